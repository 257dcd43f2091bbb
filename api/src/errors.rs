// api/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use gestion_core::CoreError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error(transparent)]
  Core(#[from] CoreError),

  /// Missing or rejected bearer token.
  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  pub fn unauthenticated() -> Self {
    AppError::Auth("No autenticado".to_string())
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Core(CoreError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
      AppError::Core(CoreError::Authentication(_)) | AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Core(CoreError::Authorization(_)) => StatusCode::FORBIDDEN,
      AppError::Core(CoreError::NotFound(_)) => StatusCode::NOT_FOUND,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Request rejected");
    }
    let mut builder = HttpResponse::build(status);
    match self {
      AppError::Core(CoreError::Validation(m))
      | AppError::Core(CoreError::Authentication(m))
      | AppError::Core(CoreError::Authorization(m))
      | AppError::Core(CoreError::NotFound(m))
      | AppError::Auth(m) => builder.json(json!({"error": m})),
      AppError::Core(CoreError::Upstream(m)) => {
        builder.json(json!({"error": "Error publicando el documento", "detail": m}))
      }
      AppError::Core(CoreError::Render(m)) => builder.json(json!({"error": "Error generando PDF", "detail": m})),
      AppError::Core(CoreError::Database(_)) | AppError::Core(CoreError::Migration(_)) | AppError::Sqlx(_) => {
        builder.json(json!({"error": "Error de base de datos"}))
      }
      _ => builder.json(json!({"error": "Error interno"})),
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
