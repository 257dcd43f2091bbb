// core/src/error.rs
use thiserror::Error;

/// Failure taxonomy shared by every repository, service and collaborator in the core.
///
/// The HTTP layer maps these one-to-one onto status codes; audit write failures
/// never reach this type because the recorder swallows them.
#[derive(Debug, Error)]
pub enum CoreError {
  /// Malformed, missing or out-of-range payload. Deliberately carries no field detail
  /// beyond the message.
  #[error("Validation failed: {0}")]
  Validation(String),

  #[error("Authentication failed: {0}")]
  Authentication(String),

  #[error("Not authorized: {0}")]
  Authorization(String),

  #[error("Resource not found: {0}")]
  NotFound(String),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Migration error: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("File storage error: {0}")]
  Storage(#[from] std::io::Error),

  #[error("Document rendering failed: {0}")]
  Render(String),

  /// Object storage or another remote collaborator failed.
  #[error("Upstream service error: {0}")]
  Upstream(String),

  #[error("Token error: {0}")]
  Token(#[from] jsonwebtoken::errors::Error),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl CoreError {
  pub fn invalid_payload() -> Self {
    CoreError::Validation("Payload inválido".to_string())
  }

  pub fn not_found() -> Self {
    CoreError::NotFound("No encontrado".to_string())
  }
}

pub type CoreResult<T, E = CoreError> = std::result::Result<T, E>;
