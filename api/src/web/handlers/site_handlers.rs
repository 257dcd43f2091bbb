// api/src/web/handlers/site_handlers.rs

use actix_web::{web, HttpResponse};
use gestion_core::CoreError;
use serde_json::json;
use tracing::{debug, instrument};

use crate::errors::AppError;
use crate::state::AppState;

pub const SERVICE_NAME: &str = "gestion-financiera-api-v2";

pub async fn health_check_handler(app_state: web::Data<AppState>) -> HttpResponse {
  HttpResponse::Ok().json(json!({
    "ok": true,
    "service": SERVICE_NAME,
    "dbEnabled": app_state.db_enabled(),
  }))
}

/// Landing page from the configured public directory.
#[instrument(name = "handler::index", skip_all)]
pub async fn index_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let path = app_state.config.public_dir.join("index.html");
  match tokio::fs::read(&path).await {
    Ok(bytes) => Ok(HttpResponse::Ok().content_type("text/html; charset=utf-8").body(bytes)),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
      debug!(path = %path.display(), "Landing page not found.");
      Err(CoreError::not_found().into())
    }
    Err(e) => Err(CoreError::Storage(e).into()),
  }
}
