// api/src/web/handlers/file_handlers.rs

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;

/// Public, gated only by the signed file token in the path.
#[instrument(name = "handler::download_pdf", skip_all)]
pub async fn download_pdf_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let file = app_state.services.documents.open_file(&path.into_inner()).await?;
  Ok(
    HttpResponse::Ok()
      .content_type("application/pdf")
      .insert_header((header::CONTENT_DISPOSITION, format!("inline; filename={}", file.file_name)))
      .body(file.bytes),
  )
}
