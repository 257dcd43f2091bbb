// api/src/web/handlers/audit_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use gestion_core::models::AuditQueryParams;

#[instrument(name = "handler::auditoria", skip(app_state, user), fields(user_id = %user.claims.sub))]
pub async fn list_audit_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  query: web::Query<AuditQueryParams>,
) -> Result<HttpResponse, AppError> {
  let listing = app_state.services.audit.search(&user.caller(), query.into_inner()).await?;
  Ok(HttpResponse::Ok().json(listing))
}
