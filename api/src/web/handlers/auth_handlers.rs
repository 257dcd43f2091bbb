// api/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use gestion_core::services::{LoginInput, RefreshInput};

#[instrument(name = "handler::login", skip_all)]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<LoginInput>,
) -> Result<HttpResponse, AppError> {
  let response = app_state.services.auth.login(payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(response))
}

#[instrument(name = "handler::refresh", skip_all)]
pub async fn refresh_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<RefreshInput>,
) -> Result<HttpResponse, AppError> {
  let response = app_state.services.auth.refresh(payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(response))
}

/// Tokens are stateless; the client simply drops them.
pub async fn logout_handler() -> HttpResponse {
  HttpResponse::NoContent().finish()
}

#[instrument(name = "handler::me", skip_all, fields(user_id = %user.claims.sub))]
pub async fn me_handler(user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(json!({ "user": user.claims })))
}
