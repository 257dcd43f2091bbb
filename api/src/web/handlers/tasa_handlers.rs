// api/src/web/handlers/tasa_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use gestion_core::models::TasaInput;

#[instrument(name = "handler::list_tasas", skip_all)]
pub async fn list_tasas_handler(
  app_state: web::Data<AppState>,
  _user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  Ok(HttpResponse::Ok().json(app_state.services.tasas.list().await?))
}

#[instrument(name = "handler::create_tasa", skip_all, fields(user_id = %user.claims.sub))]
pub async fn create_tasa_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let input: TasaInput = user.write_payload(&body)?;
  let created = app_state.services.tasas.create(&user.caller(), input).await?;
  Ok(HttpResponse::Created().json(created))
}

#[instrument(name = "handler::update_tasa", skip_all, fields(user_id = %user.claims.sub, tasa_id = %path.as_ref()))]
pub async fn update_tasa_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<String>,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let input: TasaInput = user.write_payload(&body)?;
  let updated = app_state
    .services
    .tasas
    .update(&user.caller(), &path.into_inner(), input)
    .await?;
  Ok(HttpResponse::Ok().json(updated))
}

#[instrument(name = "handler::delete_tasa", skip_all, fields(user_id = %user.claims.sub, tasa_id = %path.as_ref()))]
pub async fn delete_tasa_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  app_state.services.tasas.delete(&user.caller(), &path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}
