// api/src/web/handlers/planilla_handlers.rs

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use gestion_core::models::{PlanillaInput, PlanillaListParams};

#[instrument(name = "handler::list_planillas", skip(app_state, _user))]
pub async fn list_planillas_handler(
  app_state: web::Data<AppState>,
  _user: AuthenticatedUser,
  query: web::Query<PlanillaListParams>,
) -> Result<HttpResponse, AppError> {
  let page = app_state.services.planillas.list(query.into_inner()).await?;
  Ok(HttpResponse::Ok().json(page))
}

#[instrument(name = "handler::get_planilla", skip(app_state, _user, path), fields(planilla_id = %path.as_ref()))]
pub async fn get_planilla_handler(
  app_state: web::Data<AppState>,
  _user: AuthenticatedUser,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let planilla = app_state.services.planillas.get(&path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(planilla))
}

#[instrument(name = "handler::create_planilla", skip_all, fields(user_id = %user.claims.sub))]
pub async fn create_planilla_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let input: PlanillaInput = user.write_payload(&body)?;
  let created = app_state
    .services
    .planillas
    .create(&user.caller(), input)
    .await?;
  Ok(HttpResponse::Created().json(created))
}

#[instrument(name = "handler::update_planilla", skip_all, fields(user_id = %user.claims.sub, planilla_id = %path.as_ref()))]
pub async fn update_planilla_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<String>,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let input: PlanillaInput = user.write_payload(&body)?;
  let updated = app_state
    .services
    .planillas
    .update(&user.caller(), &path.into_inner(), input)
    .await?;
  Ok(HttpResponse::Ok().json(updated))
}

#[instrument(name = "handler::delete_planilla", skip_all, fields(user_id = %user.claims.sub, planilla_id = %path.as_ref()))]
pub async fn delete_planilla_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  app_state
    .services
    .planillas
    .delete(&user.caller(), &path.into_inner())
    .await?;
  Ok(HttpResponse::NoContent().finish())
}

/// Streams the PDF of the planilla matching the id or correlativo.
#[instrument(name = "handler::planilla_pdf", skip(app_state, _user, path), fields(key = %path.as_ref()))]
pub async fn planilla_pdf_handler(
  app_state: web::Data<AppState>,
  _user: AuthenticatedUser,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let rendered = app_state.services.documents.render(&path.into_inner()).await?;
  info!(correlativo = %rendered.correlativo, size = rendered.bytes.len(), "Serving planilla PDF.");
  Ok(
    HttpResponse::Ok()
      .content_type("application/pdf")
      .insert_header((
        header::CONTENT_DISPOSITION,
        format!("inline; filename=planilla_{}.pdf", rendered.correlativo),
      ))
      .body(rendered.bytes),
  )
}

#[instrument(name = "handler::publish_planilla_pdf", skip_all, fields(user_id = %user.claims.sub, key = %path.as_ref()))]
pub async fn publish_planilla_pdf_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let published = app_state
    .services
    .documents
    .publish(&user.caller(), &path.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(published))
}
