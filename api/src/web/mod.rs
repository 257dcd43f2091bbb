// api/src/web/mod.rs

pub mod extractors;
pub mod handlers;
pub mod routes;

pub use routes::configure_app_routes;

use crate::errors::AppError;
use actix_cors::Cors;
use actix_web::web;
use gestion_core::CoreError;

/// Malformed JSON bodies are validation failures, not 400s.
pub fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().error_handler(|err, _req| {
    tracing::debug!(error = %err, "Rejected JSON body.");
    AppError::Core(CoreError::invalid_payload()).into()
  })
}

pub fn query_config() -> web::QueryConfig {
  web::QueryConfig::default().error_handler(|err, _req| {
    tracing::debug!(error = %err, "Rejected query string.");
    AppError::Core(CoreError::invalid_payload()).into()
  })
}

/// Extractor configuration plus every route; shared by the server and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
  cfg.app_data(json_config()).app_data(query_config());
  configure_app_routes(cfg);
}

/// Browser access policy. An empty list allows any origin; requests without an
/// `Origin` header are never affected.
pub fn cors(origins: &[String]) -> Cors {
  let cors = Cors::default().allow_any_method().allow_any_header().max_age(3600);
  if origins.is_empty() {
    return cors.allow_any_origin();
  }
  origins.iter().fold(cors, |cors, origin| cors.allowed_origin(origin))
}
