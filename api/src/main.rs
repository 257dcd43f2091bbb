// api/src/main.rs

use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{web as actix_data, App, HttpServer};
use gestion_api::{web, AppConfig, AppState};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting planillas API server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => cfg,
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }
  };
  let server_address = app_config.bind_address();

  let app_state = match AppState::initialize(app_config).await {
    Ok(state) => state,
    Err(e) => {
      tracing::error!(error = %e, "Failed to initialize application state.");
      return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }
  };
  tracing::info!(
    storage = %app_state.storage_mode,
    publish_mode = %app_state.services.documents.publish_mode(),
    "Application state ready."
  );

  let rate_limit = app_state.config.rate_limit;
  let governor_config = GovernorConfigBuilder::default()
    .period(rate_limit.replenish_period())
    .burst_size(rate_limit.max)
    .finish()
    .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "Invalid rate limit configuration"))?;
  let cors_origins = app_state.config.cors_origins.clone();
  tracing::info!(
    max = rate_limit.max,
    window = ?rate_limit.window,
    cors_any_origin = cors_origins.is_empty(),
    "Request limits configured."
  );

  tracing::info!("Attempting to bind server to {}...", server_address);
  // Outermost last: tracing, then CORS (preflights never spend the budget), then the limiter.
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(Governor::new(&governor_config))
      .wrap(web::cors(&cors_origins))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure)
  })
  .bind(&server_address)?
  .run()
  .await
}
