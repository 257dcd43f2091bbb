// api/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use gestion_core::publisher::SupabaseConfig;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_JWT_SECRET: &str = "dev-secret-change-me";
pub const DEFAULT_RATE_LIMIT_MAX: u32 = 120;
pub const DEFAULT_RATE_LIMIT_WINDOW: &str = "1 minute";

/// Per-client request budget: `max` requests every `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
  pub max: u32,
  pub window: Duration,
}

impl RateLimit {
  /// Interval after which one spent request is given back.
  pub fn replenish_period(&self) -> Duration {
    (self.window / self.max.max(1)).max(Duration::from_millis(1))
  }
}

/// `RATE_LIMIT_WINDOW`: bare integers are milliseconds, anything else a
/// humantime span such as `1 minute` or `30s`.
fn parse_window(value: &str) -> Result<Duration> {
  let window = match value.parse::<u64>() {
    Ok(millis) => Duration::from_millis(millis),
    Err(_) => humantime::parse_duration(value)
      .map_err(|e| AppError::Config(format!("Invalid RATE_LIMIT_WINDOW {:?}: {}", value, e)))?,
  };
  if window.is_zero() {
    return Err(AppError::Config("RATE_LIMIT_WINDOW must be positive".to_string()));
  }
  Ok(window)
}

/// `CORS_ORIGINS`: comma-separated; empty or containing `*` allows any origin.
fn parse_origins(value: &str) -> Result<Vec<String>> {
  let origins: Vec<String> = value
    .split(',')
    .map(str::trim)
    .filter(|o| !o.is_empty())
    .map(|o| o.trim_end_matches('/').to_string())
    .collect();
  if origins.iter().any(|o| o == "*") {
    return Ok(Vec::new());
  }
  if let Some(bad) = origins
    .iter()
    .find(|o| !(o.starts_with("http://") || o.starts_with("https://")))
  {
    return Err(AppError::Config(format!("Invalid CORS origin: {}", bad)));
  }
  Ok(origins)
}

#[derive(Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// Set only when `USE_DB=1` and `DATABASE_URL` is non-empty.
  pub database_url: Option<String>,
  pub db_max_connections: u32,
  pub seed_db: bool,

  pub jwt_secret: String,
  pub file_storage_dir: PathBuf,
  pub api_public_base: String,
  /// Cloud publishing; requires both URL and service role key.
  pub supabase: Option<SupabaseConfig>,

  pub pdf_fonts_dir: PathBuf,
  pub pdf_font_family: String,
  pub public_dir: PathBuf,

  /// Allowed browser origins; empty allows any.
  pub cors_origins: Vec<String>,
  pub rate_limit: RateLimit,
}

impl fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AppConfig")
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database", &self.database_url.as_ref().map(|_| "[REDACTED]"))
      .field("db_max_connections", &self.db_max_connections)
      .field("seed_db", &self.seed_db)
      .field("file_storage_dir", &self.file_storage_dir)
      .field("api_public_base", &self.api_public_base)
      .field("supabase", &self.supabase)
      .field("pdf_fonts_dir", &self.pdf_fonts_dir)
      .field("pdf_font_family", &self.pdf_font_family)
      .field("public_dir", &self.public_dir)
      .field("cors_origins", &self.cors_origins)
      .field("rate_limit", &self.rate_limit)
      .finish_non_exhaustive()
  }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
  match value.trim().to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Ok(true),
    "0" | "false" | "no" | "off" | "" => Ok(false),
    other => Err(AppError::Config(format!("Invalid {} value: {}", name, other))),
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_source(|name| env::var(name).ok())
  }

  /// Builds the configuration from any variable lookup; empty values count as unset.
  pub fn from_source<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let server_host = get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
    let server_port = get("PORT")
      .unwrap_or_else(|| "4000".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid PORT: {}", e)))?;

    let use_db = get("USE_DB").map(|v| v == "1").unwrap_or(false);
    let database_url = if use_db { get("DATABASE_URL") } else { None };
    let db_max_connections = get("DB_MAX_CONNECTIONS")
      .unwrap_or_else(|| "5".to_string())
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid DB_MAX_CONNECTIONS: {}", e)))?;
    let seed_db = match get("SEED_DB") {
      Some(v) => parse_flag("SEED_DB", &v)?,
      None => false,
    };

    let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());
    let file_storage_dir = PathBuf::from(get("FILE_STORAGE_DIR").unwrap_or_else(|| "./storage/pdfs".to_string()));
    let api_public_base = get("API_PUBLIC_BASE").unwrap_or_else(|| format!("http://127.0.0.1:{}", server_port));

    let supabase = match (get("SUPABASE_URL"), get("SUPABASE_SERVICE_ROLE_KEY")) {
      (Some(url), Some(service_role_key)) => Some(SupabaseConfig {
        url,
        service_role_key,
        bucket: get("SUPABASE_STORAGE_BUCKET").unwrap_or_else(|| "planillas-pdf".to_string()),
      }),
      _ => None,
    };

    let pdf_fonts_dir = PathBuf::from(get("PDF_FONTS_DIR").unwrap_or_else(|| "./fonts".to_string()));
    let pdf_font_family = get("PDF_FONT_FAMILY").unwrap_or_else(|| "LiberationSans".to_string());
    let public_dir = PathBuf::from(get("PUBLIC_DIR").unwrap_or_else(|| "./public".to_string()));

    let cors_origins = parse_origins(&get("CORS_ORIGINS").unwrap_or_default())?;
    let max = get("RATE_LIMIT_MAX")
      .unwrap_or_else(|| DEFAULT_RATE_LIMIT_MAX.to_string())
      .parse::<u32>()
      .ok()
      .filter(|max| *max > 0)
      .ok_or_else(|| AppError::Config("RATE_LIMIT_MAX must be a positive integer".to_string()))?;
    let window = parse_window(&get("RATE_LIMIT_WINDOW").unwrap_or_else(|| DEFAULT_RATE_LIMIT_WINDOW.to_string()))?;

    if jwt_secret == DEFAULT_JWT_SECRET {
      tracing::warn!("JWT_SECRET not set; using the development secret.");
    }
    tracing::info!(
      db_enabled = database_url.is_some(),
      cloud_storage = supabase.is_some(),
      "Application configuration loaded successfully."
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      db_max_connections,
      seed_db,
      jwt_secret,
      file_storage_dir,
      api_public_base,
      supabase,
      pdf_fonts_dir,
      pdf_font_family,
      public_dir,
      cors_origins,
      rate_limit: RateLimit { max, window },
    })
  }

  pub fn db_enabled(&self) -> bool {
    self.database_url.is_some()
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}
