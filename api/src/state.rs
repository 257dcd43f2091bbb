// api/src/state.rs

use crate::config::AppConfig;
use crate::errors::Result;
use gestion_core::document::{DocumentGenerator, GenpdfEngine};
use gestion_core::persistence::{Persistence, StorageMode};
use gestion_core::publisher::{DocumentPublisher, LocalFileStore, ObjectStorage, SupabaseStorage};
use gestion_core::repository::postgres;
use gestion_core::tokens::TokenService;
use gestion_core::{seed, Services};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Clone, Debug)]
pub struct AppState {
  pub services: Services,
  pub storage_mode: StorageMode,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Connects, migrates and optionally seeds Postgres when configured, else
  /// falls back to the seeded in-memory backing.
  #[instrument(name = "state::initialize", skip(config))]
  pub async fn initialize(config: AppConfig) -> Result<Self> {
    let persistence = match &config.database_url {
      Some(url) => {
        let pool = PgPoolOptions::new()
          .max_connections(config.db_max_connections)
          .connect(url)
          .await?;
        info!("Successfully connected to the database.");
        postgres::migrate(&pool).await?;
        let persistence = Persistence::postgres(pool);
        if config.seed_db {
          seed::run(&persistence).await?;
        }
        persistence
      }
      None => {
        info!("USE_DB disabled; using the in-memory backing.");
        Persistence::memory()?
      }
    };
    Self::with_persistence(config, persistence)
  }

  /// Wires the production collaborators (genpdf, Supabase or local files) over `persistence`.
  /// Fails when no PDF font family can be loaded.
  pub fn with_persistence(config: AppConfig, persistence: Persistence) -> Result<Self> {
    let tokens = Arc::new(TokenService::new(&config.jwt_secret));
    let engine = GenpdfEngine::discover(&config.pdf_fonts_dir, &config.pdf_font_family)?;
    info!(fonts = %engine.source().display(), "PDF fonts loaded.");
    let generator = DocumentGenerator::new(Arc::new(engine));
    let cloud = match &config.supabase {
      Some(sb) => Some(Arc::new(SupabaseStorage::new(sb.clone())?) as Arc<dyn ObjectStorage>),
      None => None,
    };
    let local = LocalFileStore::new(config.file_storage_dir.clone(), config.api_public_base.clone(), tokens.clone());
    Ok(Self::assemble(config, persistence, tokens, generator, DocumentPublisher::new(local, cloud)))
  }

  pub fn assemble(
    config: AppConfig,
    persistence: Persistence,
    tokens: Arc<TokenService>,
    generator: DocumentGenerator,
    publisher: DocumentPublisher,
  ) -> Self {
    let services = Services::new(&persistence, tokens, generator, publisher);
    Self {
      services,
      storage_mode: persistence.mode,
      config: Arc::new(config),
    }
  }

  pub fn tokens(&self) -> &TokenService {
    self.services.auth.tokens()
  }

  pub fn db_enabled(&self) -> bool {
    self.storage_mode == StorageMode::Postgres
  }
}
