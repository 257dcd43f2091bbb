// core/src/persistence.rs

//! The repository bundle chosen once at startup and handed to every service.

use crate::error::CoreResult;
use crate::repository::memory::{MemoryPlanillas, MemoryTasas, MemoryUsers};
use crate::repository::postgres::{PgAuditLog, PgPlanillas, PgTasas, PgUsers};
use crate::repository::{AuditLogRepository, PlanillaRepository, TasaRepository, UserRepository};
use sqlx::PgPool;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
  Memory,
  Postgres,
}

impl fmt::Display for StorageMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StorageMode::Memory => write!(f, "memory"),
      StorageMode::Postgres => write!(f, "postgres"),
    }
  }
}

#[derive(Clone)]
pub struct Persistence {
  pub mode: StorageMode,
  pub planillas: Arc<dyn PlanillaRepository>,
  pub tasas: Arc<dyn TasaRepository>,
  pub users: Arc<dyn UserRepository>,
  /// `None` under the memory backing: auditing is then a silent no-op.
  pub audit_log: Option<Arc<dyn AuditLogRepository>>,
}

impl Persistence {
  /// Volatile backing seeded with one planilla, one tasa and the demo users.
  pub fn memory() -> CoreResult<Self> {
    Ok(Self {
      mode: StorageMode::Memory,
      planillas: Arc::new(MemoryPlanillas::seeded()),
      tasas: Arc::new(MemoryTasas::seeded()),
      users: Arc::new(MemoryUsers::demo()?),
      audit_log: None,
    })
  }

  pub fn postgres(pool: PgPool) -> Self {
    Self {
      mode: StorageMode::Postgres,
      planillas: Arc::new(PgPlanillas::new(pool.clone())),
      tasas: Arc::new(PgTasas::new(pool.clone())),
      users: Arc::new(PgUsers::new(pool.clone())),
      audit_log: Some(Arc::new(PgAuditLog::new(pool))),
    }
  }

  pub fn is_persistent(&self) -> bool {
    self.mode == StorageMode::Postgres
  }
}

impl fmt::Debug for Persistence {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Persistence")
      .field("mode", &self.mode)
      .field("audit", &self.audit_log.is_some())
      .finish()
  }
}
