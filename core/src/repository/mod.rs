// core/src/repository/mod.rs

//! Storage contracts shared by the in-memory and Postgres backings.
//!
//! Both backings expose identical record shapes. They are allowed to differ in
//! two places only:
//!  - listing order: Postgres returns newest first, memory returns insertion order;
//!  - correlativo uniqueness: both assign `count + 1`, which can repeat after deletions.

pub mod memory;
pub mod postgres;

use crate::error::CoreResult;
use crate::models::{
  AuditQuery, AuditRecord, NewAuditEntry, NewPlanilla, NewTasa, Page, PageRequest, Planilla, PlanillaFilter,
  PlanillaPatch, Role, Tasa, TasaPatch, User,
};
use async_trait::async_trait;

/// Most recent tasas returned by the unpaginated listing.
pub const TASA_LIST_LIMIT: usize = 200;

#[async_trait]
pub trait PlanillaRepository: Send + Sync {
  async fn list(&self, filter: &PlanillaFilter, page: PageRequest) -> CoreResult<Page<Planilla>>;

  async fn find_by_id(&self, id: &str) -> CoreResult<Option<Planilla>>;

  /// Matches either the record id or its correlativo.
  async fn find_by_id_or_correlativo(&self, key: &str) -> CoreResult<Option<Planilla>>;

  /// Assigns id, fecha and the next correlativo.
  async fn create(&self, input: NewPlanilla) -> CoreResult<Planilla>;

  /// Fails with `NotFound` when no record has `id`.
  async fn update(&self, id: &str, patch: &PlanillaPatch) -> CoreResult<Planilla>;

  /// Fails with `NotFound` when no record has `id`.
  async fn delete(&self, id: &str) -> CoreResult<()>;

  async fn count(&self) -> CoreResult<i64>;
}

#[async_trait]
pub trait TasaRepository: Send + Sync {
  /// Up to `limit` records.
  async fn list(&self, limit: usize) -> CoreResult<Vec<Tasa>>;

  async fn find_by_id(&self, id: &str) -> CoreResult<Option<Tasa>>;

  async fn create(&self, input: NewTasa) -> CoreResult<Tasa>;

  async fn update(&self, id: &str, patch: &TasaPatch) -> CoreResult<Tasa>;

  async fn delete(&self, id: &str) -> CoreResult<()>;

  async fn count(&self) -> CoreResult<i64>;
}

/// Seeding input for the identity store.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email: String,
  pub name: String,
  pub role: Role,
  pub password_hash: String,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
  async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>>;

  async fn find_by_id(&self, id: &str) -> CoreResult<Option<User>>;

  /// Inserts or, when the email exists, replaces name, role and hash.
  async fn upsert(&self, user: NewUser) -> CoreResult<User>;
}

/// Append-only audit storage. Only the persistent backing provides one.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
  async fn append(&self, entry: NewAuditEntry) -> CoreResult<()>;

  /// Newest first, at most `query.limit` rows.
  async fn search(&self, query: &AuditQuery) -> CoreResult<Vec<AuditRecord>>;
}
