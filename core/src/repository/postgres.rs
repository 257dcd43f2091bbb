// core/src/repository/postgres.rs

//! Postgres backing. Runtime-checked `sqlx` queries; every statement runs on its
//! own, so a repository write and its audit entry are never in one transaction.

use super::{AuditLogRepository, NewUser, PlanillaRepository, TasaRepository, UserRepository};
use crate::error::{CoreError, CoreResult};
use crate::models::planilla::next_correlativo;
use crate::models::{
  AuditAction, AuditQuery, AuditRecord, AuditResource, AuditUser, NewAuditEntry, NewPlanilla, NewTasa, Page, PageRequest,
  Planilla, PlanillaFilter, PlanillaPatch, Role, Tasa, TasaPatch, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// Applies the bundled schema migrations.
pub async fn migrate(pool: &PgPool) -> CoreResult<()> {
  sqlx::migrate!("./migrations").run(pool).await?;
  Ok(())
}

fn new_id() -> String {
  Uuid::new_v4().to_string()
}

#[derive(Debug, Clone)]
pub struct PgPlanillas {
  pool: PgPool,
}

impl PgPlanillas {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl PlanillaRepository for PgPlanillas {
  #[instrument(name = "pg::planillas::list", skip(self))]
  async fn list(&self, filter: &PlanillaFilter, page: PageRequest) -> CoreResult<Page<Planilla>> {
    let total: i64 = sqlx::query_scalar(
      "SELECT COUNT(*) FROM planillas \
       WHERE ($1::text IS NULL OR strpos(lower(cliente), lower($1)) > 0) \
         AND ($2::text IS NULL OR strpos(lower(proyecto), lower($2)) > 0)",
    )
    .bind(&filter.cliente)
    .bind(&filter.proyecto)
    .fetch_one(&self.pool)
    .await?;

    let items: Vec<Planilla> = sqlx::query_as(
      "SELECT id, correlativo, fecha, cliente, proyecto, monto_bruto_usd FROM planillas \
       WHERE ($1::text IS NULL OR strpos(lower(cliente), lower($1)) > 0) \
         AND ($2::text IS NULL OR strpos(lower(proyecto), lower($2)) > 0) \
       ORDER BY fecha DESC LIMIT $3 OFFSET $4",
    )
    .bind(&filter.cliente)
    .bind(&filter.proyecto)
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(&self.pool)
    .await?;

    Ok(Page {
      items,
      total,
      page: page.page,
      limit: page.limit,
    })
  }

  async fn find_by_id(&self, id: &str) -> CoreResult<Option<Planilla>> {
    let planilla = sqlx::query_as(
      "SELECT id, correlativo, fecha, cliente, proyecto, monto_bruto_usd FROM planillas WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(planilla)
  }

  async fn find_by_id_or_correlativo(&self, key: &str) -> CoreResult<Option<Planilla>> {
    let planilla = sqlx::query_as(
      "SELECT id, correlativo, fecha, cliente, proyecto, monto_bruto_usd FROM planillas \
       WHERE id = $1 OR correlativo = $1 ORDER BY fecha DESC LIMIT 1",
    )
    .bind(key)
    .fetch_optional(&self.pool)
    .await?;
    Ok(planilla)
  }

  /// Count-then-insert. Correlativos are not unique: concurrent creates, or a
  /// create after deleting an older planilla, can repeat one.
  #[instrument(name = "pg::planillas::create", skip(self, input))]
  async fn create(&self, input: NewPlanilla) -> CoreResult<Planilla> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM planillas")
      .fetch_one(&self.pool)
      .await?;
    let correlativo = next_correlativo(count as usize);

    let planilla: Planilla = sqlx::query_as(
      "INSERT INTO planillas (id, correlativo, cliente, proyecto, monto_bruto_usd) VALUES ($1, $2, $3, $4, $5) \
       RETURNING id, correlativo, fecha, cliente, proyecto, monto_bruto_usd",
    )
    .bind(new_id())
    .bind(&correlativo)
    .bind(&input.cliente)
    .bind(&input.proyecto)
    .bind(input.monto_bruto_usd)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| {
      error!(%correlativo, "Failed to insert planilla: {}", e);
      CoreError::Database(e)
    })?;
    debug!(id = %planilla.id, %correlativo, "Planilla inserted.");
    Ok(planilla)
  }

  async fn update(&self, id: &str, patch: &PlanillaPatch) -> CoreResult<Planilla> {
    let updated: Option<Planilla> = sqlx::query_as(
      "UPDATE planillas SET \
         cliente = COALESCE($2, cliente), \
         proyecto = COALESCE($3, proyecto), \
         monto_bruto_usd = COALESCE($4, monto_bruto_usd) \
       WHERE id = $1 \
       RETURNING id, correlativo, fecha, cliente, proyecto, monto_bruto_usd",
    )
    .bind(id)
    .bind(&patch.cliente)
    .bind(&patch.proyecto)
    .bind(patch.monto_bruto_usd)
    .fetch_optional(&self.pool)
    .await?;
    updated.ok_or_else(CoreError::not_found)
  }

  async fn delete(&self, id: &str) -> CoreResult<()> {
    let result = sqlx::query("DELETE FROM planillas WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(CoreError::not_found());
    }
    Ok(())
  }

  async fn count(&self) -> CoreResult<i64> {
    Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM planillas").fetch_one(&self.pool).await?)
  }
}

#[derive(Debug, Clone)]
pub struct PgTasas {
  pool: PgPool,
}

impl PgTasas {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl TasaRepository for PgTasas {
  #[instrument(name = "pg::tasas::list", skip(self))]
  async fn list(&self, limit: usize) -> CoreResult<Vec<Tasa>> {
    let tasas = sqlx::query_as("SELECT id, fecha, bcv, paralela, fuente FROM tasas ORDER BY fecha DESC LIMIT $1")
      .bind(limit as i64)
      .fetch_all(&self.pool)
      .await?;
    Ok(tasas)
  }

  async fn find_by_id(&self, id: &str) -> CoreResult<Option<Tasa>> {
    let tasa = sqlx::query_as("SELECT id, fecha, bcv, paralela, fuente FROM tasas WHERE id = $1")
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(tasa)
  }

  #[instrument(name = "pg::tasas::create", skip(self, input))]
  async fn create(&self, input: NewTasa) -> CoreResult<Tasa> {
    let tasa = sqlx::query_as(
      "INSERT INTO tasas (id, bcv, paralela, fuente) VALUES ($1, $2, $3, $4) \
       RETURNING id, fecha, bcv, paralela, fuente",
    )
    .bind(new_id())
    .bind(input.bcv)
    .bind(input.paralela)
    .bind(&input.fuente)
    .fetch_one(&self.pool)
    .await?;
    Ok(tasa)
  }

  async fn update(&self, id: &str, patch: &TasaPatch) -> CoreResult<Tasa> {
    let updated: Option<Tasa> = sqlx::query_as(
      "UPDATE tasas SET \
         bcv = COALESCE($2, bcv), \
         paralela = COALESCE($3, paralela), \
         fuente = COALESCE($4, fuente) \
       WHERE id = $1 \
       RETURNING id, fecha, bcv, paralela, fuente",
    )
    .bind(id)
    .bind(patch.bcv)
    .bind(patch.paralela)
    .bind(&patch.fuente)
    .fetch_optional(&self.pool)
    .await?;
    updated.ok_or_else(CoreError::not_found)
  }

  async fn delete(&self, id: &str) -> CoreResult<()> {
    let result = sqlx::query("DELETE FROM tasas WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(CoreError::not_found());
    }
    Ok(())
  }

  async fn count(&self) -> CoreResult<i64> {
    Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasas").fetch_one(&self.pool).await?)
  }
}

#[derive(Debug, Clone)]
pub struct PgUsers {
  pool: PgPool,
}

impl PgUsers {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl UserRepository for PgUsers {
  async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
    let user = sqlx::query_as("SELECT id, email, name, role, password_hash FROM users WHERE email = $1")
      .bind(email)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn find_by_id(&self, id: &str) -> CoreResult<Option<User>> {
    let user = sqlx::query_as("SELECT id, email, name, role, password_hash FROM users WHERE id = $1")
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  #[instrument(name = "pg::users::upsert", skip(self, user), fields(email = %user.email))]
  async fn upsert(&self, user: NewUser) -> CoreResult<User> {
    let stored = sqlx::query_as(
      "INSERT INTO users (id, email, name, role, password_hash) VALUES ($1, $2, $3, $4, $5) \
       ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name, role = EXCLUDED.role, password_hash = EXCLUDED.password_hash \
       RETURNING id, email, name, role, password_hash",
    )
    .bind(new_id())
    .bind(&user.email)
    .bind(&user.name)
    .bind(user.role)
    .bind(&user.password_hash)
    .fetch_one(&self.pool)
    .await?;
    Ok(stored)
  }
}

#[derive(Debug, Clone)]
pub struct PgAuditLog {
  pool: PgPool,
}

impl PgAuditLog {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

/// Audit row joined with its (possibly deleted) author.
#[derive(Debug, FromRow)]
struct AuditRow {
  id: String,
  created_at: DateTime<Utc>,
  recurso: AuditResource,
  recurso_id: Option<String>,
  accion: AuditAction,
  ip: Option<String>,
  user_agent: Option<String>,
  before_json: Option<Value>,
  after_json: Option<Value>,
  author_id: Option<String>,
  author_email: Option<String>,
  author_name: Option<String>,
  author_role: Option<Role>,
}

impl From<AuditRow> for AuditRecord {
  fn from(row: AuditRow) -> Self {
    let user = match (row.author_id, row.author_email, row.author_name, row.author_role) {
      (Some(id), Some(email), Some(name), Some(role)) => Some(AuditUser { id, email, name, role }),
      _ => None,
    };
    AuditRecord {
      id: row.id,
      created_at: row.created_at,
      recurso: row.recurso,
      recurso_id: row.recurso_id,
      accion: row.accion,
      ip: row.ip,
      user_agent: row.user_agent,
      user,
      before_json: row.before_json,
      after_json: row.after_json,
    }
  }
}

#[async_trait]
impl AuditLogRepository for PgAuditLog {
  #[instrument(name = "pg::audit::append", skip(self, entry), fields(recurso = %entry.recurso, accion = %entry.accion))]
  async fn append(&self, entry: NewAuditEntry) -> CoreResult<()> {
    sqlx::query(
      "INSERT INTO audit_logs \
         (id, user_id, recurso, recurso_id, accion, before_json, after_json, ip, user_agent, planilla_id, tasa_id) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(new_id())
    .bind(&entry.user_id)
    .bind(entry.recurso)
    .bind(&entry.recurso_id)
    .bind(entry.accion)
    .bind(&entry.before_json)
    .bind(&entry.after_json)
    .bind(&entry.ip)
    .bind(&entry.user_agent)
    .bind(&entry.planilla_id)
    .bind(&entry.tasa_id)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  #[instrument(name = "pg::audit::search", skip(self))]
  async fn search(&self, query: &AuditQuery) -> CoreResult<Vec<AuditRecord>> {
    let rows: Vec<AuditRow> = sqlx::query_as(
      "SELECT a.id, a.created_at, a.recurso, a.recurso_id, a.accion, a.ip, a.user_agent, a.before_json, a.after_json, \
              u.id AS author_id, u.email AS author_email, u.name AS author_name, u.role AS author_role \
       FROM audit_logs a LEFT JOIN users u ON u.id = a.user_id \
       WHERE ($1::audit_resource IS NULL OR a.recurso = $1) \
         AND ($2::audit_action IS NULL OR a.accion = $2) \
         AND ($3::text IS NULL OR a.user_id = $3) \
         AND ($4::timestamptz IS NULL OR a.created_at >= $4) \
         AND ($5::timestamptz IS NULL OR a.created_at <= $5) \
       ORDER BY a.created_at DESC LIMIT $6",
    )
    .bind(query.recurso)
    .bind(query.accion)
    .bind(&query.user_id)
    .bind(query.from)
    .bind(query.to)
    .bind(query.limit)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows.into_iter().map(AuditRecord::from).collect())
  }
}
