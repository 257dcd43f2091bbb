// core/src/repository/memory.rs

//! Process-lifetime backing used when no database is configured.
//!
//! Each collection keeps insertion order. Locks are `parking_lot` guards taken
//! inside synchronous sections only; none is held across an `.await`.

use super::{NewUser, PlanillaRepository, TasaRepository, UserRepository, TASA_LIST_LIMIT};
use crate::error::{CoreError, CoreResult};
use crate::models::planilla::next_correlativo;
use crate::models::{NewPlanilla, NewTasa, Page, PageRequest, Planilla, PlanillaFilter, PlanillaPatch, Tasa, TasaPatch, User};
use crate::password;
use crate::seed;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, instrument};

/// Ordered records plus the counter used to mint ids.
///
/// Ids come from a monotonic counter rather than the current length so that a
/// create after a delete can never reuse a live id.
#[derive(Debug)]
struct Collection<T> {
  items: Vec<T>,
  issued: u64,
}

impl<T> Collection<T> {
  fn new() -> Self {
    Self {
      items: Vec::new(),
      issued: 0,
    }
  }

  fn next_id(&mut self, prefix: &str) -> String {
    self.issued += 1;
    format!("{}_{:03}", prefix, self.issued)
  }
}

#[derive(Debug)]
pub struct MemoryPlanillas {
  inner: RwLock<Collection<Planilla>>,
}

impl MemoryPlanillas {
  pub fn empty() -> Self {
    Self {
      inner: RwLock::new(Collection::new()),
    }
  }

  /// One example record, correlativo `0001`.
  pub fn seeded() -> Self {
    let repo = Self::empty();
    repo.insert(seed::example_planilla());
    repo
  }

  fn insert(&self, input: NewPlanilla) -> Planilla {
    let mut guard = self.inner.write();
    let correlativo = next_correlativo(guard.items.len());
    let planilla = Planilla {
      id: guard.next_id("pln"),
      correlativo,
      fecha: Utc::now(),
      cliente: input.cliente,
      proyecto: input.proyecto,
      monto_bruto_usd: input.monto_bruto_usd,
    };
    guard.items.push(planilla.clone());
    planilla
  }
}

#[async_trait]
impl PlanillaRepository for MemoryPlanillas {
  #[instrument(name = "memory::planillas::list", skip(self))]
  async fn list(&self, filter: &PlanillaFilter, page: PageRequest) -> CoreResult<Page<Planilla>> {
    let guard = self.inner.read();
    let matching: Vec<&Planilla> = guard.items.iter().filter(|p| filter.matches(p)).collect();
    let total = matching.len() as i64;
    let items = matching
      .into_iter()
      .skip(page.offset() as usize)
      .take(page.limit as usize)
      .cloned()
      .collect();
    Ok(Page {
      items,
      total,
      page: page.page,
      limit: page.limit,
    })
  }

  async fn find_by_id(&self, id: &str) -> CoreResult<Option<Planilla>> {
    Ok(self.inner.read().items.iter().find(|p| p.id == id).cloned())
  }

  async fn find_by_id_or_correlativo(&self, key: &str) -> CoreResult<Option<Planilla>> {
    let guard = self.inner.read();
    // Newest first, matching the Postgres `ORDER BY fecha DESC`.
    Ok(guard.items.iter().rev().find(|p| p.id == key || p.correlativo == key).cloned())
  }

  #[instrument(name = "memory::planillas::create", skip(self, input))]
  async fn create(&self, input: NewPlanilla) -> CoreResult<Planilla> {
    let planilla = self.insert(input);
    debug!(id = %planilla.id, correlativo = %planilla.correlativo, "Planilla stored in memory.");
    Ok(planilla)
  }

  async fn update(&self, id: &str, patch: &PlanillaPatch) -> CoreResult<Planilla> {
    let mut guard = self.inner.write();
    let planilla = guard.items.iter_mut().find(|p| p.id == id).ok_or_else(CoreError::not_found)?;
    patch.apply_to(planilla);
    Ok(planilla.clone())
  }

  async fn delete(&self, id: &str) -> CoreResult<()> {
    let mut guard = self.inner.write();
    let idx = guard.items.iter().position(|p| p.id == id).ok_or_else(CoreError::not_found)?;
    guard.items.remove(idx);
    Ok(())
  }

  async fn count(&self) -> CoreResult<i64> {
    Ok(self.inner.read().items.len() as i64)
  }
}

#[derive(Debug)]
pub struct MemoryTasas {
  inner: RwLock<Collection<Tasa>>,
}

impl MemoryTasas {
  pub fn empty() -> Self {
    Self {
      inner: RwLock::new(Collection::new()),
    }
  }

  pub fn seeded() -> Self {
    let repo = Self::empty();
    repo.insert(seed::example_tasa());
    repo
  }

  fn insert(&self, input: NewTasa) -> Tasa {
    let mut guard = self.inner.write();
    let tasa = Tasa {
      id: guard.next_id("rate"),
      fecha: Utc::now(),
      bcv: input.bcv,
      paralela: input.paralela,
      fuente: input.fuente,
    };
    guard.items.push(tasa.clone());
    tasa
  }
}

#[async_trait]
impl TasaRepository for MemoryTasas {
  /// Keeps insertion order; when over `limit`, the oldest records are left out.
  async fn list(&self, limit: usize) -> CoreResult<Vec<Tasa>> {
    let guard = self.inner.read();
    let limit = limit.min(TASA_LIST_LIMIT);
    let skip = guard.items.len().saturating_sub(limit);
    Ok(guard.items.iter().skip(skip).cloned().collect())
  }

  async fn find_by_id(&self, id: &str) -> CoreResult<Option<Tasa>> {
    Ok(self.inner.read().items.iter().find(|t| t.id == id).cloned())
  }

  #[instrument(name = "memory::tasas::create", skip(self, input))]
  async fn create(&self, input: NewTasa) -> CoreResult<Tasa> {
    Ok(self.insert(input))
  }

  async fn update(&self, id: &str, patch: &TasaPatch) -> CoreResult<Tasa> {
    let mut guard = self.inner.write();
    let tasa = guard.items.iter_mut().find(|t| t.id == id).ok_or_else(CoreError::not_found)?;
    patch.apply_to(tasa);
    Ok(tasa.clone())
  }

  async fn delete(&self, id: &str) -> CoreResult<()> {
    let mut guard = self.inner.write();
    let idx = guard.items.iter().position(|t| t.id == id).ok_or_else(CoreError::not_found)?;
    guard.items.remove(idx);
    Ok(())
  }

  async fn count(&self) -> CoreResult<i64> {
    Ok(self.inner.read().items.len() as i64)
  }
}

#[derive(Debug)]
pub struct MemoryUsers {
  users: RwLock<Vec<User>>,
}

impl MemoryUsers {
  pub fn new(users: Vec<User>) -> Self {
    Self {
      users: RwLock::new(users),
    }
  }

  /// The three demo accounts (`u1`..`u3`), passwords hashed at construction.
  pub fn demo() -> CoreResult<Self> {
    let hash = password::hash_password(seed::DEMO_PASSWORD)?;
    let users = seed::DEMO_USERS
      .iter()
      .map(|demo| User {
        id: demo.id.to_string(),
        email: demo.email.to_string(),
        name: demo.name.to_string(),
        role: demo.role,
        password_hash: hash.clone(),
      })
      .collect();
    Ok(Self::new(users))
  }
}

#[async_trait]
impl UserRepository for MemoryUsers {
  async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
    Ok(self.users.read().iter().find(|u| u.email == email).cloned())
  }

  async fn find_by_id(&self, id: &str) -> CoreResult<Option<User>> {
    Ok(self.users.read().iter().find(|u| u.id == id).cloned())
  }

  async fn upsert(&self, user: NewUser) -> CoreResult<User> {
    let mut guard = self.users.write();
    if let Some(existing) = guard.iter_mut().find(|u| u.email == user.email) {
      existing.name = user.name;
      existing.role = user.role;
      existing.password_hash = user.password_hash;
      return Ok(existing.clone());
    }
    let created = User {
      id: format!("u{}", guard.len() + 1),
      email: user.email,
      name: user.name,
      role: user.role,
      password_hash: user.password_hash,
    };
    guard.push(created.clone());
    Ok(created)
  }
}
