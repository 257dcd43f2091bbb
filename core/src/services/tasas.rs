// core/src/services/tasas.rs

use crate::access::{self, Permission};
use crate::audit::{AuditEvent, AuditRecorder, Caller};
use crate::error::{CoreError, CoreResult};
use crate::models::{AuditAction, AuditResource, Listing, Tasa, TasaInput};
use crate::repository::{TasaRepository, TASA_LIST_LIMIT};
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct TasaService {
  repo: Arc<dyn TasaRepository>,
  audit: AuditRecorder,
}

impl fmt::Debug for TasaService {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TasaService").field("audit", &self.audit).finish()
  }
}

impl TasaService {
  pub fn new(repo: Arc<dyn TasaRepository>, audit: AuditRecorder) -> Self {
    Self { repo, audit }
  }

  #[instrument(name = "tasas::list", skip(self))]
  pub async fn list(&self) -> CoreResult<Listing<Tasa>> {
    Ok(Listing::new(self.repo.list(TASA_LIST_LIMIT).await?))
  }

  #[instrument(name = "tasas::create", skip(self, caller, input), fields(caller = %caller.user_id))]
  pub async fn create(&self, caller: &Caller, input: TasaInput) -> CoreResult<Tasa> {
    access::ensure(caller.role, Permission::Write)?;
    let new = input.validate_new()?;
    let created = self.repo.create(new).await?;
    info!(id = %created.id, "Tasa created.");

    self
      .audit
      .record(
        caller,
        AuditEvent::new(AuditResource::Tasa, AuditAction::Create)
          .resource_id(&created.id)
          .after(created.audit_snapshot())
          .tasa(&created.id),
      )
      .await;
    Ok(created)
  }

  #[instrument(name = "tasas::update", skip(self, caller, input), fields(caller = %caller.user_id))]
  pub async fn update(&self, caller: &Caller, id: &str, input: TasaInput) -> CoreResult<Tasa> {
    access::ensure(caller.role, Permission::Write)?;
    let patch = input.validate_patch()?;
    let before = self.repo.find_by_id(id).await?.ok_or_else(CoreError::not_found)?;
    let updated = self.repo.update(id, &patch).await?;

    self
      .audit
      .record(
        caller,
        AuditEvent::new(AuditResource::Tasa, AuditAction::Update)
          .resource_id(&updated.id)
          .before(before.audit_snapshot())
          .after(updated.audit_snapshot())
          .tasa(&updated.id),
      )
      .await;
    Ok(updated)
  }

  /// Any writer may delete a tasa.
  #[instrument(name = "tasas::delete", skip(self, caller), fields(caller = %caller.user_id))]
  pub async fn delete(&self, caller: &Caller, id: &str) -> CoreResult<()> {
    access::ensure(caller.role, Permission::Write)?;
    let before = self.repo.find_by_id(id).await?.ok_or_else(CoreError::not_found)?;
    self.repo.delete(id).await?;
    info!(id = %before.id, "Tasa deleted.");

    self
      .audit
      .record(
        caller,
        AuditEvent::new(AuditResource::Tasa, AuditAction::Delete)
          .resource_id(&before.id)
          .before(before.audit_snapshot())
          .tasa(&before.id),
      )
      .await;
    Ok(())
  }
}
