// core/src/services/planillas.rs

use crate::access::{self, Permission};
use crate::audit::{AuditEvent, AuditRecorder, Caller};
use crate::error::{CoreError, CoreResult};
use crate::models::{AuditAction, AuditResource, Page, Planilla, PlanillaInput, PlanillaListParams};
use crate::repository::PlanillaRepository;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct PlanillaService {
  repo: Arc<dyn PlanillaRepository>,
  audit: AuditRecorder,
}

impl fmt::Debug for PlanillaService {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PlanillaService").field("audit", &self.audit).finish()
  }
}

impl PlanillaService {
  pub fn new(repo: Arc<dyn PlanillaRepository>, audit: AuditRecorder) -> Self {
    Self { repo, audit }
  }

  #[instrument(name = "planillas::list", skip(self))]
  pub async fn list(&self, params: PlanillaListParams) -> CoreResult<Page<Planilla>> {
    let (filter, page) = params.into_parts()?;
    self.repo.list(&filter, page).await
  }

  #[instrument(name = "planillas::get", skip(self))]
  pub async fn get(&self, id: &str) -> CoreResult<Planilla> {
    self.repo.find_by_id(id).await?.ok_or_else(CoreError::not_found)
  }

  #[instrument(name = "planillas::create", skip(self, caller, input), fields(caller = %caller.user_id))]
  pub async fn create(&self, caller: &Caller, input: PlanillaInput) -> CoreResult<Planilla> {
    access::ensure(caller.role, Permission::Write)?;
    let new = input.validate_new()?;
    let created = self.repo.create(new).await?;
    info!(id = %created.id, correlativo = %created.correlativo, "Planilla created.");

    self
      .audit
      .record(
        caller,
        AuditEvent::new(AuditResource::Planilla, AuditAction::Create)
          .resource_id(&created.id)
          .after(created.audit_snapshot())
          .planilla(&created.id),
      )
      .await;
    Ok(created)
  }

  #[instrument(name = "planillas::update", skip(self, caller, input), fields(caller = %caller.user_id))]
  pub async fn update(&self, caller: &Caller, id: &str, input: PlanillaInput) -> CoreResult<Planilla> {
    access::ensure(caller.role, Permission::Write)?;
    let patch = input.validate_patch()?;
    let before = self.repo.find_by_id(id).await?.ok_or_else(CoreError::not_found)?;
    let updated = self.repo.update(id, &patch).await?;

    self
      .audit
      .record(
        caller,
        AuditEvent::new(AuditResource::Planilla, AuditAction::Update)
          .resource_id(&updated.id)
          .before(before.audit_snapshot())
          .after(updated.audit_snapshot())
          .planilla(&updated.id),
      )
      .await;
    Ok(updated)
  }

  #[instrument(name = "planillas::delete", skip(self, caller), fields(caller = %caller.user_id))]
  pub async fn delete(&self, caller: &Caller, id: &str) -> CoreResult<()> {
    access::ensure(caller.role, Permission::DeletePlanilla)?;
    let before = self.repo.find_by_id(id).await?.ok_or_else(CoreError::not_found)?;
    self.repo.delete(id).await?;
    info!(id = %before.id, "Planilla deleted.");

    self
      .audit
      .record(
        caller,
        AuditEvent::new(AuditResource::Planilla, AuditAction::Delete)
          .resource_id(&before.id)
          .before(before.audit_snapshot())
          .planilla(&before.id),
      )
      .await;
    Ok(())
  }
}
