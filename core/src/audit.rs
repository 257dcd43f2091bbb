// core/src/audit.rs

//! Best-effort audit side channel.
//!
//! Entries are written after the primary mutation has committed, in a separate
//! statement. A failed write is logged and dropped; it never changes the result
//! of the operation that triggered it.

use crate::access::{self, Permission};
use crate::error::CoreResult;
use crate::models::{AuditAction, AuditQueryParams, AuditRecord, AuditResource, Listing, NewAuditEntry, Role};
use crate::repository::AuditLogRepository;
use crate::tokens::AccessClaims;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Network origin of the request behind a mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOrigin {
  pub ip: Option<String>,
  pub user_agent: Option<String>,
}

/// Authenticated identity on whose behalf a service operation runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Caller {
  pub user_id: String,
  pub role: Role,
  pub email: String,
  pub origin: RequestOrigin,
}

impl Caller {
  pub fn from_claims(claims: &AccessClaims, origin: RequestOrigin) -> Self {
    Self {
      user_id: claims.sub.clone(),
      role: claims.role,
      email: claims.email.clone(),
      origin,
    }
  }
}

/// What happened, to which record, and the snapshots around it.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
  pub recurso: AuditResource,
  pub accion: AuditAction,
  pub recurso_id: Option<String>,
  pub before: Option<Value>,
  pub after: Option<Value>,
  pub planilla_id: Option<String>,
  pub tasa_id: Option<String>,
}

impl AuditEvent {
  pub fn new(recurso: AuditResource, accion: AuditAction) -> Self {
    Self {
      recurso,
      accion,
      recurso_id: None,
      before: None,
      after: None,
      planilla_id: None,
      tasa_id: None,
    }
  }

  pub fn resource_id(mut self, id: impl Into<String>) -> Self {
    self.recurso_id = Some(id.into());
    self
  }

  pub fn before(mut self, snapshot: Value) -> Self {
    self.before = Some(snapshot);
    self
  }

  pub fn after(mut self, snapshot: Value) -> Self {
    self.after = Some(snapshot);
    self
  }

  pub fn planilla(mut self, id: impl Into<String>) -> Self {
    self.planilla_id = Some(id.into());
    self
  }

  pub fn tasa(mut self, id: impl Into<String>) -> Self {
    self.tasa_id = Some(id.into());
    self
  }
}

#[derive(Clone, Default)]
pub struct AuditRecorder {
  log: Option<Arc<dyn AuditLogRepository>>,
}

impl std::fmt::Debug for AuditRecorder {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AuditRecorder").field("enabled", &self.is_enabled()).finish()
  }
}

impl AuditRecorder {
  pub fn new(log: Option<Arc<dyn AuditLogRepository>>) -> Self {
    Self { log }
  }

  pub fn is_enabled(&self) -> bool {
    self.log.is_some()
  }

  /// Appends one entry. No-op without a persistent log or an identified caller.
  #[instrument(name = "audit::record", skip_all, fields(recurso = %event.recurso, accion = %event.accion))]
  pub async fn record(&self, caller: &Caller, event: AuditEvent) {
    let Some(log) = &self.log else {
      debug!("Audit log disabled; entry skipped.");
      return;
    };
    if caller.user_id.is_empty() {
      debug!("Anonymous caller; audit entry skipped.");
      return;
    }

    let entry = NewAuditEntry {
      user_id: caller.user_id.clone(),
      recurso: event.recurso,
      recurso_id: event.recurso_id,
      accion: event.accion,
      before_json: event.before,
      after_json: event.after,
      ip: caller.origin.ip.clone(),
      user_agent: caller.origin.user_agent.clone(),
      planilla_id: event.planilla_id,
      tasa_id: event.tasa_id,
    };
    if let Err(err) = log.append(entry).await {
      warn!(error = %err, "No se pudo registrar auditoría");
    }
  }

  /// Requires audit-read permission. Without a persistent log the result is
  /// empty and the filters are never parsed; otherwise malformed filters fail.
  #[instrument(name = "audit::search", skip(self, caller), fields(caller = %caller.user_id))]
  pub async fn search(&self, caller: &Caller, params: AuditQueryParams) -> CoreResult<Listing<AuditRecord>> {
    access::ensure(caller.role, Permission::ReadAudit)?;
    let Some(log) = &self.log else {
      return Ok(Listing::empty());
    };
    let query = params.into_query()?;
    Ok(Listing::new(log.search(&query).await?))
  }
}
