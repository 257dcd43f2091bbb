// core/src/services/mod.rs

//! Business operations behind the HTTP handlers.
//!
//! Every mutating call runs the same sequence: authorize, validate, check the
//! target exists, mutate, then hand the snapshots to the audit recorder.

pub mod auth;
pub mod documents;
pub mod planillas;
pub mod tasas;

pub use auth::{AuthResponse, AuthService, LoginInput, RefreshInput};
pub use documents::{DocumentService, PublishResponse};
pub use planillas::PlanillaService;
pub use tasas::TasaService;

use crate::audit::AuditRecorder;
use crate::document::DocumentGenerator;
use crate::persistence::Persistence;
use crate::publisher::DocumentPublisher;
use crate::tokens::TokenService;
use std::sync::Arc;

/// All services wired over one persistence bundle.
#[derive(Clone, Debug)]
pub struct Services {
  pub auth: AuthService,
  pub planillas: PlanillaService,
  pub tasas: TasaService,
  pub documents: DocumentService,
  pub audit: AuditRecorder,
}

impl Services {
  pub fn new(
    persistence: &Persistence,
    tokens: Arc<TokenService>,
    generator: DocumentGenerator,
    publisher: DocumentPublisher,
  ) -> Self {
    let audit = AuditRecorder::new(persistence.audit_log.clone());
    Self {
      auth: AuthService::new(persistence.users.clone(), tokens),
      planillas: PlanillaService::new(persistence.planillas.clone(), audit.clone()),
      tasas: TasaService::new(persistence.tasas.clone(), audit.clone()),
      documents: DocumentService::new(persistence.planillas.clone(), generator, publisher, audit.clone()),
      audit,
    }
  }
}
