// core/src/lib.rs

//! Domain core of the planillas / tasas administration API.
//!
//! The crate provides:
//!  - Dual-mode persistence: Postgres via `sqlx`, or seeded in-process collections.
//!  - Role based access control and HS256 bearer tokens.
//!  - A best-effort audit trail recorded after each mutation.
//!  - Server-side PDF rendering of planillas and publishing to Supabase Storage
//!    or to a local directory behind signed file tokens.
//!  - Business services tying the above together for the HTTP layer.

pub mod access;
pub mod audit;
pub mod document;
pub mod error;
pub mod models;
pub mod password;
pub mod persistence;
pub mod publisher;
pub mod repository;
pub mod seed;
pub mod services;
pub mod tokens;

// --- Re-exports for the Public API ---

pub use crate::audit::{AuditEvent, AuditRecorder, Caller, RequestOrigin};
pub use crate::document::{DocumentGenerator, GenpdfEngine, PdfEngine, PlanillaDocument, RenderedDocument};
pub use crate::error::{CoreError, CoreResult};
pub use crate::models::{Planilla, Role, Tasa, User};
pub use crate::persistence::{Persistence, StorageMode};
pub use crate::publisher::{DocumentPublisher, LocalFileStore, ObjectStorage, PublishMode, SupabaseConfig, SupabaseStorage};
pub use crate::services::Services;
pub use crate::tokens::{AccessClaims, TokenService};

/// Common imports for users of the core.
pub mod prelude {
  pub use crate::audit::{Caller, RequestOrigin};
  pub use crate::error::{CoreError, CoreResult};
  pub use crate::models::{PlanillaInput, PlanillaListParams, Role, TasaInput};
  pub use crate::services::Services;
}
