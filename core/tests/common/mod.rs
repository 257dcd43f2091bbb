// tests/common/mod.rs
#![allow(dead_code)] // Each test binary uses a different subset.

use async_trait::async_trait;
use gestion_core::audit::{AuditRecorder, Caller, RequestOrigin};
use gestion_core::document::{DocumentGenerator, PdfEngine, PlanillaDocument};
use gestion_core::error::{CoreError, CoreResult};
use gestion_core::models::{
  AuditQuery, AuditRecord, NewAuditEntry, NewPlanilla, NewTasa, PageRequest, PlanillaFilter, PlanillaInput, PlanillaPatch,
  Role, TasaInput, TasaPatch,
};
use gestion_core::publisher::ObjectStorage;
use gestion_core::repository::{AuditLogRepository, PlanillaRepository, TasaRepository};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::Level;

// --- Tracing ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Callers ---
pub fn caller(role: Role) -> Caller {
  let (id, email) = match role {
    Role::AdminGerente => ("u1", "admin@hardsoft.local"),
    Role::Operador => ("u2", "operador@hardsoft.local"),
    Role::Consulta => ("u3", "consulta@hardsoft.local"),
  };
  Caller {
    user_id: id.to_string(),
    role,
    email: email.to_string(),
    origin: RequestOrigin {
      ip: Some("203.0.113.7".to_string()),
      user_agent: Some("integration-tests".to_string()),
    },
  }
}

// --- Payload fixtures ---
pub fn planilla_input(cliente: &str, proyecto: &str, monto: f64) -> PlanillaInput {
  PlanillaInput {
    cliente: Some(cliente.to_string()),
    proyecto: Some(proyecto.to_string()),
    monto_bruto_usd: Some(monto),
  }
}

pub fn tasa_input(bcv: f64, paralela: f64) -> TasaInput {
  TasaInput {
    bcv: Some(bcv),
    paralela: Some(paralela),
    fuente: None,
  }
}

// --- Audit logs ---

/// Keeps every appended entry in memory.
#[derive(Default)]
pub struct RecordingAuditLog {
  pub entries: Mutex<Vec<NewAuditEntry>>,
}

impl RecordingAuditLog {
  pub fn entries(&self) -> Vec<NewAuditEntry> {
    self.entries.lock().clone()
  }
}

#[async_trait]
impl AuditLogRepository for RecordingAuditLog {
  async fn append(&self, entry: NewAuditEntry) -> CoreResult<()> {
    self.entries.lock().push(entry);
    Ok(())
  }

  async fn search(&self, _query: &AuditQuery) -> CoreResult<Vec<AuditRecord>> {
    Ok(Vec::new())
  }
}

/// Always fails, counting the attempts.
#[derive(Default)]
pub struct FailingAuditLog {
  pub attempts: AtomicUsize,
}

#[async_trait]
impl AuditLogRepository for FailingAuditLog {
  async fn append(&self, _entry: NewAuditEntry) -> CoreResult<()> {
    self.attempts.fetch_add(1, Ordering::SeqCst);
    Err(CoreError::Internal("audit store unavailable".to_string()))
  }

  async fn search(&self, _query: &AuditQuery) -> CoreResult<Vec<AuditRecord>> {
    Err(CoreError::Internal("audit store unavailable".to_string()))
  }
}

pub fn recorder_with(log: Arc<dyn AuditLogRepository>) -> AuditRecorder {
  AuditRecorder::new(Some(log))
}

// --- Documents ---

/// Deterministic engine: a PDF header followed by the page lines.
pub struct StubPdfEngine;

impl PdfEngine for StubPdfEngine {
  fn render(&self, document: &PlanillaDocument) -> CoreResult<Vec<u8>> {
    let mut out = b"%PDF-1.4\n".to_vec();
    for line in document.lines() {
      out.extend_from_slice(line.text.as_bytes());
      out.push(b'\n');
    }
    Ok(out)
  }
}

pub fn stub_generator() -> DocumentGenerator {
  DocumentGenerator::new(Arc::new(StubPdfEngine))
}

// --- Object storage ---

#[derive(Default)]
pub struct FakeObjectStorage {
  pub uploads: Mutex<Vec<(String, Vec<u8>, String)>>,
  pub fail_upload: bool,
  pub fail_sign: bool,
  pub sign_calls: AtomicUsize,
}

#[async_trait]
impl ObjectStorage for FakeObjectStorage {
  async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> CoreResult<()> {
    if self.fail_upload {
      return Err(CoreError::Upstream("Supabase storage upload error: bucket not found".to_string()));
    }
    self.uploads.lock().push((path.to_string(), bytes, content_type.to_string()));
    Ok(())
  }

  async fn signed_url(&self, path: &str, expires_in_secs: i64) -> CoreResult<String> {
    self.sign_calls.fetch_add(1, Ordering::SeqCst);
    if self.fail_sign {
      return Err(CoreError::Upstream("Supabase signed url error: sin url".to_string()));
    }
    Ok(format!("https://storage.test/{}?expires={}", path, expires_in_secs))
  }
}

// --- Repository contract suites ---
//
// Shared by every backing. Assertions avoid ordering and absolute correlativo
// values, which legitimately differ between backings.

fn new_planilla(cliente: &str, proyecto: &str, cents: i64) -> NewPlanilla {
  NewPlanilla {
    cliente: cliente.to_string(),
    proyecto: proyecto.to_string(),
    monto_bruto_usd: Decimal::new(cents, 2),
  }
}

pub async fn planilla_repository_contract(repo: Arc<dyn PlanillaRepository>, tag: &str) {
  let cliente = format!("Contrato {} Alfa", tag);
  let before = repo.count().await.unwrap();

  let first = repo.create(new_planilla(&cliente, "Proyecto Uno", 10_050)).await.unwrap();
  let second = repo.create(new_planilla(&format!("Otro {}", tag), "Proyecto Dos", 20_000)).await.unwrap();
  assert_eq!(repo.count().await.unwrap(), before + 2);

  // Server-assigned fields.
  assert!(!first.id.is_empty());
  assert_ne!(first.id, second.id);
  assert_eq!(first.correlativo.len(), 4);
  assert!(first.correlativo.chars().all(|c| c.is_ascii_digit()));
  let n1: u32 = first.correlativo.parse().unwrap();
  let n2: u32 = second.correlativo.parse().unwrap();
  assert!(n2 > n1, "correlativo must grow under sequential creation");
  assert_eq!(first.monto_bruto_usd, Decimal::new(10_050, 2));

  // Lookups.
  assert_eq!(repo.find_by_id(&first.id).await.unwrap().unwrap(), first);
  assert_eq!(repo.find_by_id_or_correlativo(&first.id).await.unwrap().unwrap().id, first.id);
  assert_eq!(
    repo.find_by_id_or_correlativo(&first.correlativo).await.unwrap().unwrap().id,
    first.id
  );
  assert!(repo.find_by_id("missing-id").await.unwrap().is_none());

  // Case-insensitive filter.
  let filter = PlanillaFilter {
    cliente: Some(format!("contrato {} alfa", tag).to_uppercase()),
    proyecto: None,
  };
  let page = repo.list(&filter, PageRequest::default()).await.unwrap();
  assert_eq!(page.total, 1);
  assert_eq!(page.items.len(), 1);
  assert_eq!(page.items[0].id, first.id);
  assert_eq!((page.page, page.limit), (1, 20));

  // Pagination.
  let all = repo.list(&PlanillaFilter::default(), PageRequest::default()).await.unwrap();
  let one = repo
    .list(&PlanillaFilter::default(), PageRequest::new(Some(2), Some(1)).unwrap())
    .await
    .unwrap();
  assert_eq!(one.total, all.total);
  assert_eq!(one.items.len(), 1);

  // Partial update.
  let patch = PlanillaPatch {
    proyecto: Some("Proyecto Uno Bis".to_string()),
    ..Default::default()
  };
  let updated = repo.update(&first.id, &patch).await.unwrap();
  assert_eq!(updated.proyecto, "Proyecto Uno Bis");
  assert_eq!(updated.cliente, first.cliente);
  assert_eq!(updated.monto_bruto_usd, first.monto_bruto_usd);
  assert_eq!(updated.correlativo, first.correlativo);
  assert!(matches!(
    repo.update("missing-id", &patch).await,
    Err(CoreError::NotFound(_))
  ));

  // Delete.
  repo.delete(&first.id).await.unwrap();
  assert!(repo.find_by_id(&first.id).await.unwrap().is_none());
  assert!(matches!(repo.delete(&first.id).await, Err(CoreError::NotFound(_))));

  // Creating after deleting an older record reuses the count-derived number.
  let third = repo.create(new_planilla(&cliente, "Proyecto Tres", 5_000)).await.unwrap();
  assert_eq!(repo.count().await.unwrap(), before + 2);
  assert_eq!(third.correlativo, second.correlativo);
  assert_ne!(third.id, second.id);
  repo.delete(&third.id).await.unwrap();

  repo.delete(&second.id).await.unwrap();
  assert_eq!(repo.count().await.unwrap(), before);
}

pub async fn tasa_repository_contract(repo: Arc<dyn TasaRepository>) {
  let before = repo.count().await.unwrap();
  let created = repo
    .create(NewTasa {
      bcv: Decimal::new(3_650, 2),
      paralela: Decimal::new(3_890, 2),
      fuente: "manual".to_string(),
    })
    .await
    .unwrap();
  assert!(!created.id.is_empty());
  assert_eq!(created.fuente, "manual");
  assert!(repo.list(200).await.unwrap().iter().any(|t| t.id == created.id));

  let updated = repo
    .update(
      &created.id,
      &TasaPatch {
        paralela: Some(Decimal::new(3_900, 2)),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(updated.paralela, Decimal::new(3_900, 2));
  assert_eq!(updated.bcv, created.bcv);
  assert_eq!(updated.fuente, "manual");

  assert!(matches!(
    repo.update("missing-id", &TasaPatch::default()).await,
    Err(CoreError::NotFound(_))
  ));

  repo.delete(&created.id).await.unwrap();
  assert!(repo.find_by_id(&created.id).await.unwrap().is_none());
  assert!(matches!(repo.delete(&created.id).await, Err(CoreError::NotFound(_))));
  assert_eq!(repo.count().await.unwrap(), before);
}
