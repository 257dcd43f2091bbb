// core/src/services/documents.rs

use crate::access::{self, Permission};
use crate::audit::{AuditEvent, AuditRecorder, Caller};
use crate::document::{DocumentGenerator, RenderedDocument};
use crate::error::{CoreError, CoreResult};
use crate::models::{AuditAction, AuditResource, Planilla};
use crate::publisher::{DocumentPublisher, PublishMode, StoredFile};
use crate::repository::PlanillaRepository;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};

/// Body of `POST /planillas/:id/pdf/publish`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
  pub file_name: String,
  pub signed_url: String,
  pub expires_in: String,
  pub storage_mode: PublishMode,
}

/// `planilla_<correlativo>_<unix millis>.pdf`
pub fn published_file_name(correlativo: &str, millis: i64) -> String {
  format!("planilla_{}_{}.pdf", correlativo, millis)
}

#[derive(Clone)]
pub struct DocumentService {
  planillas: Arc<dyn PlanillaRepository>,
  generator: DocumentGenerator,
  publisher: DocumentPublisher,
  audit: AuditRecorder,
}

impl fmt::Debug for DocumentService {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DocumentService")
      .field("publisher", &self.publisher)
      .field("audit", &self.audit)
      .finish()
  }
}

impl DocumentService {
  pub fn new(
    planillas: Arc<dyn PlanillaRepository>,
    generator: DocumentGenerator,
    publisher: DocumentPublisher,
    audit: AuditRecorder,
  ) -> Self {
    Self {
      planillas,
      generator,
      publisher,
      audit,
    }
  }

  pub fn publish_mode(&self) -> PublishMode {
    self.publisher.mode()
  }

  /// Runs the CPU-bound render off the async workers.
  async fn render_blocking(&self, planilla: Planilla) -> CoreResult<RenderedDocument> {
    let generator = self.generator.clone();
    tokio::task::spawn_blocking(move || generator.render(&planilla))
      .await
      .map_err(|e| CoreError::Internal(format!("PDF render task failed: {}", e)))?
  }

  async fn find(&self, key: &str) -> CoreResult<Planilla> {
    self
      .planillas
      .find_by_id_or_correlativo(key)
      .await?
      .ok_or_else(|| CoreError::NotFound("Planilla no encontrada".to_string()))
  }

  /// Renders the planilla matching `key` as id or correlativo.
  #[instrument(name = "documents::render", skip(self))]
  pub async fn render(&self, key: &str) -> CoreResult<RenderedDocument> {
    let planilla = self.find(key).await?;
    self.render_blocking(planilla).await
  }

  #[instrument(name = "documents::publish", skip(self, caller), fields(caller = %caller.user_id))]
  pub async fn publish(&self, caller: &Caller, key: &str) -> CoreResult<PublishResponse> {
    access::ensure(caller.role, Permission::Write)?;
    let planilla = self.find(key).await?;
    let rendered = self.render_blocking(planilla.clone()).await?;
    let file_name = published_file_name(&rendered.correlativo, Utc::now().timestamp_millis());
    let published = self.publisher.publish(rendered.bytes, &file_name).await?;
    info!(file_name = %file_name, mode = %published.mode, "Planilla PDF published.");

    self
      .audit
      .record(
        caller,
        AuditEvent::new(AuditResource::Pdf, AuditAction::Publish)
          .resource_id(&file_name)
          .after(json!({
            "fileName": file_name,
            "correlativo": rendered.correlativo,
            "storageMode": published.mode,
            "signedUrlExpiresIn": published.expires_in,
          }))
          .planilla(&planilla.id),
      )
      .await;

    Ok(PublishResponse {
      file_name,
      signed_url: published.signed_url,
      expires_in: published.expires_in.to_string(),
      storage_mode: published.mode,
    })
  }

  /// Resolves a file token into the locally stored PDF. No caller identity involved.
  pub async fn open_file(&self, token: &str) -> CoreResult<StoredFile> {
    self.publisher.local().open(token).await
  }
}
