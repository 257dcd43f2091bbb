// core/src/publisher.rs

//! Publishes rendered PDFs either to Supabase object storage or to a local
//! directory served through signed file tokens.
//!
//! The mode is fixed when the [`DocumentPublisher`] is built: a configured
//! [`ObjectStorage`] wins, otherwise files go to disk.

use crate::error::{CoreError, CoreResult};
use crate::tokens::{TokenService, FILE_TOKEN_TTL_SECS};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// Human readable lifetime of every signed URL handed out.
pub const SIGNED_URL_EXPIRES_IN: &str = "24h";

/// Object-store prefix for published planillas.
pub const STORAGE_PREFIX: &str = "planillas";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishMode {
  Supabase,
  Local,
}

impl fmt::Display for PublishMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PublishMode::Supabase => write!(f, "supabase"),
      PublishMode::Local => write!(f, "local"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedDocument {
  pub mode: PublishMode,
  /// Object path in the bucket, or the file path on disk.
  pub location: String,
  pub signed_url: String,
  pub expires_in: &'static str,
}

/// Upload + signed URL primitive of a remote object store.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
  /// Stores `bytes` at `path`, replacing any existing object.
  async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> CoreResult<()>;

  /// Absolute URL granting read access to `path` for `expires_in_secs`.
  async fn signed_url(&self, path: &str, expires_in_secs: i64) -> CoreResult<String>;
}

#[derive(Clone)]
pub struct SupabaseConfig {
  pub url: String,
  pub service_role_key: String,
  pub bucket: String,
}

impl fmt::Debug for SupabaseConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SupabaseConfig")
      .field("url", &self.url)
      .field("service_role_key", &"[REDACTED]")
      .field("bucket", &self.bucket)
      .finish()
  }
}

/// Supabase Storage REST client authenticated with the service role key.
pub struct SupabaseStorage {
  client: reqwest::Client,
  base: String,
  key: String,
  bucket: String,
}

impl fmt::Debug for SupabaseStorage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SupabaseStorage")
      .field("base", &self.base)
      .field("bucket", &self.bucket)
      .finish_non_exhaustive()
  }
}

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
  #[serde(rename = "signedURL")]
  signed_url: Option<String>,
}

fn upstream(err: anyhow::Error) -> CoreError {
  error!(error = %format!("{:#}", err), "Object storage call failed.");
  CoreError::Upstream(format!("{:#}", err))
}

impl SupabaseStorage {
  pub fn new(config: SupabaseConfig) -> CoreResult<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(|e| CoreError::Internal(format!("Error creando cliente HTTP: {}", e)))?;
    Ok(Self {
      client,
      base: config.url.trim_end_matches('/').to_string(),
      key: config.service_role_key,
      bucket: config.bucket,
    })
  }

  fn storage_url(&self, suffix: &str) -> String {
    format!("{}/storage/v1{}", self.base, suffix)
  }

  async fn try_upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> anyhow::Result<()> {
    let endpoint = self.storage_url(&format!("/object/{}/{}", self.bucket, path));
    let response = self
      .client
      .post(&endpoint)
      .header("Authorization", format!("Bearer {}", self.key))
      .header("apikey", &self.key)
      .header("Content-Type", content_type)
      .header("x-upsert", "true")
      .body(bytes)
      .send()
      .await
      .context("Supabase storage upload error")?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(anyhow!("Supabase storage upload error (HTTP {}): {}", status, body));
    }
    Ok(())
  }

  async fn try_signed_url(&self, path: &str, expires_in_secs: i64) -> anyhow::Result<String> {
    let endpoint = self.storage_url(&format!("/object/sign/{}/{}", self.bucket, path));
    let response = self
      .client
      .post(&endpoint)
      .header("Authorization", format!("Bearer {}", self.key))
      .header("apikey", &self.key)
      .json(&serde_json::json!({ "expiresIn": expires_in_secs }))
      .send()
      .await
      .context("Supabase signed url error")?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(anyhow!("Supabase signed url error (HTTP {}): {}", status, body));
    }
    let data: SignedUrlResponse = response.json().await.context("Supabase signed url error: respuesta inválida")?;
    let relative = data
      .signed_url
      .filter(|u| !u.is_empty())
      .ok_or_else(|| anyhow!("Supabase signed url error: sin url"))?;
    Ok(self.storage_url(&relative))
  }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
  #[instrument(name = "supabase::upload", skip(self, bytes), fields(bucket = %self.bucket, size = bytes.len()))]
  async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> CoreResult<()> {
    self.try_upload(path, bytes, content_type).await.map_err(upstream)
  }

  #[instrument(name = "supabase::signed_url", skip(self), fields(bucket = %self.bucket))]
  async fn signed_url(&self, path: &str, expires_in_secs: i64) -> CoreResult<String> {
    self.try_signed_url(path, expires_in_secs).await.map_err(upstream)
  }
}

/// Drops every directory component, keeping only the final file name.
pub fn safe_file_name(name: &str) -> Option<String> {
  Path::new(name)
    .file_name()
    .and_then(|n| n.to_str())
    .filter(|n| !n.is_empty() && *n != "." && *n != "..")
    .map(str::to_string)
}

/// PDF stored on disk and handed back through a file token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
  pub file_name: String,
  pub bytes: Vec<u8>,
}

/// Local directory of published PDFs plus the token service that signs their URLs.
#[derive(Clone)]
pub struct LocalFileStore {
  dir: PathBuf,
  public_base: String,
  tokens: Arc<TokenService>,
}

impl fmt::Debug for LocalFileStore {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LocalFileStore")
      .field("dir", &self.dir)
      .field("public_base", &self.public_base)
      .finish()
  }
}

impl LocalFileStore {
  pub fn new(dir: impl Into<PathBuf>, public_base: impl Into<String>, tokens: Arc<TokenService>) -> Self {
    Self {
      dir: dir.into(),
      public_base: public_base.into().trim_end_matches('/').to_string(),
      tokens,
    }
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  fn path_for(&self, file_name: &str) -> CoreResult<(String, PathBuf)> {
    let safe = safe_file_name(file_name).ok_or_else(CoreError::invalid_payload)?;
    let path = self.dir.join(&safe);
    Ok((safe, path))
  }

  #[instrument(name = "local_store::write", skip(self, bytes), fields(size = bytes.len()))]
  pub async fn write(&self, file_name: &str, bytes: &[u8]) -> CoreResult<PublishedDocument> {
    let (safe, path) = self.path_for(file_name)?;
    tokio::fs::create_dir_all(&self.dir).await?;
    tokio::fs::write(&path, bytes).await?;
    let token = self.tokens.issue_file(&safe)?;
    debug!(path = %path.display(), "PDF stored locally.");
    Ok(PublishedDocument {
      mode: PublishMode::Local,
      location: path.display().to_string(),
      signed_url: format!("{}/api/v1/files/pdf/{}", self.public_base, token),
      expires_in: SIGNED_URL_EXPIRES_IN,
    })
  }

  /// Verifies a file token and reads the file it names, by basename only.
  #[instrument(name = "local_store::open", skip_all)]
  pub async fn open(&self, token: &str) -> CoreResult<StoredFile> {
    let claims = self.tokens.verify_file(token)?;
    let (safe, path) = self
      .path_for(&claims.file_name)
      .map_err(|_| CoreError::Authentication("Token inválido".to_string()))?;
    match tokio::fs::read(&path).await {
      Ok(bytes) => Ok(StoredFile { file_name: safe, bytes }),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CoreError::NotFound("Archivo no encontrado".to_string())),
      Err(e) => Err(e.into()),
    }
  }
}

#[derive(Clone)]
pub struct DocumentPublisher {
  local: LocalFileStore,
  cloud: Option<Arc<dyn ObjectStorage>>,
}

impl fmt::Debug for DocumentPublisher {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DocumentPublisher")
      .field("mode", &self.mode())
      .field("local", &self.local)
      .finish()
  }
}

impl DocumentPublisher {
  pub fn new(local: LocalFileStore, cloud: Option<Arc<dyn ObjectStorage>>) -> Self {
    let publisher = Self { local, cloud };
    info!(mode = %publisher.mode(), "Document publisher ready.");
    publisher
  }

  pub fn mode(&self) -> PublishMode {
    if self.cloud.is_some() {
      PublishMode::Supabase
    } else {
      PublishMode::Local
    }
  }

  pub fn local(&self) -> &LocalFileStore {
    &self.local
  }

  #[instrument(name = "publisher::publish", skip(self, bytes), fields(mode = %self.mode()))]
  pub async fn publish(&self, bytes: Vec<u8>, file_name: &str) -> CoreResult<PublishedDocument> {
    match &self.cloud {
      Some(storage) => {
        let path = format!("{}/{}", STORAGE_PREFIX, file_name);
        storage.upload(&path, bytes, "application/pdf").await?;
        let signed_url = storage.signed_url(&path, FILE_TOKEN_TTL_SECS).await?;
        Ok(PublishedDocument {
          mode: PublishMode::Supabase,
          location: path,
          signed_url,
          expires_in: SIGNED_URL_EXPIRES_IN,
        })
      }
      None => self.local.write(file_name, &bytes).await,
    }
  }
}
