// core/src/tokens.rs

//! HS256 bearer tokens: access, refresh and file-capability tokens share one secret
//! and are told apart by their claim shape and the `type` claim.

use crate::error::{CoreError, CoreResult};
use crate::models::{Role, User};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub const ACCESS_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;
pub const FILE_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

pub const REFRESH_TOKEN_TYPE: &str = "refresh";
pub const FILE_TOKEN_TYPE: &str = "file_pdf";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
  pub sub: String,
  pub role: Role,
  pub email: String,
  pub iat: i64,
  pub exp: i64,
  /// Access tokens never carry a type; any value here marks a foreign token.
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshClaims {
  pub sub: String,
  #[serde(rename = "type")]
  pub kind: String,
  pub iat: i64,
  pub exp: i64,
}

/// Capability for one locally stored PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileClaims {
  #[serde(rename = "type")]
  pub kind: String,
  #[serde(rename = "fileName")]
  pub file_name: String,
  pub iat: i64,
  pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
  pub access_token: String,
  pub refresh_token: String,
}

pub struct TokenService {
  encoding: EncodingKey,
  decoding: DecodingKey,
  validation: Validation,
}

impl std::fmt::Debug for TokenService {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TokenService").finish_non_exhaustive()
  }
}

fn invalid(message: &str) -> CoreError {
  CoreError::Authentication(message.to_string())
}

impl TokenService {
  pub fn new(secret: &str) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      validation: Validation::new(Algorithm::HS256),
    }
  }

  /// Signs arbitrary claims with the shared secret.
  pub fn sign<T: Serialize>(&self, claims: &T) -> CoreResult<String> {
    Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
  }

  fn verify<T: DeserializeOwned>(&self, token: &str) -> CoreResult<T> {
    decode::<T>(token, &self.decoding, &self.validation)
      .map(|data| data.claims)
      .map_err(|e| {
        debug!(error = %e, "Token rejected.");
        invalid("Token inválido o expirado")
      })
  }

  #[instrument(name = "tokens::issue_pair", skip(self, user), fields(user_id = %user.id))]
  pub fn issue_pair(&self, user: &User) -> CoreResult<TokenPair> {
    let now = Utc::now().timestamp();
    let access = AccessClaims {
      sub: user.id.clone(),
      role: user.role,
      email: user.email.clone(),
      iat: now,
      exp: now + ACCESS_TOKEN_TTL_SECS,
      kind: None,
    };
    let refresh = RefreshClaims {
      sub: user.id.clone(),
      kind: REFRESH_TOKEN_TYPE.to_string(),
      iat: now,
      exp: now + REFRESH_TOKEN_TTL_SECS,
    };
    Ok(TokenPair {
      access_token: self.sign(&access)?,
      refresh_token: self.sign(&refresh)?,
    })
  }

  pub fn issue_file(&self, file_name: &str) -> CoreResult<String> {
    let now = Utc::now().timestamp();
    self.sign(&FileClaims {
      kind: FILE_TOKEN_TYPE.to_string(),
      file_name: file_name.to_string(),
      iat: now,
      exp: now + FILE_TOKEN_TTL_SECS,
    })
  }

  /// Only access tokens pass: refresh and file tokens are rejected.
  pub fn verify_access(&self, token: &str) -> CoreResult<AccessClaims> {
    let claims: AccessClaims = self.verify(token)?;
    if claims.kind.is_some() || claims.sub.is_empty() {
      return Err(invalid("Token inválido"));
    }
    Ok(claims)
  }

  pub fn verify_refresh(&self, token: &str) -> CoreResult<RefreshClaims> {
    let claims: RefreshClaims = self.verify(token)?;
    if claims.kind != REFRESH_TOKEN_TYPE || claims.sub.is_empty() {
      return Err(invalid("Refresh token inválido"));
    }
    Ok(claims)
  }

  pub fn verify_file(&self, token: &str) -> CoreResult<FileClaims> {
    let claims: FileClaims = self.verify(token)?;
    if claims.kind != FILE_TOKEN_TYPE || claims.file_name.is_empty() {
      return Err(invalid("Token inválido"));
    }
    Ok(claims)
  }
}
