// api/src/web/extractors.rs

use crate::errors::AppError;
use crate::state::AppState;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use gestion_core::access::{self, Permission};
use gestion_core::audit::{Caller, RequestOrigin};
use gestion_core::tokens::AccessClaims;
use gestion_core::CoreError;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

/// Client address (first `X-Forwarded-For` hop, else the peer) and user agent.
pub fn request_origin(req: &HttpRequest) -> RequestOrigin {
  let header_value = |name: header::HeaderName| {
    req
      .headers()
      .get(name)
      .and_then(|v| v.to_str().ok())
      .map(str::trim)
      .filter(|v| !v.is_empty())
      .map(str::to_string)
  };
  let forwarded = req
    .headers()
    .get("x-forwarded-for")
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.split(',').next())
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .map(str::to_string);
  let ip = forwarded.or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()));
  RequestOrigin {
    ip,
    user_agent: header_value(header::USER_AGENT),
  }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
  let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.trim().split_once(' ')?;
  if !scheme.eq_ignore_ascii_case("bearer") {
    return None;
  }
  Some(token.trim()).filter(|t| !t.is_empty())
}

/// Identity behind a valid access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub claims: AccessClaims,
  pub origin: RequestOrigin,
}

impl AuthenticatedUser {
  pub fn caller(&self) -> Caller {
    Caller::from_claims(&self.claims, self.origin.clone())
  }

  /// Decodes a create/update body once write access is established, so a
  /// read-only caller gets 403 whatever the body holds.
  pub fn write_payload<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T, AppError> {
    access::ensure(self.claims.role, Permission::Write)?;
    serde_json::from_slice(body).map_err(|e| {
      debug!(error = %e, "Rejected JSON body.");
      AppError::Core(CoreError::invalid_payload())
    })
  }
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
      error!("AuthenticatedUser extractor: AppState is not registered.");
      return ready(Err(AppError::Internal("Application state missing".to_string())));
    };
    let Some(token) = bearer_token(req) else {
      debug!("AuthenticatedUser extractor: missing bearer token.");
      return ready(Err(AppError::unauthenticated()));
    };
    match state.tokens().verify_access(token) {
      Ok(claims) => ready(Ok(AuthenticatedUser {
        claims,
        origin: request_origin(req),
      })),
      Err(_) => ready(Err(AppError::unauthenticated())),
    }
  }
}
