// core/src/services/auth.rs

//! Credential login and refresh-token exchange. Logout is stateless and has no
//! server-side counterpart.

use crate::error::{CoreError, CoreResult};
use crate::models::{User, UserView};
use crate::password;
use crate::repository::UserRepository;
use crate::tokens::{TokenPair, TokenService};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
  pub email: Option<String>,
  pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshInput {
  pub refresh_token: Option<String>,
}

/// Body returned by login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
  pub access_token: String,
  pub refresh_token: String,
  pub user: UserView,
}

impl AuthResponse {
  fn new(pair: TokenPair, user: &User) -> Self {
    Self {
      access_token: pair.access_token,
      refresh_token: pair.refresh_token,
      user: UserView::from(user),
    }
  }
}

/// Loose `local@domain.tld` shape check.
pub fn is_valid_email(email: &str) -> bool {
  if email.chars().any(char::is_whitespace) {
    return false;
  }
  match email.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
    }
    None => false,
  }
}

fn bad_credentials() -> CoreError {
  CoreError::Authentication("Credenciales inválidas".to_string())
}

#[derive(Clone)]
pub struct AuthService {
  users: Arc<dyn UserRepository>,
  tokens: Arc<TokenService>,
}

impl fmt::Debug for AuthService {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AuthService").finish_non_exhaustive()
  }
}

impl AuthService {
  pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
    Self { users, tokens }
  }

  pub fn tokens(&self) -> &TokenService {
    &self.tokens
  }

  #[instrument(name = "auth::login", skip(self, input), fields(email = input.email.as_deref().unwrap_or_default()))]
  pub async fn login(&self, input: LoginInput) -> CoreResult<AuthResponse> {
    let email = input.email.filter(|e| is_valid_email(e)).ok_or_else(CoreError::invalid_payload)?;
    let provided = input.password.filter(|p| !p.is_empty()).ok_or_else(CoreError::invalid_payload)?;

    let Some(user) = self.users.find_by_email(&email).await? else {
      warn!("Login rejected: unknown email.");
      return Err(bad_credentials());
    };
    if !password::verify_password(&user.password_hash, &provided)? {
      warn!(user_id = %user.id, "Login rejected: wrong password.");
      return Err(bad_credentials());
    }

    let pair = self.tokens.issue_pair(&user)?;
    info!(user_id = %user.id, role = %user.role, "User logged in.");
    Ok(AuthResponse::new(pair, &user))
  }

  #[instrument(name = "auth::refresh", skip_all)]
  pub async fn refresh(&self, input: RefreshInput) -> CoreResult<AuthResponse> {
    let token = input.refresh_token.filter(|t| !t.is_empty()).ok_or_else(CoreError::invalid_payload)?;
    let claims = self.tokens.verify_refresh(&token)?;
    let user = self
      .users
      .find_by_id(&claims.sub)
      .await?
      .ok_or_else(|| CoreError::Authentication("Usuario no encontrado".to_string()))?;

    let pair = self.tokens.issue_pair(&user)?;
    info!(user_id = %user.id, "Tokens refreshed.");
    Ok(AuthResponse::new(pair, &user))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn email_shape() {
    assert!(is_valid_email("admin@hardsoft.local"));
    assert!(is_valid_email("a.b@c.d.e"));
    assert!(!is_valid_email("admin"));
    assert!(!is_valid_email("@hardsoft.local"));
    assert!(!is_valid_email("admin@local"));
    assert!(!is_valid_email("admin@hard soft.local"));
    assert!(!is_valid_email("a@b@c.d"));
    assert!(!is_valid_email("a@b..c"));
  }
}
