// core/src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use std::fmt;

/// Role attached to every user; decides write, delete and audit-read permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
  AdminGerente,
  Operador,
  Consulta,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::AdminGerente => "admin_gerente",
      Role::Operador => "operador",
      Role::Consulta => "consulta",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
  pub id: String,
  pub email: String,
  pub name: String,
  pub role: Role,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
}

/// Public projection returned by login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
  pub id: String,
  pub email: String,
  pub role: Role,
  pub name: String,
}

impl From<&User> for UserView {
  fn from(user: &User) -> Self {
    UserView {
      id: user.id.clone(),
      email: user.email.clone(),
      role: user.role,
      name: user.name.clone(),
    }
  }
}
