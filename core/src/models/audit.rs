// core/src/models/audit.rs

use super::user::Role;
use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::Type as SqlxType;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_AUDIT_LIMIT: i64 = 100;
pub const MAX_AUDIT_LIMIT: i64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "audit_resource", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuditResource {
  Planilla,
  Tasa,
  Pdf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "audit_action", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
  Create,
  Update,
  Delete,
  Publish,
}

impl fmt::Display for AuditResource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Planilla => write!(f, "planilla"),
      Self::Tasa => write!(f, "tasa"),
      Self::Pdf => write!(f, "pdf"),
    }
  }
}

impl fmt::Display for AuditAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Create => write!(f, "create"),
      Self::Update => write!(f, "update"),
      Self::Delete => write!(f, "delete"),
      Self::Publish => write!(f, "publish"),
    }
  }
}

impl FromStr for AuditResource {
  type Err = CoreError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "planilla" => Ok(Self::Planilla),
      "tasa" => Ok(Self::Tasa),
      "pdf" => Ok(Self::Pdf),
      _ => Err(CoreError::invalid_payload()),
    }
  }
}

impl FromStr for AuditAction {
  type Err = CoreError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "create" => Ok(Self::Create),
      "update" => Ok(Self::Update),
      "delete" => Ok(Self::Delete),
      "publish" => Ok(Self::Publish),
      _ => Err(CoreError::invalid_payload()),
    }
  }
}

/// Append-only row written after a successful mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
  pub user_id: String,
  pub recurso: AuditResource,
  pub recurso_id: Option<String>,
  pub accion: AuditAction,
  pub before_json: Option<Value>,
  pub after_json: Option<Value>,
  pub ip: Option<String>,
  pub user_agent: Option<String>,
  pub planilla_id: Option<String>,
  pub tasa_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditUser {
  pub id: String,
  pub email: String,
  pub name: String,
  pub role: Role,
}

/// Stored entry as returned by `GET /auditoria`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
  pub id: String,
  pub created_at: DateTime<Utc>,
  pub recurso: AuditResource,
  pub recurso_id: Option<String>,
  pub accion: AuditAction,
  pub ip: Option<String>,
  pub user_agent: Option<String>,
  pub user: Option<AuditUser>,
  pub before_json: Option<Value>,
  pub after_json: Option<Value>,
}

/// Raw query string of `GET /auditoria`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQueryParams {
  pub recurso: Option<String>,
  pub accion: Option<String>,
  pub user_id: Option<String>,
  pub from: Option<String>,
  pub to: Option<String>,
  pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditQuery {
  pub recurso: Option<AuditResource>,
  pub accion: Option<AuditAction>,
  pub user_id: Option<String>,
  pub from: Option<DateTime<Utc>>,
  pub to: Option<DateTime<Utc>>,
  pub limit: i64,
}

impl Default for AuditQuery {
  fn default() -> Self {
    Self {
      recurso: None,
      accion: None,
      user_id: None,
      from: None,
      to: None,
      limit: DEFAULT_AUDIT_LIMIT,
    }
  }
}

fn parse_day(value: &str, time: NaiveTime) -> CoreResult<DateTime<Utc>> {
  let day = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| CoreError::invalid_payload())?;
  Ok(day.and_time(time).and_utc())
}

fn present(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.is_empty())
}

impl AuditQueryParams {
  /// `from`/`to` cover whole days; `limit` is clamped to `[1, 500]`.
  pub fn into_query(self) -> CoreResult<AuditQuery> {
    let start_of_day = NaiveTime::from_hms_opt(0, 0, 0).ok_or_else(|| CoreError::Internal("invalid time".into()))?;
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).ok_or_else(|| CoreError::Internal("invalid time".into()))?;
    Ok(AuditQuery {
      recurso: present(self.recurso).map(|r| r.parse()).transpose()?,
      accion: present(self.accion).map(|a| a.parse()).transpose()?,
      user_id: present(self.user_id),
      from: present(self.from).map(|d| parse_day(&d, start_of_day)).transpose()?,
      to: present(self.to).map(|d| parse_day(&d, end_of_day)).transpose()?,
      limit: self.limit.unwrap_or(DEFAULT_AUDIT_LIMIT).clamp(1, MAX_AUDIT_LIMIT),
    })
  }
}
