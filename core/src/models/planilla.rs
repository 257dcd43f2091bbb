// core/src/models/planilla.rs

use super::decimal_from_number;
use super::page::PageRequest;
use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;

/// Upper bound imposed by the `NUMERIC(14,2)` column.
fn max_monto() -> Decimal {
  Decimal::new(1_000_000_000_000, 0)
}

/// Billing / consulting-fee record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Planilla {
  pub id: String,
  /// Four digit, zero padded display sequence.
  pub correlativo: String,
  pub fecha: DateTime<Utc>,
  pub cliente: String,
  pub proyecto: String,
  #[serde(with = "rust_decimal::serde::float")]
  pub monto_bruto_usd: Decimal,
}

impl Planilla {
  /// Snapshot stored in the audit trail (no `fecha`).
  pub fn audit_snapshot(&self) -> Value {
    json!({
      "id": self.id,
      "correlativo": self.correlativo,
      "cliente": self.cliente,
      "proyecto": self.proyecto,
      "monto_bruto_usd": self.monto_bruto_usd.to_f64(),
    })
  }
}

/// Formats the sequence number that follows `existing` records.
pub fn next_correlativo(existing: usize) -> String {
  format!("{:04}", existing + 1)
}

/// Raw create/update body. Every field is optional here; the `validate_*` methods
/// decide which ones are required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanillaInput {
  pub cliente: Option<String>,
  pub proyecto: Option<String>,
  pub monto_bruto_usd: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPlanilla {
  pub cliente: String,
  pub proyecto: String,
  pub monto_bruto_usd: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanillaPatch {
  pub cliente: Option<String>,
  pub proyecto: Option<String>,
  pub monto_bruto_usd: Option<Decimal>,
}

impl PlanillaPatch {
  pub fn apply_to(&self, planilla: &mut Planilla) {
    if let Some(cliente) = &self.cliente {
      planilla.cliente = cliente.clone();
    }
    if let Some(proyecto) = &self.proyecto {
      planilla.proyecto = proyecto.clone();
    }
    if let Some(monto) = self.monto_bruto_usd {
      planilla.monto_bruto_usd = monto;
    }
  }
}

fn non_empty(value: Option<String>) -> CoreResult<Option<String>> {
  match value {
    Some(v) if v.is_empty() => Err(CoreError::invalid_payload()),
    other => Ok(other),
  }
}

fn monto(value: Option<f64>) -> CoreResult<Option<Decimal>> {
  value.map(|v| decimal_from_number(v, 2, max_monto())).transpose()
}

impl PlanillaInput {
  pub fn validate_new(self) -> CoreResult<NewPlanilla> {
    let cliente = non_empty(self.cliente)?.ok_or_else(CoreError::invalid_payload)?;
    let proyecto = non_empty(self.proyecto)?.ok_or_else(CoreError::invalid_payload)?;
    let monto_bruto_usd = monto(self.monto_bruto_usd)?.ok_or_else(CoreError::invalid_payload)?;
    Ok(NewPlanilla {
      cliente,
      proyecto,
      monto_bruto_usd,
    })
  }

  pub fn validate_patch(self) -> CoreResult<PlanillaPatch> {
    Ok(PlanillaPatch {
      cliente: non_empty(self.cliente)?,
      proyecto: non_empty(self.proyecto)?,
      monto_bruto_usd: monto(self.monto_bruto_usd)?,
    })
  }
}

/// Case-insensitive substring filters. Empty strings behave as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanillaFilter {
  pub cliente: Option<String>,
  pub proyecto: Option<String>,
}

impl PlanillaFilter {
  pub fn matches(&self, planilla: &Planilla) -> bool {
    contains_ci(&planilla.cliente, self.cliente.as_deref()) && contains_ci(&planilla.proyecto, self.proyecto.as_deref())
  }
}

fn contains_ci(haystack: &str, needle: Option<&str>) -> bool {
  match needle {
    Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
    None => true,
  }
}

/// Query string of `GET /planillas`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanillaListParams {
  pub cliente: Option<String>,
  pub proyecto: Option<String>,
  pub page: Option<i64>,
  pub limit: Option<i64>,
}

impl PlanillaListParams {
  pub fn into_parts(self) -> CoreResult<(PlanillaFilter, PageRequest)> {
    let page = PageRequest::new(self.page, self.limit)?;
    let filter = PlanillaFilter {
      cliente: self.cliente.filter(|s| !s.is_empty()),
      proyecto: self.proyecto.filter(|s| !s.is_empty()),
    };
    Ok((filter, page))
  }
}
