// core/src/models/tasa.rs

use super::decimal_from_number;
use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;

pub const DEFAULT_FUENTE: &str = "manual";

/// Upper bound imposed by the `NUMERIC(14,4)` columns.
fn max_rate() -> Decimal {
  Decimal::new(10_000_000_000, 0)
}

/// Exchange-rate snapshot: official (BCV) and parallel market rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Tasa {
  pub id: String,
  pub fecha: DateTime<Utc>,
  #[serde(with = "rust_decimal::serde::float")]
  pub bcv: Decimal,
  #[serde(with = "rust_decimal::serde::float")]
  pub paralela: Decimal,
  pub fuente: String,
}

impl Tasa {
  pub fn audit_snapshot(&self) -> Value {
    json!({
      "id": self.id,
      "fecha": self.fecha,
      "bcv": self.bcv.to_f64(),
      "paralela": self.paralela.to_f64(),
      "fuente": self.fuente,
    })
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TasaInput {
  pub bcv: Option<f64>,
  pub paralela: Option<f64>,
  pub fuente: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTasa {
  pub bcv: Decimal,
  pub paralela: Decimal,
  pub fuente: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TasaPatch {
  pub bcv: Option<Decimal>,
  pub paralela: Option<Decimal>,
  pub fuente: Option<String>,
}

impl TasaPatch {
  pub fn apply_to(&self, tasa: &mut Tasa) {
    if let Some(bcv) = self.bcv {
      tasa.bcv = bcv;
    }
    if let Some(paralela) = self.paralela {
      tasa.paralela = paralela;
    }
    if let Some(fuente) = &self.fuente {
      tasa.fuente = fuente.clone();
    }
  }
}

/// Rates must be strictly positive.
fn rate(value: Option<f64>) -> CoreResult<Option<Decimal>> {
  match value {
    Some(v) => {
      let decimal = decimal_from_number(v, 4, max_rate())?;
      if decimal.is_zero() {
        return Err(CoreError::invalid_payload());
      }
      Ok(Some(decimal))
    }
    None => Ok(None),
  }
}

impl TasaInput {
  pub fn validate_new(self) -> CoreResult<NewTasa> {
    let bcv = rate(self.bcv)?.ok_or_else(CoreError::invalid_payload)?;
    let paralela = rate(self.paralela)?.ok_or_else(CoreError::invalid_payload)?;
    Ok(NewTasa {
      bcv,
      paralela,
      fuente: self.fuente.unwrap_or_else(|| DEFAULT_FUENTE.to_string()),
    })
  }

  /// An empty `fuente` leaves the stored value untouched.
  pub fn validate_patch(self) -> CoreResult<TasaPatch> {
    Ok(TasaPatch {
      bcv: rate(self.bcv)?,
      paralela: rate(self.paralela)?,
      fuente: self.fuente.filter(|f| !f.is_empty()),
    })
  }
}
