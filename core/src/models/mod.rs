// core/src/models/mod.rs

//! Records, write payloads and query parameters for every resource the API manages.

pub mod audit;
pub mod page;
pub mod planilla;
pub mod tasa;
pub mod user;

pub use audit::{AuditAction, AuditQuery, AuditQueryParams, AuditRecord, AuditResource, AuditUser, NewAuditEntry};
pub use page::{Listing, Page, PageRequest};
pub use planilla::{NewPlanilla, Planilla, PlanillaFilter, PlanillaInput, PlanillaListParams, PlanillaPatch};
pub use tasa::{NewTasa, Tasa, TasaInput, TasaPatch};
pub use user::{Role, User, UserView};

use crate::error::{CoreError, CoreResult};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Converts a JSON number into a decimal with at most `scale` fractional digits.
///
/// Goes through the shortest round-trip text form of the float so `100.5` stays
/// `100.5` and `1680.56` stays `1680.56` instead of picking up binary noise.
/// Values outside `[0, max)` or non-finite floats are rejected.
pub(crate) fn decimal_from_number(value: f64, scale: u32, max: Decimal) -> CoreResult<Decimal> {
  if !value.is_finite() {
    return Err(CoreError::invalid_payload());
  }
  let decimal = Decimal::from_str(&value.to_string()).map_err(|_| CoreError::invalid_payload())?;
  let decimal = decimal.round_dp(scale);
  if (decimal.is_sign_negative() && !decimal.is_zero()) || decimal >= max {
    return Err(CoreError::invalid_payload());
  }
  Ok(decimal.normalize())
}
