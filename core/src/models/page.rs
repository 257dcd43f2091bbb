// core/src/models/page.rs

use crate::error::{CoreError, CoreResult};
use serde::Serialize;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 500;

/// 1-indexed, offset-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub page: i64,
  pub limit: i64,
}

impl PageRequest {
  pub fn new(page: Option<i64>, limit: Option<i64>) -> CoreResult<Self> {
    let page = page.unwrap_or(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    if page < 1 || limit < 1 || limit > MAX_PAGE_LIMIT {
      return Err(CoreError::invalid_payload());
    }
    // The offset must fit the i64 that OFFSET binds to.
    if (page - 1).checked_mul(limit).is_none() {
      return Err(CoreError::invalid_payload());
    }
    Ok(Self { page, limit })
  }

  pub fn offset(&self) -> i64 {
    self.page.saturating_sub(1).saturating_mul(self.limit)
  }
}

impl Default for PageRequest {
  fn default() -> Self {
    Self {
      page: 1,
      limit: DEFAULT_PAGE_LIMIT,
    }
  }
}

/// Paginated listing: `{items, total, page, limit}`.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub total: i64,
  pub page: i64,
  pub limit: i64,
}

/// Unpaginated listing: `{items, total}`.
#[derive(Debug, Clone, Serialize)]
pub struct Listing<T> {
  pub items: Vec<T>,
  pub total: i64,
}

impl<T> Listing<T> {
  pub fn new(items: Vec<T>) -> Self {
    let total = items.len() as i64;
    Self { items, total }
  }

  pub fn empty() -> Self {
    Self {
      items: Vec::new(),
      total: 0,
    }
  }
}
