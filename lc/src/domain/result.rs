//! Normalized fetch result

use serde::{Deserialize, Serialize};

use super::query::Pagination;

/// Rows for the current window plus the total row count
///
/// `total == None` means unknown; callers then infer "more rows" from a
/// full page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult<R> {
    pub rows: Vec<R>,
    pub total: Option<usize>,
}

impl<R> FetchResult<R> {
    pub fn new(rows: Vec<R>, total: Option<usize>) -> Self {
        Self { rows, total }
    }

    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            total: None,
        }
    }

    /// Whether rows exist beyond this window
    pub fn has_more(&self, pagination: &Pagination) -> bool {
        match self.total {
            Some(total) => pagination.offset + self.rows.len() < total,
            None => pagination.limit > 0 && self.rows.len() >= pagination.limit,
        }
    }
}

impl<R> Default for FetchResult<R> {
    fn default() -> Self {
        Self::empty()
    }
}
