//! Query parameters: sort model, chips and pagination

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sort direction of a single sort item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(format!("Unknown sort direction: {}. Use asc or desc", s)),
        }
    }
}

/// One entry of the sort model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortItem {
    pub field: String,
    pub sort: SortDirection,
}

impl SortItem {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            sort: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            sort: SortDirection::Desc,
        }
    }
}

impl FromStr for SortItem {
    type Err = String;

    /// Parse `field` or `field:asc|desc`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((field, dir)) if !field.is_empty() => Ok(Self {
                field: field.to_string(),
                sort: dir.parse()?,
            }),
            None if !s.is_empty() => Ok(Self::asc(s)),
            _ => Err(format!("Invalid sort item: '{}'", s)),
        }
    }
}

/// Ordered list of sort items; earlier items take precedence
pub type SortModel = Vec<SortItem>;

/// Chip name to enabled flag
pub type Chips = BTreeMap<String, bool>;

/// Declared chip with its initial state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipSpec {
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
}

impl ChipSpec {
    pub fn new(name: impl Into<String>, enabled: bool) -> Self {
        Self {
            name: name.into(),
            enabled,
        }
    }
}

/// Compute the sort model after activating `field`
///
/// A field cycles asc → desc → removed. With `single_sort` only the toggled
/// field survives.
pub fn toggle_sort(model: &[SortItem], field: &str, single_sort: bool) -> SortModel {
    let mut next: SortModel = model.to_vec();
    match next.iter().position(|item| item.field == field) {
        Some(index) => match next[index].sort {
            SortDirection::Asc => next[index].sort = SortDirection::Desc,
            SortDirection::Desc => {
                next.remove(index);
            }
        },
        None => next.push(SortItem::asc(field)),
    }
    if single_sort {
        next.retain(|item| item.field == field);
    }
    next
}

/// Offset/limit window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
}

impl Pagination {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Window for a zero-based page index
    pub fn for_page(page: usize, limit: usize) -> Self {
        Self {
            limit,
            offset: page.saturating_mul(limit),
        }
    }

    /// Zero-based page index; zero when the limit is zero
    pub fn page(&self) -> usize {
        self.offset.checked_div(self.limit).unwrap_or(0)
    }

    /// Window after a page-size change
    ///
    /// The page is recomputed as `floor(offset / new_limit)` rather than kept,
    /// so the first row previously in view stays on the new page.
    pub fn with_limit(&self, new_limit: usize) -> Self {
        let page = self.offset.checked_div(new_limit).unwrap_or(0);
        Self::for_page(page, new_limit)
    }
}
