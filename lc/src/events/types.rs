//! Event vocabulary of a list controller

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Chips, SortModel};

/// State transitions published on the event bus
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ListEvent {
    /// A fetch produced rows (after truncation)
    RowsLoaded { count: usize, total: Option<usize> },
    /// Rows were replaced directly, without a fetch
    RowsPatched { count: usize },
    /// A fetch committed with this filter data
    FilterChanged { filter_data: Value },
    SortModelChanged { sort: SortModel },
    ChipsChanged { chips: Chips },
    SearchChanged { search: String },
    PageChanged { page: usize },
    LimitChanged { limit: usize },
    /// Dependent caches must drop what they hold (issued by reload)
    CachesCleared,
    /// A forced visual refresh was published
    Rerendered,
    /// The handler failed; previous rows are still committed
    FetchFailed { message: String },
}

impl ListEvent {
    /// Get the event type name for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RowsLoaded { .. } => "RowsLoaded",
            Self::RowsPatched { .. } => "RowsPatched",
            Self::FilterChanged { .. } => "FilterChanged",
            Self::SortModelChanged { .. } => "SortModelChanged",
            Self::ChipsChanged { .. } => "ChipsChanged",
            Self::SearchChanged { .. } => "SearchChanged",
            Self::PageChanged { .. } => "PageChanged",
            Self::LimitChanged { .. } => "LimitChanged",
            Self::CachesCleared => "CachesCleared",
            Self::Rerendered => "Rerendered",
            Self::FetchFailed { .. } => "FetchFailed",
        }
    }
}
