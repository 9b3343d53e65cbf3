//! Controller messages
//!
//! Commands and responses for the actor pattern.

use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot;

use super::state::ControllerState;
use crate::domain::{Chips, SortModel};

/// Errors from controller operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("List controller is unmounted")]
    Unmounted,

    #[error("Invalid page size: {0}")]
    InvalidLimit(usize),

    #[error("Channel error")]
    ChannelError,
}

/// Response from controller operations
pub type ControllerResponse<T> = Result<T, ControllerError>;

/// How a fetch request ended
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<R> {
    /// Rows and total were committed to state
    Committed { rows: Vec<R>, total: Option<usize> },
    /// Another fetch was in flight; nothing was scheduled
    Ignored,
    /// The handler failed; previous rows are still committed
    Failed(String),
}

impl<R> FetchOutcome<R> {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Commands sent to the controller actor
#[derive(Debug)]
pub enum ControllerCommand<R> {
    // Fetching transitions
    SetFilterData {
        data: Value,
        keep_pagination: bool,
        reply: Option<oneshot::Sender<FetchOutcome<R>>>,
    },
    SetDefault {
        initial: bool,
        reply: Option<oneshot::Sender<FetchOutcome<R>>>,
    },
    Reload {
        keep_pagination: bool,
        reply: Option<oneshot::Sender<FetchOutcome<R>>>,
    },

    // Debounced transitions
    SetPage {
        page: usize,
    },
    SetLimit {
        limit: usize,
    },
    SetSortModel {
        sort: SortModel,
    },
    ToggleSort {
        field: String,
    },
    SetChips {
        chips: Chips,
    },
    SetSearch {
        search: String,
    },

    // Direct transitions, no fetch
    SetRows {
        rows: Vec<R>,
    },
    SetFiltersCollapsed {
        collapsed: bool,
    },
    Rerender,

    // Queries
    GetState {
        reply: oneshot::Sender<ControllerState<R>>,
    },

    // Teardown
    Unmount {
        reply: Option<oneshot::Sender<()>>,
    },
}

impl<R> ControllerCommand<R> {
    /// Get the command name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetFilterData { .. } => "SetFilterData",
            Self::SetDefault { .. } => "SetDefault",
            Self::Reload { .. } => "Reload",
            Self::SetPage { .. } => "SetPage",
            Self::SetLimit { .. } => "SetLimit",
            Self::SetSortModel { .. } => "SetSortModel",
            Self::ToggleSort { .. } => "ToggleSort",
            Self::SetChips { .. } => "SetChips",
            Self::SetSearch { .. } => "SetSearch",
            Self::SetRows { .. } => "SetRows",
            Self::SetFiltersCollapsed { .. } => "SetFiltersCollapsed",
            Self::Rerender => "Rerender",
            Self::GetState { .. } => "GetState",
            Self::Unmount { .. } => "Unmount",
        }
    }
}
