//! Integrator callbacks and the notifier that drives them

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error};

use super::bus::EventBus;
use super::types::ListEvent;
use crate::domain::{Chips, SortModel};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;
type RowsCallback<R> = Arc<dyn Fn(&[R]) + Send + Sync>;
type StrCallback = Arc<dyn Fn(&str) + Send + Sync>;
type CountCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// Optional outbound callbacks
///
/// Each is invoked once per committed transition, never batched. `fallback`
/// receives handler failures and defaults to logging them.
pub struct ListCallbacks<R> {
    on_rows: Option<RowsCallback<R>>,
    on_filter_change: Option<Callback<Value>>,
    on_sort_model_change: Option<Callback<SortModel>>,
    on_chips_change: Option<Callback<Chips>>,
    on_search_change: Option<StrCallback>,
    on_page_change: Option<CountCallback>,
    on_limit_change: Option<CountCallback>,
    fallback: Option<Callback<eyre::Report>>,
}

impl<R> ListCallbacks<R> {
    pub fn new() -> Self {
        Self {
            on_rows: None,
            on_filter_change: None,
            on_sort_model_change: None,
            on_chips_change: None,
            on_search_change: None,
            on_page_change: None,
            on_limit_change: None,
            fallback: None,
        }
    }

    pub fn on_rows(mut self, f: impl Fn(&[R]) + Send + Sync + 'static) -> Self {
        self.on_rows = Some(Arc::new(f));
        self
    }

    /// Called with the committed filter data after each successful fetch
    ///
    /// Not called when the fetch fails; the failure goes to `fallback` and
    /// the previous filter data stays committed.
    pub fn on_filter_change(mut self, f: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_filter_change = Some(Arc::new(f));
        self
    }

    pub fn on_sort_model_change(mut self, f: impl Fn(&SortModel) + Send + Sync + 'static) -> Self {
        self.on_sort_model_change = Some(Arc::new(f));
        self
    }

    pub fn on_chips_change(mut self, f: impl Fn(&Chips) + Send + Sync + 'static) -> Self {
        self.on_chips_change = Some(Arc::new(f));
        self
    }

    pub fn on_search_change(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_search_change = Some(Arc::new(f));
        self
    }

    pub fn on_page_change(mut self, f: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_page_change = Some(Arc::new(f));
        self
    }

    pub fn on_limit_change(mut self, f: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_limit_change = Some(Arc::new(f));
        self
    }

    pub fn fallback(mut self, f: impl Fn(&eyre::Report) + Send + Sync + 'static) -> Self {
        self.fallback = Some(Arc::new(f));
        self
    }
}

impl<R> Default for ListCallbacks<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for ListCallbacks<R> {
    fn clone(&self) -> Self {
        Self {
            on_rows: self.on_rows.clone(),
            on_filter_change: self.on_filter_change.clone(),
            on_sort_model_change: self.on_sort_model_change.clone(),
            on_chips_change: self.on_chips_change.clone(),
            on_search_change: self.on_search_change.clone(),
            on_page_change: self.on_page_change.clone(),
            on_limit_change: self.on_limit_change.clone(),
            fallback: self.fallback.clone(),
        }
    }
}

impl<R> fmt::Debug for ListCallbacks<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListCallbacks")
            .field("on_rows", &self.on_rows.is_some())
            .field("on_filter_change", &self.on_filter_change.is_some())
            .field("on_sort_model_change", &self.on_sort_model_change.is_some())
            .field("on_chips_change", &self.on_chips_change.is_some())
            .field("on_search_change", &self.on_search_change.is_some())
            .field("on_page_change", &self.on_page_change.is_some())
            .field("on_limit_change", &self.on_limit_change.is_some())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

/// Publishes every notification to both the callbacks and the bus
pub struct Notifier<R> {
    callbacks: ListCallbacks<R>,
    bus: EventBus,
}

impl<R> Notifier<R> {
    pub fn new(callbacks: ListCallbacks<R>, bus: EventBus) -> Self {
        Self { callbacks, bus }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn rows(&self, rows: &[R], total: Option<usize>) {
        debug!(count = rows.len(), ?total, "Notifier::rows");
        if let Some(on_rows) = &self.callbacks.on_rows {
            on_rows(rows);
        }
        self.bus.emit(ListEvent::RowsLoaded {
            count: rows.len(),
            total,
        });
    }

    pub fn rows_patched(&self, count: usize) {
        self.bus.emit(ListEvent::RowsPatched { count });
    }

    pub fn filter_changed(&self, filter_data: &Value) {
        if let Some(on_filter_change) = &self.callbacks.on_filter_change {
            on_filter_change(filter_data);
        }
        self.bus.emit(ListEvent::FilterChanged {
            filter_data: filter_data.clone(),
        });
    }

    pub fn sort_model_changed(&self, sort: &SortModel) {
        if let Some(on_sort_model_change) = &self.callbacks.on_sort_model_change {
            on_sort_model_change(sort);
        }
        self.bus.emit(ListEvent::SortModelChanged { sort: sort.clone() });
    }

    pub fn chips_changed(&self, chips: &Chips) {
        if let Some(on_chips_change) = &self.callbacks.on_chips_change {
            on_chips_change(chips);
        }
        self.bus.emit(ListEvent::ChipsChanged { chips: chips.clone() });
    }

    pub fn search_changed(&self, search: &str) {
        if let Some(on_search_change) = &self.callbacks.on_search_change {
            on_search_change(search);
        }
        self.bus.emit(ListEvent::SearchChanged {
            search: search.to_string(),
        });
    }

    pub fn page_changed(&self, page: usize) {
        if let Some(on_page_change) = &self.callbacks.on_page_change {
            on_page_change(page);
        }
        self.bus.emit(ListEvent::PageChanged { page });
    }

    pub fn limit_changed(&self, limit: usize) {
        if let Some(on_limit_change) = &self.callbacks.on_limit_change {
            on_limit_change(limit);
        }
        self.bus.emit(ListEvent::LimitChanged { limit });
    }

    pub fn caches_cleared(&self) {
        self.bus.emit(ListEvent::CachesCleared);
    }

    pub fn rerendered(&self) {
        self.bus.emit(ListEvent::Rerendered);
    }

    /// Hand a handler failure to the integrator
    pub fn fetch_failed(&self, err: &eyre::Report) {
        match &self.callbacks.fallback {
            Some(fallback) => fallback(err),
            None => error!(error = %err, "List handler failed"),
        }
        self.bus.emit(ListEvent::FetchFailed {
            message: format!("{:#}", err),
        });
    }
}
