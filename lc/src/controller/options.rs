//! Controller construction options

use std::fmt;
use std::time::Duration;

use serde_json::Value;

use crate::config::ListConfig;
use crate::domain::{ChipSpec, Chips, RowData, SortModel};
use crate::events::ListCallbacks;
use crate::fields::FieldDescriptor;
use crate::handler::Handler;
use crate::subject::Subject;

/// Everything a controller needs at mount
pub struct ControllerOptions<R: RowData> {
    pub handler: Handler<R>,
    /// Filter field schema used by `set_default`
    pub fields: Vec<FieldDescriptor>,
    /// Caller filter values merged over the defaults at mount
    pub filter_data: Value,
    pub payload: Value,
    pub limit: usize,
    pub page: usize,
    pub sort_model: SortModel,
    pub chips: Vec<ChipSpec>,
    /// Chip overrides; `true` here wins over a chip's `enabled`
    pub chip_data: Chips,
    pub search: String,
    pub raw_search: bool,
    pub single_sort: bool,
    /// Initial `filters_collapsed`
    pub toggled_filters: bool,
    pub fetch_debounce: Duration,
    pub command_buffer: usize,
    pub event_capacity: usize,
    pub callbacks: ListCallbacks<R>,
    pub triggers: ListTriggers<R>,
}

impl<R: RowData> ControllerOptions<R> {
    pub fn new(handler: Handler<R>) -> Self {
        Self::from_config(&ListConfig::default(), handler)
    }

    pub fn from_config(config: &ListConfig, handler: Handler<R>) -> Self {
        Self {
            handler,
            fields: Vec::new(),
            filter_data: Value::Object(Default::default()),
            payload: Value::Object(Default::default()),
            limit: config.limit,
            page: config.page,
            sort_model: Vec::new(),
            chips: Vec::new(),
            chip_data: Chips::new(),
            search: String::new(),
            raw_search: config.raw_search,
            single_sort: config.single_sort,
            toggled_filters: config.toggled_filters,
            fetch_debounce: config.fetch_debounce(),
            command_buffer: config.command_buffer.max(1),
            event_capacity: config.event_capacity.max(1),
            callbacks: ListCallbacks::new(),
            triggers: ListTriggers::new(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<FieldDescriptor>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_filter_data(mut self, filter_data: Value) -> Self {
        self.filter_data = filter_data;
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn with_sort_model(mut self, sort_model: SortModel) -> Self {
        self.sort_model = sort_model;
        self
    }

    pub fn with_chips(mut self, chips: Vec<ChipSpec>) -> Self {
        self.chips = chips;
        self
    }

    pub fn with_chip_data(mut self, chip_data: Chips) -> Self {
        self.chip_data = chip_data;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_raw_search(mut self, raw_search: bool) -> Self {
        self.raw_search = raw_search;
        self
    }

    pub fn with_single_sort(mut self, single_sort: bool) -> Self {
        self.single_sort = single_sort;
        self
    }

    pub fn with_toggled_filters(mut self, toggled_filters: bool) -> Self {
        self.toggled_filters = toggled_filters;
        self
    }

    pub fn with_fetch_debounce(mut self, fetch_debounce: Duration) -> Self {
        self.fetch_debounce = fetch_debounce;
        self
    }

    pub fn with_callbacks(mut self, callbacks: ListCallbacks<R>) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn with_triggers(mut self, triggers: ListTriggers<R>) -> Self {
        self.triggers = triggers;
        self
    }
}

impl<R: RowData> fmt::Debug for ControllerOptions<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerOptions")
            .field("handler", &self.handler)
            .field("fields", &self.fields.len())
            .field("limit", &self.limit)
            .field("page", &self.page)
            .field("sort_model", &self.sort_model)
            .field("chips", &self.chips)
            .field("search", &self.search)
            .field("fetch_debounce", &self.fetch_debounce)
            .field("command_buffer", &self.command_buffer)
            .field("event_capacity", &self.event_capacity)
            .finish_non_exhaustive()
    }
}

/// Subjects an ancestor can use to drive the controller without a handle
///
/// The controller subscribes at mount and unsubscribes at unmount.
pub struct ListTriggers<R> {
    pub reload: Option<Subject<()>>,
    pub rerender: Option<Subject<()>>,
    pub set_limit: Option<Subject<usize>>,
    pub set_page: Option<Subject<usize>>,
    pub set_rows: Option<Subject<Vec<R>>>,
    pub set_filter_data: Option<Subject<Value>>,
}

impl<R> ListTriggers<R> {
    pub fn new() -> Self {
        Self {
            reload: None,
            rerender: None,
            set_limit: None,
            set_page: None,
            set_rows: None,
            set_filter_data: None,
        }
    }

    pub fn reload(mut self, subject: Subject<()>) -> Self {
        self.reload = Some(subject);
        self
    }

    pub fn rerender(mut self, subject: Subject<()>) -> Self {
        self.rerender = Some(subject);
        self
    }

    pub fn set_limit(mut self, subject: Subject<usize>) -> Self {
        self.set_limit = Some(subject);
        self
    }

    pub fn set_page(mut self, subject: Subject<usize>) -> Self {
        self.set_page = Some(subject);
        self
    }

    pub fn set_rows(mut self, subject: Subject<Vec<R>>) -> Self {
        self.set_rows = Some(subject);
        self
    }

    pub fn set_filter_data(mut self, subject: Subject<Value>) -> Self {
        self.set_filter_data = Some(subject);
        self
    }
}

impl<R> Default for ListTriggers<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for ListTriggers<R> {
    fn clone(&self) -> Self {
        Self {
            reload: self.reload.clone(),
            rerender: self.rerender.clone(),
            set_limit: self.set_limit.clone(),
            set_page: self.set_page.clone(),
            set_rows: self.set_rows.clone(),
            set_filter_data: self.set_filter_data.clone(),
        }
    }
}

impl<R> fmt::Debug for ListTriggers<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListTriggers")
            .field("reload", &self.reload.is_some())
            .field("rerender", &self.rerender.is_some())
            .field("set_limit", &self.set_limit.is_some())
            .field("set_page", &self.set_page.is_some())
            .field("set_rows", &self.set_rows.is_some())
            .field("set_filter_data", &self.set_filter_data.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::JsonRow;

    #[test]
    fn test_from_config() {
        let config = ListConfig {
            limit: 10,
            page: 2,
            fetch_debounce_ms: 5,
            single_sort: true,
            ..Default::default()
        };
        let options = ControllerOptions::<JsonRow>::from_config(&config, Handler::from_rows(Vec::new()));
        assert_eq!(options.limit, 10);
        assert_eq!(options.page, 2);
        assert_eq!(options.fetch_debounce, Duration::from_millis(5));
        assert!(options.single_sort);
        assert!(options.filter_data.is_object());
    }

    #[test]
    fn test_triggers_builder() {
        let triggers = ListTriggers::<JsonRow>::new().reload(Subject::new()).set_page(Subject::new());
        assert!(triggers.reload.is_some());
        assert!(triggers.set_page.is_some());
        assert!(triggers.set_rows.is_none());
    }
}
