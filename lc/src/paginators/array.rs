//! ArrayPaginator - in-memory filtering, sorting, search and paging

use std::cmp::Ordering;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::display_value;
use crate::domain::{Chips, JsonRow, Pagination, SortDirection, SortModel};
use crate::fields::is_truthy;
use crate::handler::{Handler, HandlerResponse, ListHandler, ListQuery};

/// Fields probed, in order, for the one the search string is matched against
pub const SEARCH_ENTRIES: [&str; 4] = ["name", "label", "title", "description"];

/// Handler that applies the query to a full row set itself
///
/// Stages run in order: filter, chips, sort, search, pagination. Each can be
/// switched off; `keep_clean` switches them all off.
pub struct ArrayPaginator {
    source: Handler<JsonRow>,
    with_filters: bool,
    with_chips: bool,
    with_sort: bool,
    with_search: bool,
    with_pagination: bool,
    with_total: bool,
    keep_clean: bool,
}

impl ArrayPaginator {
    /// Page over rows produced by `source`
    ///
    /// A function source receives the query unchanged and must return every
    /// row; a static source is used as is.
    pub fn new(source: Handler<JsonRow>) -> Self {
        Self {
            source,
            with_filters: true,
            with_chips: true,
            with_sort: true,
            with_search: true,
            with_pagination: true,
            with_total: true,
            keep_clean: false,
        }
    }

    pub fn from_rows(rows: Vec<JsonRow>) -> Self {
        Self::new(Handler::from_rows(rows))
    }

    pub fn with_filters(mut self, enabled: bool) -> Self {
        self.with_filters = enabled;
        self
    }

    pub fn with_chips(mut self, enabled: bool) -> Self {
        self.with_chips = enabled;
        self
    }

    pub fn with_sort(mut self, enabled: bool) -> Self {
        self.with_sort = enabled;
        self
    }

    pub fn with_search(mut self, enabled: bool) -> Self {
        self.with_search = enabled;
        self
    }

    pub fn with_pagination(mut self, enabled: bool) -> Self {
        self.with_pagination = enabled;
        self
    }

    /// Report the source size as total (on by default)
    pub fn with_total(mut self, enabled: bool) -> Self {
        self.with_total = enabled;
        self
    }

    pub fn keep_clean(mut self, keep_clean: bool) -> Self {
        self.keep_clean = keep_clean;
        self
    }

    async fn load(&self, query: &ListQuery) -> eyre::Result<(Vec<JsonRow>, Option<usize>)> {
        match &self.source {
            Handler::Static(source) => Ok((source.rows.clone(), source.total)),
            Handler::Function(handler) => match handler.fetch(query.clone()).await? {
                HandlerResponse::Rows(rows) => {
                    let total = rows.len();
                    Ok((rows, Some(total)))
                }
                HandlerResponse::Page { rows, total } => Ok((rows, total)),
            },
        }
    }

    /// Apply every enabled stage to `rows`
    pub fn apply(&self, mut rows: Vec<JsonRow>, query: &ListQuery) -> Vec<JsonRow> {
        if self.keep_clean {
            return rows;
        }
        if self.with_filters {
            rows = filter_rows(rows, &query.filter_data);
        }
        if self.with_chips {
            rows = chip_rows(rows, &query.chips);
        }
        if self.with_sort {
            sort_rows(&mut rows, &query.sort);
        }
        if self.with_search {
            rows = search_rows(rows, &query.search);
        }
        if self.with_pagination {
            rows = paginate_rows(rows, &query.pagination);
        }
        rows
    }
}

#[async_trait]
impl ListHandler<JsonRow> for ArrayPaginator {
    async fn fetch(&self, query: ListQuery) -> eyre::Result<HandlerResponse<JsonRow>> {
        debug!(pagination = ?query.pagination, "ArrayPaginator::fetch: called");
        let (rows, total) = self.load(&query).await?;
        let rows = self.apply(rows, &query);
        Ok(HandlerResponse::Page {
            rows,
            total: if self.with_total { total } else { None },
        })
    }
}

/// Keep rows whose field contains every truthy filter value, ignoring case
fn filter_rows(rows: Vec<JsonRow>, filter_data: &Value) -> Vec<JsonRow> {
    let Some(filters) = filter_data.as_object() else {
        return rows;
    };
    let templates: Vec<(&String, String)> = filters
        .iter()
        .filter(|(_, value)| is_truthy(value) && !value.is_object() && !value.is_array())
        .map(|(key, value)| (key, display_value(value).to_lowercase()))
        .collect();

    rows.into_iter()
        .filter(|row| {
            templates.iter().all(|(key, template)| {
                row.field(key)
                    .map(|value| display_value(&value).to_lowercase().contains(template.as_str()))
                    .unwrap_or(false)
            })
        })
        .collect()
}

/// Keep rows that have a truthy field for any enabled chip
fn chip_rows(rows: Vec<JsonRow>, chips: &Chips) -> Vec<JsonRow> {
    let enabled: Vec<&String> = chips.iter().filter(|(_, on)| **on).map(|(name, _)| name).collect();
    if enabled.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| {
            enabled
                .iter()
                .any(|chip| row.field(chip).as_ref().is_some_and(is_truthy))
        })
        .collect()
}

/// Order values of the same kind; mixed kinds compare equal
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::String(a), Value::String(b)) => a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)),
        _ => Ordering::Equal,
    }
}

/// Stable sort; earlier sort items take precedence
fn sort_rows(rows: &mut [JsonRow], sort: &SortModel) {
    if sort.is_empty() {
        return;
    }
    rows.sort_by(|a, b| {
        sort.iter().fold(Ordering::Equal, |ordering, item| {
            ordering.then_with(|| {
                let (left, right) = (
                    a.field(&item.field).unwrap_or(Value::Null),
                    b.field(&item.field).unwrap_or(Value::Null),
                );
                match item.sort {
                    SortDirection::Asc => compare_values(&left, &right),
                    SortDirection::Desc => compare_values(&right, &left),
                }
            })
        })
    });
}

/// Match the search string against the first search entry the first row has
fn search_rows(rows: Vec<JsonRow>, search: &str) -> Vec<JsonRow> {
    let Some(first) = rows.first() else {
        return rows;
    };
    let Some(entry) = SEARCH_ENTRIES
        .iter()
        .find(|entry| first.field(entry).as_ref().is_some_and(is_truthy))
    else {
        return rows;
    };

    let needle = search.to_lowercase();
    rows.into_iter()
        .filter(|row| {
            row.field(entry)
                .map(|value| display_value(&value).to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .collect()
}

/// Slice `[offset, offset + limit)` when there are more rows than fit a page
fn paginate_rows(rows: Vec<JsonRow>, pagination: &Pagination) -> Vec<JsonRow> {
    if rows.len() <= pagination.limit {
        return rows;
    }
    rows.into_iter()
        .skip(pagination.offset)
        .take(pagination.limit)
        .collect()
}
