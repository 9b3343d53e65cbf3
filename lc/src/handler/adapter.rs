//! FetchAdapter - uniform `{rows, total}` over any handler

use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use eyre::eyre;
use futures::FutureExt;
use tracing::{debug, warn};

use super::{Handler, HandlerResponse, ListQuery, StaticRows};
use crate::domain::{FetchResult, Pagination, RowData};
use crate::events::Notifier;
use crate::lifecycle::Lifecycle;

/// Normalizes a [`Handler`] into [`FetchResult`]s
///
/// Guarantees `rows.len() <= limit` and calls `on_rows` exactly once per
/// successful fetch, after truncation and before the controller commits.
pub struct FetchAdapter<R: RowData> {
    handler: Handler<R>,
    notifier: Arc<Notifier<R>>,
    lifecycle: Lifecycle,
}

impl<R: RowData> FetchAdapter<R> {
    pub fn new(handler: Handler<R>, notifier: Arc<Notifier<R>>, lifecycle: Lifecycle) -> Self {
        Self {
            handler,
            notifier,
            lifecycle,
        }
    }

    /// Run one fetch
    pub async fn fetch(&self, query: ListQuery) -> eyre::Result<FetchResult<R>> {
        debug!(pagination = ?query.pagination, "FetchAdapter::fetch: called");

        // One scheduler turn so the mutation that queued this fetch is fully
        // applied before the handler observes anything
        tokio::task::yield_now().await;

        let pagination = query.pagination;
        let result = match &self.handler {
            Handler::Function(handler) => {
                let response = AssertUnwindSafe(handler.fetch(query))
                    .catch_unwind()
                    .await
                    .map_err(|panic| eyre!("List handler panicked: {}", panic_message(panic.as_ref())))??;
                normalize_response(response, pagination.limit)
            }
            Handler::Static(rows) => paginate_static(rows, &pagination),
        };

        warn_duplicate_ids(&result.rows);
        if self.lifecycle.is_mounted() {
            self.notifier.rows(&result.rows, result.total);
        } else {
            debug!("FetchAdapter::fetch: controller unmounted, skipping on_rows");
        }
        Ok(result)
    }
}

/// Convert a function handler's response, truncating to `limit`
pub fn normalize_response<R>(response: HandlerResponse<R>, limit: usize) -> FetchResult<R> {
    let (mut rows, total) = match response {
        HandlerResponse::Rows(rows) => (rows, None),
        HandlerResponse::Page { rows, total } => (rows, total),
    };
    if rows.len() > limit {
        warn!(
            returned = rows.len(),
            limit, "List rows count is more than its capacity, truncating"
        );
        rows.truncate(limit);
    }
    FetchResult::new(rows, total)
}

/// Slice static rows to `[offset, offset + limit)`
pub fn paginate_static<R: Clone>(source: &StaticRows<R>, pagination: &Pagination) -> FetchResult<R> {
    let rows = source
        .rows
        .iter()
        .skip(pagination.offset)
        .take(pagination.limit)
        .cloned()
        .collect();
    FetchResult::new(rows, source.total)
}

fn warn_duplicate_ids<R: RowData>(rows: &[R]) {
    let mut seen = HashSet::with_capacity(rows.len());
    for row in rows {
        let id = row.id();
        if !seen.insert(id.clone()) {
            warn!(%id, "List rows contain a duplicate id");
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JsonRow, RowId};
    use crate::events::{EventBus, ListCallbacks};
    use crate::handler::handler_fn;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    fn rows(n: i64) -> Vec<JsonRow> {
        (0..n).map(|i| JsonRow::new(i).with("name", format!("row-{}", i))).collect()
    }

    fn query(limit: usize, offset: usize) -> ListQuery {
        ListQuery {
            filter_data: json!({}),
            pagination: Pagination::new(limit, offset),
            sort: vec![],
            chips: Default::default(),
            search: String::new(),
            payload: Value::Null,
        }
    }

    fn adapter(handler: Handler<JsonRow>) -> (FetchAdapter<JsonRow>, Arc<Mutex<Vec<usize>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);
        let callbacks = ListCallbacks::new().on_rows(move |rows: &[JsonRow]| recorded.lock().unwrap().push(rows.len()));
        let notifier = Arc::new(Notifier::new(callbacks, EventBus::new(8)));
        (FetchAdapter::new(handler, notifier, Lifecycle::mounted()), seen)
    }

    #[tokio::test]
    async fn test_function_handler_page_response() {
        let handler = handler_fn(|q: ListQuery| async move {
            Ok(HandlerResponse::Page {
                rows: rows(q.pagination.limit as i64),
                total: Some(25),
            })
        });
        let (adapter, seen) = adapter(handler);

        let result = adapter.fetch(query(10, 0)).await.unwrap();
        assert_eq!(result.rows.len(), 10);
        assert_eq!(result.total, Some(25));
        assert_eq!(*seen.lock().unwrap(), vec![10]);
    }

    #[tokio::test]
    async fn test_function_handler_over_return_is_truncated() {
        let handler = handler_fn(|_q: ListQuery| async move { Ok(HandlerResponse::Rows(rows(15))) });
        let (adapter, seen) = adapter(handler);

        let result = adapter.fetch(query(10, 0)).await.unwrap();
        assert_eq!(result.rows.len(), 10);
        assert_eq!(result.total, None);
        assert_eq!(result.rows.last().unwrap().id, RowId::Num(9));
        assert_eq!(*seen.lock().unwrap(), vec![10]);
    }

    #[tokio::test]
    async fn test_function_handler_error_skips_on_rows() {
        let handler = handler_fn(|_q: ListQuery| async move {
            Err::<HandlerResponse<JsonRow>, _>(eyre!("network"))
        });
        let (adapter, seen) = adapter(handler);

        let err = adapter.fetch(query(10, 0)).await.unwrap_err();
        assert_eq!(err.to_string(), "network");
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_function_handler_panic_becomes_error() {
        let handler = handler_fn(|_q: ListQuery| async move {
            if true {
                panic!("boom");
            }
            Ok(HandlerResponse::Rows(Vec::<JsonRow>::new()))
        });
        let (adapter, _seen) = adapter(handler);

        let err = adapter.fetch(query(10, 0)).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_static_rows_sliced_locally() {
        let (adapter, seen) = adapter(Handler::from_rows(rows(25)));

        let result = adapter.fetch(query(10, 20)).await.unwrap();
        assert_eq!(result.rows.len(), 5);
        assert_eq!(result.rows[0].id, RowId::Num(20));
        assert_eq!(result.total, Some(25));
        assert_eq!(*seen.lock().unwrap(), vec![5]);
    }

    #[tokio::test]
    async fn test_unmounted_adapter_skips_on_rows() {
        let (adapter, seen) = adapter(Handler::from_rows(rows(3)));
        adapter.lifecycle.unmount();

        let result = adapter.fetch(query(10, 0)).await.unwrap();
        assert_eq!(result.rows.len(), 3);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_paginate_static_past_end_is_empty() {
        let source = StaticRows::with_total(rows(5), None);
        let result = paginate_static(&source, &Pagination::new(10, 30));
        assert!(result.rows.is_empty());
        assert_eq!(result.total, None);
    }
}
