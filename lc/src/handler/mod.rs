//! Handler contract and the fetch adapter
//!
//! A handler is either a function of the query (sync or async) or a static
//! set of rows paginated locally. [`FetchAdapter`] turns both into a uniform
//! [`FetchResult`] that never holds more rows than the limit.

mod adapter;
mod search;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::domain::{Chips, FetchResult, Pagination, RowData, SortModel};

pub use adapter::{FetchAdapter, normalize_response, paginate_static};
pub use search::ignore_symbols;

/// Parameters of one fetch, as seen by a handler
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListQuery {
    pub filter_data: Value,
    pub pagination: Pagination,
    pub sort: SortModel,
    pub chips: Chips,
    pub search: String,
    pub payload: Value,
}

/// What a function handler may return
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerResponse<R> {
    /// Bare rows; the total is unknown
    Rows(Vec<R>),
    /// Rows with a total (`None` for unknown)
    Page { rows: Vec<R>, total: Option<usize> },
}

impl<R> From<Vec<R>> for HandlerResponse<R> {
    fn from(rows: Vec<R>) -> Self {
        Self::Rows(rows)
    }
}

impl<R> From<FetchResult<R>> for HandlerResponse<R> {
    fn from(result: FetchResult<R>) -> Self {
        Self::Page {
            rows: result.rows,
            total: result.total,
        }
    }
}

/// Integrator-supplied data source
#[async_trait]
pub trait ListHandler<R: RowData>: Send + Sync {
    /// Fetch the rows for `query`
    ///
    /// Returning more than `query.pagination.limit` rows is tolerated: the
    /// excess is dropped with a warning.
    async fn fetch(&self, query: ListQuery) -> eyre::Result<HandlerResponse<R>>;
}

/// Handler backed by a closure returning a future
pub struct FnHandler<F> {
    f: F,
}

#[async_trait]
impl<R, F, Fut> ListHandler<R> for FnHandler<F>
where
    R: RowData,
    F: Fn(ListQuery) -> Fut + Send + Sync,
    Fut: Future<Output = eyre::Result<HandlerResponse<R>>> + Send,
{
    async fn fetch(&self, query: ListQuery) -> eyre::Result<HandlerResponse<R>> {
        (self.f)(query).await
    }
}

/// Wrap an async closure as a [`Handler`]
///
/// Synchronous handlers wrap their body in `async move { ... }`.
pub fn handler_fn<R, F, Fut>(f: F) -> Handler<R>
where
    R: RowData,
    F: Fn(ListQuery) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = eyre::Result<HandlerResponse<R>>> + Send + 'static,
{
    Handler::Function(Arc::new(FnHandler { f }))
}

/// Rows served without calling out, sliced to the requested window
#[derive(Debug, Clone, PartialEq)]
pub struct StaticRows<R> {
    pub rows: Vec<R>,
    pub total: Option<usize>,
}

impl<R> StaticRows<R> {
    /// Plain array: the total is the array length
    pub fn from_rows(rows: Vec<R>) -> Self {
        let total = Some(rows.len());
        Self { rows, total }
    }

    /// Rows with an explicit total
    pub fn with_total(rows: Vec<R>, total: Option<usize>) -> Self {
        Self { rows, total }
    }
}

/// Either shape of handler the controller accepts
pub enum Handler<R: RowData> {
    Function(Arc<dyn ListHandler<R>>),
    Static(StaticRows<R>),
}

impl<R: RowData> Handler<R> {
    pub fn new(handler: impl ListHandler<R> + 'static) -> Self {
        Self::Function(Arc::new(handler))
    }

    pub fn from_rows(rows: Vec<R>) -> Self {
        Self::Static(StaticRows::from_rows(rows))
    }
}

impl<R: RowData> Clone for Handler<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Function(handler) => Self::Function(Arc::clone(handler)),
            Self::Static(rows) => Self::Static(rows.clone()),
        }
    }
}

impl<R: RowData> fmt::Debug for Handler<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(_) => f.write_str("Handler::Function(..)"),
            Self::Static(rows) => write!(f, "Handler::Static({} rows, total {:?})", rows.rows.len(), rows.total),
        }
    }
}
