//! ApiPaginator - maps a list query onto a REST endpoint

use std::time::Duration;

use async_trait::async_trait;
use eyre::{Context, eyre};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use super::display_value;
use crate::domain::JsonRow;
use crate::fields::is_truthy;
use crate::handler::{HandlerResponse, ListHandler, ListQuery};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Body the endpoint answers with; both keys are optional
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    rows: Vec<JsonRow>,
    #[serde(default)]
    total: Option<usize>,
}

/// Handler issuing `GET {origin}{path}` per fetch
///
/// The query string carries `limit` and `page`, one `sortBy=field:ASC|DESC`
/// per sort item and one `filter.key=$lte:value` per truthy filter value.
pub struct ApiPaginator {
    origin: String,
    path: String,
    http: Client,
    with_pagination: bool,
    with_filters: bool,
    with_sort: bool,
}

impl ApiPaginator {
    pub fn new(origin: impl Into<String>, path: impl Into<String>) -> eyre::Result<Self> {
        Self::with_timeout(origin, path, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(origin: impl Into<String>, path: impl Into<String>, timeout: Duration) -> eyre::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            origin: origin.into(),
            path: path.into(),
            http,
            with_pagination: true,
            with_filters: true,
            with_sort: true,
        })
    }

    pub fn with_pagination(mut self, enabled: bool) -> Self {
        self.with_pagination = enabled;
        self
    }

    pub fn with_filters(mut self, enabled: bool) -> Self {
        self.with_filters = enabled;
        self
    }

    pub fn with_sort(mut self, enabled: bool) -> Self {
        self.with_sort = enabled;
        self
    }

    /// Request URL for `query`
    pub fn build_url(&self, query: &ListQuery) -> eyre::Result<Url> {
        let base = Url::parse(&self.origin).context(format!("Invalid origin {}", self.origin))?;
        let mut url = base.join(&self.path).context(format!("Invalid path {}", self.path))?;

        {
            let mut pairs = url.query_pairs_mut();
            if self.with_pagination {
                let pagination = query.pagination;
                pairs.append_pair("limit", &pagination.limit.to_string());
                pairs.append_pair("page", &pagination.page().to_string());
            }
            if self.with_sort {
                for item in &query.sort {
                    let value = format!("{}:{}", item.field, item.sort.as_str().to_uppercase());
                    pairs.append_pair("sortBy", &value);
                }
            }
            if self.with_filters {
                let filters = query.filter_data.as_object().into_iter().flatten();
                for (key, value) in filters.filter(|(_, value)| is_truthy(value)) {
                    pairs.append_pair(&format!("filter.{}", key), &format!("$lte:{}", display_value(value)));
                }
            }
        }

        // An empty query_pairs_mut() still leaves a trailing '?'
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }
}

#[async_trait]
impl ListHandler<JsonRow> for ApiPaginator {
    async fn fetch(&self, query: ListQuery) -> eyre::Result<HandlerResponse<JsonRow>> {
        let url = self.build_url(&query)?;
        debug!(%url, "ApiPaginator::fetch: called");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .context(format!("Request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(eyre!("{} answered {}: {}", url, status, text));
        }

        let body: ApiResponse = response.json().await.context("Invalid list response body")?;
        debug!(rows = body.rows.len(), total = ?body.total, "ApiPaginator::fetch: received");
        Ok(HandlerResponse::Page {
            rows: body.rows,
            total: body.total,
        })
    }
}
