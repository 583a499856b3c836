//! Tables API endpoints.

use crate::client::BudgetKeyClient;
use crate::error::ClientResult;
use crate::request::{DatasetInfoRequest, DbQueryRequest, SearchRequest, UpstreamCall};
use tracing::info;

/// Maximum SQL characters echoed into logs.
const LOGGED_SQL_CHARS: usize = 100;

/// Tables API for dataset metadata, search and SQL queries.
pub struct TablesApi<'a> {
    client: &'a BudgetKeyClient,
}

impl<'a> TablesApi<'a> {
    pub(crate) fn new(client: &'a BudgetKeyClient) -> Self {
        Self { client }
    }

    /// Get columns and schema for a dataset.
    pub async fn info(&self, dataset: &str) -> ClientResult<serde_json::Value> {
        let call = UpstreamCall::info(self.client.config(), &DatasetInfoRequest::new(dataset));
        info!(dataset, url = %call.url(), "Fetching dataset info");
        self.client.http.execute(&call).await
    }

    /// Full-text search within a dataset.
    pub async fn search(&self, request: &SearchRequest) -> ClientResult<serde_json::Value> {
        let call = UpstreamCall::search(self.client.config(), request);
        info!(
            dataset = %request.dataset,
            url = %call.url(),
            q = %request.q,
            "Searching dataset"
        );
        self.client.http.execute(&call).await
    }

    /// Run a SQL query against a dataset.
    pub async fn query(&self, request: &DbQueryRequest) -> ClientResult<serde_json::Value> {
        let call = UpstreamCall::query(self.client.config(), request);
        let sql: String = request.query.chars().take(LOGGED_SQL_CHARS).collect();
        info!(
            dataset = %request.dataset,
            page_size = request.page_size,
            sql = %sql,
            "Querying dataset"
        );

        let result = self.client.http.execute(&call).await?;

        if let Some(download_url) = result.get("download_url").and_then(|v| v.as_str()) {
            info!(dataset = %request.dataset, download_url, "Download URL available");
        }

        Ok(result)
    }
}
