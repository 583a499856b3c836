//! Request types and upstream URL construction.
//!
//! Every tables endpoint lives at `{base}/api/tables/{dataset}/{suffix}`.
//! Building an [`UpstreamCall`] is pure: it touches no network and is fully
//! determined by the request, the base URL, and the timeout.

use crate::config::{ApiBase, ClientConfig};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Rows returned by a SQL query when the caller gives no page size.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// The three tables endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableEndpoint {
    Info,
    Search,
    Query,
}

impl TableEndpoint {
    /// Final path segment of the endpoint.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Search => "search",
            Self::Query => "query",
        }
    }

    /// Timeout that applies to this endpoint.
    pub fn timeout(&self, config: &ClientConfig) -> Duration {
        match self {
            Self::Query => config.query_timeout,
            Self::Info | Self::Search => config.timeout,
        }
    }
}

impl fmt::Display for TableEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Fetch schema and column metadata for a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetInfoRequest {
    pub dataset: String,
}

impl DatasetInfoRequest {
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
        }
    }
}

/// Free-text search within a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub dataset: String,
    pub q: String,
}

impl SearchRequest {
    pub fn new(dataset: impl Into<String>, q: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            q: q.into(),
        }
    }
}

/// SQL query against a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbQueryRequest {
    pub dataset: String,
    pub query: String,
    pub page_size: u32,
}

impl DbQueryRequest {
    /// Create a query request with the default page size.
    pub fn new(dataset: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            query: query.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

/// A fully resolved GET against the upstream API.
///
/// Constructed once per tool invocation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamCall {
    endpoint: TableEndpoint,
    url: Url,
    query_params: Vec<(String, String)>,
    timeout: Duration,
}

impl UpstreamCall {
    fn build(
        base: &ApiBase,
        endpoint: TableEndpoint,
        dataset: &str,
        query_params: Vec<(String, String)>,
        timeout: Duration,
    ) -> Self {
        let url = base.join_segments(["api", "tables", dataset, endpoint.suffix()]);
        Self {
            endpoint,
            url,
            query_params,
            timeout,
        }
    }

    /// `{base}/api/tables/{dataset}/info`
    pub fn info(config: &ClientConfig, request: &DatasetInfoRequest) -> Self {
        let endpoint = TableEndpoint::Info;
        Self::build(
            &config.base_url,
            endpoint,
            &request.dataset,
            Vec::new(),
            endpoint.timeout(config),
        )
    }

    /// `{base}/api/tables/{dataset}/search?q={q}`
    pub fn search(config: &ClientConfig, request: &SearchRequest) -> Self {
        let endpoint = TableEndpoint::Search;
        Self::build(
            &config.base_url,
            endpoint,
            &request.dataset,
            vec![("q".to_string(), request.q.clone())],
            endpoint.timeout(config),
        )
    }

    /// `{base}/api/tables/{dataset}/query?query={sql}&page_size={n}`
    pub fn query(config: &ClientConfig, request: &DbQueryRequest) -> Self {
        let endpoint = TableEndpoint::Query;
        Self::build(
            &config.base_url,
            endpoint,
            &request.dataset,
            vec![
                ("query".to_string(), request.query.clone()),
                ("page_size".to_string(), request.page_size.to_string()),
            ],
            endpoint.timeout(config),
        )
    }

    pub fn endpoint(&self) -> TableEndpoint {
        self.endpoint
    }

    /// Endpoint URL without query parameters.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query_params
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Complete request target with encoded query string.
    pub fn target(&self) -> Url {
        let mut url = self.url.clone();
        if !self.query_params.is_empty() {
            url.query_pairs_mut().extend_pairs(
                self.query_params
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str())),
            );
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base: &str) -> ClientConfig {
        ClientConfig::new(ApiBase::parse(base).unwrap())
    }

    #[test]
    fn test_info_url_has_no_query() {
        let call = UpstreamCall::info(
            &config("https://next.obudget.org"),
            &DatasetInfoRequest::new("budget_items_data"),
        );

        assert_eq!(
            call.target().as_str(),
            "https://next.obudget.org/api/tables/budget_items_data/info"
        );
        assert!(call.query_params().is_empty());
        assert_eq!(call.timeout(), Duration::from_secs(30));
        assert_eq!(call.endpoint(), TableEndpoint::Info);
    }

    #[test]
    fn test_search_url_encodes_query_text() {
        let call = UpstreamCall::search(
            &config("http://localhost:9000"),
            &SearchRequest::new("entities_data", "משרד החינוך & co"),
        );

        assert_eq!(
            call.url().as_str(),
            "http://localhost:9000/api/tables/entities_data/search"
        );

        let target = call.target();
        let pairs: Vec<(String, String)> = target.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![("q".to_string(), "משרד החינוך & co".to_string())]
        );
        assert!(!target.query().unwrap().contains(' '));
        assert!(!target.query().unwrap().contains("& co"));
    }

    #[test]
    fn test_query_url_carries_sql_and_page_size() {
        let sql = "SELECT year, title FROM budget_items_data WHERE title LIKE '%חינוך%'";
        let call = UpstreamCall::query(
            &config("https://next.obudget.org"),
            &DbQueryRequest::new("budget_items_data", sql),
        );

        assert_eq!(
            call.query_params(),
            &[
                ("query".to_string(), sql.to_string()),
                ("page_size".to_string(), "50".to_string()),
            ]
        );
        assert_eq!(call.timeout(), Duration::from_secs(60));

        let target = call.target();
        assert_eq!(target.path(), "/api/tables/budget_items_data/query");
        let pairs: Vec<(String, String)> = target.query_pairs().into_owned().collect();
        assert_eq!(pairs[0].1, sql);
        assert_eq!(pairs[1], ("page_size".to_string(), "50".to_string()));
    }

    #[test]
    fn test_default_page_size_is_fifty() {
        assert_eq!(DbQueryRequest::new("d", "SELECT 1").page_size, 50);
        assert_eq!(
            DbQueryRequest::new("d", "SELECT 1").with_page_size(7).page_size,
            7
        );
    }

    #[test]
    fn test_dataset_segment_is_percent_encoded() {
        let call = UpstreamCall::info(
            &config("https://next.obudget.org"),
            &DatasetInfoRequest::new("../admin data?x=1#frag"),
        );

        assert_eq!(
            call.target().as_str(),
            "https://next.obudget.org/api/tables/..%2Fadmin%20data%3Fx=1%23frag/info"
        );
    }

    #[test]
    fn test_builder_is_deterministic() {
        let cfg = config("https://next.obudget.org");
        let request = SearchRequest::new("contracts_data", "מחשבים");
        assert_eq!(
            UpstreamCall::search(&cfg, &request),
            UpstreamCall::search(&cfg, &request)
        );
    }
}
