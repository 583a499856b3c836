//! # BudgetKey Client
//!
//! Async client for the BudgetKey tables API: dataset metadata, full-text
//! search and SQL query execution.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use budgetkey_client::{BudgetKeyClient, ClientResult, DbQueryRequest};
//!
//! #[tokio::main]
//! async fn main() -> ClientResult<()> {
//!     let client = BudgetKeyClient::builder()
//!         .base_url("https://next.obudget.org")
//!         .build()?;
//!
//!     let info = client.tables().info("budget_items_data").await?;
//!     println!("{}", info);
//!
//!     let request = DbQueryRequest::new(
//!         "budget_items_data",
//!         "SELECT year, title FROM budget_items_data LIMIT 5",
//!     );
//!     let rows = client.tables().query(&request).await?;
//!     println!("{}", rows);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod transport;

pub use client::{BudgetKeyClient, BudgetKeyClientBuilder};
pub use config::{ApiBase, ClientConfig, RetryConfig, DEFAULT_API_BASE};
pub use error::{ClientError, ClientResult};
pub use request::{
    DatasetInfoRequest, DbQueryRequest, SearchRequest, TableEndpoint, UpstreamCall,
    DEFAULT_PAGE_SIZE,
};
