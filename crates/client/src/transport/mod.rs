//! Transport layer for the BudgetKey client.

pub mod http;

pub use http::HttpTransport;
