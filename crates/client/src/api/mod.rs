//! Typed views over the upstream API.

mod tables;

pub use tables::TablesApi;
