pub mod args;
pub mod datasets;
pub mod error;
mod registry;
pub mod result;

pub use args::ToolRequest;
pub use datasets::{dataset_registry, DatasetTool};
pub use error::{ErrorKind, ToolError};
pub use registry::{
    json_schema_object, json_schema_positive_integer, json_schema_string, Tool, ToolRegistry,
};
pub use result::ToolResult;

use std::fmt;

/// Names of the tools this server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    DatasetInfo,
    DatasetFullTextSearch,
    DatasetDBQuery,
}

impl ToolName {
    pub const ALL: [ToolName; 3] = [
        ToolName::DatasetInfo,
        ToolName::DatasetFullTextSearch,
        ToolName::DatasetDBQuery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DatasetInfo => "DatasetInfo",
            Self::DatasetFullTextSearch => "DatasetFullTextSearch",
            Self::DatasetDBQuery => "DatasetDBQuery",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
