// Argument validation: raw JSON tool arguments into typed upstream requests.
// Nothing here touches the network.

use super::error::ToolError;
use super::ToolName;
use budgetkey_client::{DatasetInfoRequest, DbQueryRequest, SearchRequest, DEFAULT_PAGE_SIZE};
use serde_json::{Map, Value};

/// A validated tool call, ready for URL construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRequest {
    Info(DatasetInfoRequest),
    Search(SearchRequest),
    DbQuery(DbQueryRequest),
}

impl ToolRequest {
    /// Validate `arguments` for the named tool.
    pub fn parse(tool: ToolName, arguments: &Value) -> Result<Self, ToolError> {
        // Missing arguments arrive as null from some clients.
        let empty = Map::new();
        let args = match arguments {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => {
                return Err(ToolError::InvalidArgument {
                    field: "arguments",
                    expected: "an object",
                })
            }
        };
        let dataset = dataset_id(args)?;

        let request = match tool {
            ToolName::DatasetInfo => Self::Info(DatasetInfoRequest::new(dataset)),
            ToolName::DatasetFullTextSearch => {
                let q = required_string(args, "q")?;
                Self::Search(SearchRequest::new(dataset, q))
            }
            ToolName::DatasetDBQuery => {
                let query = required_string(args, "query")?;
                let page_size = optional_positive_integer(args, "page_size")?
                    .unwrap_or(DEFAULT_PAGE_SIZE);
                Self::DbQuery(DbQueryRequest::new(dataset, query).with_page_size(page_size))
            }
        };

        Ok(request)
    }

    pub fn tool_name(&self) -> ToolName {
        match self {
            Self::Info(_) => ToolName::DatasetInfo,
            Self::Search(_) => ToolName::DatasetFullTextSearch,
            Self::DbQuery(_) => ToolName::DatasetDBQuery,
        }
    }

    pub fn dataset(&self) -> &str {
        match self {
            Self::Info(r) => &r.dataset,
            Self::Search(r) => &r.dataset,
            Self::DbQuery(r) => &r.dataset,
        }
    }
}

fn required_string(args: &Map<String, Value>, field: &'static str) -> Result<String, ToolError> {
    match args.get(field) {
        None | Some(Value::Null) => Err(ToolError::MissingArgument { field }),
        Some(Value::String(s)) if s.is_empty() => Err(ToolError::EmptyArgument { field }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ToolError::InvalidArgument {
            field,
            expected: "a string",
        }),
    }
}

/// The dataset becomes one URL path segment. `.` and `..` are dot segments
/// that URL normalization drops, which would route the call to another
/// endpoint, so they never name a dataset.
fn dataset_id(args: &Map<String, Value>) -> Result<String, ToolError> {
    let dataset = required_string(args, "dataset")?;
    if dataset == "." || dataset == ".." {
        return Err(ToolError::InvalidArgument {
            field: "dataset",
            expected: "a dataset id other than '.' or '..'",
        });
    }
    Ok(dataset)
}

fn optional_positive_integer(
    args: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<u32>, ToolError> {
    let invalid = ToolError::InvalidArgument {
        field,
        expected: "a positive integer",
    };

    match args.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .filter(|v| *v > 0)
            .and_then(|v| u32::try_from(v).ok())
            .map(Some)
            .ok_or(invalid),
        Some(_) => Err(invalid),
    }
}
