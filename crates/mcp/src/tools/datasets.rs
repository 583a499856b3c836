// Dataset tools: each call is one validated GET against the tables API.

use super::args::ToolRequest;
use super::error::ToolError;
use super::registry::{
    json_schema_object, json_schema_positive_integer, json_schema_string, Tool, ToolRegistry,
};
use super::ToolName;
use crate::catalog;
use crate::protocol::ToolSchema;
use budgetkey_client::{BudgetKeyClient, DEFAULT_PAGE_SIZE};
use std::sync::Arc;

/// One of the three tables tools, bound to a shared client.
pub struct DatasetTool {
    name: ToolName,
    client: BudgetKeyClient,
}

impl DatasetTool {
    pub fn new(name: ToolName, client: BudgetKeyClient) -> Self {
        Self { name, client }
    }

    fn description(&self) -> String {
        let datasets = catalog::dataset_list();
        match self.name {
            ToolName::DatasetInfo => format!(
                "Get information about a dataset: its columns, data types and database schema.\n\n\
Call this BEFORE DatasetFullTextSearch or DatasetDBQuery on any dataset, and use the column \
names exactly as shown when writing SQL. Note fields such as item_url that link to the data.\n\n\
Available datasets:\n{}",
                datasets
            ),
            ToolName::DatasetFullTextSearch => format!(
                "Full-text search within a dataset to locate identifiers (entity ids, budget codes, \
names) for precise queries. Not for searching time periods or dates.\n\n\
Call DatasetInfo first. Use the identifiers found here in DatasetDBQuery filters; \
search results are not a final answer.\n\n\
Available datasets:\n{}",
                datasets
            ),
            ToolName::DatasetDBQuery => format!(
                "Execute a PostgreSQL-compatible SQL query against a dataset.\n\n\
Call DatasetInfo first and use exact column names. Use only identifiers found through \
DatasetFullTextSearch. Filter by time period, aggregate where appropriate and include \
item_url in the SELECT list.\n\n\
The result contains rows, a download_url for the full result, and warnings. If warnings \
are present, fix the query and re-run before presenting results.\n\n\
Available datasets:\n{}",
                datasets
            ),
        }
    }

    fn input_schema(&self) -> serde_json::Value {
        let dataset = json_schema_string("ID of the dataset, e.g. budget_items_data");
        match self.name {
            ToolName::DatasetInfo => {
                json_schema_object(serde_json::json!({ "dataset": dataset }), vec!["dataset"])
            }
            ToolName::DatasetFullTextSearch => json_schema_object(
                serde_json::json!({
                    "dataset": dataset,
                    "q": json_schema_string("Free-text search query (organization name, keyword, description)")
                }),
                vec!["dataset", "q"],
            ),
            ToolName::DatasetDBQuery => json_schema_object(
                serde_json::json!({
                    "dataset": dataset,
                    "query": json_schema_string("PostgreSQL-compatible SQL query to execute"),
                    "page_size": json_schema_positive_integer("Number of rows to return", DEFAULT_PAGE_SIZE)
                }),
                vec!["dataset", "query"],
            ),
        }
    }
}

#[async_trait::async_trait]
impl Tool for DatasetTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name.as_str().to_string(),
            description: self.description(),
            input_schema: self.input_schema(),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let request = ToolRequest::parse(self.name, &arguments)?;
        let tables = self.client.tables();

        let payload = match &request {
            ToolRequest::Info(r) => tables.info(&r.dataset).await?,
            ToolRequest::Search(r) => tables.search(r).await?,
            ToolRequest::DbQuery(r) => tables.query(r).await?,
        };

        Ok(payload)
    }
}

/// Registry holding the three dataset tools over one shared client.
pub fn dataset_registry(client: BudgetKeyClient) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for name in ToolName::ALL {
        registry.register(Arc::new(DatasetTool::new(name, client.clone())));
    }
    registry
}
