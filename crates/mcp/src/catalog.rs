// Known BudgetKey datasets. Advisory only: tools forward any dataset id and
// leave rejection of unknown ids to the upstream API.

use serde::Serialize;

pub const AVAILABLE_DATASETS_URI: &str = "resource://available_datasets";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetEntry {
    pub id: &'static str,
    pub description: &'static str,
}

pub const DATASETS: &[DatasetEntry] = &[
    DatasetEntry {
        id: "budget_items_data",
        description: "Budget book (ספר התקציב): planned and executed state expenses",
    },
    DatasetEntry {
        id: "support_programs_data",
        description: "Budgetary support programs (תוכניות תמיכה)",
    },
    DatasetEntry {
        id: "supports_transactions_data",
        description: "Individual budgetary support payments (תשלומי תמיכות)",
    },
    DatasetEntry {
        id: "contracts_data",
        description: "Government procurement contracts (התקשרויות רכש)",
    },
    DatasetEntry {
        id: "entities_data",
        description: "Companies, associations, local authorities and other entities (גופים וארגונים)",
    },
    DatasetEntry {
        id: "income_items_data",
        description: "State revenues (הכנסות המדינה)",
    },
    DatasetEntry {
        id: "budgetary_change_requests_data",
        description: "Budgetary change requests (בקשות לשינויים תקציביים)",
    },
    DatasetEntry {
        id: "budgetary_change_transactions_data",
        description: "Individual transactions within budgetary change requests (שינויי תקציב)",
    },
];

/// Markdown bullet list, one dataset per line.
pub fn dataset_list() -> String {
    DATASETS
        .iter()
        .map(|d| format!("- {}: {}", d.id, d.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Body of the `available_datasets` resource.
pub fn catalog_json() -> serde_json::Value {
    serde_json::json!({ "datasets": DATASETS })
}
