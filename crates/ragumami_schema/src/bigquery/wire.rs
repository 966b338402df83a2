//! REST payloads.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct MetadataToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
}

/// `jobs.query` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryRequest<'a> {
    pub query: &'a str,
    pub use_legacy_sql: bool,
    pub location: &'a str,
    pub timeout_ms: u64,
}

/// Shared shape of `jobs.query` and `jobs.getQueryResults` responses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryResponse {
    #[serde(default)]
    pub job_complete: bool,
    pub job_reference: Option<JobReference>,
    #[serde(default)]
    pub rows: Vec<Row>,
    pub page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobReference {
    pub job_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Row {
    #[serde(default)]
    pub f: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Cell {
    #[serde(default)]
    pub v: serde_json::Value,
}

impl Row {
    /// Cell `index` as text; `None` for SQL NULL or a missing cell.
    pub fn text(&self, index: usize) -> Option<String> {
        match self.f.get(index).map(|cell| &cell.v) {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TableList {
    #[serde(default)]
    pub tables: Vec<TableListEntry>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TableListEntry {
    pub table_reference: TableReference,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TableReference {
    pub table_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Table {
    pub schema: Option<TableFieldList>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TableFieldList {
    #[serde(default)]
    pub fields: Vec<TableField>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TableField {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub mode: Option<String>,
    pub description: Option<String>,
}
