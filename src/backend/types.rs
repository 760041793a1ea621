use crate::document::WorkflowFile;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowPayload {
    pub config: WorkflowFile,
    #[serde(default)]
    pub yaml: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SaveRequest<'a> {
    pub(crate) name: &'a str,
    pub(crate) yaml: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct RunRequest<'a> {
    pub(crate) args: &'a BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RunResponse {
    #[serde(default, deserialize_with = "optional_id")]
    pub(crate) scan_id: Option<String>,
    #[serde(default)]
    pub(crate) error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub(crate) error: Option<String>,
}

/// Body of the execution details endpoint. Malformed task entries are kept
/// as `None`/partial records and skipped by consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExecutionDetails {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Option<TaskStatusRecord>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskStatusRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl TaskStatusRecord {
    pub fn new(name: &str, status: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            status: Some(status.to_string()),
        }
    }
}

impl ExecutionDetails {
    pub fn from_records(records: Vec<TaskStatusRecord>) -> Self {
        Self {
            status: None,
            tasks: records.into_iter().map(Some).collect(),
        }
    }
}

fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(value)) => Some(value),
        Some(serde_json::Value::Number(value)) => Some(value.to_string()),
        _ => None,
    })
}
