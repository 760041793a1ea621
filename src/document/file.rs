//! On-disk shape of a workflow document.
//!
//! Field order in these structs is the serialized field order. Optional
//! fields are skipped entirely when absent or empty.

use crate::shared::serde_ext::{one_or_many, scalar_string_map, serialize_one_or_many};
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowFile {
    pub workflow: WorkflowSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSection {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        alias = "args",
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "scalar_string_map"
    )]
    pub arguments: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_empty")]
    pub modules: Vec<ModuleEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tasks: Vec<TaskEntry>,
}

/// A task written as the single-key mapping `{ <task name>: <body> }`.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskEntry {
    pub name: String,
    pub body: TaskBody,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskBody {
    #[serde(default)]
    pub command: String,
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "scalar_string_map"
    )]
    pub args: BTreeMap<String, String>,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "serialize_one_or_many",
        deserialize_with = "one_or_many"
    )]
    pub requires: Vec<String>,
}

impl Serialize for TaskEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.body)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for TaskEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, Option<TaskBody>>::deserialize(deserializer)?;
        if raw.len() != 1 {
            return Err(D::Error::custom(format!(
                "task entry must be a single-key mapping, found {} keys",
                raw.len()
            )));
        }
        let Some((name, body)) = raw.into_iter().next() else {
            return Err(D::Error::custom("task entry is empty"));
        };
        Ok(Self {
            name,
            body: body.unwrap_or_default(),
        })
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
