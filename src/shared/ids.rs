use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const NODE_ID_SEPARATOR: char = ':';

pub fn validate_name_value(kind: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{kind} must be non-empty"));
    }
    if value.contains(NODE_ID_SEPARATOR) {
        return Err(format!("{kind} must not contain `{NODE_ID_SEPARATOR}`"));
    }
    Ok(())
}

/// Canonical `module:task` identity shared by a task, its visual node and
/// every status record the backend reports for it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    module: String,
    task: String,
}

impl NodeId {
    pub fn new(module: &str, task: &str) -> Result<Self, String> {
        validate_name_value("module name", module)?;
        validate_name_value("task name", task)?;
        Ok(Self {
            module: module.to_string(),
            task: task.to_string(),
        })
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        let (module, task) = raw
            .split_once(NODE_ID_SEPARATOR)
            .ok_or_else(|| format!("node id `{raw}` must use `module:task` format"))?;
        Self::new(module, task)
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn task(&self) -> &str {
        &self.task
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.module, NODE_ID_SEPARATOR, self.task)
    }
}

impl Serialize for NodeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(D::Error::custom)
    }
}

/// A dependency reference as written in a `requires` entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskRef {
    /// Resolved against the module that owns the requiring task.
    Bare(String),
    Qualified(NodeId),
}

impl TaskRef {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if raw.contains(NODE_ID_SEPARATOR) {
            return NodeId::parse(raw).map(Self::Qualified);
        }
        validate_name_value("task reference", raw)?;
        Ok(Self::Bare(raw.to_string()))
    }

    /// Express `target` as seen from a task owned by `owner_module`, keeping
    /// the bare form only when it still resolves to the same task.
    pub fn relative(target: &NodeId, owner_module: &str, prefer_bare: bool) -> Self {
        if prefer_bare && target.module() == owner_module {
            Self::Bare(target.task().to_string())
        } else {
            Self::Qualified(target.clone())
        }
    }

    pub fn resolve(&self, owner_module: &str) -> NodeId {
        match self {
            Self::Bare(task) => NodeId {
                module: owner_module.to_string(),
                task: task.clone(),
            },
            Self::Qualified(id) => id.clone(),
        }
    }

    pub fn is_bare(&self) -> bool {
        matches!(self, Self::Bare(_))
    }
}

impl std::fmt::Display for TaskRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bare(task) => task.fmt(f),
            Self::Qualified(id) => id.fmt(f),
        }
    }
}
