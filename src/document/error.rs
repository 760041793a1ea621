#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("integrity error: {0}")]
    Integrity(String),
    #[error("invalid workflow document: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to encode workflow document: {source}")]
    Encode {
        #[source]
        source: serde_yaml::Error,
    },
}

impl DocumentError {
    pub(crate) fn missing_task(node_id: impl std::fmt::Display) -> Self {
        Self::Integrity(format!("task `{node_id}` does not exist"))
    }
}
