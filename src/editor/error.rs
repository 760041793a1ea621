use crate::backend::BackendError;
use crate::document::DocumentError;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// Form input that cannot be applied.
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}
