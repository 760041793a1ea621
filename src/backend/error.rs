#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("request to {url} returned status {code}: {body}")]
    Status {
        url: String,
        code: u16,
        body: String,
    },
    #[error("failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("backend rejected the request: {0}")]
    Rejected(String),
}

impl BackendError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}
