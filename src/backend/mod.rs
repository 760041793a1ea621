pub mod error;
pub mod types;

pub use error::BackendError;
pub use types::{ExecutionDetails, TaskStatusRecord, WorkflowPayload};

use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;
use types::{ErrorBody, RunRequest, RunResponse, SaveRequest};

/// Workflow CRUD and execution start.
pub trait WorkflowStore {
    fn fetch_workflow(&self, name: &str) -> Result<WorkflowPayload, BackendError>;
    fn create_workflow(&self, name: &str, yaml: &str) -> Result<(), BackendError>;
    /// Replaces the workflow stored under `persisted`; `name` may differ when
    /// the workflow was renamed.
    fn update_workflow(&self, persisted: &str, name: &str, yaml: &str)
        -> Result<(), BackendError>;
    /// Starts an execution and returns its scan id.
    fn run_workflow(
        &self,
        name: &str,
        args: &BTreeMap<String, String>,
    ) -> Result<String, BackendError>;
}

/// Per-task execution status, polled by the status synchronizer.
pub trait ExecutionBackend {
    fn execution_details(
        &self,
        workflow: &str,
        scan_id: &str,
    ) -> Result<ExecutionDetails, BackendError>;
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    agent: ureq::Agent,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> String {
        let path = segments
            .iter()
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/api/{path}", self.base_url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, BackendError> {
        let response = self
            .agent
            .get(url)
            .set("accept", "application/json")
            .call()
            .map_err(|err| call_error(url, err))?;
        decode(url, response)
    }

    fn send_json<T: DeserializeOwned>(
        &self,
        method: &str,
        url: &str,
        body: serde_json::Value,
    ) -> Result<T, BackendError> {
        let response = self
            .agent
            .request(method, url)
            .set("accept", "application/json")
            .send_json(body)
            .map_err(|err| call_error(url, err))?;
        decode(url, response)
    }

    fn save(&self, method: &str, url: &str, name: &str, yaml: &str) -> Result<(), BackendError> {
        let body = serde_json::to_value(SaveRequest { name, yaml }).map_err(|e| {
            BackendError::Decode {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;
        let response: ErrorBody = self.send_json(method, url, body)?;
        match response.error {
            Some(message) => Err(BackendError::Rejected(message)),
            None => Ok(()),
        }
    }
}

impl WorkflowStore for BackendClient {
    fn fetch_workflow(&self, name: &str) -> Result<WorkflowPayload, BackendError> {
        self.get_json(&self.endpoint(&["workflow", name]))
    }

    fn create_workflow(&self, name: &str, yaml: &str) -> Result<(), BackendError> {
        self.save("POST", &self.endpoint(&["workflow"]), name, yaml)
    }

    fn update_workflow(
        &self,
        persisted: &str,
        name: &str,
        yaml: &str,
    ) -> Result<(), BackendError> {
        self.save("PUT", &self.endpoint(&["workflow", persisted]), name, yaml)
    }

    fn run_workflow(
        &self,
        name: &str,
        args: &BTreeMap<String, String>,
    ) -> Result<String, BackendError> {
        let url = self.endpoint(&["workflow", name, "run"]);
        let body = serde_json::to_value(RunRequest { args }).map_err(|e| BackendError::Decode {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        let response: RunResponse = self.send_json("POST", &url, body)?;
        if let Some(message) = response.error {
            return Err(BackendError::Rejected(message));
        }
        response
            .scan_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| BackendError::Decode {
                url,
                reason: "response carried neither `scan_id` nor `error`".to_string(),
            })
    }
}

impl ExecutionBackend for BackendClient {
    fn execution_details(
        &self,
        workflow: &str,
        scan_id: &str,
    ) -> Result<ExecutionDetails, BackendError> {
        self.get_json(&self.endpoint(&["workflow", workflow, "execution", scan_id, "details"]))
    }
}

fn call_error(url: &str, err: ureq::Error) -> BackendError {
    match err {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|parsed| parsed.error)
                .unwrap_or(body);
            BackendError::Status {
                url: url.to_string(),
                code,
                body: message,
            }
        }
        ureq::Error::Transport(transport) => BackendError::Transport {
            url: url.to_string(),
            reason: transport.to_string(),
        },
    }
}

fn decode<T: DeserializeOwned>(url: &str, response: ureq::Response) -> Result<T, BackendError> {
    response
        .into_json::<T>()
        .map_err(|e| BackendError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
}
