pub mod polling;
pub mod table;
pub mod viewer;

pub use polling::{run_polling, PollSummary};
pub use table::{StatusRow, StatusTable, TableChanges};
pub use viewer::WorkflowViewer;

use crate::backend::{ExecutionBackend, ExecutionDetails};
use crate::projection::{format_task_label, VisualGraph};
use crate::shared::{EventLog, NodeId};
use crate::styling::EdgeStyle;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Pending,
    Running,
    Done,
    Failed,
    /// Any status string the backend reports that has no dedicated variant.
    Other(String),
}

impl TaskStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "done" => Self::Done,
            "failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Other(raw) => raw,
        }
    }

    /// Table sort key: running, pending, done, failed, then anything else.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Running => 0,
            Self::Pending => 1,
            Self::Done => 2,
            Self::Failed => 3,
            Self::Other(_) => 4,
        }
    }

    fn incoming_edge_style(&self) -> Option<EdgeStyle> {
        match self {
            Self::Running => Some(EdgeStyle::Running),
            Self::Done => Some(EdgeStyle::Done),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No execution to follow.
    Idle,
    Polling,
    Stopped,
}

/// Last observed status per backend task name.
pub type TaskStatusSnapshot = HashMap<String, TaskStatus>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusUpdate {
    pub changed_tasks: usize,
    pub edges_restyled: usize,
    pub labels_refreshed: usize,
    pub rows_replaced: usize,
    pub rows_appended: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not polling; no request was made.
    Inactive,
    Unchanged,
    Updated(StatusUpdate),
    /// The execution no longer exists.
    Stopped,
    /// The fetch failed; the snapshot is untouched and the next tick retries.
    Failed(String),
}

/// Diffs polled task statuses against the last observed ones and restyles
/// only what moved.
#[derive(Debug, Clone)]
pub struct StatusSynchronizer {
    workflow: String,
    scan_id: Option<String>,
    state: SyncState,
    snapshot: TaskStatusSnapshot,
    table: StatusTable,
    log: EventLog,
}

impl StatusSynchronizer {
    pub fn attach(workflow: &str, scan_id: Option<String>, log: EventLog) -> Self {
        let scan_id = scan_id.filter(|id| !id.trim().is_empty());
        let state = if scan_id.is_some() {
            SyncState::Polling
        } else {
            SyncState::Idle
        };
        Self {
            workflow: workflow.to_string(),
            scan_id,
            state,
            snapshot: TaskStatusSnapshot::new(),
            table: StatusTable::new(),
            log,
        }
    }

    pub fn workflow(&self) -> &str {
        &self.workflow
    }

    pub fn scan_id(&self) -> Option<&str> {
        self.scan_id.as_deref()
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn is_polling(&self) -> bool {
        self.state == SyncState::Polling
    }

    pub fn snapshot(&self) -> &TaskStatusSnapshot {
        &self.snapshot
    }

    pub fn table(&self) -> &StatusTable {
        &self.table
    }

    pub fn detach(&mut self) {
        if self.state != SyncState::Stopped {
            self.stop("detached");
        }
    }

    fn stop(&mut self, reason: &str) {
        self.state = SyncState::Stopped;
        self.snapshot.clear();
        self.log.info(
            "status.stopped",
            &format!(
                "stopped polling `{}` execution `{}`: {reason}",
                self.workflow,
                self.scan_id.as_deref().unwrap_or("-")
            ),
        );
    }

    /// One poll. A no-op unless the synchronizer is polling.
    pub fn update_task_status<B>(&mut self, backend: &B, graph: &mut VisualGraph) -> TickOutcome
    where
        B: ExecutionBackend + ?Sized,
    {
        if !self.is_polling() {
            return TickOutcome::Inactive;
        }
        let Some(scan_id) = self.scan_id.clone() else {
            return TickOutcome::Inactive;
        };
        match backend.execution_details(&self.workflow, &scan_id) {
            Ok(details) => self.apply_details(&details, graph),
            Err(err) if err.is_not_found() => {
                self.stop("execution not found");
                TickOutcome::Stopped
            }
            Err(err) => {
                self.log.warn(
                    "status.poll_failed",
                    &format!("execution `{scan_id}` of `{}`: {err}", self.workflow),
                );
                TickOutcome::Failed(err.to_string())
            }
        }
    }

    /// Diffs `details` against the snapshot and updates `graph` and the
    /// status table when anything changed.
    pub fn apply_details(
        &mut self,
        details: &ExecutionDetails,
        graph: &mut VisualGraph,
    ) -> TickOutcome {
        let observed = observed_statuses(details);
        let mut changed_tasks = 0;
        for (name, status) in &observed {
            if self.snapshot.get(name) != Some(status) {
                self.snapshot.insert(name.clone(), status.clone());
                changed_tasks += 1;
            }
        }
        if changed_tasks == 0 {
            return TickOutcome::Unchanged;
        }

        let latest: HashMap<&str, &TaskStatus> = observed
            .iter()
            .map(|(name, status)| (name.as_str(), status))
            .collect();
        let mut update = StatusUpdate {
            changed_tasks,
            ..StatusUpdate::default()
        };

        let node_ids: Vec<NodeId> = graph.nodes().iter().map(|n| n.id.clone()).collect();
        let mut targets: Vec<(NodeId, NodeId, EdgeStyle)> = graph
            .edges()
            .iter()
            .map(|e| (e.from.clone(), e.to.clone(), EdgeStyle::Neutral))
            .collect();
        for id in &node_ids {
            let Some(status) = latest.get(id.to_string().as_str()) else {
                continue;
            };
            if graph.set_label(id, &format_task_label(id.task())) {
                update.labels_refreshed += 1;
            }
            let Some(incoming) = status.incoming_edge_style() else {
                continue;
            };
            for (from, to, style) in targets.iter_mut() {
                if *to == *id {
                    *style = incoming;
                } else if *from == *id && incoming == EdgeStyle::Done {
                    *style = EdgeStyle::Done;
                }
            }
        }
        for (from, to, style) in &targets {
            if graph.set_edge_style(from, to, *style) {
                update.edges_restyled += 1;
            }
        }

        let changes = self.table.apply(&observed);
        update.rows_replaced = changes.replaced;
        update.rows_appended = changes.appended;

        self.log.info(
            "status.updated",
            &format!(
                "{} task(s) changed, {} edge(s) restyled",
                update.changed_tasks, update.edges_restyled
            ),
        );
        TickOutcome::Updated(update)
    }
}

/// Named records with a status; anything else in the payload is ignored.
fn observed_statuses(details: &ExecutionDetails) -> Vec<(String, TaskStatus)> {
    details
        .tasks
        .iter()
        .flatten()
        .filter_map(|record| {
            let name = record.name.as_deref()?.trim();
            let status = record.status.as_deref()?;
            (!name.is_empty()).then(|| (name.to_string(), TaskStatus::parse(status)))
        })
        .collect()
}
