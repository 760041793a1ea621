use super::{StatusSynchronizer, StatusTable, SyncState, TickOutcome};
use crate::backend::{ExecutionBackend, ExecutionDetails};
use crate::document::WorkflowDocument;
use crate::projection::{GraphProjection, VisualGraph};
use crate::shared::EventLog;
use crate::styling::ColorRegistry;

/// Read-only execution page: a projected graph plus the synchronizer
/// following one execution of it.
#[derive(Debug, Clone)]
pub struct WorkflowViewer {
    document: WorkflowDocument,
    projection: GraphProjection,
    sync: StatusSynchronizer,
}

impl WorkflowViewer {
    pub fn attach(
        document: WorkflowDocument,
        workflow: &str,
        scan_id: Option<String>,
        log: EventLog,
    ) -> Self {
        let mut projection = GraphProjection::new(ColorRegistry::new(), log.clone());
        projection.refresh(&document);
        Self {
            document,
            projection,
            sync: StatusSynchronizer::attach(workflow, scan_id, log),
        }
    }

    pub fn document(&self) -> &WorkflowDocument {
        &self.document
    }

    pub fn graph(&self) -> &VisualGraph {
        self.projection.graph()
    }

    pub fn synchronizer(&self) -> &StatusSynchronizer {
        &self.sync
    }

    pub fn table(&self) -> &StatusTable {
        self.sync.table()
    }

    pub fn state(&self) -> SyncState {
        self.sync.state()
    }

    pub fn is_polling(&self) -> bool {
        self.sync.is_polling()
    }

    pub fn tick<B: ExecutionBackend + ?Sized>(&mut self, backend: &B) -> TickOutcome {
        self.sync
            .update_task_status(backend, self.projection.graph_mut())
    }

    pub fn apply_details(&mut self, details: &ExecutionDetails) -> TickOutcome {
        self.sync.apply_details(details, self.projection.graph_mut())
    }

    pub fn detach(&mut self) {
        self.sync.detach();
    }
}
