pub mod error;
pub mod form;
pub mod preview;

pub use error::EditorError;
pub use form::{FormFields, FormOutcome, TaskForm, WorkflowForm};
pub use preview::{PreviewBuffer, PreviewSink};

use crate::backend::WorkflowStore;
use crate::document::{DocumentError, WorkflowDocument};
use crate::projection::{EdgeDecision, GraphProjection, VisualGraph};
use crate::shared::{EventLog, NodeId};
use crate::styling::ColorRegistry;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The edit was applied; `text` is the document as published.
    Applied { text: String },
    Cancelled,
    /// The edit was refused without touching the document.
    Rejected(String),
}

/// Two-click "from node, to node" gesture. `from` becomes a dependency of
/// `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeGesture {
    pub from: NodeId,
    pub to: NodeId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub nodes: Vec<NodeId>,
    /// `(dependency, dependent)` pairs.
    pub edges: Vec<(NodeId, NodeId)>,
}

impl Selection {
    pub fn nodes(nodes: Vec<NodeId>) -> Self {
        Self {
            nodes,
            edges: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Created,
    Updated,
}

/// Applies structural edits to a workflow document and its projected
/// graph together, publishing the re-serialized document after each one.
///
/// Every edit runs against a copy of the document and graph and is
/// committed only once it has fully succeeded, so a failed edit leaves
/// both exactly as they were.
#[derive(Debug, Clone)]
pub struct EditorController<P: PreviewSink = PreviewBuffer> {
    document: WorkflowDocument,
    projection: GraphProjection,
    preview: P,
    persisted_name: Option<String>,
    log: EventLog,
}

impl<P: PreviewSink> EditorController<P> {
    pub fn new(preview: P, log: EventLog) -> Self {
        Self {
            document: WorkflowDocument::default(),
            projection: GraphProjection::new(ColorRegistry::new(), log.clone()),
            preview,
            persisted_name: None,
            log,
        }
    }

    pub fn document(&self) -> &WorkflowDocument {
        &self.document
    }

    pub fn graph(&self) -> &VisualGraph {
        self.projection.graph()
    }

    pub fn projection(&self) -> &GraphProjection {
        &self.projection
    }

    pub fn preview(&self) -> &P {
        &self.preview
    }

    /// Name the workflow is stored under on the backend, if it was ever
    /// saved or loaded from there.
    pub fn persisted_name(&self) -> Option<&str> {
        self.persisted_name.as_deref()
    }

    pub fn set_persisted_name(&mut self, name: Option<String>) {
        self.persisted_name = name.filter(|n| !n.trim().is_empty());
    }

    fn commit<T>(
        &mut self,
        edit: impl FnOnce(&mut WorkflowDocument, &mut GraphProjection) -> Result<T, EditorError>,
    ) -> Result<(T, String), EditorError> {
        let mut document = self.document.clone();
        let mut projection = self.projection.clone();
        let value = edit(&mut document, &mut projection)?;
        let text = document.to_text()?;
        self.document = document;
        self.projection = projection;
        self.preview.publish(&text);
        Ok((value, text))
    }

    pub fn create_task(&mut self, form: FormOutcome<TaskForm>) -> Result<EditOutcome, EditorError> {
        let FormOutcome::Accepted(form) = form else {
            return Ok(EditOutcome::Cancelled);
        };
        form.validate()?;
        let id = form.node_id()?;
        if self.document.contains(&id) {
            return Err(DocumentError::Conflict(format!("task `{id}` already exists")).into());
        }
        let (_, text) = self.commit(|document, projection| {
            document.upsert_task(&id, &form.command, form.args.clone(), None)?;
            projection.refresh(document);
            Ok(())
        })?;
        Ok(EditOutcome::Applied { text })
    }

    /// Updates the task at `original`, renaming it first when the form
    /// names a different module or task. Dependencies are kept.
    pub fn edit_task(
        &mut self,
        original: &NodeId,
        form: FormOutcome<TaskForm>,
    ) -> Result<EditOutcome, EditorError> {
        let FormOutcome::Accepted(form) = form else {
            return Ok(EditOutcome::Cancelled);
        };
        form.validate()?;
        let target = form.node_id()?;
        let (_, text) = self.commit(|document, projection| {
            if &target != original {
                projection.on_visual_node_renamed(document, original, &form.module, &form.task)?;
            } else if !document.contains(original) {
                return Err(DocumentError::missing_task(original).into());
            }
            document.upsert_task(&target, &form.command, form.args.clone(), None)?;
            projection.refresh(document);
            Ok(())
        })?;
        Ok(EditOutcome::Applied { text })
    }

    pub fn add_dependency(&mut self, gesture: &EdgeGesture) -> Result<EditOutcome, EditorError> {
        if self.projection.graph().has_edge(&gesture.from, &gesture.to) {
            return Ok(EditOutcome::Rejected(format!(
                "edge `{}` -> `{}` already exists",
                gesture.from, gesture.to
            )));
        }
        let (decision, text) = self.commit(|document, projection| {
            Ok(projection.on_visual_edge_created(document, &gesture.from, &gesture.to)?)
        })?;
        match decision {
            EdgeDecision::Accepted => Ok(EditOutcome::Applied { text }),
            EdgeDecision::RejectedDuplicate => Ok(EditOutcome::Rejected(format!(
                "edge `{}` -> `{}` already exists",
                gesture.from, gesture.to
            ))),
        }
    }

    /// Deletes the selected edges, then the selected tasks together with
    /// every reference to them.
    pub fn delete_selection(&mut self, selection: &Selection) -> Result<EditOutcome, EditorError> {
        if selection.is_empty() {
            return Ok(EditOutcome::Cancelled);
        }
        let (_, text) = self.commit(|document, projection| {
            for (from, to) in &selection.edges {
                if selection.nodes.contains(from) || selection.nodes.contains(to) {
                    continue;
                }
                projection.on_visual_edge_deleted(document, from, to)?;
            }
            let mut removed: Vec<&NodeId> = Vec::new();
            for id in &selection.nodes {
                if removed.contains(&id) {
                    continue;
                }
                projection.on_visual_node_deleted(document, id)?;
                removed.push(id);
            }
            Ok(())
        })?;
        Ok(EditOutcome::Applied { text })
    }

    pub fn edit_metadata(
        &mut self,
        form: FormOutcome<WorkflowForm>,
    ) -> Result<EditOutcome, EditorError> {
        let FormOutcome::Accepted(form) = form else {
            return Ok(EditOutcome::Cancelled);
        };
        form.validate()?;
        let (_, text) = self.commit(|document, _| {
            document.name = form.name.trim().to_string();
            document.description = Some(form.description.trim().to_string())
                .filter(|description| !description.is_empty());
            document.arguments = form.arguments.clone();
            Ok(())
        })?;
        Ok(EditOutcome::Applied { text })
    }

    /// Replaces the document wholesale and rebuilds the graph with fresh
    /// module colors. The workflow counts as never saved.
    pub fn load(&mut self, document: WorkflowDocument) -> Result<String, EditorError> {
        let text = document.to_text()?;
        self.document = document;
        self.projection.reset();
        self.projection.refresh(&self.document);
        self.persisted_name = None;
        self.preview.publish(&text);
        Ok(text)
    }

    pub fn load_from_backend<S>(&mut self, store: &S, name: &str) -> Result<String, EditorError>
    where
        S: WorkflowStore + ?Sized,
    {
        let payload = store.fetch_workflow(name)?;
        let mut document = WorkflowDocument::from_file(payload.config)?;
        if document.name.trim().is_empty() {
            document.name = name.to_string();
        }
        let text = self.load(document)?;
        self.persisted_name = Some(name.to_string());
        Ok(text)
    }

    /// Creates the workflow on first save and replaces it afterwards.
    pub fn save<S>(&mut self, store: &S) -> Result<SaveKind, EditorError>
    where
        S: WorkflowStore + ?Sized,
    {
        let name = self.document.name.trim().to_string();
        if name.is_empty() {
            return Err(EditorError::Validation(
                "workflow name is required before saving".to_string(),
            ));
        }
        let text = self.document.to_text()?;
        let kind = match &self.persisted_name {
            None => {
                store.create_workflow(&name, &text)?;
                SaveKind::Created
            }
            Some(persisted) => {
                store.update_workflow(persisted, &name, &text)?;
                SaveKind::Updated
            }
        };
        self.log.info(
            "editor.saved",
            &format!("saved workflow `{name}` ({kind:?})"),
        );
        self.persisted_name = Some(name);
        Ok(kind)
    }

    /// Declared workflow arguments with their default values.
    pub fn run_arguments(&self) -> BTreeMap<String, String> {
        self.document.arguments.clone()
    }

    /// Starts an execution of the saved workflow. Non-blank `args` override
    /// the declared defaults. Returns the scan id.
    pub fn run<S>(&self, store: &S, args: &BTreeMap<String, String>) -> Result<String, EditorError>
    where
        S: WorkflowStore + ?Sized,
    {
        let Some(name) = self.persisted_name.as_deref() else {
            return Err(EditorError::Validation(
                "workflow must be saved before it can run".to_string(),
            ));
        };
        let mut merged = self.run_arguments();
        for (key, value) in args {
            if !value.trim().is_empty() {
                merged.insert(key.clone(), value.trim().to_string());
            }
        }
        let scan_id = store.run_workflow(name, &merged)?;
        self.log.info(
            "editor.run_started",
            &format!("workflow `{name}` started as scan `{scan_id}`"),
        );
        Ok(scan_id)
    }
}
