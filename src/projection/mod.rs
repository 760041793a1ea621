pub mod graph;
pub mod label;

pub use graph::{Edge, Node, SyncReport, VisualGraph};
pub use label::format_task_label;

use crate::document::{DocumentError, Removal, Rename, WorkflowDocument};
use crate::shared::{EventLog, NodeId};
use crate::styling::ColorRegistry;

/// A `requires` entry pointing at a task the document does not contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedRef {
    pub dependent: NodeId,
    pub missing: NodeId,
}

#[derive(Debug, Clone, Default)]
pub struct Projection {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub unresolved: Vec<UnresolvedRef>,
}

/// Derives the visual graph implied by `document`. Every edge endpoint is in
/// the node set; references to absent tasks are reported, not drawn.
pub fn project(document: &WorkflowDocument, colors: &mut ColorRegistry) -> Projection {
    let mut projection = Projection::default();
    for module in &document.modules {
        let color = colors.color_for(&module.name);
        for task in &module.tasks {
            let Ok(id) = NodeId::new(&module.name, &task.name) else {
                continue;
            };
            projection.nodes.push(Node {
                id,
                label: format_task_label(&task.name),
                color,
            });
        }
    }

    for (module, task) in document.tasks() {
        let Ok(to) = NodeId::new(module, &task.name) else {
            continue;
        };
        for from in task.dependencies(module) {
            if !document.contains(&from) {
                projection.unresolved.push(UnresolvedRef {
                    dependent: to.clone(),
                    missing: from,
                });
                continue;
            }
            if projection
                .edges
                .iter()
                .any(|e| e.from == from && e.to == to)
            {
                continue;
            }
            projection.edges.push(Edge::new(from, to.clone()));
        }
    }
    projection
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDecision {
    Accepted,
    /// An edge with the same `(from, to)` pair is already drawn.
    RejectedDuplicate,
}

/// Keeps a [`VisualGraph`] observationally equal to a document and routes
/// edits made on the graph back into the document.
#[derive(Debug, Clone, Default)]
pub struct GraphProjection {
    graph: VisualGraph,
    colors: ColorRegistry,
    log: EventLog,
}

impl GraphProjection {
    pub fn new(colors: ColorRegistry, log: EventLog) -> Self {
        Self {
            graph: VisualGraph::new(),
            colors,
            log,
        }
    }

    pub fn graph(&self) -> &VisualGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut VisualGraph {
        &mut self.graph
    }

    pub fn colors(&self) -> &ColorRegistry {
        &self.colors
    }

    /// Re-runs the projection and applies the difference to the graph.
    pub fn refresh(&mut self, document: &WorkflowDocument) -> SyncReport {
        let projection = project(document, &mut self.colors);
        for unresolved in &projection.unresolved {
            self.log.warn(
                "projection.unresolved_ref",
                &format!(
                    "task `{}` requires missing task `{}`",
                    unresolved.dependent, unresolved.missing
                ),
            );
        }
        self.graph.sync(projection.nodes, projection.edges)
    }

    /// Drops graph contents and color assignments, for loading a different
    /// workflow.
    pub fn reset(&mut self) {
        self.graph.clear();
        self.colors.reset();
    }

    pub fn on_visual_edge_created(
        &mut self,
        document: &mut WorkflowDocument,
        from: &NodeId,
        to: &NodeId,
    ) -> Result<EdgeDecision, DocumentError> {
        if self.graph.has_edge(from, to) {
            return Ok(EdgeDecision::RejectedDuplicate);
        }
        document.add_dependency(to, from)?;
        self.refresh(document);
        Ok(EdgeDecision::Accepted)
    }

    pub fn on_visual_edge_deleted(
        &mut self,
        document: &mut WorkflowDocument,
        from: &NodeId,
        to: &NodeId,
    ) -> Result<bool, DocumentError> {
        let removed = document.remove_dependency(to, from)?;
        self.refresh(document);
        Ok(removed)
    }

    pub fn on_visual_node_renamed(
        &mut self,
        document: &mut WorkflowDocument,
        old_id: &NodeId,
        new_module: &str,
        new_task: &str,
    ) -> Result<Rename, DocumentError> {
        let rename = document.rename_task(old_id, new_module, new_task)?;
        if let Some(module) = &rename.pruned_module {
            self.colors.release(module);
        }
        self.refresh(document);
        Ok(rename)
    }

    /// Removes the task and every reference to it, so no edge is left
    /// pointing at the deleted node.
    pub fn on_visual_node_deleted(
        &mut self,
        document: &mut WorkflowDocument,
        id: &NodeId,
    ) -> Result<Removal, DocumentError> {
        let removal = document.remove_task(id)?;
        document.strip_references_to(id);
        if let Some(module) = &removal.pruned_module {
            self.colors.release(module);
        }
        self.refresh(document);
        Ok(removal)
    }
}
