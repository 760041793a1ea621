use super::TaskStatus;
use crate::projection::format_task_label;
use crate::shared::NodeId;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRow {
    pub node_id: NodeId,
    pub module: String,
    pub task_label: String,
    pub status: TaskStatus,
}

impl StatusRow {
    fn new(node_id: NodeId, status: TaskStatus) -> Self {
        Self {
            module: node_id.module().to_string(),
            task_label: format_task_label(node_id.task()),
            node_id,
            status,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableChanges {
    pub replaced: usize,
    pub appended: usize,
}

/// Task status rows keyed by node id. Rows keep their position once
/// appended; only their content is replaced when the status moves.
#[derive(Debug, Clone, Default)]
pub struct StatusTable {
    rows: Vec<StatusRow>,
}

impl StatusTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[StatusRow] {
        &self.rows
    }

    pub fn row(&self, id: &NodeId) -> Option<&StatusRow> {
        self.rows.iter().find(|row| &row.node_id == id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows matching `status`, or every row when `None`.
    pub fn filtered<'a>(
        &'a self,
        status: Option<&'a TaskStatus>,
    ) -> impl Iterator<Item = &'a StatusRow> + 'a {
        self.rows
            .iter()
            .filter(move |row| status.map_or(true, |wanted| &row.status == wanted))
    }

    /// Applies observed statuses in priority order. Names that are not
    /// `module:task` identities get no row.
    pub fn apply(&mut self, observed: &[(String, TaskStatus)]) -> TableChanges {
        let mut ordered: Vec<&(String, TaskStatus)> = observed.iter().collect();
        ordered.sort_by_key(|(_, status)| status.priority());

        let mut changes = TableChanges::default();
        for (name, status) in ordered {
            let Ok(node_id) = NodeId::parse(name) else {
                continue;
            };
            match self.rows.iter_mut().find(|row| row.node_id == node_id) {
                Some(row) if &row.status != status => {
                    *row = StatusRow::new(node_id, status.clone());
                    changes.replaced += 1;
                }
                Some(_) => {}
                None => {
                    self.rows.push(StatusRow::new(node_id, status.clone()));
                    changes.appended += 1;
                }
            }
        }
        changes
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
