use crate::backend::BackendClient;
use crate::config::{load_global_settings, Settings};
use crate::document::WorkflowDocument;
use crate::editor::{EditOutcome, EditorController, PreviewBuffer};
use crate::projection::VisualGraph;
use crate::shared::fs_atomic::atomic_write_file;
use crate::shared::{EventLog, NodeId};
use crate::status::StatusTable;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub type FileEditor = EditorController<PreviewBuffer>;

pub fn load_settings() -> Result<Settings, String> {
    load_global_settings().map_err(|e| e.to_string())
}

pub fn backend_client(settings: &Settings) -> BackendClient {
    BackendClient::new(&settings.backend_url, settings.request_timeout())
}

pub fn read_document(path: &Path) -> Result<WorkflowDocument, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    WorkflowDocument::from_text(&raw).map_err(|e| format!("{}: {e}", path.display()))
}

/// Opens a workflow file in an editor; a missing file starts an empty
/// workflow named after the file stem.
pub fn open_editor(path: &Path, log: EventLog) -> Result<FileEditor, String> {
    let mut editor = EditorController::new(PreviewBuffer::new(), log);
    let document = if path.exists() {
        read_document(path)?
    } else {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        WorkflowDocument::new(stem)
    };
    editor.load(document).map_err(|e| e.to_string())?;
    Ok(editor)
}

pub fn write_edit(path: &Path, outcome: EditOutcome) -> Result<(), String> {
    match outcome {
        EditOutcome::Applied { text } => atomic_write_file(path, text.as_bytes())
            .map_err(|e| format!("failed to write {}: {e}", path.display())),
        EditOutcome::Cancelled => Ok(()),
        EditOutcome::Rejected(reason) => Err(reason),
    }
}

pub fn parse_node_id(raw: &str) -> Result<NodeId, String> {
    NodeId::parse(raw).map_err(|e| format!("invalid node `{raw}`: {e}"))
}

/// Parses trailing `key=value` arguments.
pub fn parse_key_values(args: &[String]) -> Result<BTreeMap<String, String>, String> {
    let mut out = BTreeMap::new();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got `{arg}`"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("expected key=value, got `{arg}`"));
        }
        out.insert(key.to_string(), value.trim().to_string());
    }
    Ok(out)
}

pub fn render_status_table(table: &StatusTable) -> String {
    if table.is_empty() {
        return "no task status reported".to_string();
    }
    table
        .rows()
        .iter()
        .map(|row| format!("{:<8} {:<16} {}", row.status, row.module, row.task_label))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per highlighted edge, e.g. `net:scan -> net:report running width=3 dashed`.
pub fn render_active_edges(graph: &VisualGraph) -> Vec<String> {
    graph
        .edges()
        .iter()
        .filter(|edge| edge.style.is_active())
        .map(|edge| {
            let dashed = if edge.style.dashes().is_some() {
                " dashed"
            } else {
                ""
            };
            format!(
                "{} -> {} {} width={}{dashed}",
                edge.from,
                edge.to,
                edge.style.as_str(),
                edge.style.width()
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{Edge, Node};
    use crate::styling::{EdgeStyle, MODULE_PALETTE};
    use tempfile::tempdir;

    #[test]
    fn key_values_require_an_equals_sign() {
        let parsed = parse_key_values(&["target=10.0.0.1".to_string(), "depth= 2".to_string()])
            .expect("parse");
        assert_eq!(parsed.get("depth").map(String::as_str), Some("2"));

        let err = parse_key_values(&["target".to_string()]).expect_err("missing =");
        assert!(err.contains("key=value"));
    }

    #[test]
    fn missing_file_opens_empty_workflow_named_after_file() {
        let temp = tempdir().expect("temp dir");
        let editor =
            open_editor(&temp.path().join("recon.yaml"), EventLog::disabled()).expect("open");
        assert_eq!(editor.document().name, "recon");
        assert!(editor.document().is_empty());
    }

    #[test]
    fn only_highlighted_edges_are_rendered() {
        let id = |raw: &str| NodeId::parse(raw).expect("node id");
        let mut graph = VisualGraph::new();
        let nodes = ["net:scan", "net:report", "net:notify"]
            .iter()
            .map(|raw| Node {
                id: id(raw),
                label: raw.to_string(),
                color: MODULE_PALETTE[0],
            })
            .collect();
        graph.sync(
            nodes,
            vec![
                Edge::new(id("net:scan"), id("net:report")),
                Edge::new(id("net:report"), id("net:notify")),
            ],
        );
        graph.set_edge_style(&id("net:scan"), &id("net:report"), EdgeStyle::Done);

        assert_eq!(
            render_active_edges(&graph),
            vec!["net:scan -> net:report done width=2".to_string()]
        );

        graph.set_edge_style(&id("net:report"), &id("net:notify"), EdgeStyle::Running);
        assert_eq!(
            render_active_edges(&graph)[1],
            "net:report -> net:notify running width=3 dashed"
        );
    }
}
