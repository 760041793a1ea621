use crate::app::command_support::{
    load_settings, open_editor, parse_key_values, parse_node_id, write_edit,
};
use crate::editor::{EdgeGesture, FormOutcome, Selection, TaskForm};
use crate::shared::EventLog;
use std::path::Path;

fn event_log() -> EventLog {
    load_settings()
        .map(|settings| settings.event_log())
        .unwrap_or_else(|_| EventLog::disabled())
}

pub fn cmd_preview(args: &[String]) -> Result<String, String> {
    if args.len() != 1 {
        return Err("usage: preview <file>".to_string());
    }
    let path = Path::new(&args[0]);
    if !path.exists() {
        return Err(format!("workflow file {} does not exist", path.display()));
    }
    let editor = open_editor(path, EventLog::disabled())?;

    let mut lines = vec![editor.preview().text().trim_end().to_string(), String::new()];
    lines.push(format!(
        "nodes={} edges={}",
        editor.graph().nodes().len(),
        editor.graph().edges().len()
    ));
    for edge in editor.graph().edges() {
        lines.push(format!("  {} -> {}", edge.from, edge.to));
    }
    Ok(lines.join("\n"))
}

pub fn cmd_add_task(args: &[String]) -> Result<String, String> {
    if args.len() < 4 {
        return Err(
            "usage: add-task <file> <module> <task> <command> [key=value...]".to_string(),
        );
    }
    let path = Path::new(&args[0]);
    let mut form = TaskForm::new(&args[1], &args[2], &args[3]);
    form.args = parse_key_values(&args[4..])?;
    let node = format!("{}:{}", form.module, form.task);

    let mut editor = open_editor(path, event_log())?;
    let outcome = editor
        .create_task(FormOutcome::Accepted(form))
        .map_err(|e| e.to_string())?;
    write_edit(path, outcome)?;
    Ok(format!("added task {node}"))
}

pub fn cmd_link(args: &[String]) -> Result<String, String> {
    if args.len() != 3 {
        return Err("usage: link <file> <from> <to>".to_string());
    }
    let path = Path::new(&args[0]);
    let gesture = EdgeGesture {
        from: parse_node_id(&args[1])?,
        to: parse_node_id(&args[2])?,
    };

    let mut editor = open_editor(path, event_log())?;
    let outcome = editor
        .add_dependency(&gesture)
        .map_err(|e| e.to_string())?;
    write_edit(path, outcome)?;
    Ok(format!("linked {} -> {}", gesture.from, gesture.to))
}

pub fn cmd_rename(args: &[String]) -> Result<String, String> {
    if args.len() != 4 {
        return Err("usage: rename <file> <node> <module> <task>".to_string());
    }
    let path = Path::new(&args[0]);
    let original = parse_node_id(&args[1])?;

    let mut editor = open_editor(path, event_log())?;
    let task = editor
        .document()
        .task(&original)
        .cloned()
        .ok_or_else(|| format!("task `{original}` does not exist"))?;
    let mut form = TaskForm::new(&args[2], &args[3], &task.command);
    form.args = task.args;
    let renamed = format!("{}:{}", form.module, form.task);

    let outcome = editor
        .edit_task(&original, FormOutcome::Accepted(form))
        .map_err(|e| e.to_string())?;
    write_edit(path, outcome)?;
    Ok(format!("renamed {original} -> {renamed}"))
}

pub fn cmd_delete(args: &[String]) -> Result<String, String> {
    if args.len() < 2 {
        return Err("usage: delete <file> <node>...".to_string());
    }
    let path = Path::new(&args[0]);
    let nodes = args[1..]
        .iter()
        .map(|raw| parse_node_id(raw))
        .collect::<Result<Vec<_>, _>>()?;
    let count = nodes.len();

    let mut editor = open_editor(path, event_log())?;
    let outcome = editor
        .delete_selection(&Selection::nodes(nodes))
        .map_err(|e| e.to_string())?;
    write_edit(path, outcome)?;
    Ok(format!("deleted {count} task(s)"))
}
