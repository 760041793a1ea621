use crate::app::command_support::{
    backend_client, load_settings, render_active_edges, render_status_table,
};
use crate::backend::WorkflowStore;
use crate::document::WorkflowDocument;
use crate::status::{run_polling, SyncState, TickOutcome, WorkflowViewer};
use std::sync::atomic::AtomicBool;

pub fn cmd_watch(args: &[String]) -> Result<String, String> {
    let (workflow, scan_id, once) = match args {
        [workflow, scan_id] => (workflow, scan_id, false),
        [workflow, scan_id, flag] if flag == "--once" => (workflow, scan_id, true),
        _ => return Err("usage: watch <workflow> <scan_id> [--once]".to_string()),
    };
    let settings = load_settings()?;
    let backend = backend_client(&settings);
    let log = settings.event_log();

    let payload = backend
        .fetch_workflow(workflow)
        .map_err(|e| e.to_string())?;
    let document = WorkflowDocument::from_file(payload.config).map_err(|e| e.to_string())?;
    let mut viewer = WorkflowViewer::attach(document, workflow, Some(scan_id.clone()), log);

    if once {
        return match viewer.tick(&backend) {
            TickOutcome::Stopped => Err(format!("execution `{scan_id}` not found")),
            TickOutcome::Failed(reason) => Err(reason),
            _ => Ok(render_viewer(&viewer)),
        };
    }

    let stop = AtomicBool::new(false);
    let summary = run_polling(
        &mut viewer,
        &backend,
        settings.poll_interval(),
        &stop,
        |viewer, outcome| match outcome {
            TickOutcome::Updated(_) => println!("{}\n", render_viewer(viewer)),
            TickOutcome::Failed(reason) => eprintln!("status poll failed: {reason}"),
            _ => {}
        },
    );
    let state = match viewer.state() {
        SyncState::Stopped => "stopped",
        SyncState::Polling => "polling",
        SyncState::Idle => "idle",
    };
    Ok(format!(
        "watch ended: state={state} ticks={} skipped={}",
        summary.ticks, summary.skipped
    ))
}

fn render_viewer(viewer: &WorkflowViewer) -> String {
    let mut lines = vec![render_status_table(viewer.table())];
    let edges = render_active_edges(viewer.graph());
    if !edges.is_empty() {
        lines.push(String::new());
        lines.extend(edges);
    }
    lines.join("\n")
}
