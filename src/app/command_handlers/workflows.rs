use crate::app::command_support::{backend_client, load_settings, parse_key_values, read_document};
use crate::editor::{EditorController, PreviewBuffer, SaveKind};
use std::path::Path;

pub fn cmd_show(args: &[String]) -> Result<String, String> {
    if args.len() != 1 {
        return Err("usage: show <workflow>".to_string());
    }
    let settings = load_settings()?;
    let backend = backend_client(&settings);
    let mut editor = EditorController::new(PreviewBuffer::new(), settings.event_log());
    let text = editor
        .load_from_backend(&backend, &args[0])
        .map_err(|e| e.to_string())?;
    Ok(text.trim_end().to_string())
}

pub fn cmd_save(args: &[String]) -> Result<String, String> {
    let (path, create) = match args {
        [path] => (path, false),
        [path, flag] if flag == "--new" => (path, true),
        _ => return Err("usage: save <file> [--new]".to_string()),
    };
    let settings = load_settings()?;
    let backend = backend_client(&settings);
    let document = read_document(Path::new(path))?;
    let persisted = (!create).then(|| document.name.clone());

    let mut editor = EditorController::new(PreviewBuffer::new(), settings.event_log());
    editor.load(document).map_err(|e| e.to_string())?;
    editor.set_persisted_name(persisted);
    let kind = editor.save(&backend).map_err(|e| e.to_string())?;
    let name = editor.persisted_name().unwrap_or_default();
    Ok(match kind {
        SaveKind::Created => format!("created workflow {name}"),
        SaveKind::Updated => format!("updated workflow {name}"),
    })
}

pub fn cmd_run(args: &[String]) -> Result<String, String> {
    if args.is_empty() {
        return Err("usage: run <workflow> [key=value...]".to_string());
    }
    let overrides = parse_key_values(&args[1..])?;
    let settings = load_settings()?;
    let backend = backend_client(&settings);

    let mut editor = EditorController::new(PreviewBuffer::new(), settings.event_log());
    editor
        .load_from_backend(&backend, &args[0])
        .map_err(|e| e.to_string())?;
    let scan_id = editor
        .run(&backend, &overrides)
        .map_err(|e| e.to_string())?;
    Ok(format!("scan_id={scan_id}"))
}
