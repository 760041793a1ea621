#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Preview,
    AddTask,
    Link,
    Rename,
    Delete,
    Show,
    Save,
    Run,
    Watch,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "preview" => CliVerb::Preview,
        "add-task" => CliVerb::AddTask,
        "link" => CliVerb::Link,
        "rename" => CliVerb::Rename,
        "delete" => CliVerb::Delete,
        "show" => CliVerb::Show,
        "save" => CliVerb::Save,
        "run" => CliVerb::Run,
        "watch" => CliVerb::Watch,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    [
        ("preview <file>", "Print the normalized workflow document and its graph"),
        (
            "add-task <file> <module> <task> <command> [key=value...]",
            "Add a task to a workflow file",
        ),
        ("link <file> <from> <to>", "Make <to> depend on <from>"),
        ("rename <file> <node> <module> <task>", "Move a task to a new identity"),
        ("delete <file> <node>...", "Delete tasks and every reference to them"),
        ("show <workflow>", "Fetch a workflow from the backend"),
        ("save <file> [--new]", "Store a workflow file on the backend"),
        ("run <workflow> [key=value...]", "Start an execution and print its scan id"),
        (
            "watch <workflow> <scan_id> [--once]",
            "Follow per-task status of an execution",
        ),
    ]
    .iter()
    .map(|(usage, description)| format!("  {usage:58} {description}"))
    .collect()
}

pub(crate) fn help_text() -> String {
    let mut lines = vec!["Commands:".to_string()];
    lines.extend(cli_help_lines());
    lines.push(String::new());
    lines.push(format!(
        "Settings are read from ~/.taskgraph/config.yaml; {} overrides the backend URL.",
        crate::config::BACKEND_URL_ENV
    ));
    lines.join("\n")
}
