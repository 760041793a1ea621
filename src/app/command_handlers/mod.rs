use crate::app::cli::{help_text, parse_cli_verb, CliVerb};

pub mod documents;
pub mod watch;
pub mod workflows;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    if args.is_empty() {
        return Ok(help_text());
    }

    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Preview => documents::cmd_preview(&args[1..]),
        CliVerb::AddTask => documents::cmd_add_task(&args[1..]),
        CliVerb::Link => documents::cmd_link(&args[1..]),
        CliVerb::Rename => documents::cmd_rename(&args[1..]),
        CliVerb::Delete => documents::cmd_delete(&args[1..]),
        CliVerb::Show => workflows::cmd_show(&args[1..]),
        CliVerb::Save => workflows::cmd_save(&args[1..]),
        CliVerb::Run => workflows::cmd_run(&args[1..]),
        CliVerb::Watch => watch::cmd_watch(&args[1..]),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{}`", args[0])),
    }
}
