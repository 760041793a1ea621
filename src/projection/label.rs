use crate::shared::ids::NODE_ID_SEPARATOR;

/// Human label for a task: `port_scan` and `net:port_scan` both become
/// `Port Scan`.
pub fn format_task_label(name: &str) -> String {
    let task = match name.split_once(NODE_ID_SEPARATOR) {
        Some((_, task)) => task,
        None => name,
    };
    task.split('_')
        .map(capitalize_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
