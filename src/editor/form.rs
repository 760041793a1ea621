use super::EditorError;
use crate::shared::ids::validate_name_value;
use crate::shared::NodeId;
use std::collections::BTreeMap;

/// Raw field values collected by a form, keyed by field name.
pub type FormFields = BTreeMap<String, String>;

const ARG_PREFIX: &str = "args.";
const ARGUMENT_PREFIX: &str = "arguments.";

/// Result of presenting a form to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome<T> {
    Accepted(T),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub module: String,
    pub task: String,
    pub command: String,
    pub args: BTreeMap<String, String>,
}

impl TaskForm {
    pub fn new(module: &str, task: &str, command: &str) -> Self {
        Self {
            module: module.trim().to_string(),
            task: task.trim().to_string(),
            command: command.trim().to_string(),
            args: BTreeMap::new(),
        }
    }

    pub fn with_arg(mut self, key: &str, value: &str) -> Self {
        self.args.insert(key.to_string(), value.to_string());
        self
    }

    /// Reads `module`, `task`, `command` and any `args.<key>` fields.
    pub fn from_fields(fields: &FormFields) -> Result<Self, EditorError> {
        let form = Self {
            module: field(fields, "module"),
            task: field(fields, "task"),
            command: field(fields, "command"),
            args: prefixed(fields, ARG_PREFIX),
        };
        form.validate()?;
        Ok(form)
    }

    pub fn validate(&self) -> Result<(), EditorError> {
        validate_name_value("module name", &self.module).map_err(EditorError::Validation)?;
        validate_name_value("task name", &self.task).map_err(EditorError::Validation)?;
        if self.command.trim().is_empty() {
            return Err(EditorError::Validation(
                "command must be non-empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn node_id(&self) -> Result<NodeId, EditorError> {
        NodeId::new(&self.module, &self.task).map_err(EditorError::Validation)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowForm {
    pub name: String,
    pub description: String,
    pub arguments: BTreeMap<String, String>,
}

impl WorkflowForm {
    /// Reads `name`, `description` and any `arguments.<key>` fields.
    pub fn from_fields(fields: &FormFields) -> Result<Self, EditorError> {
        let form = Self {
            name: field(fields, "name"),
            description: field(fields, "description"),
            arguments: prefixed(fields, ARGUMENT_PREFIX),
        };
        form.validate()?;
        Ok(form)
    }

    pub fn validate(&self) -> Result<(), EditorError> {
        if self.name.trim().is_empty() {
            return Err(EditorError::Validation(
                "workflow name must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn field(fields: &FormFields, key: &str) -> String {
    fields
        .get(key)
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

/// Collects `prefix<key>` fields; entries with a blank key or value are
/// dropped.
fn prefixed(fields: &FormFields, prefix: &str) -> BTreeMap<String, String> {
    fields
        .iter()
        .filter_map(|(key, value)| {
            let key = key.strip_prefix(prefix)?.trim();
            let value = value.trim();
            (!key.is_empty() && !value.is_empty()).then(|| (key.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(entries: &[(&str, &str)]) -> FormFields {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn task_form_reads_prefixed_args() {
        let form = TaskForm::from_fields(&fields(&[
            ("module", " net "),
            ("task", "scan"),
            ("command", "nmap"),
            ("args.ports", "1-1024"),
            ("args.blank", " "),
        ]))
        .expect("valid form");
        assert_eq!(form.module, "net");
        assert_eq!(form.args.len(), 1);
        assert_eq!(form.args.get("ports").map(String::as_str), Some("1-1024"));
    }

    #[test]
    fn task_form_requires_all_scalar_fields() {
        for missing in ["module", "task", "command"] {
            let mut values = fields(&[("module", "net"), ("task", "scan"), ("command", "nmap")]);
            values.remove(missing);
            let err = TaskForm::from_fields(&values).expect_err("missing field");
            assert!(matches!(err, EditorError::Validation(_)), "{missing}");
        }
    }

    #[test]
    fn task_form_rejects_separator_in_names() {
        let err = TaskForm::from_fields(&fields(&[
            ("module", "net:extra"),
            ("task", "scan"),
            ("command", "nmap"),
        ]))
        .expect_err("separator");
        assert!(err.to_string().contains("module name"));
    }

    #[test]
    fn workflow_form_requires_name() {
        let err = WorkflowForm::from_fields(&fields(&[("description", "x")])).expect_err("name");
        assert!(matches!(err, EditorError::Validation(_)));
    }
}
