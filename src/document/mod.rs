pub mod error;
pub mod file;

pub use error::DocumentError;
pub use file::{ModuleEntry, TaskBody, TaskEntry, WorkflowFile, WorkflowSection};

use crate::shared::ids::validate_name_value;
use crate::shared::{NodeId, TaskRef};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    pub command: String,
    pub args: BTreeMap<String, String>,
    pub requires: Vec<TaskRef>,
}

impl Task {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: BTreeMap::new(),
            requires: Vec::new(),
        }
    }

    /// Dependencies of this task resolved to node ids, in `requires` order.
    pub fn dependencies<'a>(&'a self, owner_module: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.requires.iter().map(move |r| r.resolve(owner_module))
    }

    fn requires_target(&self, owner_module: &str, target: &NodeId) -> bool {
        self.dependencies(owner_module).any(|dep| &dep == target)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub tasks: Vec<Task>,
}

impl Module {
    fn task_index(&self, task: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.name == task)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub task: Task,
    /// Set when the removal emptied the owning module and it was pruned.
    pub pruned_module: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub new_id: NodeId,
    pub pruned_module: Option<String>,
    pub incoming: usize,
    pub outgoing: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowDocument {
    pub name: String,
    pub description: Option<String>,
    pub arguments: BTreeMap<String, String>,
    pub modules: Vec<Module>,
}

impl WorkflowDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    fn module_index(&self, name: &str) -> Option<usize> {
        self.modules.iter().position(|m| m.name == name)
    }

    pub fn task(&self, id: &NodeId) -> Option<&Task> {
        self.module(id.module())
            .and_then(|m| m.tasks.iter().find(|t| t.name == id.task()))
    }

    fn task_mut(&mut self, id: &NodeId) -> Option<&mut Task> {
        self.modules
            .iter_mut()
            .find(|m| m.name == id.module())
            .and_then(|m| m.tasks.iter_mut().find(|t| t.name == id.task()))
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.task(id).is_some()
    }

    /// Every task with its owning module name, in document order.
    pub fn tasks(&self) -> impl Iterator<Item = (&str, &Task)> {
        self.modules
            .iter()
            .flat_map(|m| m.tasks.iter().map(move |t| (m.name.as_str(), t)))
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.tasks()
            .filter_map(|(module, task)| NodeId::new(module, &task.name).ok())
            .collect()
    }

    pub fn task_count(&self) -> usize {
        self.modules.iter().map(|m| m.tasks.len()).sum()
    }

    /// Inserts a task, appending its module when absent, or replaces an
    /// existing task in place. `requires: None` keeps the dependencies of a
    /// replaced task.
    pub fn upsert_task(
        &mut self,
        id: &NodeId,
        command: &str,
        args: BTreeMap<String, String>,
        requires: Option<Vec<TaskRef>>,
    ) -> Result<Upsert, DocumentError> {
        if command.trim().is_empty() {
            return Err(DocumentError::Validation(format!(
                "task `{id}` requires a non-empty command"
            )));
        }
        let requires = requires.map(|refs| normalize_requires(id, refs));

        let module_index = match self.module_index(id.module()) {
            Some(index) => index,
            None => {
                self.modules.push(Module {
                    name: id.module().to_string(),
                    tasks: Vec::new(),
                });
                self.modules.len() - 1
            }
        };
        let module = &mut self.modules[module_index];
        match module.task_index(id.task()) {
            Some(task_index) => {
                let task = &mut module.tasks[task_index];
                task.command = command.to_string();
                task.args = args;
                if let Some(requires) = requires {
                    task.requires = requires;
                }
                Ok(Upsert::Replaced)
            }
            None => {
                module.tasks.push(Task {
                    name: id.task().to_string(),
                    command: command.to_string(),
                    args,
                    requires: requires.unwrap_or_default(),
                });
                Ok(Upsert::Inserted)
            }
        }
    }

    pub fn remove_task(&mut self, id: &NodeId) -> Result<Removal, DocumentError> {
        let module_index = self
            .module_index(id.module())
            .ok_or_else(|| DocumentError::missing_task(id))?;
        let task_index = self.modules[module_index]
            .task_index(id.task())
            .ok_or_else(|| DocumentError::missing_task(id))?;

        let task = self.modules[module_index].tasks.remove(task_index);
        let pruned_module = if self.modules[module_index].tasks.is_empty() {
            Some(self.modules.remove(module_index).name)
        } else {
            None
        };
        Ok(Removal {
            task,
            pruned_module,
        })
    }

    /// Moves a task to a new identity, keeping every edge that touched it:
    /// its own dependencies and every other task's reference to it. The task
    /// is removed and re-appended, so it lands at the end of its (possibly
    /// re-created) module.
    pub fn rename_task(
        &mut self,
        old_id: &NodeId,
        new_module: &str,
        new_task: &str,
    ) -> Result<Rename, DocumentError> {
        let new_id = NodeId::new(new_module, new_task).map_err(DocumentError::Validation)?;
        let original = self
            .task(old_id)
            .cloned()
            .ok_or_else(|| DocumentError::missing_task(old_id))?;
        if &new_id == old_id {
            return Ok(Rename {
                new_id,
                pruned_module: None,
                incoming: original.requires.len(),
                outgoing: self.dependents_of(old_id).len(),
            });
        }
        if self.contains(&new_id) {
            return Err(DocumentError::Conflict(format!(
                "task `{new_id}` already exists"
            )));
        }

        let incoming: Vec<(NodeId, bool)> = original
            .requires
            .iter()
            .map(|r| (r.resolve(old_id.module()), r.is_bare()))
            .collect();
        let dependents = self.dependents_of(old_id);

        let requires: Vec<TaskRef> = incoming
            .iter()
            .map(|(target, bare)| TaskRef::relative(target, new_id.module(), *bare))
            .collect();

        // Staged so a failed upsert leaves the document as it was.
        let mut staged = self.clone();
        let removal = staged.remove_task(old_id)?;
        staged.upsert_task(
            &new_id,
            &removal.task.command,
            removal.task.args,
            Some(requires),
        )?;
        let pruned_module = removal.pruned_module;

        for dependent in &dependents {
            let Some(task) = staged.task_mut(dependent) else {
                continue;
            };
            for entry in task.requires.iter_mut() {
                if &entry.resolve(dependent.module()) == old_id {
                    *entry = TaskRef::relative(&new_id, dependent.module(), entry.is_bare());
                }
            }
            let requires = std::mem::take(&mut task.requires);
            task.requires = normalize_requires(dependent, requires);
        }
        *self = staged;

        Ok(Rename {
            new_id,
            pruned_module,
            incoming: incoming.len(),
            outgoing: dependents.len(),
        })
    }

    /// Records that `id` depends on `depends_on`. Returns `false` when the
    /// dependency was already present. No cycle check is performed.
    pub fn add_dependency(
        &mut self,
        id: &NodeId,
        depends_on: &NodeId,
    ) -> Result<bool, DocumentError> {
        if id == depends_on {
            return Err(DocumentError::Validation(format!(
                "task `{id}` cannot depend on itself"
            )));
        }
        if !self.contains(depends_on) {
            return Err(DocumentError::missing_task(depends_on));
        }
        let task = self
            .task_mut(id)
            .ok_or_else(|| DocumentError::missing_task(id))?;
        if task.requires_target(id.module(), depends_on) {
            return Ok(false);
        }
        task.requires.push(TaskRef::Qualified(depends_on.clone()));
        Ok(true)
    }

    pub fn remove_dependency(
        &mut self,
        id: &NodeId,
        depends_on: &NodeId,
    ) -> Result<bool, DocumentError> {
        let task = self
            .task_mut(id)
            .ok_or_else(|| DocumentError::missing_task(id))?;
        let before = task.requires.len();
        task.requires
            .retain(|r| &r.resolve(id.module()) != depends_on);
        Ok(task.requires.len() != before)
    }

    /// Drops every `requires` entry that resolves to `removed`. Returns the
    /// number of entries dropped.
    pub fn strip_references_to(&mut self, removed: &NodeId) -> usize {
        let mut stripped = 0;
        for module in &mut self.modules {
            let owner = module.name.clone();
            for task in &mut module.tasks {
                let before = task.requires.len();
                task.requires.retain(|r| &r.resolve(&owner) != removed);
                stripped += before - task.requires.len();
            }
        }
        stripped
    }

    /// Tasks whose `requires` resolve to `target`.
    pub fn dependents_of(&self, target: &NodeId) -> Vec<NodeId> {
        self.tasks()
            .filter(|(module, task)| task.requires_target(module, target))
            .filter_map(|(module, task)| NodeId::new(module, &task.name).ok())
            .collect()
    }

    pub fn to_file(&self) -> WorkflowFile {
        WorkflowFile {
            workflow: WorkflowSection {
                name: self.name.clone(),
                description: self.description.clone().filter(|d| !d.trim().is_empty()),
                arguments: self.arguments.clone(),
                modules: self
                    .modules
                    .iter()
                    .map(|module| ModuleEntry {
                        name: module.name.clone(),
                        tasks: module
                            .tasks
                            .iter()
                            .map(|task| TaskEntry {
                                name: task.name.clone(),
                                body: TaskBody {
                                    command: task.command.clone(),
                                    args: task.args.clone(),
                                    requires: task
                                        .requires
                                        .iter()
                                        .map(ToString::to_string)
                                        .collect(),
                                },
                            })
                            .collect(),
                    })
                    .collect(),
            },
        }
    }

    /// Normalizes a parsed document: `requires` becomes a deduplicated list of
    /// task references without self references, and modules without tasks
    /// are dropped.
    pub fn from_file(file: WorkflowFile) -> Result<Self, DocumentError> {
        let section = file.workflow;
        let mut modules: Vec<Module> = Vec::new();
        for entry in section.modules {
            validate_name_value("module name", &entry.name).map_err(DocumentError::Validation)?;
            if modules.iter().any(|m| m.name == entry.name) {
                return Err(DocumentError::Validation(format!(
                    "module `{}` is declared more than once",
                    entry.name
                )));
            }
            let mut tasks: Vec<Task> = Vec::new();
            for task_entry in entry.tasks {
                let id = NodeId::new(&entry.name, &task_entry.name)
                    .map_err(DocumentError::Validation)?;
                if tasks.iter().any(|t| t.name == task_entry.name) {
                    return Err(DocumentError::Validation(format!(
                        "task `{id}` is declared more than once"
                    )));
                }
                let refs = task_entry
                    .body
                    .requires
                    .iter()
                    .map(|raw| {
                        TaskRef::parse(raw).map_err(|err| {
                            DocumentError::Validation(format!("task `{id}` requires: {err}"))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                tasks.push(Task {
                    name: task_entry.name,
                    command: task_entry.body.command,
                    args: task_entry.body.args,
                    requires: normalize_requires(&id, refs),
                });
            }
            if tasks.is_empty() {
                continue;
            }
            modules.push(Module {
                name: entry.name,
                tasks,
            });
        }
        Ok(Self {
            name: section.name,
            description: section.description.filter(|d| !d.trim().is_empty()),
            arguments: section.arguments,
            modules,
        })
    }

    /// The ordered document tree handed to the YAML collaborator.
    pub fn serialize(&self) -> Result<serde_yaml::Value, DocumentError> {
        serde_yaml::to_value(self.to_file()).map_err(|source| DocumentError::Encode { source })
    }

    pub fn load(tree: serde_yaml::Value) -> Result<Self, DocumentError> {
        let file: WorkflowFile =
            serde_yaml::from_value(tree).map_err(|source| DocumentError::Parse { source })?;
        Self::from_file(file)
    }

    pub fn to_text(&self) -> Result<String, DocumentError> {
        serde_yaml::to_string(&self.to_file()).map_err(|source| DocumentError::Encode { source })
    }

    pub fn from_text(text: &str) -> Result<Self, DocumentError> {
        let file: WorkflowFile =
            serde_yaml::from_str(text).map_err(|source| DocumentError::Parse { source })?;
        Self::from_file(file)
    }
}

fn normalize_requires(owner: &NodeId, refs: Vec<TaskRef>) -> Vec<TaskRef> {
    let mut seen: Vec<NodeId> = Vec::new();
    let mut out = Vec::new();
    for entry in refs {
        let target = entry.resolve(owner.module());
        if &target == owner || seen.contains(&target) {
            continue;
        }
        seen.push(target);
        out.push(entry);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> NodeId {
        NodeId::parse(raw).expect("node id")
    }

    #[test]
    fn upsert_replaces_in_place_and_keeps_position() {
        let mut doc = WorkflowDocument::new("recon");
        doc.upsert_task(&id("net:scan"), "nmap", BTreeMap::new(), None)
            .expect("insert scan");
        doc.upsert_task(&id("net:report"), "gen", BTreeMap::new(), None)
            .expect("insert report");

        let outcome = doc
            .upsert_task(&id("net:scan"), "masscan", BTreeMap::new(), None)
            .expect("replace scan");

        assert_eq!(outcome, Upsert::Replaced);
        let names: Vec<_> = doc.modules[0].tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["scan", "report"]);
        assert_eq!(doc.modules[0].tasks[0].command, "masscan");
    }

    #[test]
    fn upsert_rejects_blank_command_without_mutation() {
        let mut doc = WorkflowDocument::new("recon");
        let err = doc
            .upsert_task(&id("net:scan"), "  ", BTreeMap::new(), None)
            .expect_err("blank command");
        assert!(matches!(err, DocumentError::Validation(_)));
        assert!(doc.is_empty());
    }

    #[test]
    fn normalize_drops_self_and_duplicate_references() {
        let owner = id("net:scan");
        let refs = vec![
            TaskRef::parse("scan").expect("self"),
            TaskRef::parse("ping").expect("bare"),
            TaskRef::parse("net:ping").expect("duplicate"),
        ];
        let normalized = normalize_requires(&owner, refs);
        assert_eq!(normalized, vec![TaskRef::Bare("ping".to_string())]);
    }
}
