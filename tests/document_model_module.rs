use std::collections::BTreeMap;
use taskgraph::document::{DocumentError, Upsert, WorkflowDocument};
use taskgraph::shared::{NodeId, TaskRef};

fn id(raw: &str) -> NodeId {
    NodeId::parse(raw).expect("node id")
}

fn task_value<'a>(tree: &'a serde_yaml::Value, module: &str, task: &str) -> &'a serde_yaml::Value {
    let modules = tree["workflow"]["modules"]
        .as_sequence()
        .expect("modules sequence");
    let module = modules
        .iter()
        .find(|m| m["name"].as_str() == Some(module))
        .expect("module present");
    module["tasks"]
        .as_sequence()
        .expect("tasks sequence")
        .iter()
        .find_map(|t| t.get(task))
        .expect("task present")
}

const HAND_AUTHORED: &str = r#"workflow:
  name: recon
  description: network reconnaissance
  arguments:
    target: 10.0.0.0/24
    depth: 2
  modules:
  - name: net
    tasks:
    - scan:
        command: nmap
        args:
          ports: 1-1024
    - report:
        command: gen
        requires: scan
  - name: dns
    tasks:
    - lookup:
        command: dig
        requires:
        - net:scan
        - net:report
"#;

#[test]
fn loads_both_requires_forms_into_task_refs() {
    let doc = WorkflowDocument::from_text(HAND_AUTHORED).expect("parse");

    let report = doc.task(&id("net:report")).expect("report");
    assert_eq!(report.requires, vec![TaskRef::Bare("scan".to_string())]);
    let lookup = doc.task(&id("dns:lookup")).expect("lookup");
    assert_eq!(lookup.requires.len(), 2);
    assert_eq!(doc.arguments.get("depth").map(String::as_str), Some("2"));
}

#[test]
fn serialize_load_serialize_is_byte_identical() {
    let doc = WorkflowDocument::from_text(HAND_AUTHORED).expect("parse");
    let first = doc.to_text().expect("encode");
    let reloaded = WorkflowDocument::load(doc.serialize().expect("tree")).expect("load");
    let second = reloaded.to_text().expect("encode again");
    assert_eq!(first, second);
    assert_eq!(reloaded, doc);
}

#[test]
fn serialized_fields_follow_fixed_order_and_omit_absent_fields() {
    let mut doc = WorkflowDocument::new("recon");
    doc.upsert_task(&id("net:scan"), "nmap", BTreeMap::new(), None)
        .expect("upsert");
    let text = doc.to_text().expect("encode");

    assert!(!text.contains("description"));
    assert!(!text.contains("arguments"));
    assert!(!text.contains("args"));
    assert!(!text.contains("requires"));
    assert!(!text.contains("null"));
    let name_at = text.find("name: recon").expect("name");
    let modules_at = text.find("modules:").expect("modules");
    assert!(name_at < modules_at);
}

#[test]
fn workflow_level_args_alias_is_accepted() {
    let doc = WorkflowDocument::from_text("workflow:\n  name: legacy\n  args:\n    target: host\n")
        .expect("parse");
    assert_eq!(doc.arguments.get("target").map(String::as_str), Some("host"));
    assert!(doc.to_text().expect("encode").contains("arguments:"));
}

#[test]
fn upsert_appends_new_module_and_replaces_in_place() {
    let mut doc = WorkflowDocument::from_text(HAND_AUTHORED).expect("parse");
    let inserted = doc
        .upsert_task(&id("web:crawl"), "crawl", BTreeMap::new(), None)
        .expect("insert");
    assert_eq!(inserted, Upsert::Inserted);
    assert_eq!(
        doc.modules.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
        vec!["net", "dns", "web"]
    );

    let replaced = doc
        .upsert_task(&id("net:scan"), "masscan", BTreeMap::new(), None)
        .expect("replace");
    assert_eq!(replaced, Upsert::Replaced);
    assert_eq!(doc.modules[0].tasks[0].name, "scan");
    assert_eq!(doc.modules[0].tasks[0].command, "masscan");
}

#[test]
fn removing_last_task_prunes_module() {
    let mut doc = WorkflowDocument::from_text(HAND_AUTHORED).expect("parse");
    let removal = doc.remove_task(&id("dns:lookup")).expect("remove");
    assert_eq!(removal.pruned_module.as_deref(), Some("dns"));
    assert!(doc.module("dns").is_none());

    let err = doc.remove_task(&id("dns:lookup")).expect_err("already gone");
    assert!(matches!(err, DocumentError::Integrity(_)));
}

#[test]
fn deleting_task_strips_references_from_every_dependent_only() {
    let mut doc = WorkflowDocument::from_text(HAND_AUTHORED).expect("parse");
    doc.upsert_task(&id("net:notify"), "mail", BTreeMap::new(), None)
        .expect("notify");
    doc.add_dependency(&id("dns:lookup"), &id("net:notify"))
        .expect("link");

    doc.remove_task(&id("net:scan")).expect("remove");
    let stripped = doc.strip_references_to(&id("net:scan"));
    assert_eq!(stripped, 2);

    let report = doc.task(&id("net:report")).expect("report");
    assert!(report.requires.is_empty());
    let lookup = doc.task(&id("dns:lookup")).expect("lookup");
    let deps: Vec<String> = lookup.dependencies("dns").map(|d| d.to_string()).collect();
    assert_eq!(deps, vec!["net:report", "net:notify"]);

    let tree = doc.serialize().expect("tree");
    assert!(task_value(&tree, "net", "report").get("requires").is_none());
}

#[test]
fn add_dependency_is_idempotent_and_rejects_self() {
    let mut doc = WorkflowDocument::from_text(HAND_AUTHORED).expect("parse");
    assert!(!doc
        .add_dependency(&id("net:report"), &id("net:scan"))
        .expect("already present"));
    assert!(doc
        .add_dependency(&id("dns:lookup"), &id("net:scan"))
        .map(|added| !added)
        .expect("present qualified"));

    let err = doc
        .add_dependency(&id("net:scan"), &id("net:scan"))
        .expect_err("self");
    assert!(matches!(err, DocumentError::Validation(_)));

    let err = doc
        .add_dependency(&id("net:scan"), &id("net:missing"))
        .expect_err("missing");
    assert!(matches!(err, DocumentError::Integrity(_)));
}

#[test]
fn create_scan_then_report_scenario() {
    let mut doc = WorkflowDocument::new("recon");
    doc.upsert_task(&id("net:scan"), "nmap", BTreeMap::new(), None)
        .expect("scan");
    doc.upsert_task(
        &id("net:report"),
        "gen",
        BTreeMap::new(),
        Some(vec![TaskRef::Qualified(id("net:scan"))]),
    )
    .expect("report");

    let tree = doc.serialize().expect("tree");
    let requires = task_value(&tree, "net", "report")["requires"]
        .as_str()
        .expect("single requires is a string");
    assert!(requires == "scan" || requires == "net:scan");
}

#[test]
fn rename_within_module_reappends_task_and_rewrites_dependents() {
    let mut doc = WorkflowDocument::from_text(HAND_AUTHORED).expect("parse");
    let rename = doc
        .rename_task(&id("net:scan"), "net", "sweep")
        .expect("rename");
    assert_eq!(rename.new_id, id("net:sweep"));
    assert_eq!(rename.outgoing, 2);
    assert_eq!(rename.pruned_module, None);
    let names: Vec<&str> = doc.modules[0].tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["report", "sweep"]);

    let report = doc.task(&id("net:report")).expect("report");
    assert_eq!(report.requires, vec![TaskRef::Bare("sweep".to_string())]);
    let lookup = doc.task(&id("dns:lookup")).expect("lookup");
    assert!(lookup
        .dependencies("dns")
        .any(|d| d == id("net:sweep")));
}

#[test]
fn renaming_only_task_of_a_module_moves_the_module_last() {
    let mut doc = WorkflowDocument::new("recon");
    doc.upsert_task(&id("dns:lookup"), "dig", BTreeMap::new(), None)
        .expect("lookup");
    doc.upsert_task(&id("net:scan"), "nmap", BTreeMap::new(), None)
        .expect("scan");

    let rename = doc
        .rename_task(&id("dns:lookup"), "dns", "resolve")
        .expect("rename");
    assert_eq!(rename.pruned_module.as_deref(), Some("dns"));
    let modules: Vec<&str> = doc.modules.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(modules, vec!["net", "dns"]);
    assert!(doc.contains(&id("dns:resolve")));
}

#[test]
fn failed_rename_leaves_document_untouched() {
    let text = "workflow:\n  name: x\n  modules:\n  - name: net\n    tasks:\n    - scan:\n        args:\n          p: '1'\n    - report:\n        command: gen\n        requires: scan\n";
    let mut doc = WorkflowDocument::from_text(text).expect("parse");
    let before = doc.clone();

    let err = doc
        .rename_task(&id("net:scan"), "web", "scan")
        .expect_err("missing command");
    assert!(matches!(err, DocumentError::Validation(_)));
    assert_eq!(doc, before);
    assert!(doc.contains(&id("net:scan")));
    assert_eq!(
        doc.task(&id("net:report")).expect("report").requires,
        vec![TaskRef::Bare("scan".to_string())]
    );
}

#[test]
fn blank_description_is_dropped_on_both_sides_of_a_round_trip() {
    let mut doc = WorkflowDocument::from_text(HAND_AUTHORED).expect("parse");
    doc.description = Some("  ".to_string());
    let text = doc.to_text().expect("encode");
    assert!(!text.contains("description"));
    let reparsed = WorkflowDocument::from_text(&text).expect("reparse");
    assert_eq!(reparsed.to_text().expect("encode again"), text);
}

#[test]
fn rename_across_modules_moves_task_and_prunes_empty_module() {
    let mut doc = WorkflowDocument::from_text(HAND_AUTHORED).expect("parse");
    let rename = doc
        .rename_task(&id("dns:lookup"), "net", "lookup")
        .expect("rename");
    assert_eq!(rename.pruned_module.as_deref(), Some("dns"));
    assert_eq!(rename.incoming, 2);

    let moved = doc.task(&id("net:lookup")).expect("moved");
    let deps: Vec<String> = moved.dependencies("net").map(|d| d.to_string()).collect();
    assert_eq!(deps, vec!["net:scan", "net:report"]);
}

#[test]
fn rename_onto_existing_identity_is_a_conflict() {
    let mut doc = WorkflowDocument::from_text(HAND_AUTHORED).expect("parse");
    let before = doc.clone();
    let err = doc
        .rename_task(&id("net:scan"), "net", "report")
        .expect_err("conflict");
    assert!(matches!(err, DocumentError::Conflict(_)));
    assert_eq!(doc, before);
}

#[test]
fn load_rejects_duplicates_and_separator_in_names() {
    let duplicate = "workflow:\n  name: x\n  modules:\n  - name: net\n    tasks:\n    - scan:\n        command: a\n    - scan:\n        command: b\n";
    let err = WorkflowDocument::from_text(duplicate).expect_err("duplicate task");
    assert!(matches!(err, DocumentError::Validation(_)));

    let bad_name = "workflow:\n  name: x\n  modules:\n  - name: 'net:x'\n    tasks:\n    - scan:\n        command: a\n";
    let err = WorkflowDocument::from_text(bad_name).expect_err("separator");
    assert!(matches!(err, DocumentError::Validation(_)));
}

#[test]
fn load_drops_self_references_and_empty_modules() {
    let text = "workflow:\n  name: x\n  modules:\n  - name: empty\n    tasks: []\n  - name: net\n    tasks:\n    - scan:\n        command: nmap\n        requires:\n        - scan\n        - net:scan\n";
    let doc = WorkflowDocument::from_text(text).expect("parse");
    assert!(doc.module("empty").is_none());
    assert!(doc.task(&id("net:scan")).expect("scan").requires.is_empty());
}
