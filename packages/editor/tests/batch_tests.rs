//! Failure policy, aliases and persistence

use formedit_editor::{
    Batch, BatchEntry, Document, EditorError, ExecutionMode, Interpreter, InterpreterOptions,
    OperationError, OperationOutcome,
};
use formedit_schema::Document as SchemaDocument;
use serde_json::json;

const FORM: &str = r#"{
    "nodes": [
        { "type": "group", "uid": "applicant", "label": "Applicant", "children": [
            { "type": "field", "uid": "name", "field_name": "full_name", "label": "Name" },
            { "type": "text", "uid": "intro", "content": "Tell us about you" }
        ] }
    ],
    "attributes": [
        { "name": "full_name", "value_kind": "string",
          "created_at": "2024-03-01T10:00:00Z", "updated_at": "2024-03-01T10:00:00Z" }
    ]
}"#;

fn form() -> SchemaDocument {
    serde_json::from_str(FORM).unwrap()
}

#[test]
fn test_malformed_records_are_skipped_in_place() {
    let batch = Batch::from_json(
        &json!([
            { "type": "add", "element_type": "text", "content": "first" },
            { "type": "teleport", "uid": "intro" },
            { "type": "add", "element_type": "field" },
            { "type": "replace_subtree", "target": "intro" },
            { "type": "clone_subtree" },
            { "type": "add", "element_type": "text", "content": "last" }
        ])
        .to_string(),
    )
    .unwrap();
    assert!(matches!(batch.entries()[1], BatchEntry::Malformed { .. }));

    let output = Interpreter::new().with_seed("m").apply(&form(), &batch);

    assert_eq!(output.report.applied_count(), 2);
    for index in 1..=4 {
        assert!(
            matches!(
                output.report.outcome(index).and_then(OperationOutcome::error),
                Some(OperationError::MalformedOperation(_))
            ),
            "operation {} should be malformed",
            index
        );
    }
    let nodes = &output.document.nodes;
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[1].content(), Some("first"));
    assert_eq!(nodes[2].content(), Some("last"));
}

#[test]
fn test_alias_used_before_binding_is_not_found() {
    let batch = Batch::from_json(
        &json!([
            { "type": "add", "element_type": "text", "content": "early", "target": "$later", "position": "inside_end" },
            { "type": "add", "element_type": "group", "label": "Later", "alias": "later" },
            { "type": "add", "element_type": "text", "content": "on time", "target": "$later", "position": "inside_end" }
        ])
        .to_string(),
    )
    .unwrap();

    let output = Interpreter::new().with_seed("a").apply(&form(), &batch);

    assert_eq!(
        output.report.outcome(0).and_then(OperationOutcome::error),
        Some(&OperationError::ReferenceNotFound("$later".to_string()))
    );
    let later = output.document.nodes.last().unwrap();
    assert_eq!(later.label(), Some("Later"));
    assert_eq!(later.children().unwrap().len(), 1);
    assert_eq!(later.children().unwrap()[0].content(), Some("on time"));
}

#[test]
fn test_clone_alias_binds_copy_root() {
    let batch = Batch::from_json(
        &json!([
            { "type": "clone_subtree", "source_uid": "applicant", "field_suffix": "_2", "alias": "copy" },
            { "type": "edit", "uid": "$copy", "label": "Co-applicant" }
        ])
        .to_string(),
    )
    .unwrap();

    let output = Interpreter::new().with_seed("c").apply(&form(), &batch);

    let nodes = &output.document.nodes;
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].label(), Some("Applicant"));
    assert_eq!(nodes[1].label(), Some("Co-applicant"));
    assert!(output.document.attributes.contains("full_name_2"));
}

#[test]
fn test_stale_references_leave_document_unchanged() {
    let batch = Batch::from_json(
        &json!([
            { "type": "edit", "uid": "gone", "label": "x" },
            { "type": "delete", "uid": "gone" },
            { "type": "move", "uid": "gone", "target": "root" },
            { "type": "bulk_replace", "uids": ["gone", "also_gone"], "hidden": true }
        ])
        .to_string(),
    )
    .unwrap();

    let original = form();
    let output = Interpreter::new().apply(&original, &batch);

    assert_eq!(output.report.skipped_count(), 4);
    assert_eq!(output.document, original);
}

#[test]
fn test_edit_content_on_field_is_dropped() {
    let batch = Batch::from_json(
        &json!([{ "type": "edit", "uid": "name", "content": "nope", "required": true }]).to_string(),
    )
    .unwrap();

    let output = Interpreter::new().apply(&form(), &batch);

    let name = output.document.find("name").unwrap();
    assert!(name.flag("required"));
    assert_eq!(name.content(), None);
    let Some(OperationOutcome::Applied(applied)) = output.report.outcome(0) else {
        panic!("edit should apply");
    };
    assert_eq!(applied.dropped_keys.len(), 1);
}

#[test]
fn test_edit_with_unknown_key_is_malformed() {
    let batch = Batch::from_json(
        &json!([
            { "type": "edit", "uid": "applicant", "hide_labels": true },
            { "type": "edit", "uid": "applicant", "hide_label": true }
        ])
        .to_string(),
    )
    .unwrap();

    assert!(matches!(batch.entries()[0], BatchEntry::Malformed { .. }));

    let output = Interpreter::new().apply(&form(), &batch);
    assert!(matches!(
        output.report.outcome(0).and_then(OperationOutcome::error),
        Some(OperationError::MalformedOperation(_))
    ));
    assert_eq!(output.report.applied_count(), 1);
    assert!(output.document.find("applicant").unwrap().flag("hide_label"));
}

#[test]
fn test_unknown_color_family_is_malformed() {
    let batch = Batch::from_json(
        &json!([{ "type": "bulk_replace", "uids": ["intro"], "find_color": "red", "replace_color": "chartreuse" }])
            .to_string(),
    )
    .unwrap();

    let output = Interpreter::new().apply(&form(), &batch);
    assert!(matches!(
        output.report.outcome(0).and_then(OperationOutcome::error),
        Some(OperationError::MalformedOperation(_))
    ));
}

#[test]
fn test_strict_mode_reports_first_failure() {
    let batch = Batch::from_json(
        &json!([
            { "type": "edit", "uid": "intro", "content": "Hi" },
            { "type": "edit", "uid": "gone", "label": "x" }
        ])
        .to_string(),
    )
    .unwrap();

    let interpreter = Interpreter::with_options(InterpreterOptions {
        mode: ExecutionMode::Strict,
        id_seed: None,
    });
    let error = interpreter.execute(&form(), &batch).unwrap_err();

    assert_eq!(error.index, 1);
    assert_eq!(error.operation, "edit");
    assert!(error.to_string().contains("gone"));

    // The same interpreter still offers the lenient path
    let output = interpreter.apply(&form(), &batch);
    assert_eq!(output.report.applied_count(), 1);
}

#[test]
fn test_file_backed_document_round_trip() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("form.json");
    std::fs::write(&path, FORM)?;

    let mut doc = Document::load(&path)?;
    assert!(!doc.is_dirty());

    let batch = Batch::from_json(
        &json!([{ "type": "add", "element_type": "field", "field_name": "email",
                  "target": "name", "position": "after", "label": "Email" }])
        .to_string(),
    )?;
    let result = doc.apply_batch(&Interpreter::new(), &batch, Some("add email".to_string()))?;
    assert_eq!(result.version, 1);
    assert!(doc.is_dirty());

    doc.save()?;
    assert!(!doc.is_dirty());

    let reloaded = Document::load(&path)?;
    let applicant = reloaded.schema().find("applicant").unwrap();
    assert_eq!(applicant.children().unwrap().len(), 3);
    assert_eq!(applicant.children().unwrap()[1].field_name(), Some("email"));
    assert!(reloaded.schema().attributes.contains("email"));
    Ok(())
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Document::load(dir.path().join("missing.json"));
    assert!(matches!(result, Err(EditorError::Io(_))));
}
