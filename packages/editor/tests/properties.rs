//! Structural guarantees that hold for every batch

use std::collections::HashSet;

use formedit_editor::{
    AddOp, Batch, BulkReplaceOp, CloneSubtreeOp, ColorFamily, ColorRewrite, DeleteOp, Interpreter,
    MoveOp, NodeSpec, Operation, Position, ReplaceSubtreeOp, StructureSpec,
};
use formedit_schema::{collect_ids, Document, Node, NodeMeta};
use proptest::prelude::*;

/// Two sections with nested content and a trailing note
fn sample() -> Document {
    let mut doc = Document::new();
    doc.nodes.push(Node::group(
        NodeMeta::new("income"),
        vec![
            Node::field(NodeMeta::new("salary"), "salary"),
            Node::group(
                NodeMeta::new("extra"),
                vec![
                    Node::field(NodeMeta::new("bonus"), "bonus"),
                    Node::text(NodeMeta::new("hint"), "<i>optional</i>"),
                ],
            ),
        ],
    ));
    doc.nodes.push(Node::group(
        NodeMeta::new("costs"),
        vec![Node::field(NodeMeta::new("rent"), "rent")],
    ));
    doc.nodes.push(Node::text(NodeMeta::new("note"), "Thanks"));
    doc
}

fn apply(doc: &Document, operations: Vec<Operation>) -> Document {
    Interpreter::new().with_seed("p").apply(doc, &Batch::from(operations)).document
}

fn ids(doc: &Document) -> Vec<String> {
    collect_ids(&doc.nodes)
}

fn assert_unique(doc: &Document) {
    let all = ids(doc);
    let unique: HashSet<_> = all.iter().collect();
    assert_eq!(all.len(), unique.len(), "duplicate identifiers in {:?}", all);
}

#[test]
fn test_add_creates_exactly_one_fresh_node() {
    let doc = sample();
    let before: HashSet<_> = ids(&doc).into_iter().collect();

    for (target, position) in [
        ("root", Position::InsideStart),
        ("extra", Position::InsideEnd),
        ("bonus", Position::Before),
        ("note", Position::After),
    ] {
        let result = apply(
            &doc,
            vec![Operation::Add(AddOp {
                target: Some(target.to_string()),
                position: Some(position),
                alias: None,
                spec: NodeSpec::field("tip"),
            })],
        );

        let new: Vec<_> = ids(&result).into_iter().filter(|id| !before.contains(id)).collect();
        assert_eq!(new.len(), 1, "{} {:?}", target, position);
        assert_eq!(result.node_count(), doc.node_count() + 1);
        assert_unique(&result);
    }
}

#[test]
fn test_delete_removes_whole_subtree() {
    let doc = sample();
    let result = apply(&doc, vec![Operation::Delete(DeleteOp { uid: "income".to_string() })]);

    for gone in ["income", "salary", "extra", "bonus", "hint"] {
        assert!(!result.contains(gone), "{} survived", gone);
    }
    assert_eq!(result.node_count(), 3);
}

#[test]
fn test_move_preserves_count_and_shape() {
    let doc = sample();
    let original = doc.find("extra").unwrap().clone();

    for (target, position) in [
        ("costs", Position::InsideStart),
        ("rent", Position::After),
        ("root", Position::Before),
        ("note", Position::Before),
    ] {
        let result = apply(
            &doc,
            vec![Operation::Move(MoveOp {
                uid: "extra".to_string(),
                target: target.to_string(),
                position,
            })],
        );

        assert_eq!(result.node_count(), doc.node_count());
        assert_eq!(result.find("extra"), Some(&original));
        assert_unique(&result);
    }
}

#[test]
fn test_move_that_would_cycle_changes_nothing() {
    let doc = sample();
    let result = apply(
        &doc,
        vec![Operation::Move(MoveOp {
            uid: "income".to_string(),
            target: "extra".to_string(),
            position: Position::InsideEnd,
        })],
    );

    assert_eq!(result.nodes, doc.nodes);
}

#[test]
fn test_clone_suffix_applies_to_every_field() {
    let doc = sample();
    let result = apply(
        &doc,
        vec![Operation::CloneSubtree(CloneSubtreeOp {
            source_uid: Some("income".to_string()),
            field_suffix: Some("_2025".to_string()),
            ..CloneSubtreeOp::default()
        })],
    );

    let fields = |node: &Node| formedit_schema::collect_field_names(std::slice::from_ref(node));
    let source = fields(result.find("income").unwrap());
    let copy = fields(&result.nodes[1]);

    assert_eq!(copy.len(), source.len());
    for (original, cloned) in source.iter().zip(&copy) {
        assert_eq!(cloned, &format!("{}_2025", original));
        assert!(result.attributes.contains(cloned));
    }
    assert_unique(&result);
}

#[test]
fn test_replace_subtree_sibling_counts() {
    let doc = sample();
    let structure = StructureSpec::leaf(NodeSpec::group("Other"))
        .with_child(StructureSpec::leaf(NodeSpec::field("other")));
    let siblings = |doc: &Document| doc.find("income").unwrap().children().unwrap().len();

    for (position, expected) in [
        (Position::Replace, 2),
        (Position::Before, 3),
        (Position::After, 3),
    ] {
        let result = apply(
            &doc,
            vec![Operation::ReplaceSubtree(ReplaceSubtreeOp {
                target: "extra".to_string(),
                position: Some(position),
                structure: Some(structure.clone()),
                alias: None,
            })],
        );

        assert_eq!(siblings(&result), expected, "{:?}", position);
        assert_unique(&result);
    }
}

#[test]
fn test_recolor_twice_is_stable() {
    let mut doc = Document::new();
    let mut meta = NodeMeta::new("banner");
    meta.style.insert("background_color".to_string(), "crimson".to_string());
    meta.style.insert("border_color".to_string(), "#f00".to_string());
    doc.nodes.push(Node::group(
        meta,
        vec![Node::text(NodeMeta::new("msg"), "<b style=\"color: rgba(255, 0, 0, 0.8)\">!</b>")],
    ));

    let recolor = || {
        Operation::BulkReplace(BulkReplaceOp {
            uids: vec!["banner".to_string(), "msg".to_string()],
            find_color: Some("red".to_string()),
            replace_color: Some("green".to_string()),
            ..BulkReplaceOp::default()
        })
    };

    let once = apply(&doc, vec![recolor()]);
    let twice = apply(&once, vec![recolor()]);

    assert_eq!(once, twice);
    let style = &once.find("banner").unwrap().meta().style;
    assert_eq!(style["background_color"], "green");
    assert_eq!(style["border_color"], "#16a34a");
    assert_eq!(
        once.find("msg").unwrap().content(),
        Some("<b style=\"color: rgba(22, 163, 74, 0.8)\">!</b>")
    );
}

const KEYWORDS: &[&str] = &[
    "red", "darkred", "crimson", "orange", "gold", "green", "navy", "purple", "hotpink", "gray",
    "black", "white", "teal",
];

fn family() -> impl Strategy<Value = ColorFamily> {
    prop::sample::select(ColorFamily::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_color_rewrite_is_idempotent(
        from in family(),
        to in family(),
        hex in any::<[u8; 3]>(),
        rgb in any::<[u8; 3]>(),
        keyword in prop::sample::select(KEYWORDS),
    ) {
        let text = format!(
            "<span style=\"color: #{:02x}{:02x}{:02x}; background-color: rgb({}, {}, {}); border-color: {}\">{}</span>",
            hex[0], hex[1], hex[2], rgb[0], rgb[1], rgb[2], keyword, keyword
        );
        let rewrite = ColorRewrite::new(from, to);

        let once = rewrite.apply(&text);
        prop_assert_eq!(rewrite.apply(&once), once);
    }

    #[test]
    fn prop_classified_colors_move_to_target(r in any::<u8>(), g in any::<u8>(), b in any::<u8>(), to in family()) {
        let color = formedit_editor::Rgb::new(r, g, b);
        if let Some(from) = ColorFamily::classify(color) {
            let rewritten = ColorRewrite::new(from, to).apply(&color.to_hex());
            prop_assert_eq!(rewritten, to.canonical().to_hex());
        }
    }
}
