use anyhow::Result;
use clap::Args;
use colored::Colorize;
use formedit_editor::Document;
use formedit_schema::Node;
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Document JSON file
    pub document: PathBuf,
}

pub fn tree(args: TreeArgs, _cwd: &str) -> Result<()> {
    let doc = Document::load(&args.document)?;
    let schema = doc.schema();

    print!("{}", outline(&schema.nodes));
    println!();
    println!(
        "{} nodes, {} attributes",
        schema.node_count().to_string().bright_white(),
        schema.attributes.len().to_string().bright_white()
    );

    Ok(())
}

/// One line per node, indented by depth
pub fn outline(nodes: &[Node]) -> String {
    let mut out = String::new();
    write_nodes(&mut out, nodes, 0);
    out
}

fn write_nodes(out: &mut String, nodes: &[Node], depth: usize) {
    for node in nodes {
        let _ = write!(
            out,
            "{}{} {}",
            "  ".repeat(depth),
            node.kind().name().cyan(),
            node.uid().dimmed()
        );
        if let Some(field_name) = node.field_name() {
            let _ = write!(out, " {}", field_name.yellow());
        }
        if let Some(label) = node.label() {
            let _ = write!(out, " {:?}", label);
        }
        out.push('\n');

        if let Some(children) = node.children() {
            write_nodes(out, children, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formedit_schema::NodeMeta;

    #[test]
    fn test_outline_indents_children() {
        colored::control::set_override(false);

        let mut meta = NodeMeta::new("g");
        meta.label = Some("Income".to_string());
        let nodes = vec![Node::group(
            meta,
            vec![
                Node::field(NodeMeta::new("f"), "salary"),
                Node::text(NodeMeta::new("t"), "Total"),
            ],
        )];

        assert_eq!(
            outline(&nodes),
            "group g \"Income\"\n  field f salary\n  text t\n"
        );
    }
}
