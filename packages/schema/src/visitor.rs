use crate::model::{Document, Node};

/// Visitor pattern for traversing schema nodes immutably
///
/// Override `visit_node` and call [`walk_node`] to keep descending.
pub trait Visitor: Sized {
    fn visit_document(&mut self, doc: &Document) {
        walk_nodes(self, &doc.nodes);
    }

    fn visit_node(&mut self, node: &Node) {
        walk_node(self, node);
    }
}

/// Mutable visitor pattern for transforming schema nodes in place
pub trait VisitorMut: Sized {
    fn visit_document_mut(&mut self, doc: &mut Document) {
        walk_nodes_mut(self, &mut doc.nodes);
    }

    fn visit_node_mut(&mut self, node: &mut Node) {
        walk_node_mut(self, node);
    }
}

pub fn walk_nodes<V: Visitor>(visitor: &mut V, nodes: &[Node]) {
    for node in nodes {
        visitor.visit_node(node);
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &Node) {
    if let Some(children) = node.children() {
        walk_nodes(visitor, children);
    }
}

pub fn walk_nodes_mut<V: VisitorMut>(visitor: &mut V, nodes: &mut [Node]) {
    for node in nodes {
        visitor.visit_node_mut(node);
    }
}

pub fn walk_node_mut<V: VisitorMut>(visitor: &mut V, node: &mut Node) {
    if let Some(children) = node.children_mut() {
        walk_nodes_mut(visitor, children);
    }
}

/// Collects every identifier in pre-order
#[derive(Debug, Default)]
pub struct IdCollector {
    pub ids: Vec<String>,
}

impl Visitor for IdCollector {
    fn visit_node(&mut self, node: &Node) {
        self.ids.push(node.uid().to_string());
        walk_node(self, node);
    }
}

/// Collects field names of every field node in pre-order
#[derive(Debug, Default)]
pub struct FieldNameCollector {
    pub names: Vec<String>,
}

impl Visitor for FieldNameCollector {
    fn visit_node(&mut self, node: &Node) {
        if let Some(name) = node.field_name() {
            self.names.push(name.to_string());
        }
        walk_node(self, node);
    }
}

pub fn collect_ids(nodes: &[Node]) -> Vec<String> {
    let mut collector = IdCollector::default();
    walk_nodes(&mut collector, nodes);
    collector.ids
}

pub fn collect_field_names(nodes: &[Node]) -> Vec<String> {
    let mut collector = FieldNameCollector::default();
    walk_nodes(&mut collector, nodes);
    collector.names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeMeta;

    fn tree() -> Vec<Node> {
        vec![Node::group(
            NodeMeta::new("g"),
            vec![
                Node::field(NodeMeta::new("f1"), "amount"),
                Node::group(NodeMeta::new("g2"), vec![Node::field(NodeMeta::new("f2"), "notes")]),
            ],
        )]
    }

    #[test]
    fn test_collects_in_pre_order() {
        let nodes = tree();
        assert_eq!(collect_ids(&nodes), vec!["g", "f1", "g2", "f2"]);
        assert_eq!(collect_field_names(&nodes), vec!["amount", "notes"]);
    }

    #[test]
    fn test_mutable_visitor_reaches_every_node() {
        struct Upper;

        impl VisitorMut for Upper {
            fn visit_node_mut(&mut self, node: &mut Node) {
                let meta = node.meta_mut();
                meta.uid = meta.uid.to_uppercase();
                walk_node_mut(self, node);
            }
        }

        let mut nodes = tree();
        walk_nodes_mut(&mut Upper, &mut nodes);
        assert_eq!(collect_ids(&nodes), vec!["G", "F1", "G2", "F2"]);
    }
}
