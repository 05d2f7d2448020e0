//! Read-only tree search.
//!
//! Nodes carry no parent pointers; parent context is recovered by searching
//! from the root. Positions are expressed as index paths: the empty path is the
//! document's top-level list and `[i, j]` is child `j` of top-level node `i`.

use crate::model::{Document, Node};

/// Index path from the top-level list down to a node
pub type NodePath = Vec<usize>;

/// List holding a node and the node's position in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentContext {
    /// Path of the containing list (empty for the top-level list)
    pub list_path: NodePath,
    pub index: usize,
}

/// Depth-first search by identifier
pub fn find_by_id<'a>(nodes: &'a [Node], id: &str) -> Option<&'a Node> {
    for node in nodes {
        if node.uid() == id {
            return Some(node);
        }
        if let Some(found) = node.children().and_then(|children| find_by_id(children, id)) {
            return Some(found);
        }
    }
    None
}

pub fn find_by_id_mut<'a>(nodes: &'a mut [Node], id: &str) -> Option<&'a mut Node> {
    for node in nodes.iter_mut() {
        if node.uid() == id {
            return Some(node);
        }
        if let Some(children) = node.children_mut() {
            if let Some(found) = find_by_id_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Index path of the node with `id`
pub fn find_path(nodes: &[Node], id: &str) -> Option<NodePath> {
    for (index, node) in nodes.iter().enumerate() {
        if node.uid() == id {
            return Some(vec![index]);
        }
        if let Some(children) = node.children() {
            if let Some(mut path) = find_path(children, id) {
                path.insert(0, index);
                return Some(path);
            }
        }
    }
    None
}

pub fn find_parent_context(nodes: &[Node], id: &str) -> Option<ParentContext> {
    let mut list_path = find_path(nodes, id)?;
    let index = list_path.pop()?;
    Some(ParentContext { list_path, index })
}

/// Resolve a list path to the list it names
pub fn list_at_mut<'a>(mut nodes: &'a mut Vec<Node>, list_path: &[usize]) -> Option<&'a mut Vec<Node>> {
    for &index in list_path {
        nodes = nodes.get_mut(index)?.children_mut()?;
    }
    Some(nodes)
}

pub fn list_at<'a>(mut nodes: &'a Vec<Node>, list_path: &[usize]) -> Option<&'a Vec<Node>> {
    for &index in list_path {
        nodes = nodes.get(index)?.children()?;
    }
    Some(nodes)
}

/// Whether `id` names `root` or one of its descendants
pub fn subtree_contains(root: &Node, id: &str) -> bool {
    root.uid() == id || find_by_id(std::slice::from_ref(root), id).is_some()
}

impl Document {
    pub fn find(&self, id: &str) -> Option<&Node> {
        find_by_id(&self.nodes, id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Node> {
        find_by_id_mut(&mut self.nodes, id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn path_of(&self, id: &str) -> Option<NodePath> {
        find_path(&self.nodes, id)
    }

    pub fn parent_context(&self, id: &str) -> Option<ParentContext> {
        find_parent_context(&self.nodes, id)
    }

    pub fn list(&self, list_path: &[usize]) -> Option<&Vec<Node>> {
        list_at(&self.nodes, list_path)
    }

    pub fn list_mut(&mut self, list_path: &[usize]) -> Option<&mut Vec<Node>> {
        list_at_mut(&mut self.nodes, list_path)
    }

    /// Remove the node at `context` together with its subtree
    pub fn take_at(&mut self, context: &ParentContext) -> Option<Node> {
        let list = self.list_mut(&context.list_path)?;
        if context.index < list.len() {
            Some(list.remove(context.index))
        } else {
            None
        }
    }

    /// Detach the node with `id` from its parent list
    pub fn detach(&mut self, id: &str) -> Option<Node> {
        let context = self.parent_context(id)?;
        self.take_at(&context)
    }
}
