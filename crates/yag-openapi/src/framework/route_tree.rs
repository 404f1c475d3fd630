//! Ordered segment tree for frameworks that nest routes by path segment.
//!
//! Nodes live in an arena and refer to their children by index. Every node
//! keeps one ordered key space shared by child segments and verb entries.

use crate::types::{ObjectType, TypeExpr};

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Child(NodeId),
    Leaf(TypeExpr),
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Node {
    entries: Vec<(String, Entry)>,
}

impl Node {
    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(existing, _)| existing == key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteTree {
    nodes: Vec<Node>,
}

impl Default for RouteTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
        }
    }

    /// Walk (creating as needed) the node for `segments` and attach `leaves`
    /// to it. Keys already present keep their position.
    pub fn insert<'a>(
        &mut self,
        segments: impl IntoIterator<Item = &'a str>,
        leaves: impl IntoIterator<Item = (String, TypeExpr)>,
    ) {
        let mut current = ROOT;
        for segment in segments {
            current = self.child(current, segment);
        }
        for (key, ty) in leaves {
            self.set_leaf(current, key, ty);
        }
    }

    fn child(&mut self, parent: NodeId, segment: &str) -> NodeId {
        let Some(index) = self.nodes[parent].position(segment) else {
            let id = self.push_node();
            self.nodes[parent]
                .entries
                .push((segment.to_string(), Entry::Child(id)));
            return id;
        };

        if let Entry::Child(id) = self.nodes[parent].entries[index].1 {
            return id;
        }

        tracing::warn!(segment, "path segment replaces a verb entry with the same name");
        let id = self.push_node();
        self.nodes[parent].entries[index].1 = Entry::Child(id);
        id
    }

    fn set_leaf(&mut self, node: NodeId, key: String, ty: TypeExpr) {
        let entries = &mut self.nodes[node].entries;
        match entries.iter().position(|(existing, _)| *existing == key) {
            Some(index) => {
                if matches!(entries[index].1, Entry::Child(_)) {
                    tracing::warn!(key = %key, "verb entry replaces a path segment with the same name");
                }
                entries[index].1 = Entry::Leaf(ty);
            }
            None => entries.push((key, Entry::Leaf(ty))),
        }
    }

    fn push_node(&mut self) -> NodeId {
        self.nodes.push(Node::default());
        self.nodes.len() - 1
    }

    /// The tree as nested block objects with every key quoted
    pub fn to_type(&self) -> TypeExpr {
        self.node_type(ROOT)
    }

    fn node_type(&self, id: NodeId) -> TypeExpr {
        self.nodes[id]
            .entries
            .iter()
            .fold(ObjectType::block(), |object, (key, entry)| {
                let ty = match entry {
                    Entry::Child(child) => self.node_type(*child),
                    Entry::Leaf(ty) => ty.clone(),
                };
                object.quoted_field(key.as_str(), ty)
            })
            .into()
    }
}
