//! Hierarchical reference data for cascading-select questions.
//!
//! Nodes are bundled with a form as a read-only SQLite resource. Once loaded they are
//! indexed by parent id so each level of the cascade is a single map lookup.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Parent id of the top level of a cascade.
pub const ROOT_PARENT_ID: i64 = 0;

/// One entry of a cascade resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeNode {
    pub id: i64,
    pub name: String,
    pub code: Option<String>,
    pub parent_id: i64,
}

/// Cascade nodes grouped by parent id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeIndex {
    children: HashMap<i64, Vec<CascadeNode>>,
}

impl CascadeIndex {
    /// Groups nodes by parent, keeping the input order within each group.
    pub fn from_nodes(nodes: impl IntoIterator<Item = CascadeNode>) -> Self {
        let mut children: HashMap<i64, Vec<CascadeNode>> = HashMap::new();
        for node in nodes {
            children.entry(node.parent_id).or_default().push(node);
        }
        Self { children }
    }

    /// Children of `parent_id`. Absent parents and `None` yield an empty slice.
    pub fn children_of(&self, parent_id: Option<i64>) -> &[CascadeNode] {
        parent_id
            .and_then(|id| self.children.get(&id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Top level of the cascade.
    pub fn roots(&self) -> &[CascadeNode] {
        self.children_of(Some(ROOT_PARENT_ID))
    }

    pub fn node_count(&self) -> usize {
        self.children.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64, name: &str, parent_id: i64) -> CascadeNode {
        CascadeNode {
            id,
            name: name.to_string(),
            code: None,
            parent_id,
        }
    }

    fn index() -> CascadeIndex {
        CascadeIndex::from_nodes(vec![
            node(3, "Kenya", ROOT_PARENT_ID),
            node(1, "Mombasa", 3),
            node(2, "Nairobi", 3),
            node(4, "Uganda", ROOT_PARENT_ID),
        ])
    }

    #[test]
    fn test_children_keep_input_order() {
        let index = index();
        let names: Vec<_> = index
            .children_of(Some(3))
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(names, vec!["Mombasa", "Nairobi"]);
        assert_eq!(index.roots().len(), 2);
        assert_eq!(index.node_count(), 4);
    }

    #[test]
    fn test_none_parent_is_empty() {
        assert!(index().children_of(None).is_empty());
    }

    #[test]
    fn test_unknown_parent_is_empty() {
        assert!(index().children_of(Some(99)).is_empty());
    }
}
