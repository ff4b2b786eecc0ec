use crate::models::FolderNode;
use std::collections::BTreeMap;
use thiserror::Error;

/// A structural change requested against the folder tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum TreeOp {
    Rename {
        node: String,
        name: String,
    },
    Move {
        node: String,
        /// Parent at request time (informational; see `same_target`).
        old_parent: Option<String>,
        new_parent: String,
    },
    Delete {
        node: String,
    },
}

impl TreeOp {
    pub fn node(&self) -> &str {
        match self {
            TreeOp::Rename { node, .. } | TreeOp::Move { node, .. } | TreeOp::Delete { node } => {
                node
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TreeOp::Rename { .. } => "rename_node",
            TreeOp::Move { .. } => "move_node",
            TreeOp::Delete { .. } => "delete_node",
        }
    }

    /// True when both ops would produce the same mutation.
    ///
    /// `old_parent` is ignored: a replay recomputes it from the current tree.
    pub fn same_target(&self, other: &TreeOp) -> bool {
        match (self, other) {
            (
                TreeOp::Rename { node: a, name: x },
                TreeOp::Rename { node: b, name: y },
            ) => a == b && x == y,
            (
                TreeOp::Move {
                    node: a,
                    new_parent: x,
                    ..
                },
                TreeOp::Move {
                    node: b,
                    new_parent: y,
                    ..
                },
            ) => a == b && x == y,
            (TreeOp::Delete { node: a }, TreeOp::Delete { node: b }) => a == b,
            _ => false,
        }
    }

    /// A move that leaves the node under its current parent.
    pub fn is_same_parent_move(&self) -> bool {
        matches!(
            self,
            TreeOp::Move { old_parent: Some(old), new_parent, .. } if old == new_parent
        )
    }
}

/// Intercept hook consulted before every structural mutation.
///
/// Returning `false` suspends the mutation; the tree is left untouched.
pub(crate) trait MutationGate {
    fn check(&mut self, op: &TreeOp) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mutation {
    Applied,
    Suspended,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum TreeError {
    #[error("unknown folder {0}")]
    UnknownNode(String),
    #[error("folder name cannot be empty")]
    EmptyName,
    #[error("a folder named \"{0}\" already exists here")]
    DuplicateName(String),
    #[error("can't move a folder inside itself")]
    MoveIntoDescendant,
}

/// Folder tree widget state: nodes, selection, and gated structural mutations.
#[derive(Clone, Debug, Default)]
pub(crate) struct FolderTree {
    nodes: BTreeMap<String, FolderNode>,
    selected: Option<String>,
}

impl FolderTree {
    pub fn from_nodes(nodes: Vec<FolderNode>) -> Self {
        let mut map: BTreeMap<String, FolderNode> = nodes
            .into_iter()
            .filter(|n| !n.id.trim().is_empty())
            .map(|n| (n.id.clone(), n))
            .collect();

        // Parents missing from the source become top-level folders.
        let ids: Vec<String> = map.keys().cloned().collect();
        for id in ids {
            let orphan = map
                .get(&id)
                .and_then(|n| n.parent_id.as_ref())
                .map(|p| !map.contains_key(p))
                .unwrap_or(false);
            if orphan {
                if let Some(n) = map.get_mut(&id) {
                    n.parent_id = None;
                }
            }
        }

        Self {
            nodes: map,
            selected: None,
        }
    }

    pub fn get(&self, id: &str) -> Option<&FolderNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of `parent` (top level for `None`), ordered by name.
    pub fn children(&self, parent: Option<&str>) -> Vec<&FolderNode> {
        let mut kids: Vec<&FolderNode> = self
            .nodes
            .values()
            .filter(|n| n.parent_id.as_deref() == parent)
            .collect();
        kids.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        kids
    }

    /// Depth-first listing with depths, in display order.
    pub fn walk(&self) -> Vec<(usize, &FolderNode)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, &FolderNode)> = self
            .children(None)
            .into_iter()
            .rev()
            .map(|n| (0, n))
            .collect();
        while let Some((depth, n)) = stack.pop() {
            out.push((depth, n));
            for kid in self.children(Some(&n.id)).into_iter().rev() {
                stack.push((depth + 1, kid));
            }
        }
        out
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Select one folder, or clear the selection with `None`.
    pub fn select_node(&mut self, id: Option<&str>) -> bool {
        match id {
            Some(id) if self.nodes.contains_key(id) => {
                self.selected = Some(id.to_string());
                true
            }
            Some(_) => false,
            None => {
                self.selected = None;
                true
            }
        }
    }

    /// True if `node` is `ancestor` or sits somewhere below it.
    pub fn is_descendant_or_self(&self, node: &str, ancestor: &str) -> bool {
        let mut cur = Some(node.to_string());
        // Bounded walk; source data could contain a cycle.
        for _ in 0..=self.nodes.len() {
            let Some(id) = cur else {
                return false;
            };
            if id == ancestor {
                return true;
            }
            cur = self.nodes.get(&id).and_then(|n| n.parent_id.clone());
        }
        false
    }

    fn name_taken(&self, parent: Option<&str>, name: &str, except: &str) -> bool {
        let wanted = name.to_lowercase();
        self.children(parent)
            .into_iter()
            .any(|n| n.id != except && n.name.to_lowercase() == wanted)
    }

    fn require(&self, id: &str) -> Result<&FolderNode, TreeError> {
        self.nodes
            .get(id)
            .ok_or_else(|| TreeError::UnknownNode(id.to_string()))
    }

    pub fn rename_node(
        &mut self,
        id: &str,
        name: &str,
        gate: &mut dyn MutationGate,
    ) -> Result<Mutation, TreeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TreeError::EmptyName);
        }
        let parent = self.require(id)?.parent_id.clone();
        if self.name_taken(parent.as_deref(), name, id) {
            return Err(TreeError::DuplicateName(name.to_string()));
        }

        let op = TreeOp::Rename {
            node: id.to_string(),
            name: name.to_string(),
        };
        if !gate.check(&op) {
            return Ok(Mutation::Suspended);
        }

        if let Some(n) = self.nodes.get_mut(id) {
            n.name = name.to_string();
        }
        Ok(Mutation::Applied)
    }

    pub fn move_node(
        &mut self,
        id: &str,
        new_parent: &str,
        gate: &mut dyn MutationGate,
    ) -> Result<Mutation, TreeError> {
        let node = self.require(id)?;
        let old_parent = node.parent_id.clone();
        let name = node.name.clone();
        self.require(new_parent)?;

        if self.is_descendant_or_self(new_parent, id) {
            return Err(TreeError::MoveIntoDescendant);
        }
        if old_parent.as_deref() != Some(new_parent) && self.name_taken(Some(new_parent), &name, id)
        {
            return Err(TreeError::DuplicateName(name));
        }

        let op = TreeOp::Move {
            node: id.to_string(),
            old_parent,
            new_parent: new_parent.to_string(),
        };
        if !gate.check(&op) {
            return Ok(Mutation::Suspended);
        }

        if let Some(n) = self.nodes.get_mut(id) {
            n.parent_id = Some(new_parent.to_string());
        }
        Ok(Mutation::Applied)
    }

    /// Removes the folder and everything below it.
    pub fn delete_node(
        &mut self,
        id: &str,
        gate: &mut dyn MutationGate,
    ) -> Result<Mutation, TreeError> {
        self.require(id)?;

        let op = TreeOp::Delete {
            node: id.to_string(),
        };
        if !gate.check(&op) {
            return Ok(Mutation::Suspended);
        }

        let doomed: Vec<String> = self
            .nodes
            .keys()
            .filter(|k| self.is_descendant_or_self(k, id))
            .cloned()
            .collect();
        for k in doomed.iter() {
            self.nodes.remove(k);
        }
        if self
            .selected
            .as_ref()
            .map(|s| doomed.contains(s))
            .unwrap_or(false)
        {
            self.selected = None;
        }
        Ok(Mutation::Applied)
    }

    /// Re-issue an operation through the regular entry points.
    pub fn request(
        &mut self,
        op: &TreeOp,
        gate: &mut dyn MutationGate,
    ) -> Result<Mutation, TreeError> {
        match op {
            TreeOp::Rename { node, name } => self.rename_node(node, name, gate),
            TreeOp::Move {
                node, new_parent, ..
            } => self.move_node(node, new_parent, gate),
            TreeOp::Delete { node } => self.delete_node(node, gate),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn node(id: &str, parent: Option<&str>, name: &str) -> FolderNode {
        FolderNode {
            id: id.to_string(),
            parent_id: parent.map(|p| p.to_string()),
            name: name.to_string(),
        }
    }

    /// 1 My Links
    ///   3 Cases
    ///   7 Drafts
    ///     8 Old
    pub(crate) fn sample_tree() -> FolderTree {
        FolderTree::from_nodes(vec![
            node("1", None, "My Links"),
            node("3", Some("1"), "Cases"),
            node("7", Some("1"), "Drafts"),
            node("8", Some("7"), "Old"),
        ])
    }

    struct AllowAll;
    impl MutationGate for AllowAll {
        fn check(&mut self, _op: &TreeOp) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct DenyAll {
        seen: Vec<TreeOp>,
    }
    impl MutationGate for DenyAll {
        fn check(&mut self, op: &TreeOp) -> bool {
            self.seen.push(op.clone());
            false
        }
    }

    #[test]
    fn test_from_nodes_orphans_become_top_level() {
        let t = FolderTree::from_nodes(vec![node("1", None, "A"), node("2", Some("99"), "B")]);
        let roots: Vec<&str> = t.children(None).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(roots, vec!["1", "2"]);
    }

    #[test]
    fn test_children_sorted_by_name() {
        let t = sample_tree();
        let kids: Vec<&str> = t.children(Some("1")).iter().map(|n| n.name.as_str()).collect();
        assert_eq!(kids, vec!["Cases", "Drafts"]);
    }

    #[test]
    fn test_walk_depth_first() {
        let t = sample_tree();
        let walked: Vec<(usize, &str)> = t.walk().into_iter().map(|(d, n)| (d, n.id.as_str())).collect();
        assert_eq!(walked, vec![(0, "1"), (1, "3"), (1, "7"), (2, "8")]);
    }

    #[test]
    fn test_rename_applied_when_allowed() {
        let mut t = sample_tree();
        let r = t.rename_node("3", "  Briefs ", &mut AllowAll);
        assert_eq!(r, Ok(Mutation::Applied));
        assert_eq!(t.get("3").map(|n| n.name.as_str()), Some("Briefs"));
    }

    #[test]
    fn test_denied_rename_leaves_tree_untouched() {
        let mut t = sample_tree();
        let mut gate = DenyAll::default();
        let r = t.rename_node("3", "Briefs", &mut gate);
        assert_eq!(r, Ok(Mutation::Suspended));
        assert_eq!(t.get("3").map(|n| n.name.as_str()), Some("Cases"));
        assert_eq!(
            gate.seen,
            vec![TreeOp::Rename {
                node: "3".to_string(),
                name: "Briefs".to_string()
            }]
        );
    }

    #[test]
    fn test_rename_validation_happens_before_gate() {
        let mut t = sample_tree();
        let mut gate = DenyAll::default();
        assert_eq!(t.rename_node("3", "   ", &mut gate), Err(TreeError::EmptyName));
        assert_eq!(
            t.rename_node("3", "drafts", &mut gate),
            Err(TreeError::DuplicateName("drafts".to_string()))
        );
        assert_eq!(
            t.rename_node("404", "X", &mut gate),
            Err(TreeError::UnknownNode("404".to_string()))
        );
        assert!(gate.seen.is_empty());
    }

    #[test]
    fn test_move_records_old_parent() {
        let mut t = sample_tree();
        let mut gate = DenyAll::default();
        let _ = t.move_node("7", "3", &mut gate);
        assert_eq!(
            gate.seen,
            vec![TreeOp::Move {
                node: "7".to_string(),
                old_parent: Some("1".to_string()),
                new_parent: "3".to_string(),
            }]
        );
    }

    #[test]
    fn test_move_into_descendant_rejected() {
        let mut t = sample_tree();
        assert_eq!(t.move_node("7", "8", &mut AllowAll), Err(TreeError::MoveIntoDescendant));
        assert_eq!(t.move_node("7", "7", &mut AllowAll), Err(TreeError::MoveIntoDescendant));
        assert_eq!(t.get("7").and_then(|n| n.parent_id.as_deref()), Some("1"));
    }

    #[test]
    fn test_move_applied() {
        let mut t = sample_tree();
        assert_eq!(t.move_node("7", "3", &mut AllowAll), Ok(Mutation::Applied));
        let kids: Vec<&str> = t.children(Some("3")).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(kids, vec!["7"]);
        // Subtree travels with its root.
        assert!(t.is_descendant_or_self("8", "3"));
    }

    #[test]
    fn test_delete_removes_subtree_and_selection() {
        let mut t = sample_tree();
        assert!(t.select_node(Some("8")));
        assert_eq!(t.delete_node("7", &mut AllowAll), Ok(Mutation::Applied));
        assert!(t.get("7").is_none());
        assert!(t.get("8").is_none());
        assert!(t.selected().is_none());
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_select_unknown_node_is_ignored() {
        let mut t = sample_tree();
        assert!(t.select_node(Some("3")));
        assert!(!t.select_node(Some("404")));
        assert_eq!(t.selected(), Some("3"));
        assert!(t.select_node(None));
        assert!(t.selected().is_none());
    }

    #[test]
    fn test_same_target_ignores_old_parent() {
        let a = TreeOp::Move {
            node: "7".to_string(),
            old_parent: Some("1".to_string()),
            new_parent: "3".to_string(),
        };
        let b = TreeOp::Move {
            node: "7".to_string(),
            old_parent: None,
            new_parent: "3".to_string(),
        };
        assert!(a.same_target(&b));
        assert!(!a.same_target(&TreeOp::Delete {
            node: "7".to_string()
        }));
        assert!(!a.is_same_parent_move());
    }
}
