use crate::tree_builder::{NodeId, NodeKind, Tree};
use std::collections::HashSet;

/// How a row should be marked. Folders derive this from their leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMark {
    Selected,
    Partial,
    Unselected,
}

/// Selected leaf paths. Folder selection is never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    paths: HashSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Flips a leaf, or selects every leaf below a folder unless all of them
    /// already are, in which case they are all deselected.
    pub fn toggle(&mut self, tree: &Tree, id: NodeId) {
        match &tree.node(id).kind {
            NodeKind::Leaf { path } => {
                if !self.paths.remove(path) {
                    self.paths.insert(path.clone());
                }
            }
            NodeKind::Folder { .. } => {
                let leaves = tree.leaf_paths(id);
                if leaves.iter().all(|p| self.paths.contains(*p)) {
                    for p in leaves {
                        self.paths.remove(p);
                    }
                } else {
                    self.paths.extend(leaves.into_iter().map(str::to_string));
                }
            }
        }
    }

    pub fn is_selected(&self, tree: &Tree, id: NodeId) -> bool {
        self.mark(tree, id) == SelectionMark::Selected
    }

    pub fn mark(&self, tree: &Tree, id: NodeId) -> SelectionMark {
        let leaves = tree.leaf_paths(id);
        let picked = leaves.iter().filter(|p| self.paths.contains(**p)).count();
        if picked == 0 {
            SelectionMark::Unselected
        } else if picked == leaves.len() {
            SelectionMark::Selected
        } else {
            SelectionMark::Partial
        }
    }

    /// Clears everything if every known path is selected, otherwise selects
    /// every known path.
    pub fn toggle_all(&mut self, all_paths: &[String]) {
        if all_paths.iter().all(|p| self.paths.contains(p)) {
            self.paths.clear();
        } else {
            self.paths.extend(all_paths.iter().cloned());
        }
    }

    pub fn select_all<'a>(&mut self, paths: impl IntoIterator<Item = &'a String>) {
        self.paths.extend(paths.into_iter().cloned());
    }

    /// Selected paths in discovery order.
    pub fn selected(&self, discovery_order: &[String]) -> Vec<String> {
        discovery_order
            .iter()
            .filter(|p| self.paths.contains(*p))
            .cloned()
            .collect()
    }
}
