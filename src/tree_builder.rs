use std::collections::{HashMap, HashSet};

/// Index of a node inside its [`Tree`] arena.
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A selectable item carrying the full path it was discovered under.
    Leaf { path: String },
    /// A directory segment. Children keep first-seen order.
    Folder { children: Vec<NodeId>, is_open: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub depth: usize,
    /// Id of the corresponding node in the unfiltered tree.
    pub origin: NodeId,
}

impl TreeNode {
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { .. })
    }

    pub fn path(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Leaf { path } => Some(path),
            NodeKind::Folder { .. } => None,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Folder { children, .. } => children,
            NodeKind::Leaf { .. } => &[],
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { is_open: true, .. })
    }
}

/// Arena-backed tree. Nodes reference each other by [`NodeId`] only, so
/// ancestor walks are plain index hops along `parent`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<TreeNode>,
    roots: Vec<NodeId>,
}

impl Tree {
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sets the open flag of a folder. Returns `true` if anything changed.
    pub fn set_open(&mut self, id: NodeId, open: bool) -> bool {
        match self.nodes.get_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Folder { is_open, .. }) if *is_open != open => {
                *is_open = open;
                true
            }
            _ => false,
        }
    }

    pub fn open_all(&mut self) {
        for node in &mut self.nodes {
            if let NodeKind::Folder { is_open, .. } = &mut node.kind {
                *is_open = true;
            }
        }
    }

    /// Leaf paths at or below `id`, in tree order.
    pub fn leaf_paths(&self, id: NodeId) -> Vec<&str> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            match &self.nodes[current].kind {
                NodeKind::Leaf { path } => out.push(path.as_str()),
                NodeKind::Folder { children, .. } => stack.extend(children.iter().rev()),
            }
        }
        out
    }

    fn insert(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        kind: NodeKind,
        origin: Option<NodeId>,
    ) -> NodeId {
        let id = self.nodes.len();
        let depth = parent.map_or(0, |p| self.nodes[p].depth + 1);
        self.nodes.push(TreeNode {
            name: name.to_string(),
            kind,
            parent,
            depth,
            origin: origin.unwrap_or(id),
        });
        match parent {
            Some(p) => {
                if let NodeKind::Folder { children, .. } = &mut self.nodes[p].kind {
                    children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        id
    }
}

/// Builds a folder tree from `/`-delimited paths, preserving input order.
///
/// Folders are keyed by their cumulative path, so `x/a` and `y/a` stay
/// distinct. `strip_root` hides a leading segment when it is literally the
/// first one and something remains after it.
pub fn build_tree(paths: &[String], strip_root: Option<&str>) -> Tree {
    let mut tree = Tree::default();
    let mut folder_ids: HashMap<String, NodeId> = HashMap::new();
    let mut seen_leaves: HashSet<&str> = HashSet::new();

    for path in paths {
        if !seen_leaves.insert(path.as_str()) {
            continue;
        }
        let mut segments: Vec<&str> = path
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        if let Some(root) = strip_root {
            if segments.len() > 1 && segments[0] == root {
                segments.remove(0);
            }
        }
        let Some((leaf_name, folders)) = segments.split_last() else {
            continue;
        };

        let mut parent = None;
        let mut key = String::new();
        for segment in folders {
            if !key.is_empty() {
                key.push('/');
            }
            key.push_str(segment);
            let id = match folder_ids.get(&key) {
                Some(&id) => id,
                None => {
                    let kind = NodeKind::Folder {
                        children: Vec::new(),
                        is_open: false,
                    };
                    let id = tree.insert(parent, segment, kind, None);
                    folder_ids.insert(key.clone(), id);
                    id
                }
            };
            parent = Some(id);
        }
        tree.insert(
            parent,
            leaf_name,
            NodeKind::Leaf { path: path.clone() },
            None,
        );
    }
    tree
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keep {
    Drop,
    /// Copy only the children that survived, forcing the folder open.
    Filtered,
    /// Copy the whole subtree without pruning.
    Whole { force_open: bool },
}

/// Returns a pruned copy of `tree` for a case-insensitive `query`.
///
/// Leaves survive when their path contains the query. Folders survive when a
/// child does (and are then forced open) or when their own name matches (and
/// then keep their complete subtree). The input is never touched.
pub fn filter_tree(tree: &Tree, query: &str) -> Tree {
    if query.is_empty() {
        return tree.clone();
    }
    let needle = query.to_lowercase();
    let mut keep = vec![Keep::Drop; tree.len()];
    for &root in tree.roots() {
        classify(tree, root, &needle, &mut keep);
    }

    let mut out = Tree::default();
    for &root in tree.roots() {
        if keep[root] != Keep::Drop {
            copy_filtered(tree, root, None, &keep, &mut out);
        }
    }
    out
}

fn classify(tree: &Tree, id: NodeId, needle: &str, keep: &mut [Keep]) -> Keep {
    let node = tree.node(id);
    let verdict = match &node.kind {
        NodeKind::Leaf { path } => {
            if path.to_lowercase().contains(needle) {
                Keep::Whole { force_open: false }
            } else {
                Keep::Drop
            }
        }
        NodeKind::Folder { children, .. } => {
            let mut any_child = false;
            for &child in children {
                if classify(tree, child, needle, keep) != Keep::Drop {
                    any_child = true;
                }
            }
            if node.name.to_lowercase().contains(needle) {
                Keep::Whole {
                    force_open: any_child,
                }
            } else if any_child {
                Keep::Filtered
            } else {
                Keep::Drop
            }
        }
    };
    keep[id] = verdict;
    verdict
}

fn copy_filtered(tree: &Tree, id: NodeId, parent: Option<NodeId>, keep: &[Keep], out: &mut Tree) {
    let node = tree.node(id);
    match (keep[id], &node.kind) {
        (Keep::Drop, _) => {}
        (Keep::Filtered, NodeKind::Folder { children, .. }) => {
            let kind = NodeKind::Folder {
                children: Vec::new(),
                is_open: true,
            };
            let copied = out.insert(parent, &node.name, kind, Some(node.origin));
            for &child in children {
                copy_filtered(tree, child, Some(copied), keep, out);
            }
        }
        _ => {
            copy_subtree(tree, id, parent, keep, out);
        }
    }
}

/// Copies a subtree without pruning. Folders that matched through a
/// descendant are still forced open.
fn copy_subtree(tree: &Tree, id: NodeId, parent: Option<NodeId>, keep: &[Keep], out: &mut Tree) {
    let node = tree.node(id);
    let kind = match &node.kind {
        NodeKind::Leaf { path } => NodeKind::Leaf { path: path.clone() },
        NodeKind::Folder { is_open, .. } => NodeKind::Folder {
            children: Vec::new(),
            is_open: *is_open
                || matches!(keep[id], Keep::Filtered | Keep::Whole { force_open: true }),
        },
    };
    let copied = out.insert(parent, &node.name, kind, Some(node.origin));
    for &child in node.children() {
        copy_subtree(tree, child, Some(copied), keep, out);
    }
}

/// One visible row: the node, its depth and the row of its parent folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatNode {
    pub id: NodeId,
    pub depth: usize,
    pub parent_row: Option<usize>,
}

/// Pre-order walk that descends only into open folders.
pub fn flatten_tree(tree: &Tree) -> Vec<FlatNode> {
    let mut out = Vec::with_capacity(tree.len());
    flatten_into(tree, tree.roots(), 0, None, false, &mut out);
    out
}

/// Pre-order walk that treats every folder as open.
pub fn flatten_all(tree: &Tree) -> Vec<FlatNode> {
    let mut out = Vec::with_capacity(tree.len());
    flatten_into(tree, tree.roots(), 0, None, true, &mut out);
    out
}

fn flatten_into(
    tree: &Tree,
    ids: &[NodeId],
    depth: usize,
    parent_row: Option<usize>,
    force_open: bool,
    out: &mut Vec<FlatNode>,
) {
    for &id in ids {
        let row = out.len();
        out.push(FlatNode {
            id,
            depth,
            parent_row,
        });
        let node = tree.node(id);
        if let NodeKind::Folder { children, is_open } = &node.kind {
            if *is_open || force_open {
                flatten_into(tree, children, depth + 1, Some(row), force_open, out);
            }
        }
    }
}
