use std::fmt;

use crate::tree::{ProcessNode, ProcessTree};

/// Pids produced by a query or action, plus what to print if there are none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub pids: Vec<u32>,
    pub empty_message: Option<&'static str>,
}

impl QueryResult {
    pub fn new(pids: Vec<u32>, empty_message: &'static str) -> Self {
        Self {
            pids,
            empty_message: Some(empty_message),
        }
    }

    /// Result with no empty message; prints nothing when empty.
    pub fn silent(pids: Vec<u32>) -> Self {
        Self {
            pids,
            empty_message: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }
}

pub const NO_DIRECT_DESCENDANTS: &str = "No direct descendants";
pub const NO_GRANDCHILDREN: &str = "No grandchildren";
pub const NO_INDIRECT_DESCENDANTS: &str = "No non-direct descendants";
pub const NO_SIBLINGS: &str = "No sibling/s";
pub const NO_DEFUNCT_SIBLINGS: &str = "No defunct sibling/s";
pub const NO_DEFUNCT_DESCENDANTS: &str = "No descendant zombie process/es";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefunctStatus {
    Defunct,
    NotDefunct,
}

impl fmt::Display for DefunctStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefunctStatus::Defunct => write!(f, "Defunct"),
            DefunctStatus::NotDefunct => write!(f, "Not defunct"),
        }
    }
}

/// Read-only relationship queries over a built [`ProcessTree`].
///
/// An unknown target pid yields an empty result carrying the query's empty
/// message. Pids come back in discovery order, depth-first where depth is
/// involved.
pub struct QueryEngine<'a> {
    tree: &'a ProcessTree,
}

impl<'a> QueryEngine<'a> {
    pub fn new(tree: &'a ProcessTree) -> Self {
        Self { tree }
    }

    /// Zombies anywhere in the tree, root included.
    pub fn count_defunct(&self) -> usize {
        self.tree.nodes().filter(|node| node.is_defunct()).count()
    }

    pub fn direct_descendants(&self, pid: u32) -> QueryResult {
        let pids = match self.tree.find(pid) {
            Some(node) => node.child_pids().to_vec(),
            None => Vec::new(),
        };
        QueryResult::new(pids, NO_DIRECT_DESCENDANTS)
    }

    /// Descendants at depth exactly 2.
    pub fn grandchildren(&self, pid: u32) -> QueryResult {
        let pids = self
            .descendants(pid)
            .into_iter()
            .filter(|(_, depth)| *depth == 2)
            .map(|(node, _)| node.pid())
            .collect();
        QueryResult::new(pids, NO_GRANDCHILDREN)
    }

    /// Descendants at depth 2 or deeper.
    pub fn indirect_descendants(&self, pid: u32) -> QueryResult {
        let pids = self
            .descendants(pid)
            .into_iter()
            .filter(|(_, depth)| *depth >= 2)
            .map(|(node, _)| node.pid())
            .collect();
        QueryResult::new(pids, NO_INDIRECT_DESCENDANTS)
    }

    pub fn siblings(&self, pid: u32) -> QueryResult {
        let pids = self.sibling_nodes(pid).map(|node| node.pid()).collect();
        QueryResult::new(pids, NO_SIBLINGS)
    }

    pub fn defunct_siblings(&self, pid: u32) -> QueryResult {
        let pids = self
            .sibling_nodes(pid)
            .filter(|node| node.is_defunct())
            .map(|node| node.pid())
            .collect();
        QueryResult::new(pids, NO_DEFUNCT_SIBLINGS)
    }

    pub fn defunct_descendants(&self, pid: u32) -> QueryResult {
        let pids = self
            .descendants(pid)
            .into_iter()
            .filter(|(node, _)| node.is_defunct())
            .map(|(node, _)| node.pid())
            .collect();
        QueryResult::new(pids, NO_DEFUNCT_DESCENDANTS)
    }

    pub fn status_of(&self, pid: u32) -> Option<DefunctStatus> {
        self.tree.find(pid).map(|node| {
            if node.is_defunct() {
                DefunctStatus::Defunct
            } else {
                DefunctStatus::NotDefunct
            }
        })
    }

    /// Proper descendants of `pid` with their depth below it, preorder.
    fn descendants(&self, pid: u32) -> Vec<(&'a ProcessNode, usize)> {
        let mut out = Vec::new();
        let Some(start) = self.tree.find(pid) else {
            return out;
        };

        let mut stack: Vec<(&'a ProcessNode, usize)> = self
            .tree
            .children_of(start)
            .map(|child| (child, 1))
            .collect();
        stack.reverse();

        while let Some((node, depth)) = stack.pop() {
            out.push((node, depth));
            let first = stack.len();
            stack.extend(self.tree.children_of(node).map(|child| (child, depth + 1)));
            stack[first..].reverse();
        }
        out
    }

    /// Other children of `pid`'s parent. Empty for the root.
    fn sibling_nodes(&self, pid: u32) -> impl Iterator<Item = &'a ProcessNode> + 'a {
        let tree = self.tree;
        let parent = tree.find(pid).and_then(|node| tree.parent_of(node));
        parent
            .into_iter()
            .flat_map(move |parent| tree.children_of(parent))
            .filter(move |node| node.pid() != pid)
    }
}
