use std::collections::HashMap;

use tracing::{debug, info, trace, warn};

use super::ProcessTree;
use crate::error::Result;
use crate::model::ProcessRecord;
use crate::platform::PlatformProvider;

/// Populates a [`ProcessTree`] from one pass over the process namespace.
pub struct TreeBuilder<'a> {
    provider: &'a dyn PlatformProvider,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(provider: &'a dyn PlatformProvider) -> Self {
        Self { provider }
    }

    /// Snapshot the subtree rooted at `root_pid`.
    ///
    /// A root that does not exist yields an empty tree (no root), not an
    /// error. Only a failure to enumerate the namespace at all is reported.
    pub fn build(&self, root_pid: u32) -> Result<ProcessTree> {
        let root = match self.provider.lookup(root_pid) {
            Some(record) => record,
            None => {
                info!(root = root_pid, "root process not found, tree is empty");
                return Ok(ProcessTree::new());
            }
        };

        let records = self.provider.list_processes()?;
        let scanned = records.len();
        let tree = build_from_records(root, records);
        info!(
            root = root_pid,
            scanned,
            processes = tree.len(),
            "built process tree"
        );
        Ok(tree)
    }
}

/// Build the tree for `root` out of a flat snapshot.
///
/// Records are grouped by parent id once, then walked depth-first from the
/// root. A pid is inserted at most once and is always linked to the node
/// whose group it was found in, so the result is acyclic whatever parent
/// ids the snapshot claims.
pub fn build_from_records(
    root: ProcessRecord,
    records: impl IntoIterator<Item = ProcessRecord>,
) -> ProcessTree {
    let mut by_parent: HashMap<u32, Vec<ProcessRecord>> = HashMap::new();
    for record in records {
        by_parent.entry(record.ppid).or_default().push(record);
    }

    let mut tree = ProcessTree::new();
    // Fresh tree: insert and set_root cannot fail.
    let _ = tree.insert(root);
    let _ = tree.set_root(root.pid);

    // Preorder: a child's whole subtree is discovered before its next
    // sibling, and siblings keep their scan order.
    let mut stack: Vec<ProcessRecord> = Vec::new();
    push_children(&mut stack, &by_parent, root.pid);

    while let Some(record) = stack.pop() {
        // Already discovered through another path.
        if tree.insert(record).is_err() {
            continue;
        }
        if let Err(e) = tree.link(record.ppid, record.pid) {
            debug!(pid = record.pid, error = %e, "link failed");
        }
        trace!(
            pid = record.pid,
            ppid = record.ppid,
            defunct = record.defunct,
            "discovered process"
        );
        push_children(&mut stack, &by_parent, record.pid);
    }

    let repaired = reconcile(&mut tree);
    if repaired > 0 {
        warn!(repaired, "linked nodes missed during discovery");
    }
    tree
}

fn push_children(
    stack: &mut Vec<ProcessRecord>,
    by_parent: &HashMap<u32, Vec<ProcessRecord>>,
    ppid: u32,
) {
    if let Some(children) = by_parent.get(&ppid) {
        stack.extend(children.iter().rev().copied());
    }
}

/// Link every non-root node that has no parent yet but whose `ppid` is in
/// the tree. Returns how many links were made. Discovery above links each
/// node as it is inserted, so this is expected to find nothing.
pub fn reconcile(tree: &mut ProcessTree) -> usize {
    let root = tree.root().map(|node| node.pid());
    let orphans: Vec<(u32, u32)> = tree
        .nodes()
        .filter(|node| Some(node.pid()) != root && node.parent_pid().is_none())
        .filter(|node| tree.contains(node.record.ppid))
        .map(|node| (node.record.ppid, node.pid()))
        .collect();

    let mut linked = 0;
    for (ppid, pid) in orphans {
        if let Ok(true) = tree.link(ppid, pid) {
            linked += 1;
        }
    }
    linked
}
