use tracing::{debug, warn};

use crate::query::{QueryEngine, QueryResult};
use crate::signal::{is_addressable, SignalKind, SignalSender};
use crate::tree::ProcessTree;

/// Pid of init. Never signalled by `kill_zombie_parents`.
const INIT_PID: u32 = 1;

/// Tree traversals that signal the processes they match. Each operation
/// returns the pids it signalled; delivery itself is never confirmed.
pub struct ActionEngine<'a> {
    tree: &'a ProcessTree,
    sender: &'a dyn SignalSender,
}

impl<'a> ActionEngine<'a> {
    pub fn new(tree: &'a ProcessTree, sender: &'a dyn SignalSender) -> Self {
        Self { tree, sender }
    }

    /// Signal every proper descendant of `pid`.
    ///
    /// Scans the whole tree in discovery order and walks each node's parent
    /// chain looking for `pid`.
    pub fn signal_descendants(&self, pid: u32, kind: SignalKind) -> QueryResult {
        let mut signalled = Vec::new();
        if !self.tree.contains(pid) {
            return QueryResult::silent(signalled);
        }

        for node in self.tree.nodes() {
            let mut ancestor = self.tree.parent_of(node);
            while let Some(parent) = ancestor {
                if parent.pid() == pid {
                    self.sender.send(node.pid(), kind);
                    signalled.push(node.pid());
                    break;
                }
                ancestor = self.tree.parent_of(parent);
            }
        }

        debug!(pid, signal = %kind, count = signalled.len(), "signalled descendants");
        QueryResult::silent(signalled)
    }

    /// SIGKILL the parent of every zombie below `pid`, skipping init.
    /// A parent with several zombie children is signalled once per zombie.
    pub fn kill_zombie_parents(&self, pid: u32) -> QueryResult {
        let zombies = QueryEngine::new(self.tree).defunct_descendants(pid);

        let mut signalled = Vec::new();
        for zombie in zombies.pids {
            let Some(node) = self.tree.find(zombie) else {
                continue;
            };
            let ppid = node.record.ppid;
            if ppid <= INIT_PID {
                debug!(zombie, ppid, "refusing to signal init");
                continue;
            }
            self.sender.send(ppid, SignalKind::Kill);
            signalled.push(ppid);
        }
        QueryResult::silent(signalled)
    }

    /// SIGKILL the tree's root, or `requested_root` when the tree is empty.
    /// A pid `kill(2)` cannot address on its own is neither sent nor reported.
    pub fn kill_root(&self, requested_root: u32) -> QueryResult {
        let pid = self
            .tree
            .root()
            .map(|node| node.pid())
            .unwrap_or(requested_root);
        if !is_addressable(pid) {
            warn!(pid, "root pid not addressable, nothing signalled");
            return QueryResult::silent(Vec::new());
        }
        self.sender.send(pid, SignalKind::Kill);
        QueryResult::silent(vec![pid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProcessRecord;
    use crate::query::tests::scenario;
    use crate::signal::testing::RecordingSender;
    use crate::tree::builder::build_from_records;

    #[test]
    fn test_signal_descendants_reaches_every_depth() {
        let tree = scenario();
        let sender = RecordingSender::default();
        let actions = ActionEngine::new(&tree, &sender);

        let result = actions.signal_descendants(1, SignalKind::Stop);
        assert_eq!(result.pids, vec![2, 4, 3]);
        assert_eq!(result.empty_message, None);
        assert_eq!(
            *sender.sent.borrow(),
            vec![(2, SignalKind::Stop), (4, SignalKind::Stop), (3, SignalKind::Stop)]
        );
    }

    #[test]
    fn test_signal_descendants_excludes_target_and_outsiders() {
        let tree = scenario();
        let sender = RecordingSender::default();
        let actions = ActionEngine::new(&tree, &sender);

        assert_eq!(actions.signal_descendants(2, SignalKind::Kill).pids, vec![4]);
        assert!(actions.signal_descendants(3, SignalKind::Kill).is_empty());
        assert!(actions.signal_descendants(99, SignalKind::Kill).is_empty());
        assert_eq!(sender.pids(), vec![4]);
    }

    #[test]
    fn test_kill_zombie_parents_scenario() {
        let tree = scenario();
        let sender = RecordingSender::default();
        let actions = ActionEngine::new(&tree, &sender);

        // Zombies 2 (parent 1, excluded) and 4 (parent 2).
        let result = actions.kill_zombie_parents(1);
        assert_eq!(result.pids, vec![2]);
        assert_eq!(*sender.sent.borrow(), vec![(2, SignalKind::Kill)]);
    }

    #[test]
    fn test_kill_zombie_parents_keeps_duplicates() {
        let tree = build_from_records(
            ProcessRecord::new(100, 1, false),
            vec![
                ProcessRecord::new(200, 100, false),
                ProcessRecord::new(201, 200, true),
                ProcessRecord::new(202, 200, true),
                ProcessRecord::new(203, 100, true),
            ],
        );
        let sender = RecordingSender::default();
        let actions = ActionEngine::new(&tree, &sender);

        assert_eq!(actions.kill_zombie_parents(100).pids, vec![200, 200, 100]);
        assert_eq!(sender.pids(), vec![200, 200, 100]);
    }

    #[test]
    fn test_kill_zombie_parents_never_targets_init() {
        let tree = build_from_records(
            ProcessRecord::new(1, 0, false),
            vec![ProcessRecord::new(5, 1, true), ProcessRecord::new(6, 1, true)],
        );
        let sender = RecordingSender::default();
        let actions = ActionEngine::new(&tree, &sender);

        assert!(actions.kill_zombie_parents(1).is_empty());
        assert!(sender.sent.borrow().is_empty());
    }

    #[test]
    fn test_kill_root_uses_tree_root() {
        let tree = scenario();
        let sender = RecordingSender::default();
        let actions = ActionEngine::new(&tree, &sender);

        assert_eq!(actions.kill_root(1).pids, vec![1]);
        assert_eq!(*sender.sent.borrow(), vec![(1, SignalKind::Kill)]);
    }

    #[test]
    fn test_kill_root_skips_unaddressable_pid() {
        let tree = ProcessTree::new();
        let sender = RecordingSender::default();
        let actions = ActionEngine::new(&tree, &sender);

        assert!(actions.kill_root(0).is_empty());
        assert!(actions.kill_root(u32::MAX).is_empty());
        assert!(sender.sent.borrow().is_empty());
    }

    #[test]
    fn test_kill_root_on_empty_tree_still_signals() {
        let tree = ProcessTree::new();
        let sender = RecordingSender::default();
        let actions = ActionEngine::new(&tree, &sender);

        assert_eq!(actions.kill_root(4242).pids, vec![4242]);
        assert_eq!(*sender.sent.borrow(), vec![(4242, SignalKind::Kill)]);
    }
}
