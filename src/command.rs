use tracing::debug;

use crate::action::ActionEngine;
use crate::model::ProcessRecord;
use crate::query::{DefunctStatus, QueryEngine, QueryResult};
use crate::signal::{SignalKind, SignalSender};
use crate::tree::ProcessTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    CountDefunct,
    IndirectDescendants,
    DirectDescendants,
    Siblings,
    DefunctSiblings,
    DefunctDescendants,
    Grandchildren,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    SignalDescendants(SignalKind),
    KillZombieParents,
    KillRoot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Query(QueryKind),
    Action(ActionKind),
}

pub struct CommandSpec {
    pub flag: &'static str,
    pub command: Command,
    pub description: &'static str,
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        flag: "-dc",
        command: Command::Query(QueryKind::CountDefunct),
        description: "Count defunct processes in the tree",
    },
    CommandSpec {
        flag: "-ds",
        command: Command::Query(QueryKind::IndirectDescendants),
        description: "List non-direct descendants",
    },
    CommandSpec {
        flag: "-id",
        command: Command::Query(QueryKind::DirectDescendants),
        description: "List immediate descendants",
    },
    CommandSpec {
        flag: "-lg",
        command: Command::Query(QueryKind::Siblings),
        description: "List sibling processes",
    },
    CommandSpec {
        flag: "-lz",
        command: Command::Query(QueryKind::DefunctSiblings),
        description: "List defunct sibling processes",
    },
    CommandSpec {
        flag: "-df",
        command: Command::Query(QueryKind::DefunctDescendants),
        description: "List defunct descendants",
    },
    CommandSpec {
        flag: "-gc",
        command: Command::Query(QueryKind::Grandchildren),
        description: "List grandchildren",
    },
    CommandSpec {
        flag: "-do",
        command: Command::Query(QueryKind::Status),
        description: "Print whether the process is defunct",
    },
    CommandSpec {
        flag: "--pz",
        command: Command::Action(ActionKind::KillZombieParents),
        description: "Kill parents of zombie descendants",
    },
    CommandSpec {
        flag: "-sk",
        command: Command::Action(ActionKind::SignalDescendants(SignalKind::Kill)),
        description: "Kill all descendants",
    },
    CommandSpec {
        flag: "-st",
        command: Command::Action(ActionKind::SignalDescendants(SignalKind::Stop)),
        description: "Stop all descendants",
    },
    CommandSpec {
        flag: "-dt",
        command: Command::Action(ActionKind::SignalDescendants(SignalKind::Continue)),
        description: "Continue all stopped descendants",
    },
    CommandSpec {
        flag: "-rp",
        command: Command::Action(ActionKind::KillRoot),
        description: "Kill the root process",
    },
];

impl Command {
    pub fn from_flag(flag: &str) -> Option<Command> {
        COMMANDS
            .iter()
            .find(|spec| spec.flag == flag)
            .map(|spec| spec.command)
    }

    /// Whether the target pid must be in the tree before running.
    pub fn requires_membership(self) -> bool {
        !matches!(self, Command::Action(ActionKind::KillRoot))
    }
}

/// `--help` text listing every operation flag.
pub fn options_help() -> String {
    let mut help = String::from("Operations:\n");
    for spec in COMMANDS {
        help.push_str(&format!("  {:<6} {}\n", spec.flag, spec.description));
    }
    help
}

/// What an invocation produced, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No operation given: the target's record if it is in the tree.
    Membership(Option<ProcessRecord>),
    NotInTree { target: u32, root: u32 },
    Ids(QueryResult),
    Count(usize),
    Status(DefunctStatus),
}

pub fn execute(
    tree: &ProcessTree,
    root_pid: u32,
    target_pid: u32,
    command: Option<Command>,
    sender: &dyn SignalSender,
) -> Outcome {
    if tree.is_empty() {
        debug!(root_pid, "root not found, tree is empty");
    }

    let Some(command) = command else {
        let membership = tree.find(target_pid).map(|node| node.record);
        return Outcome::Membership(membership);
    };

    if command.requires_membership() && !tree.contains(target_pid) {
        debug!(target_pid, root_pid, "target not in tree");
        return Outcome::NotInTree {
            target: target_pid,
            root: root_pid,
        };
    }

    debug!(?command, target_pid, "dispatching");
    match command {
        Command::Query(kind) => run_query(tree, root_pid, target_pid, kind),
        Command::Action(kind) => {
            let actions = ActionEngine::new(tree, sender);
            let result = match kind {
                ActionKind::SignalDescendants(signal) => {
                    actions.signal_descendants(target_pid, signal)
                }
                ActionKind::KillZombieParents => actions.kill_zombie_parents(target_pid),
                ActionKind::KillRoot => actions.kill_root(root_pid),
            };
            Outcome::Ids(result)
        }
    }
}

fn run_query(tree: &ProcessTree, root_pid: u32, pid: u32, kind: QueryKind) -> Outcome {
    let queries = QueryEngine::new(tree);
    match kind {
        QueryKind::CountDefunct => Outcome::Count(queries.count_defunct()),
        QueryKind::IndirectDescendants => Outcome::Ids(queries.indirect_descendants(pid)),
        QueryKind::DirectDescendants => Outcome::Ids(queries.direct_descendants(pid)),
        QueryKind::Siblings => Outcome::Ids(queries.siblings(pid)),
        QueryKind::DefunctSiblings => Outcome::Ids(queries.defunct_siblings(pid)),
        QueryKind::DefunctDescendants => Outcome::Ids(queries.defunct_descendants(pid)),
        QueryKind::Grandchildren => Outcome::Ids(queries.grandchildren(pid)),
        QueryKind::Status => match queries.status_of(pid) {
            Some(status) => Outcome::Status(status),
            None => Outcome::NotInTree {
                target: pid,
                root: root_pid,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::tests::scenario;
    use crate::query::{NO_DEFUNCT_SIBLINGS, NO_GRANDCHILDREN};
    use crate::signal::testing::RecordingSender;

    #[test]
    fn test_every_flag_resolves() {
        let flags = [
            "-dc", "-ds", "-id", "-lg", "-lz", "-df", "-gc", "-do", "--pz", "-sk", "-st", "-dt",
            "-rp",
        ];
        for flag in flags {
            assert!(Command::from_flag(flag).is_some(), "flag {} unresolved", flag);
        }
        assert_eq!(COMMANDS.len(), flags.len());
    }

    #[test]
    fn test_flag_mapping() {
        assert_eq!(
            Command::from_flag("-sk"),
            Some(Command::Action(ActionKind::SignalDescendants(SignalKind::Kill)))
        );
        assert_eq!(
            Command::from_flag("-dt"),
            Some(Command::Action(ActionKind::SignalDescendants(SignalKind::Continue)))
        );
        assert_eq!(
            Command::from_flag("-ds"),
            Some(Command::Query(QueryKind::IndirectDescendants))
        );
        assert_eq!(Command::from_flag("-pz"), None);
        assert_eq!(Command::from_flag("dc"), None);
    }

    #[test]
    fn test_only_kill_root_skips_membership() {
        for spec in COMMANDS {
            let expected = spec.flag != "-rp";
            assert_eq!(spec.command.requires_membership(), expected, "{}", spec.flag);
        }
    }

    #[test]
    fn test_options_help_lists_flags() {
        let help = options_help();
        for spec in COMMANDS {
            assert!(help.contains(spec.flag));
            assert!(help.contains(spec.description));
        }
    }

    #[test]
    fn test_membership_without_command() {
        let tree = scenario();
        let sender = RecordingSender::default();
        assert_eq!(
            execute(&tree, 1, 4, None, &sender),
            Outcome::Membership(Some(ProcessRecord::new(4, 2, true)))
        );
        assert_eq!(
            execute(&tree, 1, 1, None, &sender),
            Outcome::Membership(Some(ProcessRecord::new(1, 0, false)))
        );
        assert_eq!(execute(&tree, 1, 9, None, &sender), Outcome::Membership(None));
    }

    #[test]
    fn test_target_outside_tree_runs_nothing() {
        let tree = scenario();
        let sender = RecordingSender::default();
        let outcome = execute(&tree, 1, 9, Command::from_flag("-sk"), &sender);
        assert_eq!(outcome, Outcome::NotInTree { target: 9, root: 1 });
        assert!(sender.sent.borrow().is_empty());
    }

    #[test]
    fn test_queries_dispatch() {
        let tree = scenario();
        let sender = RecordingSender::default();
        let run = |flag: &str, target: u32| {
            execute(&tree, 1, target, Command::from_flag(flag), &sender)
        };

        assert_eq!(run("-dc", 3), Outcome::Count(2));
        assert_eq!(run("-gc", 1), Outcome::Ids(QueryResult::new(vec![4], NO_GRANDCHILDREN)));
        assert_eq!(run("-lz", 2), Outcome::Ids(QueryResult::new(vec![], NO_DEFUNCT_SIBLINGS)));
        assert_eq!(run("-do", 4), Outcome::Status(DefunctStatus::Defunct));
        assert!(sender.sent.borrow().is_empty());
    }

    #[test]
    fn test_kill_root_ignores_target_and_empty_tree() {
        let tree = ProcessTree::new();
        let sender = RecordingSender::default();
        let outcome = execute(&tree, 321, 9999, Command::from_flag("-rp"), &sender);
        assert_eq!(outcome, Outcome::Ids(QueryResult::silent(vec![321])));
        assert_eq!(sender.pids(), vec![321]);
    }

    #[test]
    fn test_empty_tree_reports_not_in_tree() {
        let tree = ProcessTree::new();
        let sender = RecordingSender::default();
        let outcome = execute(&tree, 5, 5, Command::from_flag("-id"), &sender);
        assert_eq!(outcome, Outcome::NotInTree { target: 5, root: 5 });
    }

    #[test]
    fn test_zombie_parents_dispatch() {
        let tree = scenario();
        let sender = RecordingSender::default();
        let outcome = execute(&tree, 1, 1, Command::from_flag("--pz"), &sender);
        assert_eq!(outcome, Outcome::Ids(QueryResult::silent(vec![2])));
    }
}
