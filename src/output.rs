use crate::command::Outcome;

pub const NOT_IN_TREE: &str = "Does not belong to the process tree";

/// Lines printed to stdout for an outcome.
pub fn render(outcome: &Outcome) -> Vec<String> {
    match outcome {
        Outcome::Membership(Some(record)) => vec![record.display_line()],
        Outcome::Membership(None) => vec![NOT_IN_TREE.to_string()],
        Outcome::NotInTree { target, root } => vec![format!(
            "The process {} does not belong to the tree rooted at {}",
            target, root
        )],
        Outcome::Ids(result) => {
            if result.is_empty() {
                result
                    .empty_message
                    .map(|message| vec![message.to_string()])
                    .unwrap_or_default()
            } else {
                result.pids.iter().map(|pid| pid.to_string()).collect()
            }
        }
        Outcome::Count(count) => vec![count.to_string()],
        Outcome::Status(status) => vec![status.to_string()],
    }
}

pub fn print_outcome(outcome: &Outcome) {
    for line in render(outcome) {
        println!("{}", line);
    }
}
