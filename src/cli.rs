use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, FromArgMatches, Parser};

use crate::command::options_help;
use crate::logging::LogFormat;
use crate::platform::Backend;

#[derive(Parser, Debug)]
#[command(
    name = "proctree",
    version,
    about = "Query and signal the process tree rooted at a given PID",
    override_usage = "proctree [OPTIONS] <ROOT_PID> <TARGET_PID> [OPERATION]"
)]
pub struct CliArgs {
    /// Process whose subtree is inspected
    #[arg(value_name = "ROOT_PID")]
    pub root_pid: Option<u32>,

    /// Process the operation applies to
    #[arg(value_name = "TARGET_PID")]
    pub target_pid: Option<u32>,

    /// Operation flag, e.g. -id (normally given positionally)
    #[arg(long = "op", value_name = "OPERATION", allow_hyphen_values = true)]
    pub operation: Option<String>,

    /// Process information source
    #[arg(long, value_enum, env = "PROCTREE_BACKEND")]
    pub backend: Option<Backend>,

    /// Mount point of the proc filesystem (procfs backend)
    #[arg(long, value_name = "DIR", env = "PROCTREE_PROC_ROOT", default_value = "/proc")]
    pub proc_root: PathBuf,

    /// Log signals instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// More log output on stderr (repeatable)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log line format
    #[arg(long, value_enum, env = "PROCTREE_LOG_FORMAT", default_value_t = LogFormat::Human)]
    pub log_format: LogFormat,
}

/// Long options clap handles itself; anything else starting with `-` is an
/// operation flag.
const OWN_LONG_FLAGS: &[&str] = &[
    "help",
    "version",
    "op",
    "backend",
    "proc-root",
    "dry-run",
    "verbose",
    "quiet",
    "log-format",
];

/// Own options whose value may follow as a separate argument.
const VALUE_FLAGS: &[&str] = &["--op", "--backend", "--proc-root", "--log-format"];

/// Positionals before the operation: root and target pid.
const PID_POSITIONALS: usize = 2;

fn is_own_flag(arg: &str) -> bool {
    if let Some(long) = arg.strip_prefix("--") {
        let name = long.split('=').next().unwrap_or_default();
        return OWN_LONG_FLAGS.contains(&name);
    }
    match arg.strip_prefix('-') {
        Some("h") | Some("V") | Some("q") => true,
        Some(shorts) => !shorts.is_empty() && shorts.chars().all(|c| c == 'v'),
        None => false,
    }
}

/// Preprocess command-line arguments so the legacy operation flags
/// (`-dc`, `--pz`, ...) reach clap as the value of `--op`. Whatever sits in
/// the third positional slot is the operation too, so a bare word there is
/// reported as an invalid option rather than rejected by clap.
///
/// Conversions:
///   -id   -> --op=-id
///   --pz  -> --op=--pz
///   foo   -> --op=foo   (after both pids)
pub fn preprocess_args(args: Vec<String>) -> Vec<String> {
    let mut result = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();

    // Always keep the program name as-is
    if let Some(prog) = iter.next() {
        result.push(prog);
    }

    let mut positionals = 0;
    let mut value_pending = false;
    for arg in iter {
        if value_pending {
            value_pending = false;
            result.push(arg);
        } else if arg.len() > 1 && arg.starts_with('-') {
            if is_own_flag(&arg) {
                value_pending = VALUE_FLAGS.contains(&arg.as_str());
                result.push(arg);
            } else {
                result.push(format!("--op={}", arg));
            }
        } else if positionals == PID_POSITIONALS {
            result.push(format!("--op={}", arg));
        } else {
            positionals += 1;
            result.push(arg);
        }
    }

    result
}

/// Parse the process arguments, exiting with clap's message on error.
pub fn parse_args(raw_args: Vec<String>) -> CliArgs {
    let matches = CliArgs::command()
        .after_help(options_help())
        .get_matches_from(preprocess_args(raw_args));
    CliArgs::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}
