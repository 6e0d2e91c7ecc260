mod action;
mod cli;
mod command;
mod error;
mod logging;
mod model;
mod output;
mod platform;
mod query;
mod signal;
mod tree;

use tracing::debug;

use cli::parse_args;
use command::{execute, Command};
use logging::{init_logging, LogConfig};
use platform::{create_provider, ProviderConfig};
use signal::{DryRunSender, NixSignalSender, SignalSender};
use tree::builder::TreeBuilder;

fn main() {
    let raw_args: Vec<String> = std::env::args().collect();
    let program = raw_args
        .first()
        .cloned()
        .unwrap_or_else(|| "proctree".to_string());
    let args = parse_args(raw_args);

    init_logging(&LogConfig::from_verbosity(
        args.verbose,
        args.quiet,
        args.log_format,
    ));

    let (Some(root_pid), Some(target_pid)) = (args.root_pid, args.target_pid) else {
        println!("Usage: {} [root_process] [target_process] [option]", program);
        std::process::exit(1);
    };

    // Resolve the operation before touching the process table.
    let command = match args.operation.as_deref() {
        None => None,
        Some(flag) => match Command::from_flag(flag) {
            Some(command) => Some(command),
            None => {
                println!("Invalid option: {}", flag);
                std::process::exit(1);
            }
        },
    };

    let config = ProviderConfig {
        backend: args.backend.unwrap_or_default(),
        proc_root: args.proc_root,
    };
    debug!(?config, root_pid, target_pid, "starting");

    let sender: Box<dyn SignalSender> = if args.dry_run {
        Box::new(DryRunSender)
    } else {
        Box::new(NixSignalSender)
    };

    if let Err(e) = run(config, root_pid, target_pid, command, &*sender) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(
    config: ProviderConfig,
    root_pid: u32,
    target_pid: u32,
    command: Option<Command>,
    sender: &dyn SignalSender,
) -> error::Result<()> {
    let provider = create_provider(config)?;
    let tree = TreeBuilder::new(&*provider).build(root_pid)?;

    let outcome = execute(&tree, root_pid, target_pid, command, sender);
    output::print_outcome(&outcome);
    Ok(())
}
