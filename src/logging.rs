use std::io::IsTerminal;

use clap::ValueEnum;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Plain text lines
    #[default]
    Human,
    /// One JSON object per line
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LevelFilter,
    pub format: LogFormat,
}

impl LogConfig {
    /// Warnings by default; each `-v` adds a level, `-q` keeps errors only.
    pub fn from_verbosity(verbose: u8, quiet: bool, format: LogFormat) -> Self {
        let level = if quiet {
            LevelFilter::ERROR
        } else {
            match verbose {
                0 => LevelFilter::WARN,
                1 => LevelFilter::INFO,
                2 => LevelFilter::DEBUG,
                _ => LevelFilter::TRACE,
            }
        };
        Self { level, format }
    }
}

/// Install the global subscriber. Logs go to stderr only; stdout is kept
/// for results. `PROCTREE_LOG` (or `RUST_LOG`) overrides the level picked
/// on the command line.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_env("PROCTREE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(format!("proctree={}", config.level)));

    let result = match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi)
                .without_time();
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .try_init()
        }
    };

    if let Err(e) = result {
        eprintln!("Warning: logging already initialised: {}", e);
    }
}
