use std::fmt;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::{debug, info, warn};

/// Signals the action operations can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Kill,
    Stop,
    Continue,
}

impl SignalKind {
    pub fn as_nix(self) -> Signal {
        match self {
            SignalKind::Kill => Signal::SIGKILL,
            SignalKind::Stop => Signal::SIGSTOP,
            SignalKind::Continue => Signal::SIGCONT,
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_nix().as_str())
    }
}

/// Whether `pid` names a single process `kill(2)` can address. Pid 0 would
/// hit our own process group and anything past `i32::MAX` wraps negative.
pub fn is_addressable(pid: u32) -> bool {
    pid != 0 && i32::try_from(pid).is_ok()
}

/// Fire-and-forget signal delivery. Implementations never report whether
/// the target received the signal.
pub trait SignalSender {
    fn send(&self, pid: u32, kind: SignalKind);
}

/// Delivers signals with `kill(2)`.
#[derive(Debug, Default)]
pub struct NixSignalSender;

impl SignalSender for NixSignalSender {
    fn send(&self, pid: u32, kind: SignalKind) {
        if !is_addressable(pid) {
            warn!(pid, signal = %kind, "pid not addressable, not signalled");
            return;
        }
        match kill(Pid::from_raw(pid as i32), kind.as_nix()) {
            Ok(()) => debug!(pid, signal = %kind, "signal delivered"),
            // Exited or not ours: expected when racing the live process table.
            Err(errno) => debug!(pid, signal = %kind, error = %errno, "signal not delivered"),
        }
    }
}

/// Logs what would be delivered without touching any process.
#[derive(Debug, Default)]
pub struct DryRunSender;

impl SignalSender for DryRunSender {
    fn send(&self, pid: u32, kind: SignalKind) {
        info!(pid, signal = %kind, "dry run: signal not sent");
    }
}
