use std::path::PathBuf;

use clap::ValueEnum;
use tracing::trace;

use crate::error::{ProctreeError, Result};
use crate::model::ProcessRecord;

/// Source of per-process parent/zombie information.
pub trait PlatformProvider: Send + Sync {
    /// Every process id currently present in the namespace.
    fn list_pids(&self) -> Result<Vec<u32>>;

    /// Record for one process, or `None` if it is gone or unreadable.
    fn lookup(&self, pid: u32) -> Option<ProcessRecord>;

    /// One full pass over the namespace. Ids that disappear between
    /// enumeration and lookup are skipped.
    fn list_processes(&self) -> Result<Vec<ProcessRecord>> {
        let pids = self.list_pids()?;
        let mut records = Vec::with_capacity(pids.len());
        for pid in pids {
            match self.lookup(pid) {
                Some(record) => records.push(record),
                None => trace!(pid, "process vanished before lookup"),
            }
        }
        Ok(records)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Parse `<proc-root>/<pid>/stat` directly (Linux only)
    Procfs,
    /// Query the process table through sysinfo
    Sysinfo,
}

impl Default for Backend {
    fn default() -> Self {
        if cfg!(target_os = "linux") {
            Backend::Procfs
        } else {
            Backend::Sysinfo
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub backend: Backend,
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    pub proc_root: PathBuf,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            proc_root: PathBuf::from("/proc"),
        }
    }
}

#[cfg(target_os = "linux")]
mod linux;
mod portable;

pub fn create_provider(config: ProviderConfig) -> Result<Box<dyn PlatformProvider>> {
    match config.backend {
        #[cfg(target_os = "linux")]
        Backend::Procfs => {
            if !config.proc_root.is_dir() {
                return Err(ProctreeError::Config(format!(
                    "proc root {} is not a directory",
                    config.proc_root.display()
                )));
            }
            Ok(Box::new(linux::LinuxProvider::new(config)))
        }
        #[cfg(not(target_os = "linux"))]
        Backend::Procfs => Err(ProctreeError::Config(
            "the procfs backend is only available on Linux".to_string(),
        )),
        Backend::Sysinfo => Ok(Box::new(portable::SysinfoProvider::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FlakyProvider {
        listed: Vec<u32>,
        alive: HashMap<u32, ProcessRecord>,
    }

    impl PlatformProvider for FlakyProvider {
        fn list_pids(&self) -> Result<Vec<u32>> {
            Ok(self.listed.clone())
        }

        fn lookup(&self, pid: u32) -> Option<ProcessRecord> {
            self.alive.get(&pid).copied()
        }
    }

    #[test]
    fn test_list_processes_skips_vanished_pids() {
        let provider = FlakyProvider {
            listed: vec![1, 2, 3],
            alive: [(1, ProcessRecord::new(1, 0, false)), (3, ProcessRecord::new(3, 1, true))]
                .into_iter()
                .collect(),
        };
        let records = provider.list_processes().unwrap();
        let pids: Vec<u32> = records.iter().map(|r| r.pid).collect();
        assert_eq!(pids, vec![1, 3]);
    }

    #[test]
    fn test_default_backend_matches_platform() {
        let backend = Backend::default();
        if cfg!(target_os = "linux") {
            assert_eq!(backend, Backend::Procfs);
        } else {
            assert_eq!(backend, Backend::Sysinfo);
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_missing_proc_root_is_config_error() {
        let config = ProviderConfig {
            backend: Backend::Procfs,
            proc_root: PathBuf::from("/nonexistent/proctree-proc"),
        };
        assert!(matches!(create_provider(config), Err(ProctreeError::Config(_))));
    }

    #[test]
    fn test_sysinfo_backend_always_available() {
        let config = ProviderConfig {
            backend: Backend::Sysinfo,
            ..ProviderConfig::default()
        };
        assert!(create_provider(config).is_ok());
    }
}
