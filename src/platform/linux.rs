use crate::error::{ProctreeError, Result};
use crate::model::ProcessRecord;
use super::{PlatformProvider, ProviderConfig};

use tracing::trace;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Convert a parsed `/proc/[pid]/stat` into our record.
/// A process is defunct when its state character is `Z`.
fn record_from_stat(stat: &procfs::process::Stat) -> ProcessRecord {
    ProcessRecord::new(stat.pid as u32, stat.ppid.max(0) as u32, stat.state == 'Z')
}

// ---------------------------------------------------------------------------
// LinuxProvider
// ---------------------------------------------------------------------------

pub struct LinuxProvider {
    config: ProviderConfig,
}

impl LinuxProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    fn all_processes(&self) -> Result<procfs::process::ProcessesIter> {
        procfs::process::all_processes_with_root(&self.config.proc_root).map_err(|e| {
            ProctreeError::Platform(format!(
                "Cannot read {}: {}",
                self.config.proc_root.display(),
                e
            ))
        })
    }
}

impl PlatformProvider for LinuxProvider {
    fn list_pids(&self) -> Result<Vec<u32>> {
        let pids = self
            .all_processes()?
            .filter_map(|proc_result| proc_result.ok())
            .map(|proc| proc.pid as u32)
            .collect();
        Ok(pids)
    }

    fn lookup(&self, pid: u32) -> Option<ProcessRecord> {
        let path = self.config.proc_root.join(pid.to_string());
        let process = match procfs::process::Process::new_with_root(path) {
            Ok(p) => p,
            Err(e) => {
                trace!(pid, error = %e, "cannot open process");
                return None;
            }
        };
        match process.stat() {
            Ok(stat) => Some(record_from_stat(&stat)),
            Err(e) => {
                trace!(pid, error = %e, "cannot read stat");
                None
            }
        }
    }

    // Single pass: stat each entry as it is enumerated instead of
    // re-opening every pid.
    fn list_processes(&self) -> Result<Vec<ProcessRecord>> {
        let mut records = Vec::new();
        for proc_result in self.all_processes()? {
            let proc = match proc_result {
                Ok(p) => p,
                Err(_) => continue,
            };

            match proc.stat() {
                Ok(stat) => records.push(record_from_stat(&stat)),
                Err(e) => {
                    // Exited between readdir and open -- skip silently.
                    trace!(pid = proc.pid, error = %e, "process vanished during scan");
                }
            }
        }
        Ok(records)
    }
}
