use std::collections::HashSet;

use crate::error::Result;
use crate::model::ProcessRecord;
use super::PlatformProvider;

use sysinfo::{Pid, Process, ProcessStatus, System};

/// Provider backed by a single sysinfo refresh taken at construction.
pub struct SysinfoProvider {
    sys: System,
    /// Thread ids sysinfo reports alongside real processes on Linux.
    threads: HashSet<Pid>,
}

impl SysinfoProvider {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_processes();

        let threads = sys
            .processes()
            .iter()
            .filter_map(|(pid, process)| process.tasks().map(|tasks| (pid, tasks)))
            .flat_map(|(pid, tasks)| tasks.iter().filter(move |tid| *tid != pid).copied())
            .collect();

        Self { sys, threads }
    }

    fn processes(&self) -> impl Iterator<Item = (&Pid, &Process)> {
        self.sys
            .processes()
            .iter()
            .filter(|(pid, _)| !self.threads.contains(pid))
    }
}

fn record_from_process(pid: Pid, process: &Process) -> ProcessRecord {
    ProcessRecord::new(
        pid.as_u32(),
        process.parent().map(|p| p.as_u32()).unwrap_or(0),
        process.status() == ProcessStatus::Zombie,
    )
}

impl PlatformProvider for SysinfoProvider {
    fn list_pids(&self) -> Result<Vec<u32>> {
        Ok(self.processes().map(|(pid, _)| pid.as_u32()).collect())
    }

    fn lookup(&self, pid: u32) -> Option<ProcessRecord> {
        let pid = Pid::from_u32(pid);
        if self.threads.contains(&pid) {
            return None;
        }
        self.sys
            .process(pid)
            .map(|process| record_from_process(pid, process))
    }

    fn list_processes(&self) -> Result<Vec<ProcessRecord>> {
        Ok(self
            .processes()
            .map(|(pid, process)| record_from_process(*pid, process))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_contains_self() {
        let provider = SysinfoProvider::new();
        let me = std::process::id();
        assert!(provider.list_pids().unwrap().contains(&me));

        let record = provider.lookup(me).expect("own process should be listed");
        assert_eq!(record.pid, me);
        assert!(!record.defunct);
    }

    #[test]
    fn test_lookup_and_list_agree() {
        let provider = SysinfoProvider::new();
        let me = std::process::id();
        let listed = provider
            .list_processes()
            .unwrap()
            .into_iter()
            .find(|r| r.pid == me);
        assert_eq!(listed, provider.lookup(me));
    }
}
