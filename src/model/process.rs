/// Identity and zombie status of one process, as observed at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: u32,
    /// OS-reported parent. May name a process outside the tree.
    pub ppid: u32,
    pub defunct: bool,
}

impl ProcessRecord {
    pub fn new(pid: u32, ppid: u32, defunct: bool) -> Self {
        Self { pid, ppid, defunct }
    }

    /// `<pid> <ppid>`, the line printed for a plain membership check.
    pub fn display_line(&self) -> String {
        format!("{} {}", self.pid, self.ppid)
    }
}
