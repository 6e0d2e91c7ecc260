use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProctreeError {
    #[error("Platform error: {0}")]
    Platform(String),
    #[error("Process not found: PID {0}")]
    ProcessNotFound(u32),
    #[error("Process already present in tree: PID {0}")]
    DuplicateProcess(u32),
    #[error("Tree root already set to PID {0}")]
    RootAlreadySet(u32),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProctreeError>;
