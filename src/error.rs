use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WrapperError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Claude Code entry file not found in {} (tried cli.js and cli.mjs)", .0.display())]
    EntryNotFound(PathBuf),

    #[error("Patching declined, not launching Claude Code")]
    ConsentDeclined,

    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),
}

pub type Result<T> = std::result::Result<T, WrapperError>;
