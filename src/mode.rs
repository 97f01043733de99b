use crate::error::{Result, WrapperError};
use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Operating mode persisted across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Patch the Claude Code entry file to read AGENTS.md
    Agents,
    /// Launch Claude Code unmodified
    Claude,
}

impl Mode {
    fn as_token(self) -> &'static str {
        match self {
            Mode::Agents => "AGENTS",
            Mode::Claude => "CLAUDE",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Persists the mode to a single-line file under a base directory
/// (`~/.config/agents-code` in production). The base directory is injected
/// so tests never touch the real home directory.
pub struct ModeStore {
    path: PathBuf,
}

impl ModeStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: base_dir.into().join("mode"),
        }
    }

    pub fn default_location() -> Result<Self> {
        let home = std::env::var("HOME")
            .map_err(|_| WrapperError::Config("HOME environment variable not set".to_string()))?;
        Ok(Self::new(PathBuf::from(home).join(".config/agents-code")))
    }

    /// Read the persisted mode. An absent or unreadable file, or anything
    /// other than the CLAUDE token, falls back to the default AGENTS mode.
    pub fn load(&self) -> Mode {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                if contents.trim() == Mode::Claude.as_token() {
                    Mode::Claude
                } else {
                    Mode::Agents
                }
            }
            Err(e) => {
                debug!("No mode file at {}: {}", self.path.display(), e);
                Mode::Agents
            }
        }
    }

    pub fn save(&self, mode: Mode) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                WrapperError::Config(format!(
                    "Failed to create mode directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        std::fs::write(&self.path, mode.as_token()).map_err(|e| {
            WrapperError::Config(format!(
                "Failed to write mode file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(())
    }
}
