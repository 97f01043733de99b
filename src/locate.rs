use crate::error::{Result, WrapperError};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// npm name of the wrapped package.
pub const CLAUDE_CODE_PACKAGE: &str = "@anthropic-ai/claude-code";

/// Entry-file conventions probed inside the install directory, in order of
/// preference.
const ENTRY_CANDIDATES: [&str; 2] = ["cli.js", "cli.mjs"];

/// Resolved installation of the wrapped Claude Code package.
#[derive(Debug, Clone)]
pub struct Install {
    pub dir: PathBuf,
    pub global: bool,
}

/// Original entry file plus the sibling path the patched copy is written to.
#[derive(Debug, Clone)]
pub struct EntryFile {
    pub original: PathBuf,
    pub patched: PathBuf,
}

/// Directory the wrapper itself runs from, used as the origin for the
/// install-root walk.
pub fn wrapper_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Walk `start` and its ancestors for the nearest directory containing a
/// `node_modules` tree. When the walk reaches the filesystem root without a
/// hit, `start` itself is used; downstream reads then fail with a diagnostic
/// naming the concrete missing path.
pub fn find_install_root(start: &Path) -> PathBuf {
    for dir in start.ancestors() {
        if dir.join("node_modules").is_dir() {
            debug!("Install root: {}", dir.display());
            return dir.to_path_buf();
        }
    }
    debug!(
        "No node_modules above {}, treating it as the install root",
        start.display()
    );
    start.to_path_buf()
}

/// Query npm for a globally installed copy of the wrapped package. Any
/// failure (npm missing, non-zero exit, empty output) means no global
/// install is considered; startup never aborts here.
pub async fn global_install_dir() -> Option<PathBuf> {
    let npm = match which::which("npm") {
        Ok(path) => path,
        Err(e) => {
            debug!("npm not found: {}", e);
            return None;
        }
    };

    let output = match Command::new(npm).args(["root", "-g"]).output().await {
        Ok(output) => output,
        Err(e) => {
            debug!("npm root -g failed to start: {}", e);
            return None;
        }
    };
    if !output.status.success() {
        debug!("npm root -g exited with {}", output.status);
        return None;
    }

    let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if root.is_empty() {
        return None;
    }

    let dir = PathBuf::from(root).join(CLAUDE_CODE_PACKAGE);
    if dir.is_dir() {
        Some(dir)
    } else {
        debug!("No global install at {}", dir.display());
        None
    }
}

/// Pick the installation to run: a global install wins when present,
/// otherwise the local path under the install root is used unconditionally.
/// The nested candidate covers the wrapper being installed as a dependency
/// of another package.
pub async fn resolve_install(install_root: &Path) -> Install {
    if let Some(dir) = global_install_dir().await {
        info!("Using global Claude Code install at {}", dir.display());
        return Install { dir, global: true };
    }

    let local = local_install_dir(install_root);
    debug!("Using local Claude Code install at {}", local.display());
    Install {
        dir: local,
        global: false,
    }
}

fn local_install_dir(install_root: &Path) -> PathBuf {
    let primary = install_root.join("node_modules").join(CLAUDE_CODE_PACKAGE);
    if primary.is_dir() {
        return primary;
    }
    let nested = install_root
        .join("node_modules/agents-code/node_modules")
        .join(CLAUDE_CODE_PACKAGE);
    if nested.is_dir() {
        return nested;
    }
    primary
}

/// Probe the entry-file candidates. The first one found fixes both the
/// original path and the name of its patched sibling.
pub fn entry_file(install: &Install) -> Result<EntryFile> {
    for candidate in ENTRY_CANDIDATES {
        let original = install.dir.join(candidate);
        if original.is_file() {
            let patched = install.dir.join(patched_name(candidate));
            return Ok(EntryFile { original, patched });
        }
    }
    Err(WrapperError::EntryNotFound(install.dir.clone()))
}

fn patched_name(entry: &str) -> String {
    match entry.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}-agents.{ext}"),
        None => format!("{entry}-agents"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_install_root_nearest_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("project");
        std::fs::create_dir_all(root.join("node_modules")).unwrap();
        let start = root.join("node_modules/.bin");
        std::fs::create_dir_all(&start).unwrap();

        assert_eq!(find_install_root(&start), root);
    }

    #[test]
    fn test_find_install_root_falls_back_to_start() {
        let dir = tempfile::tempdir().unwrap();
        let start = dir.path().join("no/manifest/here");
        std::fs::create_dir_all(&start).unwrap();

        assert_eq!(find_install_root(&start), start);
    }

    #[test]
    fn test_local_install_prefers_primary_path() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("node_modules").join(CLAUDE_CODE_PACKAGE);
        std::fs::create_dir_all(&primary).unwrap();

        assert_eq!(local_install_dir(dir.path()), primary);
    }

    #[test]
    fn test_local_install_falls_back_to_nested_path() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir
            .path()
            .join("node_modules/agents-code/node_modules")
            .join(CLAUDE_CODE_PACKAGE);
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(local_install_dir(dir.path()), nested);
    }

    #[test]
    fn test_local_install_uses_primary_when_neither_exists() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("node_modules").join(CLAUDE_CODE_PACKAGE);

        assert_eq!(local_install_dir(dir.path()), primary);
    }

    #[test]
    fn test_entry_file_prefers_cli_js() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cli.js"), "js").unwrap();
        std::fs::write(dir.path().join("cli.mjs"), "mjs").unwrap();

        let install = Install {
            dir: dir.path().to_path_buf(),
            global: false,
        };
        let entry = entry_file(&install).unwrap();
        assert_eq!(entry.original, dir.path().join("cli.js"));
        assert_eq!(entry.patched, dir.path().join("cli-agents.js"));
    }

    #[test]
    fn test_entry_file_falls_back_to_cli_mjs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cli.mjs"), "mjs").unwrap();

        let install = Install {
            dir: dir.path().to_path_buf(),
            global: false,
        };
        let entry = entry_file(&install).unwrap();
        assert_eq!(entry.original, dir.path().join("cli.mjs"));
        assert_eq!(entry.patched, dir.path().join("cli-agents.mjs"));
    }

    #[test]
    fn test_entry_file_missing_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let install = Install {
            dir: dir.path().to_path_buf(),
            global: false,
        };
        assert!(matches!(
            entry_file(&install),
            Err(WrapperError::EntryNotFound(_))
        ));
    }

    #[test]
    fn test_patched_name() {
        assert_eq!(patched_name("cli.js"), "cli-agents.js");
        assert_eq!(patched_name("cli.mjs"), "cli-agents.mjs");
        assert_eq!(patched_name("cli"), "cli-agents");
    }
}
