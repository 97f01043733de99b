use crate::error::{Result, WrapperError};
use crate::locate::EntryFile;
use crate::strings;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Sentinel recording that the user approved patching this install.
const CONSENT_FLAG: &str = ".agents-code-consent";

pub fn consent_flag_path(install_dir: &Path) -> PathBuf {
    install_dir.join(CONSENT_FLAG)
}

/// The prompt is skipped only when both the patched entry file and the
/// consent flag exist. A reinstall of the wrapped package removes the
/// patched file and thereby forces re-consent.
pub fn needs_prompt(install_dir: &Path, entry: &EntryFile) -> bool {
    !(entry.patched.is_file() && consent_flag_path(install_dir).is_file())
}

/// Run the one-time consent gate for this install. Declining is fatal to
/// the run; an unwritable flag file is not (the prompt simply reappears
/// next time).
pub fn ensure_consent(install_dir: &Path, entry: &EntryFile) -> Result<()> {
    if !needs_prompt(install_dir, entry) {
        debug!("Patching previously approved for this install");
        return Ok(());
    }

    if !prompt_consent(&entry.original)? {
        return Err(WrapperError::ConsentDeclined);
    }

    let flag = consent_flag_path(install_dir);
    if let Err(e) = std::fs::write(&flag, "") {
        warn!("Failed to record consent at {}: {}", flag.display(), e);
    }
    Ok(())
}

fn prompt_consent(original: &Path) -> Result<bool> {
    use std::io::{self, Write};

    println!(
        "{}",
        strings::format_string(strings::CONSENT_EXPLAIN, &original.display())
    );
    print!("{}", strings::CONSENT_QUESTION);
    io::stdout()
        .flush()
        .map_err(|e| WrapperError::Config(format!("Failed to flush stdout: {e}")))?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .map_err(|e| WrapperError::Config(format!("Failed to read input: {e}")))?;

    let answer = input.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}
