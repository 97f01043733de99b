use crate::error::{Result, WrapperError};
use crate::locate::CLAUDE_CODE_PACKAGE;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error, info};

#[derive(Debug, Deserialize)]
struct PackageManifest {
    version: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
}

/// Outcome of comparing the pinned version against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateAction {
    None,
    /// Pin is the floating "latest" marker; reinstall to pick up the newest
    /// resolution.
    Refresh,
    /// Rewrite the pin to this version, then reinstall.
    Upgrade(String),
}

pub fn plan_update(pinned: Option<&str>, latest: Option<&str>) -> UpdateAction {
    match (pinned, latest) {
        (Some("latest"), _) => UpdateAction::Refresh,
        (Some(pinned), Some(latest)) if pinned != latest => {
            UpdateAction::Upgrade(latest.to_string())
        }
        _ => UpdateAction::None,
    }
}

/// Check the registry and refresh the wrapped package if it is out of date.
/// Runs before every dispatch, in both modes. Failures never abort the run;
/// the launcher continues with whatever is already installed.
pub async fn refresh_if_outdated(install_root: &Path, global_dir: Option<&Path>) {
    if let Err(e) = try_refresh(install_root, global_dir).await {
        error!("Update check failed: {}", e);
    }
}

async fn try_refresh(install_root: &Path, global_dir: Option<&Path>) -> Result<()> {
    let latest = latest_version().await;
    let manifest_path = install_root.join("package.json");
    let pinned = pinned_version(&manifest_path);

    if let Some(dir) = global_dir {
        if let Some(version) = installed_version(dir) {
            debug!("Global Claude Code install reports version {}", version);
        }
    }

    match plan_update(pinned.as_deref(), latest.as_deref()) {
        UpdateAction::None => {
            debug!("Claude Code is up to date");
        }
        UpdateAction::Refresh => {
            info!("Version pin is 'latest', refreshing dependency install");
            npm_install(install_root).await?;
        }
        UpdateAction::Upgrade(version) => {
            info!(
                "Updating Claude Code {} -> {}",
                pinned.as_deref().unwrap_or("?"),
                version
            );
            rewrite_pin(&manifest_path, &version)?;
            npm_install(install_root).await?;
        }
    }
    Ok(())
}

/// Latest published version of the wrapped package. Any failure collapses
/// to "no update available".
async fn latest_version() -> Option<String> {
    let npm = match which::which("npm") {
        Ok(path) => path,
        Err(e) => {
            debug!("npm not found: {}", e);
            return None;
        }
    };

    let output = match Command::new(npm)
        .args(["view", CLAUDE_CODE_PACKAGE, "version"])
        .output()
        .await
    {
        Ok(output) => output,
        Err(e) => {
            debug!("npm view failed to start: {}", e);
            return None;
        }
    };
    if !output.status.success() {
        debug!("npm view exited with {}", output.status);
        return None;
    }

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if version.is_empty() {
        None
    } else {
        Some(version)
    }
}

/// Version string pinned in the install root's manifest, if any.
fn pinned_version(manifest_path: &Path) -> Option<String> {
    let contents = match std::fs::read_to_string(manifest_path) {
        Ok(contents) => contents,
        Err(e) => {
            debug!("No manifest at {}: {}", manifest_path.display(), e);
            return None;
        }
    };
    let manifest: PackageManifest = match serde_json::from_str(&contents) {
        Ok(manifest) => manifest,
        Err(e) => {
            debug!("Unparseable manifest {}: {}", manifest_path.display(), e);
            return None;
        }
    };
    manifest.dependencies.get(CLAUDE_CODE_PACKAGE).cloned()
}

/// Concrete version of an installed package directory, read for diagnostics
/// only.
fn installed_version(package_dir: &Path) -> Option<String> {
    let contents = std::fs::read_to_string(package_dir.join("package.json")).ok()?;
    let manifest: PackageManifest = serde_json::from_str(&contents).ok()?;
    manifest.version
}

/// Rewrite the manifest's version pin in place, preserving every other
/// field.
fn rewrite_pin(manifest_path: &Path, version: &str) -> Result<()> {
    let contents = std::fs::read_to_string(manifest_path)?;
    let mut manifest: serde_json::Value = serde_json::from_str(&contents)?;

    let deps = manifest
        .as_object_mut()
        .ok_or_else(|| {
            WrapperError::Config(format!(
                "Manifest {} is not a JSON object",
                manifest_path.display()
            ))
        })?
        .entry("dependencies")
        .or_insert_with(|| serde_json::json!({}));
    deps.as_object_mut()
        .ok_or_else(|| {
            WrapperError::Config(format!(
                "Manifest {} has a non-object dependencies field",
                manifest_path.display()
            ))
        })?
        .insert(
            CLAUDE_CODE_PACKAGE.to_string(),
            serde_json::Value::String(version.to_string()),
        );

    let mut output = serde_json::to_string_pretty(&manifest)?;
    output.push('\n');
    std::fs::write(manifest_path, output)?;
    Ok(())
}

/// Run `npm install` in the install root with inherited stdio so the user
/// sees progress. A failure propagates to the caller, where it is logged
/// and the run continues with the previously installed tree.
async fn npm_install(install_root: &Path) -> Result<()> {
    let npm = which::which("npm")
        .map_err(|e| WrapperError::ExecutionFailed(format!("npm not found: {e}")))?;

    let status = Command::new(npm)
        .arg("install")
        .current_dir(install_root)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| WrapperError::ExecutionFailed(format!("Failed to run npm install: {e}")))?;

    if !status.success() {
        return Err(WrapperError::ExecutionFailed(format!(
            "npm install exited with status: {status}"
        )));
    }
    Ok(())
}
