mod cli;
mod consent;
mod error;
mod launch;
mod locate;
mod mode;
mod patch;
mod strings;
mod update;

use cli::{Cli, Commands};
use error::WrapperError;
use mode::{Mode, ModeStore};
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Any non-empty value other than "0"/"false" enables debug diagnostics.
const DEBUG_ENV: &str = "AGENTS_CODE_DEBUG";

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    let filter = if debug_enabled() {
        "agents_code=debug,info"
    } else {
        "agents_code=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn debug_enabled() -> bool {
    std::env::var(DEBUG_ENV)
        .map(|v| !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false"))
        .unwrap_or(false)
}

async fn run(cli: Cli) -> error::Result<i32> {
    if let Some(Commands::Mode { value }) = cli.command {
        let store = ModeStore::default_location()?;
        match value {
            Some(mode) => {
                store.save(mode)?;
                println!("{}", strings::format_string(strings::MODE_SET, &mode));
            }
            None => println!("{}", store.load()),
        }
        return Ok(0);
    }

    let install_root = locate::find_install_root(&locate::wrapper_dir());
    let install = locate::resolve_install(&install_root).await;

    // The update check runs in both modes, before any dispatch. It may
    // materialize a fresh install tree, so the entry file is probed after.
    let global_dir = install.global.then_some(install.dir.as_path());
    update::refresh_if_outdated(&install_root, global_dir).await;

    let entry = locate::entry_file(&install)?;

    let persisted = load_mode();
    if cli.unmodified || persisted == Mode::Claude {
        debug!("Launching Claude Code unmodified");
        return launch::run_entry(&entry.original, &cli.args).await;
    }

    consent::ensure_consent(&install.dir, &entry)?;

    // The patched file is regenerated from the current original on every
    // run; its prior existence only feeds the consent check above.
    let source = tokio::fs::read_to_string(&entry.original)
        .await
        .map_err(|e| {
            WrapperError::Config(format!("Failed to read {}: {}", entry.original.display(), e))
        })?;
    let patched = patch::apply(&source, !install.global);
    tokio::fs::write(&entry.patched, patched).await.map_err(|e| {
        WrapperError::Config(format!("Failed to write {}: {}", entry.patched.display(), e))
    })?;

    launch::run_entry(&entry.patched, &cli.args).await
}

/// Mode lookup never fails; a missing HOME falls back to the default.
fn load_mode() -> Mode {
    match ModeStore::default_location() {
        Ok(store) => store.load(),
        Err(e) => {
            debug!("Cannot locate mode file: {}", e);
            Mode::Agents
        }
    }
}
