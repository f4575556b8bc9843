use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// The full-screen client owns the terminal, so it logs to a file under the
/// local data dir. One-shot commands log to stderr. `RUST_LOG` overrides the
/// default filter either way.
pub fn init(verbose: bool, to_file: bool) -> Result<Option<PathBuf>> {
    let filter = if verbose {
        "ragchat=debug,ragchat_core=debug"
    } else {
        "ragchat=info,ragchat_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    if !to_file {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
        return Ok(None);
    }

    let path = log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Could not create log directory {}", parent.display()))?;
    }
    let file = File::create(&path)
        .with_context(|| format!("Could not create log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();

    Ok(Some(path))
}

fn log_path() -> Result<PathBuf> {
    let dir = dirs::data_local_dir().context("Could not determine local data directory")?;
    Ok(dir.join("ragchat").join("ragchat.log"))
}
