//! Tracing subscriber setup

use crate::config::LoggingConfig;
use crate::error::{Error, Result};
use std::fs::File;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Level used when `RUST_LOG` is unset
pub fn default_level(config: &LoggingConfig, verbose: bool) -> Level {
    if verbose {
        Level::DEBUG.max(config.level.into())
    } else {
        config.level.into()
    }
}

/// Install the global subscriber.
///
/// Writes to `config.file` when set (truncated, no ANSI colors), otherwise
/// to stderr. `RUST_LOG` directives take precedence over the configured level.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level(config, verbose).into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|e| Error::config(format!("Failed to initialize logging: {e}")))
}
