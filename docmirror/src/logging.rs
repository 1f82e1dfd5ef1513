use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::MirrorConfig;

pub fn init(config: &MirrorConfig) -> anyhow::Result<Option<PathBuf>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(config.verbose)))?;
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_path() {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            registry
                .with(
                    fmt::layer()
                        .with_writer(Arc::new(file))
                        .with_ansi(false)
                        .with_target(false),
                )
                .try_init()?;
            Ok(Some(path))
        }
        None => {
            registry
                .with(fmt::layer().with_writer(std::io::stdout).with_target(false))
                .try_init()?;
            Ok(None)
        }
    }
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "info" } else { "warn" }
}
