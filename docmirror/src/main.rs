use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use docmirror::config::{DEFAULT_DOCUMENT_EXTENSION, FailurePolicy, MirrorConfig};
use docmirror::logging;
use docmirror::session::MirrorSession;
use docmirror_core::DEFAULT_BASE_URL;
use tracing::error;

#[derive(Debug, Parser)]
#[command(name = "docmirror")]
#[command(about = "Back up the documents on a tablet's web interface as local files")]
struct Cli {
    /// Directory that receives the backups, the manifest and the log file.
    #[arg(long = "backups-dir", env = "DOCMIRROR_BACKUPS_DIR", default_value = ".")]
    backups_dir: PathBuf,

    /// Address of the tablet web interface.
    #[arg(long, env = "DOCMIRROR_URL", default_value = DEFAULT_BASE_URL)]
    url: String,

    /// Document or folder path to back up, relative to the root. Folders need
    /// a trailing slash (`foo/bar/`). Repeat to include several items.
    #[arg(short = 'i', long = "include", value_name = "PATH")]
    include: Vec<String>,

    /// Document or folder path to skip; same syntax as --include.
    #[arg(short = 'e', long = "exclude", value_name = "PATH")]
    exclude: Vec<String>,

    /// Append logs to <backups-dir>/.backup.logs instead of stdout.
    #[arg(short = 'l', long = "log-to-file")]
    log_to_file: bool,

    #[arg(short, long)]
    verbose: bool,

    /// Skip items that fail instead of aborting the whole run.
    #[arg(long)]
    keep_going: bool,

    /// Remove local copies of items that no longer exist remotely.
    #[arg(long)]
    prune: bool,

    /// File extension of downloaded documents.
    #[arg(long, default_value = DEFAULT_DOCUMENT_EXTENSION)]
    extension: String,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<MirrorConfig> {
        let backup_root = std::path::absolute(&self.backups_dir).with_context(|| {
            format!(
                "failed to resolve backups directory {}",
                self.backups_dir.display()
            )
        })?;
        let mut config = MirrorConfig::new(backup_root).with_base_url(self.url);
        config.include = self.include;
        config.exclude = self.exclude;
        config.log_to_file = self.log_to_file;
        config.verbose = self.verbose;
        config.failure_policy = if self.keep_going {
            FailurePolicy::SkipSubtree
        } else {
            FailurePolicy::Abort
        };
        config.prune = self.prune;
        config.document_extension = self.extension;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_config()?;
    let log_file = logging::init(&config)?;

    let outcome = run(config).await;
    if let Err(err) = &outcome {
        error!("{err:#}");
    }
    if let Some(path) = log_file {
        eprintln!("Logs written to {}", path.display());
    }
    outcome
}

async fn run(config: MirrorConfig) -> anyhow::Result<()> {
    let session = MirrorSession::bootstrap(config).await?;
    session.run().await?;
    Ok(())
}
