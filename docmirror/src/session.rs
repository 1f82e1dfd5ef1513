use anyhow::Context;
use docmirror_core::DocumentClient;
use tracing::info;

use crate::config::MirrorConfig;
use crate::sync::filter::PathFilter;
use crate::sync::manifest::ManifestStore;
use crate::sync::mirror::{LocalMirror, format_size};
use crate::sync::prune::{PruneReport, prune_vanished};
use crate::sync::walker::{TreeWalker, WalkReport};

#[derive(Debug)]
pub struct SessionSummary {
    pub walk: WalkReport,
    pub prune: Option<PruneReport>,
    pub manifest_entries: usize,
}

pub struct MirrorSession {
    config: MirrorConfig,
    walker: TreeWalker,
    store: ManifestStore,
}

impl MirrorSession {
    pub async fn bootstrap(config: MirrorConfig) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&config.backup_root)
            .await
            .with_context(|| {
                format!(
                    "failed to create backup root at {}",
                    config.backup_root.display()
                )
            })?;

        let client = DocumentClient::with_base_url(&config.base_url)
            .with_context(|| format!("invalid remote url {}", config.base_url))?;
        let walker = TreeWalker::new(
            client,
            LocalMirror::new(config.backup_root.clone()),
            PathFilter::new(&config.include, &config.exclude),
        )
        .with_failure_policy(config.failure_policy)
        .with_document_extension(config.document_extension.clone());
        let store = ManifestStore::new(config.manifest_path());

        Ok(Self {
            config,
            walker,
            store,
        })
    }

    pub async fn run(self) -> anyhow::Result<SessionSummary> {
        info!(
            "Begin backups: root={}, remote={}",
            self.config.backup_root.display(),
            self.config.base_url
        );
        let mut manifest = self
            .store
            .load()
            .await
            .context("failed to load manifest")?;

        // An aborted walk returns before the save below, so the file on disk
        // keeps describing the last completed run.
        let walk = self
            .walker
            .walk(&mut manifest)
            .await
            .context("backup aborted, manifest left unchanged")?;

        let prune = if self.config.prune {
            Some(
                prune_vanished(&self.walker, &mut manifest, &walk)
                    .await
                    .context("failed to prune vanished items")?,
            )
        } else {
            None
        };

        self.store
            .save(&manifest)
            .await
            .with_context(|| format!("failed to write {}", self.store.path().display()))?;

        info!(
            "Complete backups: {} folder(s), {} document(s), {} download(s) ({}), {} move(s), {} failure(s)",
            walk.folders_visited,
            walk.documents_seen,
            walk.downloads,
            format_size(walk.bytes_downloaded),
            walk.renames,
            walk.failures.len()
        );

        Ok(SessionSummary {
            walk,
            prune,
            manifest_entries: manifest.len(),
        })
    }
}
