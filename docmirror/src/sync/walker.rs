use std::collections::HashSet;
use std::time::Instant;

use docmirror_core::{DocumentClient, DocumentError, ItemKind, RemoteItem};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::detect::{is_modified, is_moved, normalize_timestamp};
use super::filter::PathFilter;
use super::manifest::{Manifest, ManifestEntry};
use super::mirror::{LocalMirror, MirrorError, Relocation, format_size};
use super::paths::{PathError, PathStack, join_relative};
use super::relocation::RelocationLog;
use crate::config::FailurePolicy;

const ROOT_FOLDER_ID: &str = "";

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("remote error: {0}")]
    Remote(#[from] DocumentError),
    #[error("mirror error: {0}")]
    Mirror(#[from] MirrorError),
    #[error("path error: {0}")]
    Path(#[from] PathError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub id: String,
    pub display_name: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct WalkReport {
    pub folders_visited: usize,
    pub documents_seen: usize,
    pub filtered_out: usize,
    pub downloads: usize,
    pub renames: usize,
    pub bytes_downloaded: u64,
    pub visited: HashSet<String>,
    pub failures: Vec<ItemFailure>,
    pub relocations: RelocationLog,
}

impl WalkReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct TreeWalker {
    client: DocumentClient,
    mirror: LocalMirror,
    filter: PathFilter,
    policy: FailurePolicy,
    extension: String,
}

impl TreeWalker {
    pub fn new(client: DocumentClient, mirror: LocalMirror, filter: PathFilter) -> Self {
        Self {
            client,
            mirror,
            filter,
            policy: FailurePolicy::Abort,
            extension: crate::config::DEFAULT_DOCUMENT_EXTENSION.to_string(),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_document_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn mirror(&self) -> &LocalMirror {
        &self.mirror
    }

    pub fn filter(&self) -> &PathFilter {
        &self.filter
    }

    pub fn artifact_name(&self, name: &str) -> String {
        let extension = self.extension.trim_start_matches('.');
        if extension.is_empty() {
            name.to_string()
        } else {
            format!("{name}.{extension}")
        }
    }

    pub async fn walk(&self, manifest: &mut Manifest) -> Result<WalkReport, WalkError> {
        let mut report = WalkReport::default();
        let mut stack = PathStack::new();
        self.walk_folder(&mut stack, ROOT_FOLDER_ID, manifest, &mut report)
            .await?;
        Ok(report)
    }

    async fn walk_folder(
        &self,
        stack: &mut PathStack,
        folder_id: &str,
        manifest: &mut Manifest,
        report: &mut WalkReport,
    ) -> Result<(), WalkError> {
        self.mirror.ensure_dir(stack.components()).await?;
        let items = self.client.list_children(folder_id).await?;
        report.folders_visited += 1;

        for item in items {
            let display_name = stack.display_name(&item.name, item.is_folder());
            if item.kind == ItemKind::Unknown {
                debug!("ignoring {display_name}: unsupported item type");
                continue;
            }
            if !self
                .filter
                .admits(&display_name, item.is_folder(), stack.components())
            {
                debug!("filtered out {display_name}");
                report.filtered_out += 1;
                continue;
            }
            report.visited.insert(item.id.clone());

            let result = if item.is_folder() {
                self.visit_folder(stack, &item, manifest, report).await
            } else {
                self.visit_document(stack, &item, &display_name, manifest, report)
                    .await
            };

            if let Err(err) = result {
                match self.policy {
                    FailurePolicy::Abort => return Err(err),
                    FailurePolicy::SkipSubtree => {
                        warn!("skipping {display_name}: {err}");
                        report.failures.push(ItemFailure {
                            id: item.id.clone(),
                            display_name,
                            error: err.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    async fn visit_document(
        &self,
        stack: &PathStack,
        item: &RemoteItem,
        display_name: &str,
        manifest: &mut Manifest,
        report: &mut WalkReport,
    ) -> Result<(), WalkError> {
        let parent = stack.relative();
        let updated_at = normalize_timestamp(&item.updated_at);
        let size = item.size_bytes();
        let previous = manifest.get(&item.id).cloned();
        let target = stack.child(&self.artifact_name(&item.name));

        if let Some(previous) = previous
            .as_ref()
            .filter(|entry| is_moved(Some(*entry), &item.name, &parent))
        {
            let mut recorded = previous.parent_components();
            recorded.push(self.artifact_name(&previous.name));
            let source = report.relocations.resolve(&recorded);
            if self.mirror.relocate(&source, &target).await? == Relocation::Renamed {
                report.renames += 1;
            }
            info!(
                "moved document '{}' -> '{}'",
                join_relative(&source),
                join_relative(&target)
            );
        }

        if is_modified(previous.as_ref(), false, &updated_at, size) {
            info!("{display_name} ...");
            let started = Instant::now();
            let fetched = self.client.fetch_content(&item.id).await?;
            let length = fetched.bytes.len() as u64;
            debug!(suggested = %fetched.file_name, "downloaded {display_name}");
            self.mirror.write_file(&target, &fetched.bytes).await?;
            info!(
                "time: {:.2}s | size: {}",
                started.elapsed().as_secs_f64(),
                format_size(length)
            );
            report.downloads += 1;
            report.bytes_downloaded += length;
        }

        manifest.upsert(
            item.id.clone(),
            ManifestEntry::document(&item.name, updated_at, parent, size),
        );
        report.documents_seen += 1;
        Ok(())
    }

    async fn visit_folder(
        &self,
        stack: &mut PathStack,
        item: &RemoteItem,
        manifest: &mut Manifest,
        report: &mut WalkReport,
    ) -> Result<(), WalkError> {
        let parent = stack.relative();
        let updated_at = normalize_timestamp(&item.updated_at);
        let target = stack.child(&item.name);

        if let Some(previous) = manifest
            .get(&item.id)
            .filter(|entry| is_moved(Some(*entry), &item.name, &parent))
        {
            let mut recorded = previous.parent_components();
            recorded.push(previous.name.clone());
            let source = report.relocations.resolve(&recorded);
            if self.mirror.relocate(&source, &target).await? == Relocation::Renamed {
                report.renames += 1;
            }
            info!(
                "moved folder '{}/' -> '{}/'",
                join_relative(&source),
                join_relative(&target)
            );
            report.relocations.record(source, target);
        }

        stack.push(item.name.clone());
        let outcome = Box::pin(self.walk_folder(stack, &item.id, manifest, report)).await;
        stack.pop();

        // The directory is in place even when part of its subtree failed.
        manifest.upsert(
            item.id.clone(),
            ManifestEntry::folder(&item.name, updated_at, parent),
        );
        outcome
    }
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;
