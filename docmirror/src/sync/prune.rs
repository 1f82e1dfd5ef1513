use std::collections::HashSet;

use tracing::{info, warn};

use super::manifest::{Manifest, ManifestEntry};
use super::mirror::MirrorError;
use super::paths::PathStack;
use super::walker::{TreeWalker, WalkReport};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PruneReport {
    pub removed_documents: usize,
    pub removed_folders: usize,
    pub kept_folders: usize,
}

struct Candidate {
    id: String,
    display_name: String,
    location: Vec<String>,
}

// Unvisited subtrees look deleted after a failed walk, so nothing is pruned then.
pub async fn prune_vanished(
    walker: &TreeWalker,
    manifest: &mut Manifest,
    report: &WalkReport,
) -> Result<PruneReport, MirrorError> {
    let mut outcome = PruneReport::default();
    if !report.is_clean() {
        warn!(
            "skipping prune: {} item(s) failed during the walk",
            report.failures.len()
        );
        return Ok(outcome);
    }

    let mut occupied = HashSet::new();
    let mut documents = Vec::new();
    let mut folders = Vec::new();
    for (id, entry) in manifest.iter() {
        // Visited entries already hold this run's placement; older ones still
        // need the folder moves applied.
        if report.visited.contains(id) {
            occupied.insert(recorded_location(walker, entry));
            continue;
        }
        let location = report.relocations.resolve(&recorded_location(walker, entry));
        let parent = PathStack::from_components(entry.parent_components());
        let display_name = parent.display_name(&entry.name, entry.is_folder);
        if !walker
            .filter()
            .admits(&display_name, entry.is_folder, parent.components())
        {
            continue;
        }
        let candidate = Candidate {
            id: id.clone(),
            display_name,
            location,
        };
        if entry.is_folder {
            folders.push(candidate);
        } else {
            documents.push(candidate);
        }
    }

    for candidate in documents {
        if !occupied.contains(&candidate.location) {
            walker.mirror().remove_file(&candidate.location).await?;
        }
        manifest.remove(&candidate.id);
        outcome.removed_documents += 1;
        info!("removed {}", candidate.display_name);
    }

    folders.sort_by(|a, b| b.location.len().cmp(&a.location.len()));
    for candidate in folders {
        if occupied.contains(&candidate.location) {
            manifest.remove(&candidate.id);
            continue;
        }
        let removed = walker.mirror().remove_empty_dir(&candidate.location).await?;
        let path = walker.mirror().resolve(&candidate.location)?;
        let still_there = tokio::fs::try_exists(&path)
            .await
            .map_err(|source| MirrorError::Io {
                path: path.clone(),
                source,
            })?;
        if removed || !still_there {
            manifest.remove(&candidate.id);
            outcome.removed_folders += 1;
            info!("removed {}", candidate.display_name);
        } else {
            outcome.kept_folders += 1;
            warn!("kept {}: directory is not empty", candidate.display_name);
        }
    }

    Ok(outcome)
}

fn recorded_location(walker: &TreeWalker, entry: &ManifestEntry) -> Vec<String> {
    let mut location = entry.parent_components();
    if entry.is_folder {
        location.push(entry.name.clone());
    } else {
        location.push(walker.artifact_name(&entry.name));
    }
    location
}
