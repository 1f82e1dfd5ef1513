use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::paths::split_relative;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("I/O error on manifest {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("manifest {path:?} is malformed: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode manifest: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub name: String,
    pub updated_at: String,
    // `.` for root children; older files may hold `""`.
    pub path: String,
    pub size: u64,
    pub is_folder: bool,
}

impl ManifestEntry {
    pub fn document(
        name: impl Into<String>,
        updated_at: impl Into<String>,
        path: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            name: name.into(),
            updated_at: updated_at.into(),
            path: path.into(),
            size,
            is_folder: false,
        }
    }

    pub fn folder(
        name: impl Into<String>,
        updated_at: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            updated_at: updated_at.into(),
            path: path.into(),
            size: 0,
            is_folder: true,
        }
    }

    pub fn parent_components(&self) -> Vec<String> {
        split_relative(&self.path)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&ManifestEntry> {
        self.entries.get(id)
    }

    pub fn upsert(&mut self, id: impl Into<String>, entry: ManifestEntry) {
        self.entries.insert(id.into(), entry);
    }

    pub fn remove(&mut self, id: &str) -> Option<ManifestEntry> {
        self.entries.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ManifestEntry)> {
        self.entries.iter()
    }
}

#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Manifest, ManifestError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Manifest::new()),
            Err(source) => {
                return Err(ManifestError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Manifest::new());
        }
        serde_json::from_slice(&raw).map_err(|source| ManifestError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    pub async fn save(&self, manifest: &Manifest) -> Result<(), ManifestError> {
        let encoded = serde_json::to_vec(manifest)?;
        let partial = partial_path(&self.path);
        let io_err = |source: io::Error| ManifestError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        tokio::fs::write(&partial, &encoded).await.map_err(io_err)?;
        tokio::fs::rename(&partial, &self.path)
            .await
            .map_err(io_err)?;
        Ok(())
    }
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    target.with_file_name(name)
}
