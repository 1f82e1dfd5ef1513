use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncWriteExt;

use super::paths::{PathError, join_relative, mirror_path};

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("path error: {0}")]
    Path(#[from] PathError),
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot move {from:?}: it is missing locally and {to:?} does not exist")]
    MissingSource { from: String, to: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relocation {
    Renamed,
    AlreadyInPlace,
}

#[derive(Debug, Clone)]
pub struct LocalMirror {
    root: PathBuf,
}

impl LocalMirror {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, components: &[String]) -> Result<PathBuf, MirrorError> {
        Ok(mirror_path(&self.root, components)?)
    }

    pub async fn ensure_dir(&self, components: &[String]) -> Result<PathBuf, MirrorError> {
        let path = self.resolve(components)?;
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| io_error(&path, source))?;
        Ok(path)
    }

    pub async fn relocate(
        &self,
        from: &[String],
        to: &[String],
    ) -> Result<Relocation, MirrorError> {
        if from == to {
            return Ok(Relocation::AlreadyInPlace);
        }
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;

        if !exists(&source).await? {
            if exists(&target).await? {
                return Ok(Relocation::AlreadyInPlace);
            }
            return Err(MirrorError::MissingSource {
                from: join_relative(from),
                to: join_relative(to),
            });
        }

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| io_error(parent, source))?;
        }
        tokio::fs::rename(&source, &target)
            .await
            .map_err(|err| io_error(&source, err))?;
        Ok(Relocation::Renamed)
    }

    pub async fn write_file(&self, components: &[String], bytes: &[u8]) -> Result<(), MirrorError> {
        let target = self.resolve(components)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| io_error(parent, source))?;
        }
        let partial = partial_path(&target);
        let mut file = tokio::fs::File::create(&partial)
            .await
            .map_err(|source| io_error(&partial, source))?;
        file.write_all(bytes)
            .await
            .map_err(|source| io_error(&partial, source))?;
        file.flush()
            .await
            .map_err(|source| io_error(&partial, source))?;
        file.sync_all()
            .await
            .map_err(|source| io_error(&partial, source))?;
        drop(file);

        tokio::fs::rename(&partial, &target)
            .await
            .map_err(|source| io_error(&target, source))?;
        Ok(())
    }

    pub async fn remove_file(&self, components: &[String]) -> Result<bool, MirrorError> {
        let path = self.resolve(components)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(io_error(&path, source)),
        }
    }

    pub async fn remove_empty_dir(&self, components: &[String]) -> Result<bool, MirrorError> {
        let path = self.resolve(components)?;
        match tokio::fs::remove_dir(&path).await {
            Ok(()) => Ok(true),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::DirectoryNotEmpty
                ) =>
            {
                Ok(false)
            }
            Err(source) => Err(io_error(&path, source)),
        }
    }
}

async fn exists(path: &Path) -> Result<bool, MirrorError> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: io::Error) -> MirrorError {
    MirrorError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn partial_path(target: &Path) -> PathBuf {
    target.with_extension(format!(
        "{}partial",
        target
            .extension()
            .map(|ext| format!("{}.", ext.to_string_lossy()))
            .unwrap_or_default()
    ))
}

pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1000.0;
    const MB: f64 = KB * 1000.0;
    const GB: f64 = MB * 1000.0;
    const TB: f64 = GB * 1000.0;

    let value = bytes as f64;
    if value < KB {
        format!("{bytes} B")
    } else if value < MB {
        format!("{:.2} KB", value / KB)
    } else if value < GB {
        format!("{:.2} MB", value / MB)
    } else if value < TB {
        format!("{:.2} GB", value / GB)
    } else {
        format!("{:.2} TB", value / TB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn parts(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[tokio::test]
    async fn write_file_creates_parents_and_leaves_no_partial() {
        let dir = tempdir().unwrap();
        let mirror = LocalMirror::new(dir.path());

        mirror
            .write_file(&parts(&["Work", "Plan.pdf"]), b"hello")
            .await
            .unwrap();

        let target = dir.path().join("Work/Plan.pdf");
        assert_eq!(std::fs::read(&target).unwrap(), b"hello");
        assert!(!dir.path().join("Work/Plan.pdf.partial").exists());
    }

    #[tokio::test]
    async fn relocate_moves_directory_with_contents() {
        let dir = tempdir().unwrap();
        let mirror = LocalMirror::new(dir.path());
        mirror
            .write_file(&parts(&["Old", "Plan.pdf"]), b"x")
            .await
            .unwrap();

        let outcome = mirror
            .relocate(&parts(&["Old"]), &parts(&["Archive", "New"]))
            .await
            .unwrap();

        assert_eq!(outcome, Relocation::Renamed);
        assert!(dir.path().join("Archive/New/Plan.pdf").exists());
        assert!(!dir.path().join("Old").exists());
    }

    #[tokio::test]
    async fn relocate_to_same_place_is_a_no_op() {
        let dir = tempdir().unwrap();
        let mirror = LocalMirror::new(dir.path());
        let outcome = mirror
            .relocate(&parts(&["A.pdf"]), &parts(&["A.pdf"]))
            .await
            .unwrap();
        assert_eq!(outcome, Relocation::AlreadyInPlace);
    }

    #[tokio::test]
    async fn relocate_accepts_already_moved_target() {
        let dir = tempdir().unwrap();
        let mirror = LocalMirror::new(dir.path());
        mirror.write_file(&parts(&["B.pdf"]), b"x").await.unwrap();

        let outcome = mirror
            .relocate(&parts(&["A.pdf"]), &parts(&["B.pdf"]))
            .await
            .unwrap();
        assert_eq!(outcome, Relocation::AlreadyInPlace);
    }

    #[tokio::test]
    async fn relocate_without_source_or_target_fails() {
        let dir = tempdir().unwrap();
        let mirror = LocalMirror::new(dir.path());
        let err = mirror
            .relocate(&parts(&["A.pdf"]), &parts(&["B.pdf"]))
            .await
            .unwrap_err();
        assert!(matches!(err, MirrorError::MissingSource { .. }));
    }

    #[tokio::test]
    async fn remove_empty_dir_keeps_non_empty_directory() {
        let dir = tempdir().unwrap();
        let mirror = LocalMirror::new(dir.path());
        mirror
            .write_file(&parts(&["Work", "keep.txt"]), b"x")
            .await
            .unwrap();
        mirror.ensure_dir(&parts(&["Empty"])).await.unwrap();

        assert!(!mirror.remove_empty_dir(&parts(&["Work"])).await.unwrap());
        assert!(dir.path().join("Work").exists());
        assert!(mirror.remove_empty_dir(&parts(&["Empty"])).await.unwrap());
        assert!(!dir.path().join("Empty").exists());
        assert!(!mirror.remove_empty_dir(&parts(&["Empty"])).await.unwrap());
    }

    #[tokio::test]
    async fn remove_file_tolerates_missing_file() {
        let dir = tempdir().unwrap();
        let mirror = LocalMirror::new(dir.path());
        assert!(!mirror.remove_file(&parts(&["gone.pdf"])).await.unwrap());
    }

    #[test]
    fn format_size_uses_decimal_units() {
        assert_eq!(format_size(999), "999 B");
        assert_eq!(format_size(1_500), "1.50 KB");
        assert_eq!(format_size(2_000_000), "2.00 MB");
        assert_eq!(format_size(3_250_000_000), "3.25 GB");
    }
}
