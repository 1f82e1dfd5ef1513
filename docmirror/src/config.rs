use std::path::PathBuf;

use docmirror_core::DEFAULT_BASE_URL;

pub const MANIFEST_FILE_NAME: &str = ".backup_info.json";
pub const LOG_FILE_NAME: &str = ".backup.logs";
pub const DEFAULT_DOCUMENT_EXTENSION: &str = "pdf";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    #[default]
    Abort,
    SkipSubtree,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    pub backup_root: PathBuf,
    pub base_url: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub log_to_file: bool,
    pub verbose: bool,
    pub failure_policy: FailurePolicy,
    pub prune: bool,
    pub document_extension: String,
}

impl MirrorConfig {
    pub fn new(backup_root: impl Into<PathBuf>) -> Self {
        Self {
            backup_root: backup_root.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            include: Vec::new(),
            exclude: Vec::new(),
            log_to_file: false,
            verbose: false,
            failure_policy: FailurePolicy::default(),
            prune: false,
            document_extension: DEFAULT_DOCUMENT_EXTENSION.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.backup_root.join(MANIFEST_FILE_NAME)
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_to_file.then(|| self.backup_root.join(LOG_FILE_NAME))
    }
}
