use std::path::{Component, Path, PathBuf};

use thiserror::Error;

pub const ROOT_RELATIVE: &str = ".";
const SEPARATOR: char = '/';

#[derive(Debug, Error)]
pub enum PathError {
    #[error("remote name is empty")]
    Empty,
    #[error("remote name {0:?} cannot be used as a path component")]
    UnsupportedComponent(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathStack {
    names: Vec<String>,
}

impl PathStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_components(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn push(&mut self, name: impl Into<String>) {
        self.names.push(name.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.names.pop()
    }

    pub fn is_root(&self) -> bool {
        self.names.is_empty()
    }

    pub fn components(&self) -> &[String] {
        &self.names
    }

    pub fn relative(&self) -> String {
        join_relative(&self.names)
    }

    pub fn display_name(&self, name: &str, is_folder: bool) -> String {
        let mut out = if self.is_root() {
            name.to_string()
        } else {
            format!("{}{SEPARATOR}{name}", self.relative())
        };
        if is_folder {
            out.push(SEPARATOR);
        }
        out
    }

    pub fn child(&self, name: &str) -> Vec<String> {
        let mut out = self.names.clone();
        out.push(name.to_string());
        out
    }
}

pub fn split_relative(path: &str) -> Vec<String> {
    path.split(SEPARATOR)
        .filter(|part| !part.is_empty() && *part != ROOT_RELATIVE)
        .map(str::to_string)
        .collect()
}

pub fn join_relative(components: &[String]) -> String {
    if components.is_empty() {
        ROOT_RELATIVE.to_string()
    } else {
        components.join("/")
    }
}

pub fn same_relative(a: &str, b: &str) -> bool {
    split_relative(a) == split_relative(b)
}

pub fn mirror_path(root: &Path, components: &[String]) -> Result<PathBuf, PathError> {
    let mut out = root.to_path_buf();
    for name in components {
        validate_component(name)?;
        out.push(name);
    }
    Ok(out)
}

pub fn validate_component(name: &str) -> Result<(), PathError> {
    if name.is_empty() {
        return Err(PathError::Empty);
    }
    if name.contains(SEPARATOR) || name.contains('\\') {
        return Err(PathError::UnsupportedComponent(name.to_string()));
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(PathError::UnsupportedComponent(name.to_string())),
    }
}
