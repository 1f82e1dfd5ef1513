use std::collections::HashSet;

use super::paths::split_relative;

const SEPARATOR: char = '/';

#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    include: PatternSet,
    exclude: PatternSet,
}

impl PathFilter {
    pub fn new<I, E, S, T>(include: I, exclude: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            include: PatternSet::from_patterns(include),
            exclude: PatternSet::from_patterns(exclude),
        }
    }

    pub fn admits(&self, display_name: &str, is_folder: bool, stack: &[String]) -> bool {
        if self.exclude.exact.contains(display_name) || self.exclude.covers(stack) {
            return false;
        }
        if self.include.is_empty()
            || self.include.exact.contains(display_name)
            || self.include.covers(stack)
        {
            return true;
        }
        is_folder && self.include.descends_into(display_name)
    }
}

#[derive(Debug, Clone, Default)]
struct PatternSet {
    exact: HashSet<String>,
    prefixes: Vec<Vec<String>>,
}

impl PatternSet {
    fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue;
            }
            if pattern.ends_with(SEPARATOR) {
                set.prefixes.push(split_relative(pattern));
            }
            set.exact.insert(pattern.to_string());
        }
        set
    }

    fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }

    fn covers(&self, stack: &[String]) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && stack.starts_with(prefix))
    }

    fn descends_into(&self, display_name: &str) -> bool {
        let folder = split_relative(display_name);
        self.exact.iter().any(|pattern| {
            let parts = split_relative(pattern);
            parts.len() > folder.len() && parts.starts_with(&folder)
        })
    }
}
