#[derive(Debug, Clone, Default)]
pub struct RelocationLog {
    moves: Vec<(Vec<String>, Vec<String>)>,
}

impl RelocationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, from: Vec<String>, to: Vec<String>) {
        if from != to {
            self.moves.push((from, to));
        }
    }

    // Moves apply in the order they happened.
    pub fn resolve(&self, path: &[String]) -> Vec<String> {
        let mut current = path.to_vec();
        for (from, to) in &self.moves {
            if current.starts_with(from) {
                let mut rewritten = to.clone();
                rewritten.extend_from_slice(&current[from.len()..]);
                current = rewritten;
            }
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn unrelated_paths_are_unchanged() {
        let mut log = RelocationLog::new();
        log.record(parts(&["X"]), parts(&["Y"]));
        assert_eq!(log.resolve(&parts(&["Z", "a.pdf"])), parts(&["Z", "a.pdf"]));
        assert_eq!(log.resolve(&parts(&["XY"])), parts(&["XY"]));
    }

    #[test]
    fn descendants_follow_moved_folder() {
        let mut log = RelocationLog::new();
        log.record(parts(&["X"]), parts(&["Archive", "Y"]));
        assert_eq!(
            log.resolve(&parts(&["X", "Sub", "a.pdf"])),
            parts(&["Archive", "Y", "Sub", "a.pdf"])
        );
        assert_eq!(log.resolve(&parts(&["X"])), parts(&["Archive", "Y"]));
    }

    #[test]
    fn moves_chain_in_order() {
        let mut log = RelocationLog::new();
        log.record(parts(&["A"]), parts(&["B"]));
        log.record(parts(&["B", "C"]), parts(&["D"]));
        assert_eq!(log.resolve(&parts(&["A", "C", "f.pdf"])), parts(&["D", "f.pdf"]));
    }

    #[test]
    fn identity_moves_are_not_recorded() {
        let mut log = RelocationLog::new();
        log.record(parts(&["A"]), parts(&["A"]));
        assert!(log.moves.is_empty());
        assert_eq!(log.resolve(&parts(&["A", "f.pdf"])), parts(&["A", "f.pdf"]));
    }
}
