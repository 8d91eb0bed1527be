use std::collections::HashSet;

/// Variable names under observation. Matching is exact and case-sensitive.
#[derive(Debug, Default)]
pub struct WatchList {
    names: HashSet<String>,
}

impl WatchList {
    pub fn new() -> Self {
        Self {
            names: HashSet::new(),
        }
    }

    /// Returns true if `name` was not watched before.
    pub fn add(&mut self, name: &str) -> bool {
        if self.names.contains(name) {
            return false;
        }
        self.names.insert(name.to_string())
    }

    /// Returns true if `name` was being watched.
    pub fn remove(&mut self, name: &str) -> bool {
        self.names.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn sorted(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.iter().cloned().collect();
        names.sort();
        names
    }
}
