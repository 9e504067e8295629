//! Repository allow-list.

use std::collections::BTreeSet;
use std::fmt;

/// Set of repository names to sync. Empty means "every public repository".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoSet(BTreeSet<String>);

impl RepoSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a flag value; comma separated lists are split and blanks skipped.
    pub fn insert_arg(&mut self, arg: &str) {
        for name in arg.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            self.0.insert(name.to_string());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Members in sorted order.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for RepoSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = RepoSet::new();
        for arg in iter {
            set.insert_arg(arg.as_ref());
        }
        set
    }
}

impl fmt::Display for RepoSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.members().collect();
        f.write_str(&joined.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_commas_and_dedupes() {
        let set: RepoSet = ["widgets,gadgets", "widgets", ""].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains("gadgets"));
        assert_eq!(set.to_string(), "gadgets,widgets");
    }

    #[test]
    fn empty_arg_yields_empty_set() {
        let mut set = RepoSet::new();
        set.insert_arg("");
        set.insert_arg(" , ");
        assert!(set.is_empty());
    }
}
