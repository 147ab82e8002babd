// src/model/watch.rs
use std::collections::BTreeSet;

/// Reflections the user has marked as observed. Indices refer to the current
/// Miller list and are meaningless after it is regenerated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchSet {
    indices: BTreeSet<usize>,
}

impl WatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the watch state; returns whether the index is now watched.
    pub fn toggle(&mut self, index: usize) -> bool {
        if self.indices.remove(&index) {
            false
        } else {
            self.indices.insert(index);
            true
        }
    }

    pub fn is_watched(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn clear(&mut self) {
        self.indices.clear();
    }
}

impl FromIterator<usize> for WatchSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self { indices: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut set = WatchSet::new();
        assert!(set.toggle(3));
        assert!(set.is_watched(3));
        assert!(!set.toggle(3));
        assert!(set.is_empty());
    }

    #[test]
    fn test_iter_is_sorted() {
        let set: WatchSet = [9, 2, 5].into_iter().collect();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![2, 5, 9]);
        assert_eq!(set.len(), 3);
    }
}
