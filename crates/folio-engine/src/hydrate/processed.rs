use std::collections::HashSet;
use std::hash::Hash;

/// Ledger of placeholders the hydrator has already handled.
///
/// A placeholder goes into the set before its widget is requested, so a
/// second hydration pass over the same content never mounts it again.
pub trait ProcessedSet<K> {
    fn contains(&self, key: &K) -> bool;
    /// Record a key. Returns false if it was already present.
    fn insert(&mut self, key: K) -> bool;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash> ProcessedSet<K> for HashSet<K> {
    fn contains(&self, key: &K) -> bool {
        HashSet::contains(self, key)
    }

    fn insert(&mut self, key: K) -> bool {
        HashSet::insert(self, key)
    }

    fn len(&self) -> usize {
        HashSet::len(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_set_ledger() {
        let mut set: HashSet<u32> = HashSet::new();
        assert!(ProcessedSet::is_empty(&set));
        assert!(ProcessedSet::insert(&mut set, 1));
        assert!(!ProcessedSet::insert(&mut set, 1));
        assert!(ProcessedSet::contains(&set, &1));
        assert_eq!(ProcessedSet::len(&set), 1);
    }
}
