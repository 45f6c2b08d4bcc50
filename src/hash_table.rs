use log::debug;
use std::fmt::{Debug, Formatter};
use std::mem;

/// Keys carry their own precomputed hash and compare by identity.
pub trait TableKey: Copy + Eq {
    fn table_hash(&self) -> u32;
}

enum Entry<K, V> {
    Empty,
    Tombstone,
    Occupied { key: K, value: V },
}

/// Open addressing with linear probing. Deleted slots become tombstones so that probe
/// chains running through them stay intact; tombstones are dropped when the table grows.
pub struct HashTable<K, V> {
    /// Occupied slots plus tombstones.
    count: usize,
    entries: Vec<Entry<K, V>>,
}

impl<K: TableKey, V> HashTable<K, V> {
    const MAX_LOAD: f64 = 0.75;

    pub fn new() -> Self {
        Self {
            count: 0,
            entries: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        if self.count == 0 {
            return None;
        }
        match &self.entries[Self::find_entry(&self.entries, key)] {
            Entry::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Returns true if `key` was not present before.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if (self.count + 1) as f64 > (self.capacity() as f64) * Self::MAX_LOAD {
            let new_capacity = self.grow_capacity();
            self.adjust_capacity(new_capacity)
        }

        let index = Self::find_entry(&self.entries, &key);
        let entry = &mut self.entries[index];
        let is_new_key = !matches!(entry, Entry::Occupied { .. });
        // Reusing a tombstone doesn't change the count, it was already counted.
        if matches!(entry, Entry::Empty) {
            self.count += 1;
        }
        *entry = Entry::Occupied { key, value };
        is_new_key
    }

    pub fn delete(&mut self, key: &K) -> bool {
        if self.count == 0 {
            return false;
        }

        let index = Self::find_entry(&self.entries, key);
        let entry = &mut self.entries[index];
        if !matches!(entry, Entry::Occupied { .. }) {
            return false;
        }
        *entry = Entry::Tombstone;
        true
    }

    /// Probes the chain for `hash` and returns the first key accepted by `matches`.
    /// Used to find a key by content rather than identity.
    pub fn find_by(&self, hash: u32, mut matches: impl FnMut(&K) -> bool) -> Option<K> {
        if self.count == 0 {
            return None;
        }
        let capacity = self.capacity();
        let mut index = hash as usize % capacity;
        loop {
            match &self.entries[index] {
                Entry::Empty => return None,
                Entry::Occupied { key, .. } if key.table_hash() == hash && matches(key) => {
                    return Some(*key)
                }
                _ => {}
            }
            index = (index + 1) % capacity;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Occupied { key, value } => Some((key, value)),
            _ => None,
        })
    }

    fn grow_capacity(&self) -> usize {
        if self.capacity() < 8 {
            8
        } else {
            self.capacity() * 2
        }
    }

    fn adjust_capacity(&mut self, new_capacity: usize) {
        let old = mem::replace(
            &mut self.entries,
            (0..new_capacity).map(|_| Entry::Empty).collect(),
        );
        let previous_count = self.count;
        self.count = 0;
        for entry in old {
            if let Entry::Occupied { key, value } = entry {
                let index = Self::find_entry(&self.entries, &key);
                self.entries[index] = Entry::Occupied { key, value };
                self.count += 1;
            }
        }
        debug!(
            "Resized table to {new_capacity} buckets, {} tombstones dropped",
            previous_count - self.count
        );
    }

    /// The slot holding `key`, or the slot it should be inserted into. Relies on the load
    /// factor to guarantee at least one empty slot.
    fn find_entry(entries: &[Entry<K, V>], key: &K) -> usize {
        let capacity = entries.len();
        let mut index = key.table_hash() as usize % capacity;
        let mut tombstone: Option<usize> = None;
        loop {
            match &entries[index] {
                Entry::Empty => return tombstone.unwrap_or(index),
                Entry::Tombstone => {
                    if tombstone.is_none() {
                        tombstone = Some(index)
                    }
                }
                Entry::Occupied { key: existing, .. } if existing == key => return index,
                Entry::Occupied { .. } => {}
            }
            index = (index + 1) % capacity;
        }
    }
}

impl<K: TableKey, V> Default for HashTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: TableKey + Debug, V: Debug> Debug for HashTable<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashTable")
            .field("count", &self.count)
            .field("capacity", &self.capacity())
            .field("entries", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const MAX: u32 = if cfg!(miri) { 17 } else { 2500 };

    /// Deliberately collides: only seven distinct hashes.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    struct Key(u32);

    impl TableKey for Key {
        fn table_hash(&self) -> u32 {
            self.0 % 7
        }
    }

    #[test]
    fn insert() {
        let mut table = HashTable::new();
        assert!(table.insert(Key(1), 1.5));
        assert!(!table.insert(Key(1), 2.5));
        assert_eq!(table.get(&Key(1)), Some(&2.5));
        assert_eq!(table.count(), 1);
    }

    #[test]
    fn insert_multiple() {
        let mut table = HashTable::new();
        for i in 0..MAX {
            assert!(table.insert(Key(i), i), "{i}");
            assert_eq!(table.get(&Key(i)), Some(&i), "{i}");
            assert!(!table.insert(Key(i), i), "{i}");
        }
        for i in 0..MAX {
            assert_eq!(table.get(&Key(i)), Some(&i), "{i}");
        }
        assert_eq!(table.len(), MAX as usize);
        assert!(table.count() as f64 <= table.capacity() as f64 * 0.75);
    }

    #[test]
    fn get() {
        let mut table = HashTable::new();
        assert_eq!(table.get(&Key(3)), None);
        assert!(table.insert(Key(3), "three"));
        assert_eq!(table.get(&Key(3)), Some(&"three"));
        assert_eq!(table.get(&Key(10)), None);
    }

    #[test]
    fn delete() {
        let mut table = HashTable::new();
        for i in 0..MAX {
            assert!(table.insert(Key(i), i), "{i}");
            assert!(table.delete(&Key(i)), "{i}");
            assert_eq!(table.get(&Key(i)), None, "{i}");
            assert!(!table.delete(&Key(i)), "{i}");
        }
        for i in 0..MAX {
            assert_eq!(table.get(&Key(i)), None, "{i}");
        }
        assert!(table.is_empty());
    }

    #[test]
    fn tombstones_keep_probe_chains_intact() {
        let mut table = HashTable::new();
        // Same bucket, so each one probes past the previous.
        table.insert(Key(0), 'a');
        table.insert(Key(7), 'b');
        table.insert(Key(14), 'c');
        assert!(table.delete(&Key(7)));
        assert_eq!(table.get(&Key(14)), Some(&'c'));
        assert_eq!(table.count(), 3);

        // Reusing the tombstone doesn't count twice.
        assert!(table.insert(Key(21), 'd'));
        assert_eq!(table.count(), 3);
        assert_eq!(table.get(&Key(21)), Some(&'d'));
        assert_eq!(table.get(&Key(14)), Some(&'c'));
    }

    #[test]
    fn churn_never_loses_keys() {
        let mut table = HashTable::new();
        let mut model = HashMap::new();
        // Small LCG so the sequence is reproducible.
        let mut seed: u32 = 12345;
        let mut next = || {
            seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
            (seed >> 16) % 200
        };
        for step in 0..(MAX * 2) {
            let k = next();
            let capacity = table.capacity();
            if step % 3 == 0 {
                assert_eq!(table.delete(&Key(k)), model.remove(&k).is_some(), "{step}");
            } else {
                assert_eq!(table.insert(Key(k), step), model.insert(k, step).is_none());
                if table.capacity() != capacity {
                    // A rebuild drops every tombstone.
                    assert_eq!(table.count(), model.len(), "{step}");
                }
            }
            for (k, v) in model.iter() {
                assert_eq!(table.get(&Key(*k)), Some(v), "{step}");
            }
        }
        assert_eq!(table.len(), model.len());
    }

    #[test]
    fn find_by_skips_tombstones() {
        let mut table = HashTable::new();
        table.insert(Key(0), ());
        table.insert(Key(7), ());
        table.insert(Key(14), ());
        table.delete(&Key(7));
        assert_eq!(table.find_by(0, |k| k.0 == 14), Some(Key(14)));
        assert_eq!(table.find_by(0, |k| k.0 == 7), None);
        assert_eq!(table.find_by(3, |_| true), None);
    }
}
