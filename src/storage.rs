use indexmap::IndexMap;
use std::fmt;

/// Accumulation map backing a collector: path-prefix key to running total.
///
/// Iteration order is insertion order, which is also the reporting order.
/// Entries are never removed; the map lives and dies with its collector and
/// is never persisted. Totals are not guarded against overflow.
#[derive(Debug, Default)]
pub struct Storage {
    map: IndexMap<String, u64>,
}

impl Storage {
    pub fn new() -> Self {
        Storage {
            map: IndexMap::new(),
        }
    }

    /// Insert `amount` under `key`, or add it to the existing total.
    pub fn add(&mut self, key: &str, amount: u64) {
        if let Some(total) = self.map.get_mut(key) {
            *total += amount;
        } else {
            self.map.insert(key.to_owned(), amount);
        }
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.map.get(key).copied()
    }

    /// All entries, in insertion order, unfiltered.
    pub fn entries(&self) -> impl Iterator<Item = (&str, u64)> {
        self.map.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (key, total) in self.entries() {
            writeln!(f, "{}: {}", key, total)?;
        }
        Ok(())
    }
}
