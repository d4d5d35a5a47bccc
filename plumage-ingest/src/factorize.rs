//! Identifier Factorizer
//!
//! Dense surrogate keys in order of first appearance: the first distinct
//! value gets 1, the next new value 2, and repeats reuse the key of their
//! first occurrence. Every value is a valid key, `None` included.

use std::collections::HashMap;
use std::hash::Hash;

/// Incremental factorizer over values of type `K`
#[derive(Debug, Clone)]
pub struct Factorizer<K> {
    keys: HashMap<K, i64>,
    uniques: Vec<K>,
}

impl<K: Eq + Hash + Clone> Factorizer<K> {
    pub fn new() -> Self {
        Self {
            keys: HashMap::new(),
            uniques: Vec::new(),
        }
    }

    /// Key for `value`, assigning the next key if it is new
    pub fn key(&mut self, value: K) -> i64 {
        if let Some(&key) = self.keys.get(&value) {
            return key;
        }
        let key = self.uniques.len() as i64 + 1;
        self.keys.insert(value.clone(), key);
        self.uniques.push(value);
        key
    }

    /// Key already assigned to `value`, if any
    pub fn get(&self, value: &K) -> Option<i64> {
        self.keys.get(value).copied()
    }

    /// Number of distinct values seen
    pub fn len(&self) -> usize {
        self.uniques.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uniques.is_empty()
    }

    /// Distinct values; the value at index `i` has key `i + 1`
    pub fn uniques(&self) -> &[K] {
        &self.uniques
    }
}

impl<K: Eq + Hash + Clone> Default for Factorizer<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Factorize a whole sequence: one key per input position, plus the
/// distinct values in key order
pub fn factorize<K, I>(values: I) -> (Vec<i64>, Vec<K>)
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut factorizer = Factorizer::new();
    let keys: Vec<i64> = values.into_iter().map(|v| factorizer.key(v)).collect();
    (keys, factorizer.uniques)
}
