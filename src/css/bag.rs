//! Property bags: the opaque declaration blocks rules carry.
//!
//! The engine never interprets values. It only needs to merge one block into
//! another when a selector is registered twice, which is what [`StyleData`]
//! captures.

use std::fmt;

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a bag stored in a collection's bag arena. Several style nodes
    /// may hold the same handle.
    pub struct BagId;
}

/// A mergeable declaration block.
pub trait StyleData {
    /// Merge `other` into `self`, entry by entry; `other` wins on conflicts.
    ///
    /// Returns the keys whose existing value was replaced.
    fn load_data(&mut self, other: &Self) -> Vec<String>;
}

/// Insertion-ordered `key -> value` string store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyBag {
    entries: Vec<(String, String)>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property (builder).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a property, returning the value it replaced. A replaced entry keeps
    /// its original position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl StyleData for PropertyBag {
    fn load_data(&mut self, other: &Self) -> Vec<String> {
        let mut replaced = Vec::new();
        for (key, value) in &other.entries {
            if let Some(previous) = self.set(key.clone(), value.clone()) {
                if previous != *value {
                    replaced.push(key.clone());
                }
            }
        }
        replaced
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = PropertyBag::new();
        for (key, value) in iter {
            bag.set(key, value);
        }
        bag
    }
}

/// One `key: value;` per line.
impl fmt::Display for PropertyBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{key}: {value};")?;
        }
        Ok(())
    }
}
