use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::{Deserialize, Serialize};

/// An insertion-ordered map of named entities.
///
/// Keys are unique; iteration yields entries in the order their key was first
/// registered, even when the value behind a key is replaced later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry<T> {
    entries: IndexMap<String, T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.entries.get_mut(key)
    }

    /// Insert or replace the value under `key`, keeping its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), value);
    }

    /// Register `key` with the value built by `make` unless it is already known.
    ///
    /// Returns `true` when a new entry was created.
    pub fn insert_if_absent(&mut self, key: &str, make: impl FnOnce() -> T) -> bool {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(make());
                true
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_values(self) -> impl Iterator<Item = T> {
        self.entries.into_values()
    }
}

impl<T> FromIterator<(String, T)> for Registry<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
