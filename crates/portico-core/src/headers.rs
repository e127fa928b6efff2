//! Case-insensitive, multi-valued header collections

use std::collections::BTreeMap;

/// Header names are stored lower-cased; values keep insertion order.
/// [`add`](Self::add) de-duplicates values per name, [`append`](Self::append)
/// keeps them as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadersCollection {
    headers: BTreeMap<String, Vec<String>>,
}

/// Headers attached to an outgoing request
pub type RequestHeaders = HeadersCollection;

/// Headers received with a response
pub type ResponseHeaders = HeadersCollection;

impl HeadersCollection {
    pub fn new() -> Self {
        Self::default()
    }

    fn normalize(key: &str) -> String {
        key.trim().to_ascii_lowercase()
    }

    /// Append a value for `key`. Empty names are ignored.
    pub fn add(&mut self, key: &str, value: impl Into<String>) {
        let key = Self::normalize(key);
        if key.is_empty() {
            return;
        }
        let value = value.into().trim().to_string();
        let values = self.headers.entry(key).or_default();
        if !values.contains(&value) {
            values.push(value);
        }
    }

    /// Append a value for `key` as is, keeping repeated values
    pub fn append(&mut self, key: &str, value: impl Into<String>) {
        let key = Self::normalize(key);
        if key.is_empty() {
            return;
        }
        self.headers.entry(key).or_default().push(value.into());
    }

    /// Add the value only when no value exists yet for `key`.
    /// Returns whether the value was added.
    pub fn try_add(&mut self, key: &str, value: impl Into<String>) -> bool {
        if self.contains(key) {
            return false;
        }
        self.add(key, value);
        true
    }

    /// Replace every value of `key` with `value`
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.headers.remove(&Self::normalize(key));
        self.add(key, value);
    }

    /// Merge all entries of `other` into this collection
    pub fn add_all(&mut self, other: &HeadersCollection) {
        for (key, values) in &other.headers {
            for value in values {
                self.add(key, value.clone());
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.headers.get(&Self::normalize(key)).map(|v| v.as_slice())
    }

    pub fn get_first(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.first()).map(|s| s.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.headers.contains_key(&Self::normalize(key))
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.headers.remove(&Self::normalize(key))
    }

    /// Remove a single value; the name disappears with its last value
    pub fn remove_value(&mut self, key: &str, value: &str) -> bool {
        let key = Self::normalize(key);
        let Some(values) = self.headers.get_mut(&key) else {
            return false;
        };
        let before = values.len();
        values.retain(|v| v != value);
        let removed = values.len() != before;
        if values.is_empty() {
            self.headers.remove(&key);
        }
        removed
    }

    pub fn clear(&mut self) {
        self.headers.clear();
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.headers.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}
