//! Path-addressed access to the host key/value store
//!
//! The host exposes its state as a flat map of dotted paths:
//!
//! - `<key>` holds a scalar or a whole list/set
//! - `<key>.#` holds the element count of a list, set or record
//! - `<key>.<i>.<sub>` addresses a field of the i-th element
//! - `<key>.<token>.<sub>` addresses an element of an unordered set
//!
//! [`Accessor`] layers a key prefix over a [`Source`] so nested records can
//! be decoded with keys relative to their own position. Segments are joined
//! with `.` verbatim; a key containing `.` will address the wrong entry.

use crate::error::Result;
use crate::value::{PropertyTree, Value};
use std::collections::HashMap;
use std::fmt;

/// Read side of the host store
pub trait Source {
    /// Value stored at `key`, or `None` when nothing is stored
    fn get_ok(&self, key: &str) -> Option<Value>;

    /// Value stored at `key`, `Null` when absent
    fn get(&self, key: &str) -> Value {
        self.get_ok(key).unwrap_or(Value::Null)
    }

    /// Previous and current value at `key`
    fn get_change(&self, key: &str) -> (Value, Value) {
        let current = self.get(key);
        (current.clone(), current)
    }

    /// Whether the value at `key` differs from its previous state
    fn has_change(&self, key: &str) -> bool {
        let (old, new) = self.get_change(key);
        old != new
    }
}

/// Write side of the host store
pub trait Sink {
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
}

impl Source for HashMap<String, Value> {
    fn get_ok(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

impl Sink for HashMap<String, Value> {
    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.insert(key.to_string(), value);
        Ok(())
    }
}

/// A [`Source`] view rooted at a key prefix
#[derive(Clone)]
pub struct Accessor<'a> {
    source: &'a dyn Source,
    prefix: String,
}

impl<'a> Accessor<'a> {
    /// Accessor at the root of `source`
    pub fn new(source: &'a dyn Source) -> Self {
        Self {
            source,
            prefix: String::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Absolute address of a relative key
    pub fn address(&self, key: &str) -> String {
        match (self.prefix.is_empty(), key.is_empty()) {
            (true, _) => key.to_string(),
            (false, true) => self.prefix.clone(),
            (false, false) => format!("{}.{}", self.prefix, key),
        }
    }

    pub fn get_ok(&self, key: &str) -> Option<Value> {
        self.source.get_ok(&self.address(key))
    }

    pub fn get(&self, key: &str) -> Value {
        self.source.get(&self.address(key))
    }

    pub fn get_change(&self, key: &str) -> (Value, Value) {
        self.source.get_change(&self.address(key))
    }

    pub fn has_change(&self, key: &str) -> bool {
        self.source.has_change(&self.address(key))
    }

    /// Element count stored at `<key>.#`, zero when absent or not an int
    pub fn count(&self, key: &str) -> usize {
        self.get_ok(&format!("{}.#", key))
            .and_then(|v| v.as_int())
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .unwrap_or(0)
    }

    /// Accessor whose prefix is extended by the given segments
    pub fn scoped(&self, segments: &[&str]) -> Accessor<'a> {
        let mut prefix = self.prefix.clone();
        for segment in segments {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);
        }
        Accessor {
            source: self.source,
            prefix,
        }
    }

    /// Accessor for one child segment (a key, an index or a set token)
    pub fn child(&self, segment: impl fmt::Display) -> Accessor<'a> {
        self.scoped(&[&segment.to_string()])
    }
}

impl fmt::Debug for Accessor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor").field("prefix", &self.prefix).finish()
    }
}

/// In-memory store following the host path protocol
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    values: HashMap<String, Value>,
    previous: HashMap<String, Value>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten an encoded tree into addressable paths
    pub fn from_tree(tree: &PropertyTree) -> Self {
        let mut source = Self::new();
        for (key, value) in tree {
            flatten(&mut source.values, key, value);
        }
        source
    }

    /// Attach a previous state for change detection
    pub fn with_previous(mut self, tree: &PropertyTree) -> Self {
        self.previous.clear();
        for (key, value) in tree {
            flatten(&mut self.previous, key, value);
        }
        self
    }

    /// Store `value` at `key`, flattening nested collections
    pub fn insert(&mut self, key: &str, value: Value) {
        flatten(&mut self.values, key, &value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All stored paths, sorted
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.values.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}

fn flatten(out: &mut HashMap<String, Value>, address: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::List(items) => {
            out.insert(address.to_string(), value.clone());
            out.insert(format!("{}.#", address), Value::Int(items.len() as i64));
            for (i, item) in items.iter().enumerate() {
                flatten(out, &format!("{}.{}", address, i), item);
            }
        }
        Value::Set(set) => {
            out.insert(address.to_string(), value.clone());
            out.insert(format!("{}.#", address), Value::Int(set.len() as i64));
            for (token, item) in set.iter() {
                flatten(out, &format!("{}.{}", address, token), item);
            }
        }
        Value::Map(tree) => {
            out.insert(address.to_string(), value.clone());
            for (key, item) in tree {
                flatten(out, &format!("{}.{}", address, key), item);
            }
        }
        scalar => {
            out.insert(address.to_string(), scalar.clone());
        }
    }
}

impl Source for MemorySource {
    fn get_ok(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn get_change(&self, key: &str) -> (Value, Value) {
        let old = self.previous.get(key).cloned().unwrap_or(Value::Null);
        (old, self.get(key))
    }
}

impl Sink for MemorySource {
    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.insert(key, value);
        Ok(())
    }
}
