//! Unordered collections keyed by element hash
//!
//! A [`ValueSet`] stores each element under an integer token derived from
//! its content. The token is what the host uses to address the element
//! (`<key>.<token>.<sub>`), so the hashing rules have to be stable:
//! integers hash to themselves, strings to the CRC-32 of their bytes,
//! floats to the CRC-32 of a fixed precision rendering.

use crate::value::Value;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::collections::BTreeMap;

/// Hash function used to derive element tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetHash {
    /// Integer elements, token is the value itself
    Int,
    /// String elements, CRC-32 (IEEE) of the UTF-8 bytes
    String,
    /// Float elements rendered with `precision` decimal places
    Float { precision: usize },
    /// Nested resources, CRC-32 of their JSON rendering
    Resource,
}

impl SetHash {
    /// Token for `value` under this hash
    pub fn token(&self, value: &Value) -> i64 {
        match (self, value) {
            (SetHash::Int, Value::Int(i)) => *i,
            (SetHash::String, Value::String(s)) => hash_string(s),
            (SetHash::Float { precision }, Value::Float(f)) => hash_float(*f, *precision),
            (SetHash::Float { precision }, Value::Int(i)) => hash_float(*i as f64, *precision),
            _ => hash_string(&value.to_json().to_string()),
        }
    }
}

/// CRC-32 of the string, always non-negative
pub fn hash_string(s: &str) -> i64 {
    i64::from(crc32fast::hash(s.as_bytes()))
}

/// Hash of a float rendered with a fixed number of decimal places
pub fn hash_float(f: f64, precision: usize) -> i64 {
    hash_string(&format!("{:.*}", precision, f))
}

/// An unordered, deduplicated collection of values
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSet {
    hash: SetHash,
    items: BTreeMap<i64, Value>,
}

impl ValueSet {
    pub fn new(hash: SetHash) -> Self {
        Self {
            hash,
            items: BTreeMap::new(),
        }
    }

    /// Build a set from values, collapsing duplicates
    pub fn from_values(hash: SetHash, values: impl IntoIterator<Item = Value>) -> Self {
        let mut set = Self::new(hash);
        for value in values {
            set.insert(value);
        }
        set
    }

    /// Insert a value and return its token
    pub fn insert(&mut self, value: Value) -> i64 {
        let token = self.hash.token(&value);
        self.items.insert(token, value);
        token
    }

    pub fn hash(&self) -> SetHash {
        self.hash
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Element stored under `token`
    pub fn get(&self, token: i64) -> Option<&Value> {
        self.items.get(&token)
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.items.contains_key(&self.hash.token(value))
    }

    /// Elements with their tokens, in token order
    pub fn iter(&self) -> impl Iterator<Item = (i64, &Value)> {
        self.items.iter().map(|(token, value)| (*token, value))
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.items.values()
    }

    pub fn tokens(&self) -> impl Iterator<Item = i64> + '_ {
        self.items.keys().copied()
    }
}

impl Serialize for ValueSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.items.len()))?;
        for value in self.items.values() {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}
