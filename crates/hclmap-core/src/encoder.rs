//! Projection of typed records into property trees
//!
//! Scalars are normalized (all integer widths to `Int`, all float widths to
//! `Float`), records become one element lists, and collections become
//! lists or hash-keyed sets depending on the `unordered` option.

use crate::accessor::Sink;
use crate::config::Config;
use crate::descriptor::{resolve, FieldDescriptor};
use crate::error::{Error, Operation, Result};
use crate::property::{Node, Property, Record, RecordNode};
use crate::set::{SetHash, ValueSet};
use crate::shape::Shape;
use crate::value::{PropertyTree, Value};

/// Encodes records into property trees
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: Config,
}

impl Encoder {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Encode a record into a property tree
    pub fn encode<T: Record>(&self, value: &T) -> Result<PropertyTree> {
        let span = tracing::debug_span!("encode", record = T::type_name());
        let _enter = span.enter();
        self.encode_record(value, 0)
    }

    /// Encode a record and write each top-level property to a sink
    pub fn encode_to<T: Record>(&self, value: &T, sink: &mut dyn Sink) -> Result<()> {
        for (key, value) in self.encode(value)? {
            sink.set(&key, value)?;
        }
        Ok(())
    }

    /// Encode a single value as if it were a field named `key`
    ///
    /// Returns `None` when nothing would be emitted under `key`, which
    /// includes empty values when `omit_empty` is set.
    pub fn encode_value<P: Property>(&self, key: &str, value: &P, omit_empty: bool) -> Result<Option<Value>> {
        let descriptor = FieldDescriptor {
            omit_empty,
            ..FieldDescriptor::for_key(key, P::shape())
        };
        let mut tree = PropertyTree::new();
        self.encode_field(&descriptor, value.to_node(), &mut tree, 0)
            .map_err(|e| e.in_field(Operation::Encode, key))?;
        Ok(tree.remove(key))
    }

    fn encode_record(&self, record: &dyn RecordNode, depth: usize) -> Result<PropertyTree> {
        if depth >= self.config.max_depth {
            return Err(Error::DepthExceeded {
                type_name: record.record_type_name().to_string(),
                limit: self.config.max_depth,
            });
        }

        let mut tree = PropertyTree::new();
        for descriptor in resolve(record.fields(), &self.config) {
            let node = record.node_at(&descriptor.path).ok_or_else(|| Error::InvalidTarget {
                type_name: record.record_type_name().to_string(),
                message: format!("no mapped field at index path {:?}", descriptor.path),
            })?;
            self.encode_field(&descriptor, node, &mut tree, depth)
                .map_err(|e| e.in_field(Operation::Encode, descriptor.ident))?;
        }
        Ok(tree)
    }

    fn encode_field(
        &self,
        descriptor: &FieldDescriptor,
        node: Node<'_>,
        tree: &mut PropertyTree,
        depth: usize,
    ) -> Result<()> {
        if descriptor.omit_empty && self.is_empty(&node) {
            return Ok(());
        }

        let node = match deref(node) {
            Some(node) => node,
            None => {
                if !descriptor.shape.is_structured() {
                    tree.insert(descriptor.key.clone(), Value::Null);
                }
                return Ok(());
            }
        };

        match node {
            Node::Bool(_) | Node::Int(_) | Node::Float(_) | Node::Str(_) => {
                tree.insert(descriptor.key.clone(), scalar(descriptor, node)?);
            }
            Node::Record(record) => {
                let nested = self.encode_record(record, depth + 1)?;
                tree.insert(descriptor.key.clone(), Value::record(nested));
            }
            Node::Variant { index, record } => {
                let key = variant_key(descriptor, index)?;
                let nested = self.encode_record(record, depth + 1)?;
                tree.insert(key, Value::record(nested));
            }
            Node::Sequence(items) => {
                let value = self.encode_sequence(descriptor, items, depth)?;
                tree.insert(descriptor.key.clone(), value);
            }
            Node::Unsupported { type_name, kind } => {
                return Err(Error::unsupported(descriptor.ident, type_name, kind));
            }
            // deref never yields a pointer
            Node::Pointer(_) => {}
        }
        Ok(())
    }

    fn encode_sequence(
        &self,
        descriptor: &FieldDescriptor,
        items: Vec<Node<'_>>,
        depth: usize,
    ) -> Result<Value> {
        let elem = match descriptor.shape.unref() {
            Shape::Sequence(elem) => elem.unref(),
            other => {
                return Err(Error::unsupported(descriptor.ident, &other.type_name(), other.kind()));
            }
        };

        match elem {
            Shape::Record { .. } => {
                let mut maps = Vec::with_capacity(items.len());
                for item in items {
                    match deref(item) {
                        Some(Node::Record(record)) => {
                            maps.push(Value::Map(self.encode_record(record, depth + 1)?));
                        }
                        Some(other) => {
                            return Err(Error::unsupported(descriptor.ident, &elem.type_name(), other.kind_name()));
                        }
                        None => log::debug!("Skipping absent element of '{}'", descriptor.key),
                    }
                }
                match &descriptor.wrap_under {
                    Some(wrap) => {
                        let mut wrapper = PropertyTree::new();
                        wrapper.insert(wrap.clone(), Value::List(maps));
                        Ok(Value::record(wrapper))
                    }
                    None => Ok(Value::List(maps)),
                }
            }
            Shape::Bool | Shape::Int | Shape::Float | Shape::String | Shape::Enumeration { .. } => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(node) = deref(item) {
                        values.push(scalar(descriptor, node)?);
                    }
                }
                let hash = match elem {
                    Shape::Int => Some(SetHash::Int),
                    Shape::Float => Some(SetHash::Float {
                        precision: self.config.float_hash_precision,
                    }),
                    Shape::String | Shape::Enumeration { .. } => Some(SetHash::String),
                    _ => None,
                };
                match hash {
                    Some(hash) if descriptor.unordered => Ok(Value::Set(ValueSet::from_values(hash, values))),
                    _ => Ok(Value::List(values)),
                }
            }
            other => Err(Error::unsupported(
                descriptor.ident,
                &descriptor.shape.type_name(),
                &format!("sequence of {}", other.kind()),
            )),
        }
    }

    /// Whether a value counts as empty for `omit_empty`
    pub fn is_empty(&self, node: &Node<'_>) -> bool {
        match node {
            Node::Bool(b) => !*b,
            Node::Int(i) => *i == 0,
            Node::Float(f) => *f == 0.0,
            Node::Str(s) => s.is_empty(),
            Node::Pointer(inner) => inner.is_none(),
            Node::Sequence(items) => items.is_empty(),
            Node::Record(record) => resolve(record.fields(), &self.config)
                .iter()
                .all(|d| record.node_at(&d.path).map_or(true, |n| self.is_empty(&n))),
            Node::Variant { .. } | Node::Unsupported { .. } => false,
        }
    }
}

/// Strip optional layers; `None` when a layer is absent
fn deref(node: Node<'_>) -> Option<Node<'_>> {
    let mut node = node;
    loop {
        match node {
            Node::Pointer(Some(inner)) => node = *inner,
            Node::Pointer(None) => return None,
            other => return Some(other),
        }
    }
}

fn scalar(descriptor: &FieldDescriptor, node: Node<'_>) -> Result<Value> {
    match node {
        Node::Bool(b) => Ok(Value::Bool(b)),
        Node::Int(i) => i64::try_from(i).map(Value::Int).map_err(|_| Error::ValueOutOfRange {
            field: descriptor.key.clone(),
            value: i.to_string(),
            target: "i64".to_string(),
        }),
        Node::Float(f) => Ok(Value::Float(f)),
        Node::Str(s) => Ok(Value::String(s.into_owned())),
        other => Err(Error::unsupported(descriptor.ident, "scalar", other.kind_name())),
    }
}

fn variant_key(descriptor: &FieldDescriptor, index: usize) -> Result<String> {
    match descriptor.shape.unref() {
        Shape::Variants { variants, type_name } => variants
            .get(index)
            .map(|variant| variant.key())
            .ok_or_else(|| Error::InvalidTarget {
                type_name: type_name.to_string(),
                message: format!("variant index {} out of range", index),
            }),
        other => Err(Error::InvalidTarget {
            type_name: other.type_name(),
            message: "variant value for a non-polymorphic field".to_string(),
        }),
    }
}
