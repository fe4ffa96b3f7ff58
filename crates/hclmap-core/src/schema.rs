//! Schema derivation
//!
//! Produces the declarative description of the tree the encoder emits for
//! a record type: value kind, cardinality, required/optional flags and
//! documentation per property key.

use crate::config::Config;
use crate::descriptor::{resolve, FieldDescriptor};
use crate::error::{Error, Operation, Result};
use crate::property::Record;
use crate::shape::Shape;
use serde::Serialize;
use std::collections::BTreeMap;

/// Schema of a resource: property key to node
pub type SchemaMap = BTreeMap<String, SchemaNode>;

/// Value kind of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    String,
    List,
    Set,
}

/// Element schema of a list or set
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaElem {
    /// Scalar elements
    Element(Box<SchemaNode>),
    /// Nested resource elements
    Resource(SchemaMap),
}

/// Schema of one property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaNode {
    pub kind: ValueKind,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elem: Option<SchemaElem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exactly_one_of: Vec<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl SchemaNode {
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            description: String::new(),
            required: false,
            optional: false,
            min_items: None,
            max_items: None,
            elem: None,
            exactly_one_of: Vec::new(),
        }
    }

    /// Node for a field, required unless `omit_empty`
    fn for_field(kind: ValueKind, descriptor: &FieldDescriptor) -> Self {
        Self {
            description: descriptor.documentation.clone(),
            required: !descriptor.omit_empty,
            optional: descriptor.omit_empty,
            ..Self::new(kind)
        }
    }

    /// Nested resource schema, if this node holds one
    pub fn resource(&self) -> Option<&SchemaMap> {
        match &self.elem {
            Some(SchemaElem::Resource(map)) => Some(map),
            _ => None,
        }
    }

    /// Scalar element schema, if this node holds one
    pub fn element(&self) -> Option<&SchemaNode> {
        match &self.elem {
            Some(SchemaElem::Element(node)) => Some(node),
            _ => None,
        }
    }
}

/// Derives schemas from record field tables
#[derive(Debug, Clone, Default)]
pub struct SchemaDeriver {
    config: Config,
}

impl SchemaDeriver {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Schema of record type `T`
    pub fn derive<T: Record>(&self) -> Result<SchemaMap> {
        let span = tracing::debug_span!("derive_schema", record = T::type_name());
        let _enter = span.enter();
        self.resource(T::type_name(), T::declared_fields, 0)
    }

    fn resource(
        &self,
        type_name: &str,
        fields: fn() -> Vec<crate::descriptor::FieldDecl>,
        depth: usize,
    ) -> Result<SchemaMap> {
        if depth >= self.config.max_depth {
            return Err(Error::DepthExceeded {
                type_name: type_name.to_string(),
                limit: self.config.max_depth,
            });
        }

        let mut map = SchemaMap::new();
        for descriptor in resolve(fields(), &self.config) {
            self.field(&descriptor, &mut map, depth)
                .map_err(|e| e.in_field(Operation::Schema, descriptor.ident))?;
        }
        Ok(map)
    }

    fn field(&self, descriptor: &FieldDescriptor, map: &mut SchemaMap, depth: usize) -> Result<()> {
        match descriptor.shape.unref() {
            Shape::Bool => self.insert(map, descriptor, SchemaNode::for_field(ValueKind::Bool, descriptor)),
            Shape::Int => self.insert(map, descriptor, SchemaNode::for_field(ValueKind::Int, descriptor)),
            Shape::Float => self.insert(map, descriptor, SchemaNode::for_field(ValueKind::Float, descriptor)),
            Shape::String | Shape::Enumeration { .. } => {
                self.insert(map, descriptor, SchemaNode::for_field(ValueKind::String, descriptor))
            }
            Shape::Record { type_name, fields } => {
                let resource = self.resource(type_name, *fields, depth + 1)?;
                let node = SchemaNode {
                    min_items: Some(1),
                    max_items: Some(1),
                    elem: Some(SchemaElem::Resource(resource)),
                    ..SchemaNode::for_field(ValueKind::List, descriptor)
                };
                self.insert(map, descriptor, node)
            }
            Shape::Sequence(elem) => {
                let node = self.sequence(descriptor, elem.unref(), depth)?;
                self.insert(map, descriptor, node)
            }
            Shape::Variants { variants, .. } => {
                let keys: Vec<String> = variants.iter().map(|v| v.key()).collect();
                for (variant, key) in variants.iter().zip(&keys) {
                    let resource = self.resource(variant.type_name, variant.fields, depth + 1)?;
                    let node = SchemaNode {
                        description: variant
                            .doc
                            .map(|doc| doc.trim().to_string())
                            .unwrap_or_else(|| descriptor.documentation.clone()),
                        optional: true,
                        min_items: Some(1),
                        max_items: Some(1),
                        elem: Some(SchemaElem::Resource(resource)),
                        exactly_one_of: keys.clone(),
                        ..SchemaNode::new(ValueKind::List)
                    };
                    map.insert(key.clone(), node);
                }
                Ok(())
            }
            Shape::Unsupported { type_name, kind } => Err(Error::unsupported(descriptor.ident, type_name, kind)),
            Shape::Optional(_) => Err(Error::unsupported(
                descriptor.ident,
                &descriptor.shape.type_name(),
                "optional",
            )),
        }
    }

    fn sequence(&self, descriptor: &FieldDescriptor, elem: &Shape, depth: usize) -> Result<SchemaNode> {
        let kind = if descriptor.unordered {
            ValueKind::Set
        } else {
            ValueKind::List
        };

        let scalar = |elem_kind: ValueKind| SchemaNode {
            min_items: Some(1),
            elem: Some(SchemaElem::Element(Box::new(SchemaNode::new(elem_kind)))),
            ..SchemaNode::for_field(kind, descriptor)
        };

        match elem {
            // unordered booleans are still emitted as a list
            Shape::Bool => Ok(SchemaNode {
                kind: ValueKind::List,
                ..scalar(ValueKind::Bool)
            }),
            Shape::Int => Ok(scalar(ValueKind::Int)),
            Shape::Float => Ok(scalar(ValueKind::Float)),
            Shape::String | Shape::Enumeration { .. } => Ok(scalar(ValueKind::String)),
            Shape::Record { type_name, fields } => {
                let resource = self.resource(type_name, *fields, depth + 1)?;
                match &descriptor.wrap_under {
                    None => Ok(SchemaNode {
                        min_items: Some(1),
                        elem: Some(SchemaElem::Resource(resource)),
                        ..SchemaNode::for_field(kind, descriptor)
                    }),
                    Some(wrap) => {
                        let inner = SchemaNode {
                            description: descriptor.documentation.clone(),
                            required: true,
                            min_items: Some(1),
                            elem: Some(SchemaElem::Resource(resource)),
                            ..SchemaNode::new(kind)
                        };
                        let mut wrapper = SchemaMap::new();
                        wrapper.insert(wrap.clone(), inner);
                        Ok(SchemaNode {
                            min_items: Some(1),
                            max_items: Some(1),
                            elem: Some(SchemaElem::Resource(wrapper)),
                            ..SchemaNode::for_field(ValueKind::List, descriptor)
                        })
                    }
                }
            }
            other => Err(Error::unsupported(
                descriptor.ident,
                &descriptor.shape.type_name(),
                &format!("sequence of {}", other.kind()),
            )),
        }
    }

    fn insert(&self, map: &mut SchemaMap, descriptor: &FieldDescriptor, node: SchemaNode) -> Result<()> {
        if map.insert(descriptor.key.clone(), node).is_some() {
            log::warn!("Property key '{}' is declared more than once", descriptor.key);
        }
        Ok(())
    }
}
