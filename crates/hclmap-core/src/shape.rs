//! Type-level classification of mapped fields
//!
//! Every [`Property`](crate::Property) reports a [`Shape`]. The encoder,
//! decoder and schema deriver all dispatch on it, which keeps the three
//! projections in agreement. Record and variant boundaries hold function
//! pointers instead of expanded field lists, so self-referencing types can
//! be described without infinite recursion.

use crate::descriptor::{canonicalize, FieldDecl};
use std::fmt;

/// Classification of a field type
#[derive(Debug, Clone)]
pub enum Shape {
    Bool,
    Int,
    Float,
    String,
    /// String valued enumeration with a closed set of names
    Enumeration {
        type_name: &'static str,
        values: &'static [&'static str],
    },
    /// Possibly absent value (`Option<T>`)
    Optional(Box<Shape>),
    /// Nested record with its own field table
    Record {
        type_name: &'static str,
        fields: fn() -> Vec<FieldDecl>,
    },
    /// Ordered or unordered collection
    Sequence(Box<Shape>),
    /// Closed set of record variants, each under its own key
    Variants {
        type_name: &'static str,
        variants: Vec<VariantDecl>,
    },
    /// A type with no property tree mapping
    Unsupported {
        type_name: &'static str,
        kind: &'static str,
    },
}

impl Shape {
    /// Shape for a type that is carried by a record but never mapped
    pub fn opaque<T: ?Sized>() -> Shape {
        Shape::Unsupported {
            type_name: std::any::type_name::<T>(),
            kind: "opaque",
        }
    }

    /// Shape with any `Optional` layers removed
    pub fn unref(&self) -> &Shape {
        match self {
            Shape::Optional(inner) => inner.unref(),
            other => other,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Shape::Optional(_))
    }

    /// Whether values of this shape map to a single scalar
    pub fn is_scalar(&self) -> bool {
        matches!(
            self.unref(),
            Shape::Bool | Shape::Int | Shape::Float | Shape::String | Shape::Enumeration { .. }
        )
    }

    /// Records and variants are omitted rather than written as null
    pub fn is_structured(&self) -> bool {
        matches!(self.unref(), Shape::Record { .. } | Shape::Variants { .. })
    }

    /// Type name used in diagnostics
    pub fn type_name(&self) -> String {
        match self {
            Shape::Bool => "bool".to_string(),
            Shape::Int => "int".to_string(),
            Shape::Float => "float".to_string(),
            Shape::String => "string".to_string(),
            Shape::Enumeration { type_name, .. }
            | Shape::Record { type_name, .. }
            | Shape::Variants { type_name, .. }
            | Shape::Unsupported { type_name, .. } => type_name.to_string(),
            Shape::Optional(inner) => format!("Option<{}>", inner.type_name()),
            Shape::Sequence(inner) => format!("Vec<{}>", inner.type_name()),
        }
    }

    /// Kind name used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Bool => "bool",
            Shape::Int => "int",
            Shape::Float => "float",
            Shape::String => "string",
            Shape::Enumeration { .. } => "enumeration",
            Shape::Optional(_) => "optional",
            Shape::Record { .. } => "record",
            Shape::Sequence(_) => "sequence",
            Shape::Variants { .. } => "variants",
            Shape::Unsupported { kind, .. } => *kind,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// One variant of a polymorphic type
#[derive(Debug, Clone)]
pub struct VariantDecl {
    /// Variant identifier
    pub ident: &'static str,
    /// Explicit property key, if renamed
    pub rename: Option<&'static str>,
    pub doc: Option<&'static str>,
    /// Type name of the variant's record
    pub type_name: &'static str,
    pub fields: fn() -> Vec<FieldDecl>,
}

impl VariantDecl {
    pub fn new(ident: &'static str, type_name: &'static str, fields: fn() -> Vec<FieldDecl>) -> Self {
        Self {
            ident,
            rename: None,
            doc: None,
            type_name,
            fields,
        }
    }

    pub fn rename(mut self, key: &'static str) -> Self {
        self.rename = Some(key);
        self
    }

    pub fn doc(mut self, doc: &'static str) -> Self {
        self.doc = Some(doc);
        self
    }

    /// Candidate key the variant is stored under
    pub fn key(&self) -> String {
        match self.rename {
            Some(key) => key.to_string(),
            None => canonicalize(self.ident),
        }
    }
}
