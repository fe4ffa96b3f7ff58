//! Typed conversions between Rust values and the property tree
//!
//! [`Property`] is implemented by every mappable field type. It exposes a
//! static [`Shape`], a borrowed [`Node`] view for encoding and a conversion
//! from the [`Raw`] data the decoder reads. [`Record`] is implemented by
//! structs with named fields and gives indexed access to those fields so
//! the projections can walk a resolved descriptor list.

mod impls;

use crate::accessor::Accessor;
use crate::decoder::DecodeContext;
use crate::descriptor::FieldDecl;
use crate::error::{Error, Result};
use crate::shape::Shape;
use crate::value::Value;
use std::borrow::Cow;

/// Borrowed view of a value, as seen by the encoder
pub enum Node<'a> {
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(Cow<'a, str>),
    /// Optional value, `None` when absent
    Pointer(Option<Box<Node<'a>>>),
    Record(&'a dyn RecordNode),
    Sequence(Vec<Node<'a>>),
    /// Chosen variant of a polymorphic value
    Variant {
        index: usize,
        record: &'a dyn RecordNode,
    },
    Unsupported {
        type_name: &'static str,
        kind: &'static str,
    },
}

impl Node<'_> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Bool(_) => "bool",
            Node::Int(_) => "int",
            Node::Float(_) => "float",
            Node::Str(_) => "string",
            Node::Pointer(_) => "pointer",
            Node::Record(_) => "record",
            Node::Sequence(_) => "sequence",
            Node::Variant { .. } => "variant",
            Node::Unsupported { kind, .. } => *kind,
        }
    }
}

/// Data read from a source, handed to [`Property::from_raw`]
#[derive(Debug, Clone)]
pub enum Raw<'a> {
    /// A stored value (scalar, list or set)
    Value(Value),
    /// A present record, addressed relative to its own element
    Record(Accessor<'a>),
    /// Elements of a record collection
    Sequence(Vec<Raw<'a>>),
    /// The one present variant of a polymorphic value
    Variant { index: usize, accessor: Accessor<'a> },
}

impl Raw<'_> {
    pub fn describe(&self) -> String {
        match self {
            Raw::Value(value) => value.kind_name().to_string(),
            Raw::Record(acc) => format!("record at '{}'", acc.prefix()),
            Raw::Sequence(items) => format!("sequence of {}", items.len()),
            Raw::Variant { index, .. } => format!("variant #{}", index),
        }
    }
}

/// A type that maps to a property value
pub trait Property: Sized {
    /// Static classification of the type
    fn shape() -> Shape;

    /// Borrowed view used for encoding
    fn to_node(&self) -> Node<'_>;

    /// Build a value from raw data
    ///
    /// `Ok(None)` means the data did not fit and the mismatch has already
    /// been reported through the context.
    fn from_raw(raw: Raw<'_>, ctx: &DecodeContext<'_>) -> Result<Option<Self>>;

    /// Decode into an existing value
    fn decode_in_place(&mut self, raw: Raw<'_>, ctx: &DecodeContext<'_>) -> Result<()> {
        if let Some(value) = Self::from_raw(raw, ctx)? {
            *self = value;
        }
        Ok(())
    }
}

/// A struct with named, mappable fields
pub trait Record: Default {
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Declared field table, in declaration order
    fn declared_fields() -> Vec<FieldDecl>;

    /// View of the field at `path` (see [`FieldDescriptor::path`](crate::FieldDescriptor))
    fn field_node(&self, path: &[usize]) -> Option<Node<'_>>;

    /// Decode raw data into the field at `path`
    fn decode_field(&mut self, path: &[usize], raw: Raw<'_>, ctx: &DecodeContext<'_>) -> Result<()>;
}

/// Object-safe view of a [`Record`]
pub trait RecordNode {
    fn record_type_name(&self) -> &'static str;
    fn fields(&self) -> Vec<FieldDecl>;
    fn node_at(&self, path: &[usize]) -> Option<Node<'_>>;
}

impl<T: Record> RecordNode for T {
    fn record_type_name(&self) -> &'static str {
        T::type_name()
    }

    fn fields(&self) -> Vec<FieldDecl> {
        T::declared_fields()
    }

    fn node_at(&self, path: &[usize]) -> Option<Node<'_>> {
        self.field_node(path)
    }
}

/// Shape of a record type
pub fn record_shape<T: Record>() -> Shape {
    Shape::Record {
        type_name: T::type_name(),
        fields: T::declared_fields,
    }
}

/// Error for a field path that does not address a field of `T`
pub fn unknown_field<T: Record>(path: &[usize]) -> Error {
    Error::InvalidTarget {
        type_name: T::type_name().to_string(),
        message: format!("no mapped field at index path {:?}", path),
    }
}

/// Error for a value that cannot be mapped at all
pub fn unsupported<T>(ctx: &DecodeContext<'_>, kind: &str) -> Error {
    Error::unsupported(ctx.field(), std::any::type_name::<T>(), kind)
}
