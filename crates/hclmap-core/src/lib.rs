//! hclmap core: tag-driven mapping between typed records and property trees
//!
//! A host resource-configuration system stores state as a dynamically typed
//! tree addressed by dotted paths. This crate maps Rust records onto that
//! tree in three coordinated directions, all driven by the same field
//! metadata:
//!
//! - **Encode**: typed record to [`PropertyTree`]
//! - **Decode**: [`Source`] (through an [`Accessor`]) back to a typed record
//! - **Schema**: record type to [`SchemaMap`]
//!
//! Field metadata comes from `#[derive(Hcl)]`, which reads `#[hcl(...)]`
//! attributes and falls back to serde's `rename`/`skip`/`flatten`.
//!
//! # Example
//!
//! ```
//! use hclmap_core::{decode, derive_schema, encode, Hcl, MemorySource};
//!
//! #[derive(Debug, Default, PartialEq, Hcl)]
//! pub struct Listener {
//!     pub port: u16,
//!     #[hcl(omit_empty)]
//!     pub protocol: String,
//! }
//!
//! #[derive(Debug, Default, PartialEq, Hcl)]
//! pub struct Service {
//!     /// Name of the service
//!     pub name: String,
//!     pub listener: Option<Listener>,
//! }
//!
//! fn main() -> hclmap_core::Result<()> {
//!     let service = Service {
//!         name: "api".to_string(),
//!         listener: Some(Listener { port: 8080, protocol: String::new() }),
//!     };
//!
//!     let tree = encode(&service)?;
//!     assert_eq!(
//!         tree.to_json(),
//!         serde_json::json!({"name": "api", "listener": [{"port": 8080}]})
//!     );
//!
//!     let decoded: Service = decode(&MemorySource::from_tree(&tree))?;
//!     assert_eq!(decoded, service);
//!
//!     let schema = derive_schema::<Service>()?;
//!     assert_eq!(schema["name"].description, "Name of the service");
//!     Ok(())
//! }
//! ```

extern crate self as hclmap_core;

pub mod accessor;
pub mod config;
pub mod decoder;
pub mod descriptor;
pub mod encoder;
pub mod error;
pub mod export;
pub mod property;
pub mod schema;
pub mod set;
pub mod shape;
pub mod value;

pub use hclmap_derive::Hcl;

pub use accessor::{Accessor, MemorySource, Sink, Source};
pub use config::{Config, ConfigBuilder};
pub use decoder::{decode_any, decode_key, variant_candidates, Candidate, DecodeContext, Decoder};
pub use descriptor::{resolve, FieldDecl, FieldDescriptor, FieldKind, Tags};
pub use encoder::Encoder;
pub use error::{Error, Operation, Result};
pub use property::{Node, Property, Raw, Record, RecordNode};
pub use schema::{SchemaDeriver, SchemaElem, SchemaMap, SchemaNode, ValueKind};
pub use set::{SetHash, ValueSet};
pub use shape::{Shape, VariantDecl};
pub use value::{PropertyTree, Value};

/// Encode a record with the default configuration
pub fn encode<T: Record>(value: &T) -> Result<PropertyTree> {
    Encoder::default().encode(value)
}

/// Decode a record from `source` with the default configuration
pub fn decode<T: Record>(source: &dyn Source) -> Result<T> {
    Decoder::default().decode(source)
}

/// Decode into an existing record with the default configuration
pub fn decode_into<T: Record>(source: &dyn Source, target: &mut T) -> Result<()> {
    Decoder::default().decode_into(source, target)
}

/// Derive the schema of a record type with the default configuration
pub fn derive_schema<T: Record>() -> Result<SchemaMap> {
    SchemaDeriver::default().derive::<T>()
}
