//! Reconstruction of typed records from a path-addressed source
//!
//! For every resolved descriptor the decoder reads the data the host stores
//! for it (following the path protocol described in [`crate::accessor`])
//! and hands it to the field's [`Property`] conversion as [`Raw`] data.
//! Keys that are absent leave the destination field untouched.

mod context;

pub use context::DecodeContext;

use crate::accessor::{Accessor, Source};
use crate::config::Config;
use crate::descriptor::{resolve, FieldDescriptor};
use crate::error::{Error, Operation, Result};
use crate::property::{Property, Raw, Record};
use crate::shape::Shape;
use crate::value::Value;

/// Decodes records from a [`Source`]
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: Config,
}

impl Decoder {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decode a new record from the root of `source`
    pub fn decode<T: Record>(&self, source: &dyn Source) -> Result<T> {
        let mut target = T::default();
        self.decode_into(source, &mut target)?;
        Ok(target)
    }

    /// Decode into an existing record; absent keys keep their current value
    pub fn decode_into<T: Record>(&self, source: &dyn Source, target: &mut T) -> Result<()> {
        self.decode_at(&Accessor::new(source), target)
    }

    /// Decode into an existing record addressed by `accessor`
    pub fn decode_at<T: Record>(&self, accessor: &Accessor<'_>, target: &mut T) -> Result<()> {
        let span = tracing::debug_span!("decode", record = T::type_name(), prefix = accessor.prefix());
        let _enter = span.enter();
        let ctx = DecodeContext::new(&self.config);
        decode_fields(target, accessor, &ctx)
    }

    /// Decode the value stored under `key` into `target`
    ///
    /// Returns whether anything was stored; an absent key leaves `target`
    /// untouched.
    pub fn decode_key<P: Property>(&self, accessor: &Accessor<'_>, key: &str, target: &mut P) -> Result<bool> {
        let ctx = DecodeContext::new(&self.config);
        decode_key(accessor, key, target, &ctx)
    }

    /// Decode whichever candidate is present at the root of `source`
    pub fn decode_any<T>(&self, source: &dyn Source, candidates: &[Candidate<'_, T>]) -> Result<Option<T>> {
        let ctx = DecodeContext::new(&self.config);
        decode_any(&Accessor::new(source), candidates, &ctx)
    }
}

/// Decode every mapped field of `target` from `accessor`
pub fn decode_fields<T: Record>(target: &mut T, accessor: &Accessor<'_>, ctx: &DecodeContext<'_>) -> Result<()> {
    let ctx = ctx.descend(T::type_name())?;
    for descriptor in resolve(T::declared_fields(), ctx.config()) {
        let field_ctx = ctx.for_field(&descriptor.key);
        let raw = read_field(&descriptor, accessor, &field_ctx)
            .map_err(|e| e.in_field(Operation::Decode, descriptor.ident))?;
        if let Some(raw) = raw {
            log::trace!("Decoding '{}' from {}", accessor.address(&descriptor.key), raw.describe());
            target
                .decode_field(&descriptor.path, raw, &field_ctx)
                .map_err(|e| e.in_field(Operation::Decode, descriptor.ident))?;
        }
    }
    Ok(())
}

/// Decode a single value stored under `key`, outside any record field table
///
/// Hand-written mappings use this for each of their properties. Records
/// and record collections follow the same path protocol as derived fields.
pub fn decode_key<P: Property>(
    accessor: &Accessor<'_>,
    key: &str,
    target: &mut P,
    ctx: &DecodeContext<'_>,
) -> Result<bool> {
    let descriptor = FieldDescriptor::for_key(key, P::shape());
    let field_ctx = ctx.for_field(key);
    let raw = read_field(&descriptor, accessor, &field_ctx).map_err(|e| e.in_field(Operation::Decode, key))?;
    match raw {
        Some(raw) => {
            target
                .decode_in_place(raw, &field_ctx)
                .map_err(|e| e.in_field(Operation::Decode, key))?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// [`Property::from_raw`] for record types
pub fn decode_record<T: Record>(raw: Raw<'_>, ctx: &DecodeContext<'_>) -> Result<Option<T>> {
    match raw {
        Raw::Record(accessor) => {
            let mut target = T::default();
            decode_fields(&mut target, &accessor, ctx)?;
            Ok(Some(target))
        }
        other => ctx.mismatch(T::type_name(), &other.describe()),
    }
}

/// [`Property::decode_in_place`] for record types
pub fn decode_record_in_place<T: Record>(target: &mut T, raw: Raw<'_>, ctx: &DecodeContext<'_>) -> Result<()> {
    match raw {
        Raw::Record(accessor) => decode_fields(target, &accessor, ctx),
        other => ctx.mismatch::<()>(T::type_name(), &other.describe()).map(|_| ()),
    }
}

fn read_field<'a>(
    descriptor: &FieldDescriptor,
    accessor: &Accessor<'a>,
    ctx: &DecodeContext<'_>,
) -> Result<Option<Raw<'a>>> {
    let key = descriptor.key.as_str();
    match descriptor.shape.unref() {
        Shape::Bool | Shape::Int | Shape::Float | Shape::String | Shape::Enumeration { .. } => {
            Ok(accessor.get_ok(key).filter(|v| !v.is_null()).map(Raw::Value))
        }
        Shape::Record { .. } => {
            if accessor.count(key) == 0 {
                return Ok(None);
            }
            Ok(Some(Raw::Record(accessor.scoped(&[key, "0"]))))
        }
        Shape::Sequence(elem) => read_sequence(descriptor, elem.unref(), accessor, ctx),
        Shape::Variants { variants, .. } => {
            let keys: Vec<String> = variants.iter().map(|v| v.key()).collect();
            Ok(find_candidate(accessor, &keys, ctx.field())?.map(|index| Raw::Variant {
                index,
                accessor: accessor.scoped(&[&keys[index], "0"]),
            }))
        }
        Shape::Unsupported { type_name, kind } => Err(Error::unsupported(descriptor.ident, type_name, kind)),
        Shape::Optional(_) => Err(Error::unsupported(descriptor.ident, &descriptor.shape.type_name(), "optional")),
    }
}

fn read_sequence<'a>(
    descriptor: &FieldDescriptor,
    elem: &Shape,
    accessor: &Accessor<'a>,
    ctx: &DecodeContext<'_>,
) -> Result<Option<Raw<'a>>> {
    let key = descriptor.key.as_str();
    match elem {
        Shape::Bool | Shape::Int | Shape::Float | Shape::String | Shape::Enumeration { .. } => {
            let Some(value) = accessor.get_ok(key).filter(|v| !v.is_null()) else {
                return Ok(None);
            };
            match (&value, descriptor.unordered) {
                (Value::List(_), true) => {
                    log::warn!("Field '{}' is declared unordered but stored as a list", key)
                }
                (Value::Set(_), false) => {
                    log::warn!("Field '{}' is declared ordered but stored as a set", key)
                }
                (Value::List(_) | Value::Set(_), _) => {}
                (other, _) => return ctx.mismatch("collection", other.kind_name()),
            }
            Ok(Some(Raw::Value(value)))
        }
        Shape::Record { .. } => {
            let base = match &descriptor.wrap_under {
                Some(wrap) => {
                    if accessor.count(key) == 0 {
                        return Ok(None);
                    }
                    format!("{}.0.{}", key, wrap)
                }
                None => key.to_string(),
            };

            let stored = accessor.get_ok(&base);
            if descriptor.unordered {
                if let Some(Value::Set(set)) = &stored {
                    let items = set
                        .tokens()
                        .map(|token| Raw::Record(accessor.scoped(&[&base, &token.to_string()])))
                        .collect();
                    return Ok(Some(Raw::Sequence(items)));
                }
                log::debug!("Unordered field '{}' is not stored as a set, reading by index", key);
            }

            let count = accessor.count(&base);
            if count == 0 {
                // a stored empty collection is still present
                let empty = match &stored {
                    Some(Value::List(items)) => items.is_empty(),
                    Some(Value::Set(set)) => set.is_empty(),
                    _ => false,
                };
                return Ok(empty.then(|| Raw::Sequence(Vec::new())));
            }
            let items = (0..count)
                .map(|i| Raw::Record(accessor.scoped(&[&base, &i.to_string()])))
                .collect();
            Ok(Some(Raw::Sequence(items)))
        }
        other => Err(Error::unsupported(
            descriptor.ident,
            &descriptor.shape.type_name(),
            &format!("sequence of {}", other.kind()),
        )),
    }
}

/// Index of the single candidate key present under `accessor`
///
/// Candidates are checked in order. More than one present key is rejected.
fn find_candidate(accessor: &Accessor<'_>, keys: &[String], field: &str) -> Result<Option<usize>> {
    let present: Vec<usize> = keys
        .iter()
        .enumerate()
        .filter(|(_, key)| accessor.count(key) > 0)
        .map(|(index, _)| index)
        .collect();

    match present.as_slice() {
        [] => Ok(None),
        [index] => Ok(Some(*index)),
        _ => Err(Error::AmbiguousPolymorphicMatch {
            field: field.to_string(),
            candidates: present.iter().map(|i| keys[*i].clone()).collect(),
        }),
    }
}

type DecodeFn<'f, T> = Box<dyn Fn(&Accessor<'_>, &DecodeContext<'_>) -> Result<Option<T>> + 'f>;

/// One alternative of a polymorphic decode
pub struct Candidate<'f, T> {
    key: String,
    decode: DecodeFn<'f, T>,
}

impl<'f, T: 'f> Candidate<'f, T> {
    /// Candidate stored under `key`, decoded from `<key>.0` by `decode`
    pub fn new(
        key: impl Into<String>,
        decode: impl Fn(&Accessor<'_>, &DecodeContext<'_>) -> Result<Option<T>> + 'f,
    ) -> Self {
        Self {
            key: key.into(),
            decode: Box::new(decode),
        }
    }

    /// Candidate that decodes record `R` and wraps it into `T`
    pub fn record<R: Record + 'f>(key: impl Into<String>, wrap: impl Fn(R) -> T + 'f) -> Self {
        Self::new(key, move |accessor, ctx| {
            let mut record = R::default();
            decode_fields(&mut record, accessor, ctx)?;
            Ok(Some(wrap(record)))
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Candidates for every variant of a polymorphic type, in declaration order
pub fn variant_candidates<T: Property + 'static>() -> Vec<Candidate<'static, T>> {
    match T::shape().unref() {
        Shape::Variants { variants, .. } => variants
            .iter()
            .enumerate()
            .map(|(index, variant)| {
                Candidate::new(variant.key(), move |accessor, ctx| {
                    T::from_raw(
                        Raw::Variant {
                            index,
                            accessor: accessor.clone(),
                        },
                        ctx,
                    )
                })
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Decode the one candidate whose key is present under `accessor`
///
/// Returns `Ok(None)` when no candidate is present and
/// [`Error::AmbiguousPolymorphicMatch`] when several are.
pub fn decode_any<T>(
    accessor: &Accessor<'_>,
    candidates: &[Candidate<'_, T>],
    ctx: &DecodeContext<'_>,
) -> Result<Option<T>> {
    if candidates.is_empty() {
        return Err(Error::InvalidTarget {
            type_name: std::any::type_name::<T>().to_string(),
            message: "no polymorphic candidates given".to_string(),
        });
    }

    let keys: Vec<String> = candidates.iter().map(|c| c.key.clone()).collect();
    match find_candidate(accessor, &keys, ctx.field())? {
        Some(index) => {
            let scoped = accessor.scoped(&[&keys[index], "0"]);
            (candidates[index].decode)(&scoped, ctx)
        }
        None => Ok(None),
    }
}
