//! Field descriptor resolution
//!
//! Each record type declares a static table of [`FieldDecl`]s (generated
//! by `#[derive(Hcl)]`). The resolver turns that table into the ordered
//! list of [`FieldDescriptor`]s that all three projections iterate:
//!
//! - non-public fields are skipped
//! - an exclude marker (`-`) skips the field
//! - the primary annotation wins over the fallback (serde) annotation
//! - embedded fields are replaced by the embedded type's descriptors
//!
//! Annotation options that are not recognized are ignored.

mod canonical;

pub use canonical::canonicalize;

use crate::config::Config;
use crate::shape::Shape;

/// Raw annotations attached to a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tags {
    /// `<key>[,omit_empty][,unordered][,wrap_under=<w>]`
    pub primary: Option<&'static str>,
    /// `<key>[,omit_empty]`, lowered from serde attributes
    pub fallback: Option<&'static str>,
    pub doc: Option<&'static str>,
}

/// Declared field of a record type
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub ident: &'static str,
    pub public: bool,
    pub tags: Tags,
    pub shape: fn() -> Shape,
    /// Field table of an embedded record, spliced into the parent
    pub embedded: Option<fn() -> Vec<FieldDecl>>,
}

impl FieldDecl {
    pub fn new(ident: &'static str, shape: fn() -> Shape) -> Self {
        Self {
            ident,
            public: true,
            tags: Tags::default(),
            shape,
            embedded: None,
        }
    }

    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn primary(mut self, tag: &'static str) -> Self {
        self.tags.primary = Some(tag);
        self
    }

    pub fn fallback(mut self, tag: &'static str) -> Self {
        self.tags.fallback = Some(tag);
        self
    }

    pub fn doc(mut self, doc: &'static str) -> Self {
        self.tags.doc = Some(doc);
        self
    }

    pub fn embedded(mut self, fields: fn() -> Vec<FieldDecl>) -> Self {
        self.embedded = Some(fields);
        self
    }
}

/// How a descriptor is projected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Primitive,
    Record,
    Collection,
    Polymorphic,
    Unsupported,
}

/// A resolved, mapped field
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Identifier of the declaring field
    pub ident: &'static str,
    /// Field indices from the resolved record through embedded fields
    pub path: Vec<usize>,
    /// Property key, never empty
    pub key: String,
    pub documentation: String,
    pub omit_empty: bool,
    pub unordered: bool,
    pub wrap_under: Option<String>,
    pub shape: Shape,
}

impl FieldDescriptor {
    /// Descriptor for a value stored directly under `key`, outside any record
    pub fn for_key(key: &str, shape: Shape) -> Self {
        Self {
            ident: "value",
            path: Vec::new(),
            key: key.to_string(),
            documentation: String::new(),
            omit_empty: false,
            unordered: false,
            wrap_under: None,
            shape,
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self.shape.unref() {
            Shape::Bool | Shape::Int | Shape::Float | Shape::String | Shape::Enumeration { .. } => {
                FieldKind::Primitive
            }
            Shape::Record { .. } => FieldKind::Record,
            Shape::Sequence(_) => FieldKind::Collection,
            Shape::Variants { .. } => FieldKind::Polymorphic,
            Shape::Optional(_) | Shape::Unsupported { .. } => FieldKind::Unsupported,
        }
    }
}

#[derive(Debug, Default, PartialEq)]
struct Options {
    key: String,
    omit_empty: bool,
    unordered: bool,
    wrap_under: Option<String>,
}

/// Parse a primary annotation; `None` means the field is excluded
fn parse_primary(tag: &str, ident: &str) -> Option<Options> {
    let items: Vec<&str> = tag.split(',').collect();
    let name = items[0].trim();
    if name == "-" {
        return None;
    }

    let mut options = Options {
        key: if name.is_empty() || name.contains('=') {
            canonicalize(ident)
        } else {
            name.to_string()
        },
        ..Options::default()
    };

    for item in items.iter().map(|item| item.trim()) {
        match item {
            "omit_empty" | "omitempty" => options.omit_empty = true,
            "unordered" => options.unordered = true,
            _ => {
                if let Some(wrap) = item.strip_prefix("wrap_under=") {
                    let wrap = wrap.trim();
                    if !wrap.is_empty() {
                        options.wrap_under = Some(wrap.to_string());
                    }
                }
            }
        }
    }
    Some(options)
}

/// Parse a fallback annotation; `None` means the field is excluded
fn parse_fallback(tag: &str, ident: &str) -> Option<Options> {
    let items: Vec<&str> = tag.split(',').collect();
    let name = items[0].trim();
    if name == "-" {
        return None;
    }
    Some(Options {
        key: canonicalize(if name.is_empty() { ident } else { name }),
        omit_empty: items.iter().any(|item| matches!(item.trim(), "omit_empty" | "omitempty")),
        ..Options::default()
    })
}

/// Resolve a declared field table into descriptors
pub fn resolve(fields: Vec<FieldDecl>, config: &Config) -> Vec<FieldDescriptor> {
    let mut descriptors = Vec::with_capacity(fields.len());
    resolve_into(fields, &[], config, &mut descriptors);
    descriptors
}

fn resolve_into(
    fields: Vec<FieldDecl>,
    prefix: &[usize],
    config: &Config,
    out: &mut Vec<FieldDescriptor>,
) {
    for (index, field) in fields.into_iter().enumerate() {
        if !field.public {
            continue;
        }

        let mut path = prefix.to_vec();
        path.push(index);

        let options = match (field.tags.primary, field.tags.fallback) {
            (Some(primary), _) => parse_primary(primary, field.ident),
            (None, Some(fallback)) => parse_fallback(fallback, field.ident),
            (None, None) => Some(Options {
                key: canonicalize(field.ident),
                ..Options::default()
            }),
        };
        let Some(options) = options else {
            continue;
        };

        if let Some(embedded) = field.embedded {
            resolve_into(embedded(), &path, config, out);
            continue;
        }

        let key = if options.key.is_empty() {
            field.ident.to_string()
        } else {
            options.key
        };

        out.push(FieldDescriptor {
            ident: field.ident,
            path,
            key,
            documentation: field
                .tags
                .doc
                .map(|doc| doc.trim().to_string())
                .filter(|doc| !doc.is_empty())
                .unwrap_or_else(|| config.default_documentation.clone()),
            omit_empty: options.omit_empty,
            unordered: options.unordered,
            wrap_under: options.wrap_under,
            shape: (field.shape)(),
        });
    }
}

#[cfg(test)]
mod tests;
