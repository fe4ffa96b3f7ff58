//! Tests for descriptor resolution

use super::*;

fn int_shape() -> Shape {
    Shape::Int
}

fn string_shape() -> Shape {
    Shape::String
}

fn base_fields() -> Vec<FieldDecl> {
    vec![
        FieldDecl::new("global", string_shape),
        FieldDecl::new("property", string_shape).primary("base_property"),
        FieldDecl::new("hidden", string_shape).private(),
    ]
}

fn resolve_default(fields: Vec<FieldDecl>) -> Vec<FieldDescriptor> {
    resolve(fields, &Config::default())
}

#[test]
fn test_default_key_is_canonical_ident() {
    let descriptors = resolve_default(vec![FieldDecl::new("NonZeroString", string_shape)]);
    assert_eq!(descriptors.len(), 1);
    assert_eq!(descriptors[0].key, "non_zero_string");
    assert_eq!(descriptors[0].path, vec![0]);
    assert!(!descriptors[0].omit_empty);
    assert_eq!(descriptors[0].kind(), FieldKind::Primitive);
}

#[test]
fn test_private_fields_skipped() {
    let descriptors = resolve_default(vec![
        FieldDecl::new("secret", string_shape).private(),
        FieldDecl::new("name", string_shape),
    ]);
    assert_eq!(descriptors.len(), 1);
    assert_eq!(descriptors[0].key, "name");
    assert_eq!(descriptors[0].path, vec![1]);
}

#[test]
fn test_exclude_marker() {
    let descriptors = resolve_default(vec![
        FieldDecl::new("a", string_shape).primary("-"),
        FieldDecl::new("b", string_shape).fallback("-"),
        FieldDecl::new("c", string_shape),
    ]);
    let keys: Vec<&str> = descriptors.iter().map(|d| d.key.as_str()).collect();
    assert_eq!(keys, vec!["c"]);
}

#[test]
fn test_primary_options() {
    let descriptors = resolve_default(vec![FieldDecl::new("BarBar", string_shape)
        .primary("bar_bar,omit_empty,unordered,wrap_under=bar_instance")]);
    let d = &descriptors[0];
    assert_eq!(d.key, "bar_bar");
    assert!(d.omit_empty);
    assert!(d.unordered);
    assert_eq!(d.wrap_under.as_deref(), Some("bar_instance"));
}

#[test]
fn test_primary_key_with_equals_is_replaced() {
    let descriptors = resolve_default(vec![
        FieldDecl::new("Items", string_shape).primary("wrap_under=item"),
        FieldDecl::new("Other", string_shape).primary(",omit_empty"),
    ]);
    assert_eq!(descriptors[0].key, "items");
    assert_eq!(descriptors[0].wrap_under.as_deref(), Some("item"));
    assert_eq!(descriptors[1].key, "other");
    assert!(descriptors[1].omit_empty);
}

#[test]
fn test_primary_key_is_not_canonicalized() {
    let descriptors = resolve_default(vec![FieldDecl::new("x", string_shape).primary("MixedCase")]);
    assert_eq!(descriptors[0].key, "MixedCase");
}

#[test]
fn test_primary_wins_over_fallback() {
    let descriptors = resolve_default(vec![FieldDecl::new("value", int_shape)
        .primary("primary_key")
        .fallback("fallbackKey,omit_empty")]);
    assert_eq!(descriptors[0].key, "primary_key");
    assert!(!descriptors[0].omit_empty);
}

#[test]
fn test_fallback_is_canonicalized() {
    let descriptors = resolve_default(vec![
        FieldDecl::new("value", int_shape).fallback("maxCount,omit_empty,unordered"),
        FieldDecl::new("MinCount", int_shape).fallback(""),
    ]);
    assert_eq!(descriptors[0].key, "max_count");
    assert!(descriptors[0].omit_empty);
    assert!(!descriptors[0].unordered);
    assert_eq!(descriptors[1].key, "min_count");
}

#[test]
fn test_unknown_options_ignored() {
    let descriptors = resolve_default(vec![FieldDecl::new("a", string_shape).primary("a,bogus,sorted=true")]);
    assert_eq!(descriptors.len(), 1);
    assert!(!descriptors[0].omit_empty);
    assert!(descriptors[0].wrap_under.is_none());
}

#[test]
fn test_documentation() {
    let config = Config {
        default_documentation: "undocumented".to_string(),
        ..Config::default()
    };
    let descriptors = resolve(
        vec![
            FieldDecl::new("a", string_shape).doc(" The name "),
            FieldDecl::new("b", string_shape),
        ],
        &config,
    );
    assert_eq!(descriptors[0].documentation, "The name");
    assert_eq!(descriptors[1].documentation, "undocumented");
}

#[test]
fn test_embedded_fields_spliced() {
    let descriptors = resolve_default(vec![
        FieldDecl::new("base", string_shape).embedded(base_fields),
        FieldDecl::new("property", string_shape).primary("derived_property"),
    ]);
    let keys: Vec<&str> = descriptors.iter().map(|d| d.key.as_str()).collect();
    assert_eq!(keys, vec!["global", "base_property", "derived_property"]);
    assert_eq!(descriptors[0].path, vec![0, 0]);
    assert_eq!(descriptors[1].path, vec![0, 1]);
    assert_eq!(descriptors[2].path, vec![1]);
}

#[test]
fn test_excluded_embedding_skipped() {
    let descriptors = resolve_default(vec![FieldDecl::new("base", string_shape)
        .embedded(base_fields)
        .primary("-")]);
    assert!(descriptors.is_empty());
}

#[test]
fn test_field_kinds() {
    fn seq() -> Shape {
        Shape::Sequence(Box::new(Shape::Int))
    }
    fn map() -> Shape {
        Shape::Unsupported { type_name: "HashMap", kind: "map" }
    }
    let descriptors = resolve_default(vec![FieldDecl::new("a", seq), FieldDecl::new("b", map)]);
    assert_eq!(descriptors[0].kind(), FieldKind::Collection);
    assert_eq!(descriptors[1].kind(), FieldKind::Unsupported);
}
