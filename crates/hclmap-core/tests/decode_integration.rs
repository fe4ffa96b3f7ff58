//! End-to-end tests for decoding records from path-addressed sources


use hclmap_core::{
    decode, decode_any, decode_into, encode, variant_candidates, Accessor, Candidate, Config,
    DecodeContext, Decoder, Error, MemorySource, Value,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashMap;
use test_support::*;

#[test]
fn test_numeric_widths() {
    let source = source_from_json(json!({
        "int": 42, "int_8": 42, "int_16": 42, "int_32": 42,
        "uint": 42, "uint_8": 42, "uint_16": 42, "uint_32": 42,
        "float_32": 1.5, "float_64": 1.5
    }));

    let numbers: Numbers = decode(&source).unwrap();
    assert_eq!(numbers, Numbers::uniform(42, 1.5));
}

#[test]
fn test_embedded_fields() {
    let source = source_from_json(json!({
        "global": "g",
        "base_property": "b",
        "derived_property": "d"
    }));

    let derived: Derived = decode(&source).unwrap();
    assert_eq!(derived.base.global, "g");
    assert_eq!(derived.base.property, "b");
    assert_eq!(derived.property, "d");
}

#[test]
fn test_wrap_under() {
    let source = source_from_json(json!({
        "bar_bar": [{"bar_instance": [{"string": "a"}, {"string": "b"}]}]
    }));

    let bar: Bar = decode(&source).unwrap();
    let strings: Vec<&str> = bar.bar_bar.iter().map(|b| b.string.as_str()).collect();
    assert_eq!(strings, vec!["a", "b"]);
}

#[test]
fn test_nested_record_presence() {
    let absent = source_from_json(json!({"name": "x", "limits": []}));
    let settings: Settings = decode(&absent).unwrap();
    assert_eq!(settings.limits, None);

    let present = source_from_json(json!({"limits": [{"max_connections": 5}]}));
    let settings: Settings = decode(&present).unwrap();
    assert_eq!(
        settings.limits,
        Some(Limits {
            max_connections: 5,
            burst: 0
        })
    );
}

#[test]
fn test_decode_into_keeps_absent_fields() {
    let mut settings = Settings {
        name: "keep".to_string(),
        port: 22,
        limits: Some(Limits {
            max_connections: 1,
            burst: 7,
        }),
        ..Settings::default()
    };

    let source = source_from_json(json!({
        "port": 2222,
        "limits": [{"max_connections": 10}]
    }));
    decode_into(&source, &mut settings).unwrap();

    assert_eq!(settings.name, "keep");
    assert_eq!(settings.port, 2222);
    assert_eq!(
        settings.limits,
        Some(Limits {
            max_connections: 10,
            burst: 7
        })
    );
}

#[test]
fn test_enum_and_newtype() {
    let source = source_from_json(json!({"protocol": "udp", "alias": "blue"}));
    let settings: Settings = decode(&source).unwrap();
    assert_eq!(settings.protocol, Protocol::Udp);
    assert_eq!(settings.alias, Alias("blue".to_string()));
}

#[test]
fn test_type_mismatch_is_lenient_by_default() {
    let source = source_from_json(json!({
        "name": 12,
        "port": 70000,
        "protocol": "sctp",
        "enabled": true
    }));

    let settings: Settings = decode(&source).unwrap();
    assert_eq!(settings.name, "");
    assert_eq!(settings.port, 0);
    assert_eq!(settings.protocol, Protocol::Tcp);
    assert!(settings.enabled);
}

#[test]
fn test_type_mismatch_strict() {
    let config = Config {
        strict_types: true,
        ..Config::default()
    };
    let source = source_from_json(json!({"port": 70000}));

    let err = Decoder::new(config).decode::<Settings>(&source).unwrap_err();
    assert_eq!(err.field_path(), vec!["port"]);
    match err.root_cause() {
        Error::TypeMismatch { field, expected, .. } => {
            assert_eq!(field, "port");
            assert_eq!(expected, "u16");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_polymorphic_field() {
    let source = source_from_json(json!({"name": "m", "linux": [{"kernel": "6.1"}]}));
    let machine: Machine = decode(&source).unwrap();
    assert_eq!(
        machine.host,
        Some(Host::Linux(LinuxHost {
            kernel: "6.1".to_string()
        }))
    );

    let source = source_from_json(json!({"name": "m"}));
    let machine: Machine = decode(&source).unwrap();
    assert_eq!(machine.host, None);
}

#[test]
fn test_polymorphic_ambiguity_rejected() {
    let source = source_from_json(json!({
        "linux": [{"kernel": "6.1"}],
        "windows": [{"build": 1}]
    }));

    let err = decode::<Machine>(&source).unwrap_err();
    match err.root_cause() {
        Error::AmbiguousPolymorphicMatch { candidates, .. } => {
            assert_eq!(candidates, &vec!["linux".to_string(), "windows".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_decode_any_with_explicit_candidates() {
    let source = source_from_json(json!({"platform": [{"windows": [{"build": 19045}]}]}));
    let config = Config::default();
    let ctx = DecodeContext::new(&config);
    let accessor = Accessor::new(&source).scoped(&["platform", "0"]);

    let candidates = vec![
        Candidate::record("linux", Host::Linux),
        Candidate::record("windows", Host::Windows),
    ];
    let host = decode_any(&accessor, &candidates, &ctx).unwrap();
    assert_eq!(host, Some(Host::Windows(WindowsHost { build: 19045 })));

    let derived = variant_candidates::<Host>();
    let keys: Vec<&str> = derived.iter().map(Candidate::key).collect();
    assert_eq!(keys, vec!["linux", "windows"]);
    assert_eq!(decode_any(&accessor, &derived, &ctx).unwrap(), host);

    let empty = Accessor::new(&source);
    assert_eq!(decode_any(&empty, &derived, &ctx).unwrap(), None);
}

#[test]
fn test_decode_any_custom_candidate() {
    let source = source_from_json(json!({"port": [{"value": 8080}]}));
    let candidates = vec![Candidate::new("port", |acc: &Accessor<'_>, _ctx: &DecodeContext<'_>| {
        Ok(acc.get_ok("value").and_then(|v| v.as_int()))
    })];

    let value = Decoder::default().decode_any(&source, &candidates).unwrap();
    assert_eq!(value, Some(8080));
}

#[test]
fn test_unordered_collections() {
    let inventory = Inventory {
        ports: vec![443, 80],
        names: vec!["b".to_string(), "a".to_string()],
        protocols: vec![Protocol::Udp, Protocol::Tcp],
        members: vec![
            Rule {
                id: 2,
                action: "deny".to_string(),
            },
            Rule {
                id: 1,
                action: "allow".to_string(),
            },
        ],
    };

    let tree = encode(&inventory).unwrap();
    let decoded: Inventory = decode(&MemorySource::from_tree(&tree)).unwrap();

    let mut ports = decoded.ports.clone();
    ports.sort();
    assert_eq!(ports, vec![80, 443]);

    let mut names = decoded.names.clone();
    names.sort();
    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);

    assert_eq!(decoded.protocols.len(), 2);
    assert!(decoded.protocols.contains(&Protocol::Udp));
    assert_eq!(decoded.members.len(), 2);
}

#[test]
fn test_unordered_records_from_set() {
    use hclmap_core::{PropertyTree, SetHash, ValueSet};

    let mut element = PropertyTree::new();
    element.insert("id", 9i64);
    element.insert("action", "allow");
    let mut tree = PropertyTree::new();
    tree.insert("members", ValueSet::from_values(SetHash::Resource, vec![Value::Map(element)]));

    let decoded: Inventory = decode(&MemorySource::from_tree(&tree)).unwrap();
    assert_eq!(
        decoded.members,
        vec![Rule {
            id: 9,
            action: "allow".to_string()
        }]
    );
}

#[test]
fn test_scalar_collection_from_plain_map_source() {
    let mut source: HashMap<String, Value> = HashMap::new();
    source.insert(
        "tags".to_string(),
        Value::List(vec![Value::from("x"), Value::from("y")]),
    );
    source.insert("weights".to_string(), Value::Int(3));

    let settings: Settings = decode(&source).unwrap();
    assert_eq!(settings.tags, vec!["x".to_string(), "y".to_string()]);
    assert!(settings.weights.is_empty());
}

#[derive(Debug, Default, PartialEq)]
struct Endpoint {
    host: String,
    protocol: Protocol,
    limits: Option<Limits>,
    rules: Vec<Rule>,
    weights: Vec<i32>,
}

impl Endpoint {
    fn to_tree(&self) -> hclmap_core::Result<hclmap_core::PropertyTree> {
        let mut tree = hclmap_core::PropertyTree::new();
        tree.encode("host", &self.host, false)?;
        tree.encode("protocol", &self.protocol, true)?;
        tree.encode("limits", &self.limits, false)?;
        tree.encode("rules", &self.rules, true)?;
        tree.encode("weights", &self.weights, false)?;
        Ok(tree)
    }

    fn from_accessor(decoder: &Decoder, accessor: &Accessor<'_>) -> hclmap_core::Result<Self> {
        let mut endpoint = Endpoint::default();
        decoder.decode_key(accessor, "host", &mut endpoint.host)?;
        decoder.decode_key(accessor, "protocol", &mut endpoint.protocol)?;
        decoder.decode_key(accessor, "limits", &mut endpoint.limits)?;
        decoder.decode_key(accessor, "rules", &mut endpoint.rules)?;
        decoder.decode_key(accessor, "weights", &mut endpoint.weights)?;
        Ok(endpoint)
    }
}

#[test]
fn test_hand_written_mapping() {
    let endpoint = Endpoint {
        host: "db".to_string(),
        protocol: Protocol::Udp,
        limits: Some(Limits {
            max_connections: 4,
            burst: 0,
        }),
        rules: vec![Rule {
            id: 3,
            action: "allow".to_string(),
        }],
        weights: Vec::new(),
    };

    let tree = endpoint.to_tree().unwrap();
    assert_eq!(
        tree.to_json(),
        json!({
            "host": "db",
            "protocol": "udp",
            "limits": [{"max_connections": 4}],
            "rules": [{"id": 3, "action": "allow"}],
            "weights": []
        })
    );

    let source = MemorySource::from_tree(&tree);
    let decoded = Endpoint::from_accessor(&Decoder::default(), &Accessor::new(&source)).unwrap();
    assert_eq!(decoded, endpoint);
}

#[test]
fn test_decode_key_absent_and_nested() {
    let source = source_from_json(json!({"outer": [{"rules": [{"id": 1, "action": "deny"}]}]}));
    let decoder = Decoder::default();
    let outer = Accessor::new(&source).scoped(&["outer", "0"]);

    let mut rules: Vec<Rule> = Vec::new();
    assert!(decoder.decode_key(&outer, "rules", &mut rules).unwrap());
    assert_eq!(
        rules,
        vec![Rule {
            id: 1,
            action: "deny".to_string()
        }]
    );

    let mut host = "kept".to_string();
    assert!(!decoder.decode_key(&outer, "host", &mut host).unwrap());
    assert_eq!(host, "kept");

    let mut limits: Option<Limits> = None;
    assert!(!decoder.decode_key(&outer, "limits", &mut limits).unwrap());
    assert_eq!(limits, None);
}

#[test]
fn test_decode_key_strict_mismatch_names_key() {
    let source = source_from_json(json!({"port": "eighty"}));
    let decoder = Decoder::new(Config {
        strict_types: true,
        ..Config::default()
    });

    let mut port = 0u16;
    let err = decoder.decode_key(&Accessor::new(&source), "port", &mut port).unwrap_err();
    assert_eq!(err.field_path(), vec!["port"]);
    assert!(matches!(err.root_cause(), Error::TypeMismatch { .. }));
}

#[test]
fn test_empty_record_collection_is_present() {
    #[derive(Debug, Default, PartialEq, hclmap_core::Hcl)]
    pub struct Holder {
        pub rules: Option<Vec<Rule>>,
    }

    for holder in [Holder { rules: None }, Holder { rules: Some(Vec::new()) }] {
        let tree = encode(&holder).unwrap();
        let decoded: Holder = decode(&MemorySource::from_tree(&tree)).unwrap();
        assert_eq!(decoded, holder);
    }

    let mut settings = Settings {
        rules: vec![Rule::default()],
        ..Settings::default()
    };
    decode_into(&source_from_json(json!({"rules": []})), &mut settings).unwrap();
    assert!(settings.rules.is_empty());
}
