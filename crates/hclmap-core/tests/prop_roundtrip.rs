//! Property-based tests for the encode/decode pair
//!
//! Decoding what the encoder produced must give back the input record,
//! and re-encoding a decoded record must reproduce the same tree.


use hclmap_core::{decode, encode, MemorySource, PropertyTree, Record};
use proptest::prelude::*;
use test_support::*;

fn roundtrip<T: Record>(value: &T) -> (PropertyTree, T) {
    let tree = encode(value).unwrap();
    let decoded = decode(&MemorySource::from_tree(&tree)).unwrap();
    (tree, decoded)
}

fn protocol_strategy() -> impl Strategy<Value = Protocol> {
    prop_oneof![Just(Protocol::Tcp), Just(Protocol::Udp)]
}

fn rule_strategy() -> impl Strategy<Value = Rule> {
    (any::<i64>(), "[a-z]{1,8}").prop_map(|(id, action)| Rule { id, action })
}

fn limits_strategy() -> impl Strategy<Value = Limits> {
    (any::<u32>(), any::<i32>()).prop_map(|(max_connections, burst)| Limits {
        max_connections,
        burst,
    })
}

/// Strategy for generating settings
fn settings_strategy() -> impl Strategy<Value = Settings> {
    (
        (
            "[a-z0-9 ]{0,16}",                          // name
            "[a-z ]{0,16}",                             // description
            any::<bool>(),                              // enabled
            any::<u16>(),                               // port
            -1.0e6f64..1.0e6,                           // ratio
            protocol_strategy(),                        // protocol
        ),
        (
            prop::collection::vec("[a-z]{1,6}", 0..4),  // tags
            prop::collection::vec(any::<i32>(), 0..4),  // weights
            proptest::option::of(limits_strategy()),    // limits
            prop::collection::vec(rule_strategy(), 0..3),
            "[a-z]{0,6}",                               // alias
            proptest::option::of("[a-z]{0,6}"),         // nickname
        ),
    )
        .prop_map(
            |(
                (name, description, enabled, port, ratio, protocol),
                (tags, weights, limits, rules, alias, nickname),
            )| Settings {
                name,
                description,
                enabled,
                port,
                ratio,
                protocol,
                tags,
                weights,
                limits,
                rules,
                alias: Alias(alias),
                nickname,
            },
        )
}

fn numbers_strategy() -> impl Strategy<Value = Numbers> {
    (
        (any::<i64>(), any::<i8>(), any::<i16>(), any::<i32>(), 0..=i64::MAX as u64),
        (any::<u8>(), any::<u16>(), any::<u32>(), -1.0e6f32..1.0e6, -1.0e12f64..1.0e12),
    )
        .prop_map(
            |((int, int8, int16, int32, uint), (uint8, uint16, uint32, float32, float64))| Numbers {
                int,
                int8,
                int16,
                int32,
                uint,
                uint8,
                uint16,
                uint32,
                float32,
                float64,
            },
        )
}

fn inventory_strategy() -> impl Strategy<Value = Inventory> {
    (
        prop::collection::vec(-1000i64..1000, 0..6),
        prop::collection::vec("[a-z]{1,4}", 0..6),
        prop::collection::vec(protocol_strategy(), 0..3),
        prop::collection::vec(rule_strategy(), 0..3),
    )
        .prop_map(|(ports, names, protocols, members)| Inventory {
            ports,
            names,
            protocols,
            members,
        })
}

proptest! {
    #[test]
    fn prop_settings_roundtrip(settings in settings_strategy()) {
        let (_, decoded) = roundtrip(&settings);
        prop_assert_eq!(decoded, settings);
    }

    #[test]
    fn prop_numbers_roundtrip(numbers in numbers_strategy()) {
        let (_, decoded) = roundtrip(&numbers);
        prop_assert_eq!(decoded, numbers);
    }

    #[test]
    fn prop_embedded_roundtrip(global in "[a-z]{0,8}", base in "[a-z]{0,8}", own in "[a-z]{0,8}") {
        let derived = Derived {
            base: Base { global, property: base },
            property: own,
        };
        let (_, decoded) = roundtrip(&derived);
        prop_assert_eq!(decoded, derived);
    }

    #[test]
    fn prop_wrapped_sequence_roundtrip(strings in prop::collection::vec("[a-z]{0,8}", 0..5)) {
        let bar = Bar {
            bar_bar: strings.into_iter().map(|string| BarInstance { string }).collect(),
        };
        let (_, decoded) = roundtrip(&bar);
        prop_assert_eq!(decoded, bar);
    }

    #[test]
    fn prop_polymorphic_roundtrip(kernel in "[0-9.]{1,6}", build in any::<i32>(), linux in any::<bool>()) {
        let host = if linux {
            Host::Linux(LinuxHost { kernel })
        } else {
            Host::Windows(WindowsHost { build })
        };
        let machine = Machine { name: "m".to_string(), host: Some(host) };
        let (_, decoded) = roundtrip(&machine);
        prop_assert_eq!(decoded, machine);
    }

    #[test]
    fn prop_reencode_is_stable(settings in settings_strategy(), inventory in inventory_strategy()) {
        let (tree, decoded) = roundtrip(&settings);
        prop_assert_eq!(encode(&decoded).unwrap(), tree);

        // unordered collections may come back reordered but encode identically
        let (tree, decoded) = roundtrip(&inventory);
        prop_assert_eq!(encode(&decoded).unwrap(), tree);
    }
}
