//! [`Property`] implementations for standard types

use super::{Node, Property, Raw};
use crate::decoder::DecodeContext;
use crate::error::{Error, Result};
use crate::shape::Shape;
use crate::value::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

impl Property for bool {
    fn shape() -> Shape {
        Shape::Bool
    }

    fn to_node(&self) -> Node<'_> {
        Node::Bool(*self)
    }

    fn from_raw(raw: Raw<'_>, ctx: &DecodeContext<'_>) -> Result<Option<Self>> {
        match raw {
            Raw::Value(Value::Bool(b)) => Ok(Some(b)),
            other => ctx.mismatch("bool", &other.describe()),
        }
    }
}

macro_rules! impl_int_property {
    ($($t:ty),* $(,)?) => {
        $(
            impl Property for $t {
                fn shape() -> Shape {
                    Shape::Int
                }

                fn to_node(&self) -> Node<'_> {
                    Node::Int(*self as i128)
                }

                fn from_raw(raw: Raw<'_>, ctx: &DecodeContext<'_>) -> Result<Option<Self>> {
                    let wide = match raw {
                        Raw::Value(Value::Int(i)) => i128::from(i),
                        Raw::Value(Value::Float(f)) if f.is_finite() && f.fract() == 0.0 => f as i128,
                        other => return ctx.mismatch(stringify!($t), &other.describe()),
                    };
                    match <$t>::try_from(wide) {
                        Ok(value) => Ok(Some(value)),
                        Err(_) => ctx.mismatch(stringify!($t), &format!("out of range value {}", wide)),
                    }
                }
            }
        )*
    };
}

impl_int_property!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_float_property {
    ($($t:ty),* $(,)?) => {
        $(
            impl Property for $t {
                fn shape() -> Shape {
                    Shape::Float
                }

                fn to_node(&self) -> Node<'_> {
                    Node::Float(f64::from(*self))
                }

                fn from_raw(raw: Raw<'_>, ctx: &DecodeContext<'_>) -> Result<Option<Self>> {
                    match raw {
                        Raw::Value(Value::Float(f)) => Ok(Some(f as $t)),
                        Raw::Value(Value::Int(i)) => Ok(Some(i as $t)),
                        other => ctx.mismatch(stringify!($t), &other.describe()),
                    }
                }
            }
        )*
    };
}

impl_float_property!(f32, f64);

impl Property for String {
    fn shape() -> Shape {
        Shape::String
    }

    fn to_node(&self) -> Node<'_> {
        Node::Str(Cow::Borrowed(self))
    }

    fn from_raw(raw: Raw<'_>, ctx: &DecodeContext<'_>) -> Result<Option<Self>> {
        match raw {
            Raw::Value(Value::String(s)) => Ok(Some(s)),
            other => ctx.mismatch("string", &other.describe()),
        }
    }
}

impl<T: Property> Property for Option<T> {
    fn shape() -> Shape {
        Shape::Optional(Box::new(T::shape()))
    }

    fn to_node(&self) -> Node<'_> {
        Node::Pointer(self.as_ref().map(|value| Box::new(value.to_node())))
    }

    fn from_raw(raw: Raw<'_>, ctx: &DecodeContext<'_>) -> Result<Option<Self>> {
        Ok(T::from_raw(raw, ctx)?.map(Some))
    }

    fn decode_in_place(&mut self, raw: Raw<'_>, ctx: &DecodeContext<'_>) -> Result<()> {
        match self {
            Some(inner) => inner.decode_in_place(raw, ctx),
            None => {
                if let Some(value) = T::from_raw(raw, ctx)? {
                    *self = Some(value);
                }
                Ok(())
            }
        }
    }
}

impl<T: Property> Property for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn to_node(&self) -> Node<'_> {
        (**self).to_node()
    }

    fn from_raw(raw: Raw<'_>, ctx: &DecodeContext<'_>) -> Result<Option<Self>> {
        Ok(T::from_raw(raw, ctx)?.map(Box::new))
    }

    fn decode_in_place(&mut self, raw: Raw<'_>, ctx: &DecodeContext<'_>) -> Result<()> {
        (**self).decode_in_place(raw, ctx)
    }
}

impl<T: Property> Property for Vec<T> {
    fn shape() -> Shape {
        Shape::Sequence(Box::new(T::shape()))
    }

    fn to_node(&self) -> Node<'_> {
        Node::Sequence(self.iter().map(Property::to_node).collect())
    }

    fn from_raw(raw: Raw<'_>, ctx: &DecodeContext<'_>) -> Result<Option<Self>> {
        let items: Vec<Raw<'_>> = match raw {
            Raw::Sequence(items) => items,
            Raw::Value(Value::List(items)) => items.into_iter().map(Raw::Value).collect(),
            Raw::Value(Value::Set(set)) => set.values().cloned().map(Raw::Value).collect(),
            other => return ctx.mismatch("sequence", &other.describe()),
        };

        let mut values = Vec::with_capacity(items.len());
        for item in items {
            if let Some(value) = T::from_raw(item, ctx)? {
                values.push(value);
            }
        }
        Ok(Some(values))
    }
}

impl<K, V, S> Property for HashMap<K, V, S> {
    fn shape() -> Shape {
        Shape::Unsupported {
            type_name: std::any::type_name::<Self>(),
            kind: "map",
        }
    }

    fn to_node(&self) -> Node<'_> {
        Node::Unsupported {
            type_name: std::any::type_name::<Self>(),
            kind: "map",
        }
    }

    fn from_raw(_raw: Raw<'_>, ctx: &DecodeContext<'_>) -> Result<Option<Self>> {
        Err(super::unsupported::<Self>(ctx, "map"))
    }
}

impl<K, V> Property for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::Unsupported {
            type_name: std::any::type_name::<Self>(),
            kind: "map",
        }
    }

    fn to_node(&self) -> Node<'_> {
        Node::Unsupported {
            type_name: std::any::type_name::<Self>(),
            kind: "map",
        }
    }

    fn from_raw(_raw: Raw<'_>, ctx: &DecodeContext<'_>) -> Result<Option<Self>> {
        Err(super::unsupported::<Self>(ctx, "map"))
    }
}

impl Property for Value {
    fn shape() -> Shape {
        Shape::Unsupported {
            type_name: "Value",
            kind: "dynamic",
        }
    }

    fn to_node(&self) -> Node<'_> {
        Node::Unsupported {
            type_name: "Value",
            kind: "dynamic",
        }
    }

    fn from_raw(_raw: Raw<'_>, ctx: &DecodeContext<'_>) -> Result<Option<Self>> {
        Err(Error::unsupported(ctx.field(), "Value", "dynamic"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::set::{SetHash, ValueSet};

    fn raw(value: impl Into<Value>) -> Raw<'static> {
        Raw::Value(value.into())
    }

    #[test]
    fn test_int_narrowing() {
        let config = Config::default();
        let ctx = DecodeContext::new(&config);
        assert_eq!(u8::from_raw(raw(200i64), &ctx).unwrap(), Some(200));
        assert_eq!(u8::from_raw(raw(300i64), &ctx).unwrap(), None);
        assert_eq!(i32::from_raw(raw(-5i64), &ctx).unwrap(), Some(-5));
        assert_eq!(u64::from_raw(raw(-1i64), &ctx).unwrap(), None);
        assert_eq!(i64::from_raw(raw(42.0), &ctx).unwrap(), Some(42));
        assert_eq!(i64::from_raw(raw(42.5), &ctx).unwrap(), None);
    }

    #[test]
    fn test_strict_mismatch_is_error() {
        let config = Config {
            strict_types: true,
            ..Config::default()
        };
        let ctx = DecodeContext::new(&config).for_field("port");
        let err = u16::from_raw(raw("eighty"), &ctx).unwrap_err();
        match err {
            Error::TypeMismatch { field, expected, found } => {
                assert_eq!(field, "port");
                assert_eq!(expected, "u16");
                assert_eq!(found, "string");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_float_accepts_int() {
        let config = Config::default();
        let ctx = DecodeContext::new(&config);
        assert_eq!(f64::from_raw(raw(3i64), &ctx).unwrap(), Some(3.0));
        assert_eq!(f32::from_raw(raw(1.5), &ctx).unwrap(), Some(1.5));
        assert_eq!(f64::from_raw(raw(true), &ctx).unwrap(), None);
    }

    #[test]
    fn test_sequence_from_list_and_set() {
        let config = Config::default();
        let ctx = DecodeContext::new(&config);

        let list = Value::List(vec![Value::from("a"), Value::Int(1), Value::from("b")]);
        let strings = Vec::<String>::from_raw(Raw::Value(list), &ctx).unwrap().unwrap();
        assert_eq!(strings, vec!["a".to_string(), "b".to_string()]);

        let set = ValueSet::from_values(SetHash::Int, vec![Value::Int(3), Value::Int(1)]);
        let mut ints = Vec::<i32>::from_raw(Raw::Value(Value::Set(set)), &ctx).unwrap().unwrap();
        ints.sort();
        assert_eq!(ints, vec![1, 3]);
    }

    #[test]
    fn test_option_lazy_allocation() {
        let config = Config::default();
        let ctx = DecodeContext::new(&config);

        let mut target: Option<String> = None;
        target.decode_in_place(raw(7i64), &ctx).unwrap();
        assert_eq!(target, None);

        target.decode_in_place(raw("set"), &ctx).unwrap();
        assert_eq!(target.as_deref(), Some("set"));
    }

    #[test]
    fn test_map_is_unsupported() {
        let config = Config::default();
        let ctx = DecodeContext::new(&config).for_field("labels");
        assert_eq!(HashMap::<String, String>::shape().kind(), "map");
        let err = BTreeMap::<String, i32>::from_raw(raw(1i64), &ctx).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType { ref field, .. } if field == "labels"));
    }
}
