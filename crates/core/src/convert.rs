//! Default type converter
//!
//! Conversions are lossless or they fail:
//! - `Any` accepts every value unchanged
//! - Identical types pass through
//! - `Int` <-> `Float` when the number is exactly representable
//! - `String` -> `Bytes`, and `Bytes` -> `String` for valid UTF-8
//!
//! Everything else is a [`ConversionError`].

use crate::error::ConversionError;
use crate::shape::ValueType;
use crate::traits::TypeConverter;
use crate::value::Value;

/// Lossless converter between value representations
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConverter;

impl TypeConverter for DefaultConverter {
    fn convert(&self, value: Value, target: &ValueType) -> Result<Value, ConversionError> {
        if *target == ValueType::Any || value.value_type() == *target {
            return Ok(value);
        }
        let from = value.type_name();
        let fail = || ConversionError { from, to: *target };
        match (value, target) {
            (Value::Int(i), ValueType::Float) => {
                let f = i as f64;
                // `f as i64` saturates at the edges, compare in a wider type
                if f as i128 == i128::from(i) {
                    Ok(Value::Float(f))
                } else {
                    Err(fail())
                }
            }
            (Value::Float(f), ValueType::Int) => {
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                    Ok(Value::Int(f as i64))
                } else {
                    Err(fail())
                }
            }
            (Value::String(s), ValueType::Bytes) => Ok(Value::Bytes(s.into_bytes())),
            (Value::Bytes(b), ValueType::String) => {
                String::from_utf8(b).map(Value::String).map_err(|_| fail())
            }
            _ => Err(fail()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identity_and_any() {
        let c = DefaultConverter;
        assert_eq!(c.convert(Value::Int(7), &ValueType::Int), Ok(Value::Int(7)));
        assert_eq!(c.convert(Value::Null, &ValueType::Any), Ok(Value::Null));
        assert_eq!(
            c.convert(Value::String("x".into()), &ValueType::Any),
            Ok(Value::String("x".into()))
        );
    }

    #[test]
    fn test_numeric_conversions() {
        let c = DefaultConverter;
        assert_eq!(c.convert(Value::Int(3), &ValueType::Float), Ok(Value::Float(3.0)));
        assert_eq!(c.convert(Value::Float(4.0), &ValueType::Int), Ok(Value::Int(4)));
        assert!(c.convert(Value::Float(4.5), &ValueType::Int).is_err());
        assert!(c.convert(Value::Float(f64::NAN), &ValueType::Int).is_err());
    }

    #[test]
    fn test_text_conversions() {
        let c = DefaultConverter;
        assert_eq!(
            c.convert(Value::String("ab".into()), &ValueType::Bytes),
            Ok(Value::Bytes(b"ab".to_vec()))
        );
        assert_eq!(
            c.convert(Value::Bytes(b"ab".to_vec()), &ValueType::String),
            Ok(Value::String("ab".into()))
        );
        let err = c.convert(Value::Bytes(vec![0xFF]), &ValueType::String).unwrap_err();
        assert_eq!(err.from, "Bytes");
        assert_eq!(err.to, ValueType::String);
    }

    #[test]
    fn test_null_only_converts_to_any() {
        let c = DefaultConverter;
        assert!(c.convert(Value::Null, &ValueType::Int).is_err());
    }

    #[test]
    fn test_int_extremes_to_float() {
        let c = DefaultConverter;
        assert_eq!(
            c.convert(Value::Int(i64::MAX), &ValueType::Float),
            Err(ConversionError {
                from: "Int",
                to: ValueType::Float
            })
        );
        let min = c.convert(Value::Int(i64::MIN), &ValueType::Float).unwrap();
        assert_eq!(min.as_float(), Some(-9.223372036854775808e18));
        assert_eq!(c.convert(min, &ValueType::Int), Ok(Value::Int(i64::MIN)));
    }

    proptest! {
        #[test]
        fn prop_small_ints_roundtrip_through_float(i in -(1i64 << 52)..(1i64 << 52)) {
            let c = DefaultConverter;
            let f = c.convert(Value::Int(i), &ValueType::Float).unwrap();
            prop_assert_eq!(c.convert(f, &ValueType::Int).unwrap(), Value::Int(i));
        }

        #[test]
        fn prop_accepted_int_to_float_always_roundtrips(
            i in prop_oneof![any::<i64>(), Just(i64::MAX), Just(i64::MIN), Just(i64::MAX - 1)]
        ) {
            let c = DefaultConverter;
            if let Ok(f) = c.convert(Value::Int(i), &ValueType::Float) {
                prop_assert_eq!(c.convert(f, &ValueType::Int).unwrap(), Value::Int(i));
            }
        }
    }
}
