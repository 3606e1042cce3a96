//! Typed-value decoding.
//!
//! Converts OTLP `AnyValue` unions and `KeyValue` lists into [`AttributeValue`]s
//! and flat [`Attributes`] mappings.

use crate::models::{AttributeValue, Attributes, ScopeInfo};
use crate::otlp::proto::common::v1::{any_value::Value, AnyValue, InstrumentationScope, KeyValue};
use crate::otlp::proto::resource::v1::Resource;

/// Decodes a single OTLP value by matching on its populated variant.
///
/// A value with no populated variant decodes to [`AttributeValue::Empty`].
#[must_use]
pub fn decode_any_value(value: &AnyValue) -> AttributeValue {
    match &value.value {
        Some(Value::StringValue(s)) => AttributeValue::String(s.clone()),
        Some(Value::IntValue(i)) => AttributeValue::Int(*i),
        Some(Value::DoubleValue(d)) => AttributeValue::Double(*d),
        Some(Value::BoolValue(b)) => AttributeValue::Bool(*b),
        Some(Value::BytesValue(b)) => AttributeValue::Bytes(b.clone()),
        Some(Value::ArrayValue(arr)) => {
            AttributeValue::Array(arr.values.iter().map(decode_any_value).collect())
        }
        Some(Value::KvlistValue(kv)) => AttributeValue::KvList(decode_attributes(&kv.values)),
        None => AttributeValue::Empty,
    }
}

/// Decodes an optional OTLP value; an absent value is [`AttributeValue::Empty`].
#[must_use]
pub fn decode_optional_value(value: Option<&AnyValue>) -> AttributeValue {
    value.map_or(AttributeValue::Empty, decode_any_value)
}

/// Flattens an ordered attribute list into a mapping.
///
/// When a key repeats, the later entry wins.
#[must_use]
pub fn decode_attributes(attributes: &[KeyValue]) -> Attributes {
    let mut decoded = Attributes::with_capacity(attributes.len());
    for kv in attributes {
        decoded.insert(kv.key.clone(), decode_optional_value(kv.value.as_ref()));
    }
    decoded
}

/// Flattens the attributes of an optional resource.
#[must_use]
pub fn resource_attributes(resource: Option<&Resource>) -> Attributes {
    resource
        .map(|r| decode_attributes(&r.attributes))
        .unwrap_or_default()
}

/// Extracts the identity of an optional instrumentation scope.
#[must_use]
pub fn decode_scope(scope: Option<&InstrumentationScope>) -> Option<ScopeInfo> {
    scope.map(|s| ScopeInfo {
        name: s.name.clone(),
        version: (!s.version.is_empty()).then(|| s.version.clone()),
        attributes: decode_attributes(&s.attributes),
    })
}

/// Hex-encodes a wire identifier, returning `None` when it is empty.
#[must_use]
pub fn encode_id(bytes: &[u8]) -> Option<String> {
    (!bytes.is_empty()).then(|| hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otlp::proto::common::v1::{ArrayValue, KeyValueList};
    use std::collections::HashMap;

    fn kv(key: &str, value: Value) -> KeyValue {
        KeyValue {
            key: key.to_string(),
            value: Some(AnyValue { value: Some(value) }),
        }
    }

    #[test]
    fn test_decode_string_and_int() {
        let attributes = vec![
            kv("string_attr", Value::StringValue("test_value".to_string())),
            kv("int_attr", Value::IntValue(42)),
        ];

        assert_eq!(
            decode_attributes(&attributes),
            HashMap::from([
                ("string_attr".to_string(), AttributeValue::from("test_value")),
                ("int_attr".to_string(), AttributeValue::Int(42)),
            ])
        );
    }

    #[test]
    fn test_duplicate_key_keeps_last_entry() {
        let attributes = vec![
            kv("env", Value::StringValue("staging".to_string())),
            kv("other", Value::BoolValue(false)),
            kv("env", Value::StringValue("production".to_string())),
        ];

        let decoded = decode_attributes(&attributes);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded["env"], AttributeValue::from("production"));
    }

    #[test]
    fn test_missing_values_decode_to_empty() {
        let attributes = vec![
            KeyValue {
                key: "no_value".to_string(),
                value: None,
            },
            KeyValue {
                key: "no_variant".to_string(),
                value: Some(AnyValue { value: None }),
            },
        ];

        let decoded = decode_attributes(&attributes);
        assert_eq!(decoded["no_value"], AttributeValue::Empty);
        assert_eq!(decoded["no_variant"], AttributeValue::Empty);
    }

    #[test]
    fn test_nested_values() {
        let nested = AnyValue {
            value: Some(Value::KvlistValue(KeyValueList {
                values: vec![
                    kv("ratio", Value::DoubleValue(0.25)),
                    kv(
                        "list",
                        Value::ArrayValue(ArrayValue {
                            values: vec![
                                AnyValue {
                                    value: Some(Value::BoolValue(true)),
                                },
                                AnyValue {
                                    value: Some(Value::BytesValue(vec![1, 2])),
                                },
                            ],
                        }),
                    ),
                ],
            })),
        };

        let AttributeValue::KvList(map) = decode_any_value(&nested) else {
            panic!("expected a key-value list");
        };
        assert_eq!(map["ratio"], AttributeValue::Double(0.25));
        assert_eq!(
            map["list"],
            AttributeValue::Array(vec![
                AttributeValue::Bool(true),
                AttributeValue::Bytes(vec![1, 2])
            ])
        );
    }

    #[test]
    fn test_resource_and_scope() {
        assert!(resource_attributes(None).is_empty());

        let resource = Resource {
            attributes: vec![kv("service.name", Value::StringValue("svc".to_string()))],
            ..Default::default()
        };
        assert_eq!(
            resource_attributes(Some(&resource))["service.name"],
            AttributeValue::from("svc")
        );

        assert!(decode_scope(None).is_none());
        let scope = InstrumentationScope {
            name: "lib".to_string(),
            ..Default::default()
        };
        let info = decode_scope(Some(&scope)).unwrap();
        assert_eq!(info.name, "lib");
        assert!(info.version.is_none());
    }

    #[test]
    fn test_encode_id() {
        assert_eq!(encode_id(&[]), None);
        assert_eq!(encode_id(&[0x0a, 0xff]), Some("0aff".to_string()));
    }
}
