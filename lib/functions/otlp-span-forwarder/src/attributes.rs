//! Attribute value typing.
//!
//! The instrumentation library writes attributes as a flat JSON object of
//! scalars. OTLP needs each value tagged with its type.

use opentelemetry_proto::tonic::common::v1::{AnyValue, KeyValue as ProtoKeyValue, any_value};
use serde::Serialize;
use serde_json::{Map, Value};

/// A typed attribute value. Serializes to the OTLP JSON shape, e.g.
/// `{"intValue": 15}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeValue {
    BoolValue(bool),
    IntValue(i64),
    DoubleValue(f64),
    StringValue(String),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct KeyValue {
    pub key: String,
    pub value: AttributeValue,
}

impl AttributeValue {
    /// Picks the wire type for a JSON value.
    ///
    /// Booleans must be checked before integers. Integers that do not fit an
    /// i64 fall through to doubles. Non-scalar values are kept as their JSON
    /// text.
    pub fn coerce(value: &Value) -> Self {
        match value {
            Value::Bool(b) => Self::BoolValue(*b),
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Self::IntValue(i),
                (None, Some(f)) => Self::DoubleValue(f),
                (None, None) => Self::StringValue(n.to_string()),
            },
            Value::String(s) => Self::StringValue(s.clone()),
            other => Self::StringValue(other.to_string()),
        }
    }

    /// OTLP JSON field name for this value's type.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::BoolValue(_) => "boolValue",
            Self::IntValue(_) => "intValue",
            Self::DoubleValue(_) => "doubleValue",
            Self::StringValue(_) => "stringValue",
        }
    }

    /// The value as plain text, as used for grouping keys.
    pub fn to_text(&self) -> String {
        match self {
            Self::BoolValue(b) => b.to_string(),
            Self::IntValue(i) => i.to_string(),
            Self::DoubleValue(f) => f.to_string(),
            Self::StringValue(s) => s.clone(),
        }
    }
}

/// Converts a flat attribute map, keeping insertion order.
pub fn coerce_attributes(attributes: &Map<String, Value>) -> Vec<KeyValue> {
    attributes
        .iter()
        .map(|(key, value)| KeyValue {
            key: key.clone(),
            value: AttributeValue::coerce(value),
        })
        .collect()
}

impl From<AttributeValue> for AnyValue {
    fn from(value: AttributeValue) -> Self {
        let value = match value {
            AttributeValue::BoolValue(b) => any_value::Value::BoolValue(b),
            AttributeValue::IntValue(i) => any_value::Value::IntValue(i),
            AttributeValue::DoubleValue(f) => any_value::Value::DoubleValue(f),
            AttributeValue::StringValue(s) => any_value::Value::StringValue(s),
        };
        AnyValue { value: Some(value) }
    }
}

impl From<KeyValue> for ProtoKeyValue {
    fn from(kv: KeyValue) -> Self {
        ProtoKeyValue {
            key: kv.key,
            value: Some(kv.value.into()),
        }
    }
}

/// Converts a list of attributes into their protobuf form.
pub fn to_proto(attributes: Vec<KeyValue>) -> Vec<ProtoKeyValue> {
    attributes.into_iter().map(Into::into).collect()
}
