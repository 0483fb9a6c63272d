//! Per-field deserializers for hand-edited metadata.
//!
//! Every helper accepts any JSON value and falls back to the field's default
//! when the value has the wrong shape, so one bad field never rejects the
//! whole document.

use super::codec::extract_leading_integer;
use super::details::{CarSpecs, Curve};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

pub fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => extract_leading_integer(&s),
        _ => 0,
    })
}

pub fn tags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let mut tags: Vec<String> = Vec::new();
    if let Value::Array(values) = Value::deserialize(deserializer)? {
        for value in values {
            if let Value::String(tag) = value {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
        }
    }
    Ok(tags)
}

pub fn curve<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Curve, D::Error> {
    let Value::Array(points) = Value::deserialize(deserializer)? else {
        return Ok(Curve::new());
    };
    Ok(points
        .iter()
        .filter_map(|point| match point {
            Value::Array(pair) if pair.len() == 2 => {
                Some((coordinate(&pair[0]), coordinate(&pair[1])))
            }
            _ => None,
        })
        .collect())
}

pub fn specs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<CarSpecs, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(CarSpecs::default());
    }
    // Every CarSpecs field is itself lenient, this only fails on non-objects.
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// A finite coordinate; anything else (including `"inf"` and `"NaN"`) is 0.
fn coordinate(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|v: &f64| v.is_finite()).unwrap_or(0.0)
}
