//! Normalization of backend result payloads
//!
//! The upload endpoint answers in several shapes: direction fields at the top
//! level, the same fields nested under `result` next to an optional
//! `rl_recommendation`, or an `{error}` object. [`normalize`] maps all of them
//! onto one [`NormalizedResult`] so presentation never branches on shape.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::warn;

use crate::app::models::{Direction, NormalizedResult, Recommendation};
use crate::errors::ValidationError;

/// Map a raw success payload to the canonical result
///
/// Each direction is read from the nested `result` object when it holds a
/// non-null value there, otherwise from the top level.
///
/// # Errors
///
/// Returns `ValidationError::BackendReported` for an `{error}` payload without
/// usable directions, and `ValidationError::MalformedPayload` when a direction
/// is missing or not a non-negative integer.
pub fn normalize(payload: &Value) -> Result<NormalizedResult, ValidationError> {
    let top = payload
        .as_object()
        .ok_or_else(|| ValidationError::MalformedPayload {
            reason: format!("expected a JSON object, got {}", type_name(payload)),
        })?;
    let nested = top.get("result").and_then(Value::as_object);

    let mut per_direction = BTreeMap::new();
    for direction in Direction::ALL {
        match lookup(nested, top, direction.key()) {
            Some(raw) => {
                let seconds = coerce_seconds(raw).ok_or_else(|| {
                    ValidationError::MalformedPayload {
                        reason: format!(
                            "field '{}' is not a non-negative integer: {}",
                            direction.key(),
                            raw
                        ),
                    }
                })?;
                per_direction.insert(direction, seconds);
            }
            None => return Err(missing_direction(top, nested, direction)),
        }
    }

    Ok(NormalizedResult {
        per_direction,
        recommendation: top.get("rl_recommendation").and_then(recommendation),
    })
}

fn lookup<'a>(
    nested: Option<&'a Map<String, Value>>,
    top: &'a Map<String, Value>,
    key: &str,
) -> Option<&'a Value> {
    nested
        .and_then(|n| n.get(key))
        .filter(|v| !v.is_null())
        .or_else(|| top.get(key).filter(|v| !v.is_null()))
}

fn missing_direction(
    top: &Map<String, Value>,
    nested: Option<&Map<String, Value>>,
    direction: Direction,
) -> ValidationError {
    // The backend reports its own failures as {"error": "..."}, sometimes
    // nested under "result" when the optimizer failed
    let reported = top
        .get("error")
        .or_else(|| nested.and_then(|n| n.get("error")))
        .and_then(Value::as_str);

    match reported {
        Some(message) => ValidationError::BackendReported {
            message: message.to_string(),
        },
        None => ValidationError::MalformedPayload {
            reason: format!("missing field '{}'", direction.key()),
        },
    }
}

/// Coerce a JSON value to whole seconds
///
/// Accepts unsigned integers, finite non-negative floats (rounded) and strings
/// holding either.
pub fn coerce_seconds(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => match n.as_u64() {
            Some(whole) => u32::try_from(whole).ok(),
            None => from_float(n.as_f64()?),
        },
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<u64>() {
                Ok(whole) => u32::try_from(whole).ok(),
                Err(_) => from_float(s.parse::<f64>().ok()?),
            }
        }
        _ => None,
    }
}

fn from_float(value: f64) -> Option<u32> {
    if value.is_finite() && value >= 0.0 && value <= f64::from(u32::MAX) {
        Some(value.round() as u32)
    } else {
        None
    }
}

fn recommendation(raw: &Value) -> Option<Recommendation> {
    let object = raw.as_object()?;

    let direction = object.get("direction").and_then(Value::as_str);
    let timer = object.get("timer").and_then(coerce_seconds);

    match (direction, timer) {
        (Some(direction), Some(timer_seconds)) => Some(Recommendation {
            direction: direction.to_string(),
            timer_seconds,
            reason: object
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }),
        _ => {
            warn!("Ignoring unusable recommendation: {}", raw);
            None
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
