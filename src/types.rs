//! Value types flowing through formula evaluation

use crate::core::scope::Node;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as Json;
use std::fmt;

/// A value produced while evaluating a formula.
///
/// `Node` borrows a compound value (object or array) from the caller's
/// context; its leaves are coerced only when a formula reads them.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Number(f64),
    Text(String),
    Boolean(bool),
    /// Native instant, interpreted in the requested zone by date functions
    Date(DateTime<Utc>),
    Null,
    Undefined,
    Node(Node<'a>),
    /// A function library entry read in value position
    Function(&'static str),
}

impl<'a> Value<'a> {
    /// Numeric view used by operators. `None` means the operand has no
    /// numeric reading and the operator should fail.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Null => Some(0.0),
            Value::Text(s) => parse_plain_number(s),
            Value::Date(dt) => Some(dt.timestamp_millis() as f64),
            _ => None,
        }
    }

    /// Loose numeric cast used by library functions: anything without a
    /// numeric reading becomes NaN instead of failing.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Text(s) if s.trim().is_empty() => 0.0,
            Value::Undefined => f64::NAN,
            other => other.as_number().unwrap_or(f64::NAN),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
            Value::Boolean(b) => b.to_string(),
            Value::Date(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            Value::Null => "null".to_string(),
            Value::Undefined => "undefined".to_string(),
            Value::Node(node) => node.to_json_string(),
            Value::Function(name) => format!("[function {}]", name),
        }
    }

    /// Falsy values are `0`, NaN, `""`, `false`, null and undefined.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::Boolean(b) => *b,
            Value::Null | Value::Undefined => false,
            Value::Date(_) | Value::Node(_) | Value::Function(_) => true,
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Boolean(_) => "boolean",
            Value::Date(_) => "date",
            Value::Null => "null",
            Value::Undefined => "undefined",
            Value::Node(node) if node.is_array() => "array",
            Value::Node(_) => "object",
            Value::Function(_) => "function",
        }
    }
}

/// Strict numeric parse of operator operands: optional sign, digits, one
/// dot, optional exponent. Locale-formatted text is handled by coercion
/// before it reaches here.
fn parse_plain_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed == "Infinity" || trimmed == "+Infinity" {
        return Some(f64::INFINITY);
    }
    if trimmed == "-Infinity" {
        return Some(f64::NEG_INFINITY);
    }
    let valid = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    if !valid || !trimmed.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

/// Render a number the way template output expects it: integers without a
/// fractional part, `NaN`, `Infinity`, exponent form outside 1e-6..1e21.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let abs = n.abs();
    if !(1e-6..1e21).contains(&abs) {
        let s = format!("{:e}", n);
        return match s.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => s,
        };
    }
    format!("{}", n)
}

/// Final, normalised result of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Boolean(bool),
    Text(String),
}

impl Scalar {
    /// Null becomes the empty string; compound values keep their JSON text.
    pub fn from_json(value: &Json) -> Self {
        match value {
            Json::Null => Scalar::Text(String::new()),
            Json::Bool(b) => Scalar::Boolean(*b),
            Json::Number(n) => Scalar::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Scalar::Text(s.clone()),
            other => Scalar::Text(other.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Scalar::Text(s) if s.is_empty())
    }
}

impl<'a> From<Value<'a>> for Scalar {
    fn from(value: Value<'a>) -> Self {
        match value {
            Value::Number(n) => Scalar::Number(n),
            Value::Boolean(b) => Scalar::Boolean(b),
            Value::Text(s) => Scalar::Text(s),
            Value::Null | Value::Undefined => Scalar::Text(String::new()),
            other => Scalar::Text(other.as_text()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{}", format_number(*n)),
            Scalar::Boolean(b) => write!(f, "{}", b),
            Scalar::Text(s) => write!(f, "{}", s),
        }
    }
}
