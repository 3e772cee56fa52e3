//! Layered variable scope
//!
//! A formula resolves names against, in increasing precedence: the function
//! library, the root context, the local context, the named arguments and
//! native instants bound by the caller.
//! Context data is never copied; [`Node`] borrows compound values and
//! coerces leaves only when they are read.

use super::coercion::coerce;
use super::functions::{Builtin, FunctionLibrary};
use crate::config::NumberFormat;
use crate::types::Value;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;
use std::fmt;

/// Read-through view over a borrowed JSON object or array.
#[derive(Clone, Copy, PartialEq)]
pub struct Node<'a> {
    value: &'a Json,
    format: &'a NumberFormat,
}

impl<'a> Node<'a> {
    pub fn is_array(&self) -> bool {
        self.value.is_array()
    }

    pub fn raw(&self) -> &'a Json {
        self.value
    }

    /// Property access: object keys, `length` and numeric keys on arrays.
    pub fn get(&self, key: &str) -> Value<'a> {
        match self.value {
            Json::Object(map) => map
                .get(key)
                .map(|v| wrap(v, self.format))
                .unwrap_or(Value::Undefined),
            Json::Array(items) => {
                if key == "length" {
                    return Value::Number(items.len() as f64);
                }
                key.parse::<usize>()
                    .ok()
                    .and_then(|i| items.get(i))
                    .map(|v| wrap(v, self.format))
                    .unwrap_or(Value::Undefined)
            }
            _ => Value::Undefined,
        }
    }

    /// Bracket access with an evaluated key.
    pub fn index(&self, key: &Value<'_>) -> Value<'a> {
        match (self.value, key) {
            (Json::Array(items), Value::Number(n)) => {
                if n.fract() != 0.0 || *n < 0.0 {
                    return Value::Undefined;
                }
                items
                    .get(*n as usize)
                    .map(|v| wrap(v, self.format))
                    .unwrap_or(Value::Undefined)
            }
            (_, Value::Text(s)) => self.get(s),
            (_, other) => self.get(&other.as_text()),
        }
    }

    /// Elements of an array node, each coerced. Empty for objects.
    pub fn elements(&self) -> Vec<Value<'a>> {
        match self.value {
            Json::Array(items) => items.iter().map(|v| wrap(v, self.format)).collect(),
            _ => Vec::new(),
        }
    }

    pub fn to_json_string(&self) -> String {
        self.value.to_string()
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.value)
    }
}

/// Wrap a context value: scalars become formula values (text is coerced),
/// compounds become lazy nodes.
pub fn wrap<'a>(value: &'a Json, format: &'a NumberFormat) -> Value<'a> {
    match value {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Boolean(*b),
        Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        Json::String(s) => coerce(Value::Text(s.clone()), format),
        Json::Array(_) | Json::Object(_) => Value::Node(Node { value, format }),
    }
}

/// Native instants keyed by variable name.
pub type Instants = BTreeMap<String, DateTime<Utc>>;

/// Name resolution environment for one evaluation.
#[derive(Debug)]
pub struct Scope<'a> {
    /// Lowest precedence first.
    layers: Vec<&'a Map<String, Json>>,
    instants: Option<&'a Instants>,
    functions: &'a FunctionLibrary,
    format: &'a NumberFormat,
}

impl<'a> Scope<'a> {
    pub fn builder(functions: &'a FunctionLibrary, format: &'a NumberFormat) -> ScopeBuilder<'a> {
        ScopeBuilder {
            root: None,
            local: None,
            named: None,
            instants: None,
            functions,
            format,
        }
    }

    pub fn format(&self) -> &'a NumberFormat {
        self.format
    }

    /// Value-position lookup: instants, data layers, then the reserved
    /// `undefined`, then the function library.
    pub fn lookup(&self, name: &str) -> Option<Value<'a>> {
        if let Some(instant) = self.instants.and_then(|instants| instants.get(name)) {
            return Some(Value::Date(*instant));
        }
        for layer in self.layers.iter().rev() {
            if let Some(value) = layer.get(name) {
                return Some(wrap(value, self.format));
            }
        }
        if name == "undefined" {
            return Some(Value::Undefined);
        }
        self.functions.get(name).map(|(name, _)| Value::Function(name))
    }

    /// Call-position lookup.
    pub fn function(&self, name: &str) -> Option<(&'static str, Builtin)> {
        self.functions.get(name)
    }
}

pub struct ScopeBuilder<'a> {
    root: Option<&'a Json>,
    local: Option<&'a Json>,
    named: Option<&'a Map<String, Json>>,
    instants: Option<&'a Instants>,
    functions: &'a FunctionLibrary,
    format: &'a NumberFormat,
}

impl<'a> ScopeBuilder<'a> {
    pub fn root(mut self, root: Option<&'a Json>) -> Self {
        self.root = root;
        self
    }

    pub fn local(mut self, local: Option<&'a Json>) -> Self {
        self.local = local;
        self
    }

    pub fn named(mut self, named: Option<&'a Map<String, Json>>) -> Self {
        self.named = named;
        self
    }

    pub fn instants(mut self, instants: Option<&'a Instants>) -> Self {
        self.instants = instants;
        self
    }

    pub fn build(self) -> Scope<'a> {
        let mut layers = Vec::with_capacity(3);
        // Only objects contribute top-level names.
        if let Some(Json::Object(map)) = self.root {
            layers.push(map);
        }
        if let Some(Json::Object(map)) = self.local {
            layers.push(map);
        }
        if let Some(map) = self.named {
            layers.push(map);
        }
        Scope {
            layers,
            instants: self.instants,
            functions: self.functions,
            format: self.format,
        }
    }
}
