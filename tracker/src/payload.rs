//! Event payload access.
//!
//! Payloads arrive as untyped JSON whose shape varies by producer: flat
//! or nested, camel or snake case, numbers or numeric strings. No schema
//! is enforced. Field resolution consults two regions:
//!
//! 1. the payload root
//! 2. the nested sub-record under the `ecommerce` key, when present
//!
//! A field candidate counts as present when it is a non-empty string or
//! a non-zero number. Everything else (absent, null, empty, zero, or a
//! non-scalar value) falls through to the next candidate in the chain.

use serde_json::{Map, Value};

/// Key of the nested e-commerce sub-record.
pub const ECOMMERCE_KEY: &str = "ecommerce";

/// Untyped event payload as delivered by the host runtime.
#[derive(Clone, Debug)]
pub struct Payload {
    value: Value,
}

impl Payload {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// View over the payload root.
    pub fn root(&self) -> Section<'_> {
        Section::new(&self.value)
    }

    /// View over the nested e-commerce sub-record.
    ///
    /// Falls back to the root for flat payloads, so callers can always
    /// consult the sub-record first without caring about the shape.
    pub fn ecommerce(&self) -> Section<'_> {
        match self.value.get(ECOMMERCE_KEY) {
            Some(nested @ Value::Object(_)) => Section::new(nested),
            _ => self.root(),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }
}

/// Borrowed view over one region of the event payload.
#[derive(Clone, Copy, Debug)]
pub struct Section<'a> {
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> Section<'a> {
    fn new(value: &'a Value) -> Self {
        Self {
            fields: value.as_object(),
        }
    }

    /// Resolve a single field candidate.
    ///
    /// Numbers render through their canonical display form, so a payload
    /// carrying `revenue: 10` and one carrying `revenue: "10"` produce
    /// the same value.
    pub fn field(&self, key: &str) -> Option<String> {
        match self.fields?.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) if !is_zero(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// First present candidate among `keys`, left to right.
    pub fn first(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.field(key))
    }
}

fn is_zero(n: &serde_json::Number) -> bool {
    n.as_f64().is_some_and(|v| v == 0.0)
}
