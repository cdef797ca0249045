//! Filter descriptor builders.

use std::fmt::Debug;

use serde_json::{Map, Value};

use crate::error::{HalberdError, Result};

/// Something that serialises to a filter descriptor.
pub trait FilterBuilder: Debug {
    /// Build the descriptor.
    fn to_json(&self) -> Result<Value>;

    /// Build the descriptor as a compact JSON string.
    fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_json()?)?)
    }
}

/// Passes documents whose field contains a term.
#[derive(Debug, Clone)]
pub struct TermFilterBuilder {
    field: String,
    value: String,
}

impl TermFilterBuilder {
    pub fn new<F: Into<String>, V: Into<String>>(field: F, value: V) -> Self {
        TermFilterBuilder {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl FilterBuilder for TermFilterBuilder {
    fn to_json(&self) -> Result<Value> {
        if self.field.is_empty() {
            return Err(HalberdError::config("term filter requires a field"));
        }
        let mut inner = Map::new();
        inner.insert(self.field.clone(), Value::String(self.value.clone()));
        let mut root = Map::new();
        root.insert("term".to_string(), Value::Object(inner));
        Ok(Value::Object(root))
    }
}
