//! Facet descriptor builders.

use std::fmt::Debug;

use serde_json::{Map, Value, json};

use crate::builder::filter::FilterBuilder;
use crate::error::{HalberdError, Result};

/// Something that serialises to a named facet descriptor.
pub trait FacetBuilder: Debug {
    /// Facet name.
    fn name(&self) -> &str;

    /// Build `{"<name>": {...}}`.
    fn to_json(&self) -> Result<Value>;

    /// Build the descriptor as a compact JSON string.
    fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_json()?)?)
    }
}

/// Settings shared by every facet kind.
#[derive(Debug, Default)]
pub struct FacetOptions {
    /// Compute over every document rather than the query's hits.
    pub global: Option<bool>,
    /// Restrict the facet to documents passing this filter.
    pub facet_filter: Option<Box<dyn FilterBuilder>>,
}

impl FacetOptions {
    /// Append `facet_filter` then `global` to a facet body, each only when
    /// set.
    pub fn write_filter_and_global(&self, body: &mut Map<String, Value>) -> Result<()> {
        if let Some(filter) = &self.facet_filter {
            body.insert("facet_filter".to_string(), filter.to_json()?);
        }
        if let Some(global) = self.global {
            body.insert("global".to_string(), Value::Bool(global));
        }
        Ok(())
    }
}

/// Most frequent terms of a field.
#[derive(Debug)]
pub struct TermsFacetBuilder {
    name: String,
    field: Option<String>,
    size: usize,
    options: FacetOptions,
}

impl TermsFacetBuilder {
    pub fn new<S: Into<String>>(name: S) -> Self {
        TermsFacetBuilder {
            name: name.into(),
            field: None,
            size: 10,
            options: FacetOptions::default(),
        }
    }

    /// The faceted field. Required.
    pub fn field<S: Into<String>>(mut self, field: S) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Number of terms to return.
    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn global(mut self, global: bool) -> Self {
        self.options.global = Some(global);
        self
    }

    pub fn facet_filter<F: FilterBuilder + 'static>(mut self, filter: F) -> Self {
        self.options.facet_filter = Some(Box::new(filter));
        self
    }
}

impl FacetBuilder for TermsFacetBuilder {
    fn name(&self) -> &str {
        &self.name
    }

    fn to_json(&self) -> Result<Value> {
        let field = self.field.as_ref().ok_or_else(|| {
            HalberdError::config(format!("terms facet [{}] requires 'field'", self.name))
        })?;

        let mut body = Map::new();
        body.insert(
            "terms".to_string(),
            json!({ "field": field, "size": self.size }),
        );
        self.options.write_filter_and_global(&mut body)?;

        let mut root = Map::new();
        root.insert(self.name.clone(), Value::Object(body));
        Ok(Value::Object(root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::filter::TermFilterBuilder;

    #[test]
    fn test_terms_facet() {
        let json = TermsFacetBuilder::new("tags")
            .field("tag")
            .size(5)
            .to_json_string()
            .unwrap();
        assert_eq!(json, r#"{"tags":{"terms":{"field":"tag","size":5}}}"#);
    }

    #[test]
    fn test_filter_then_global() {
        let json = TermsFacetBuilder::new("tags")
            .global(true)
            .facet_filter(TermFilterBuilder::new("lang", "en"))
            .field("tag")
            .to_json_string()
            .unwrap();
        assert_eq!(
            json,
            r#"{"tags":{"terms":{"field":"tag","size":10},"facet_filter":{"term":{"lang":"en"}},"global":true}}"#
        );
    }

    #[test]
    fn test_missing_field() {
        let err = TermsFacetBuilder::new("tags").to_json().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("terms facet [tags] requires 'field'"));
    }
}
