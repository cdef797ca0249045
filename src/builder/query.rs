//! Query descriptor builders.

use std::fmt::Debug;

use serde_json::{Map, Value, json};

use crate::error::{HalberdError, Result};

/// Something that serialises to a query descriptor.
pub trait QueryBuilder: Debug {
    /// Build the descriptor.
    fn to_json(&self) -> Result<Value>;

    /// Build the descriptor as a compact JSON string.
    fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_json()?)?)
    }
}

/// A fuzzy "more like this" query on a single field.
#[derive(Debug, Clone, Default)]
pub struct FuzzyLikeThisFieldQueryBuilder {
    field: String,
    like_text: Option<String>,
    min_similarity: Option<f32>,
    prefix_length: Option<u32>,
    max_num_terms: Option<u32>,
    ignore_tf: Option<bool>,
    boost: Option<f32>,
}

impl FuzzyLikeThisFieldQueryBuilder {
    /// Create a builder for `field`.
    pub fn new<S: Into<String>>(field: S) -> Self {
        FuzzyLikeThisFieldQueryBuilder {
            field: field.into(),
            ..Default::default()
        }
    }

    /// The text documents should be like. Required.
    pub fn like_text<S: Into<String>>(mut self, like_text: S) -> Self {
        self.like_text = Some(like_text.into());
        self
    }

    pub fn min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = Some(min_similarity);
        self
    }

    pub fn prefix_length(mut self, prefix_length: u32) -> Self {
        self.prefix_length = Some(prefix_length);
        self
    }

    pub fn max_num_terms(mut self, max_num_terms: u32) -> Self {
        self.max_num_terms = Some(max_num_terms);
        self
    }

    pub fn ignore_tf(mut self, ignore_tf: bool) -> Self {
        self.ignore_tf = Some(ignore_tf);
        self
    }

    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = Some(boost);
        self
    }
}

impl QueryBuilder for FuzzyLikeThisFieldQueryBuilder {
    fn to_json(&self) -> Result<Value> {
        let like_text = self.like_text.as_ref().ok_or_else(|| {
            HalberdError::config("fuzzyLikeThis requires 'likeText' to be provided")
        })?;

        let mut body = Map::new();
        body.insert("likeText".to_string(), json!(like_text));
        if let Some(max_num_terms) = self.max_num_terms {
            body.insert("maxNumTerms".to_string(), json!(max_num_terms));
        }
        if let Some(min_similarity) = self.min_similarity {
            body.insert("minSimilarity".to_string(), float_value(min_similarity));
        }
        if let Some(prefix_length) = self.prefix_length {
            body.insert("prefixLength".to_string(), json!(prefix_length));
        }
        if let Some(ignore_tf) = self.ignore_tf {
            body.insert("ignoreTF".to_string(), json!(ignore_tf));
        }
        if let Some(boost) = self.boost {
            body.insert("boost".to_string(), float_value(boost));
        }

        let mut field = Map::new();
        field.insert(self.field.clone(), Value::Object(body));
        let mut root = Map::new();
        root.insert("fuzzyLikeThis".to_string(), Value::Object(field));
        Ok(Value::Object(root))
    }
}

/// An exact term query.
#[derive(Debug, Clone)]
pub struct TermQueryBuilder {
    field: String,
    value: String,
    boost: Option<f32>,
}

impl TermQueryBuilder {
    /// Match documents whose `field` contains `value`.
    pub fn new<F: Into<String>, V: Into<String>>(field: F, value: V) -> Self {
        TermQueryBuilder {
            field: field.into(),
            value: value.into(),
            boost: None,
        }
    }

    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = Some(boost);
        self
    }
}

impl QueryBuilder for TermQueryBuilder {
    fn to_json(&self) -> Result<Value> {
        leaf_query("term", &self.field, &self.value, self.boost)
    }
}

/// A prefix query.
#[derive(Debug, Clone)]
pub struct PrefixQueryBuilder {
    field: String,
    prefix: String,
    boost: Option<f32>,
}

impl PrefixQueryBuilder {
    /// Match documents with a term in `field` starting with `prefix`.
    pub fn new<F: Into<String>, P: Into<String>>(field: F, prefix: P) -> Self {
        PrefixQueryBuilder {
            field: field.into(),
            prefix: prefix.into(),
            boost: None,
        }
    }

    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = Some(boost);
        self
    }
}

impl QueryBuilder for PrefixQueryBuilder {
    fn to_json(&self) -> Result<Value> {
        leaf_query("prefix", &self.field, &self.prefix, self.boost)
    }
}

/// `{"<kind>":{"<field>":"<value>"}}`, or the `{"value","boost"}` form when
/// boosted.
fn leaf_query(kind: &str, field: &str, value: &str, boost: Option<f32>) -> Result<Value> {
    if field.is_empty() {
        return Err(HalberdError::config(format!("{kind} query requires a field")));
    }
    let body = match boost {
        Some(boost) => json!({ "value": value, "boost": float_value(boost) }),
        None => json!(value),
    };
    let mut inner = Map::new();
    inner.insert(field.to_string(), body);
    let mut root = Map::new();
    root.insert(kind.to_string(), Value::Object(inner));
    Ok(Value::Object(root))
}

/// An `f32` as the JSON number it reads as, without the noise of widening
/// it to `f64` bit for bit.
fn float_value(value: f32) -> Value {
    value
        .to_string()
        .parse::<f64>()
        .map_or(Value::Null, Value::from)
}
