//! Prefix query: expands into the indexed terms sharing a prefix.

use std::any::Any;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::{HalberdError, Result};
use crate::index::IndexSnapshot;
use crate::query::boolean::{BooleanQuery, MAX_CLAUSE_COUNT};
use crate::query::query::Query;
use crate::query::term::TermQuery;
use crate::query::weight::Weight;
use crate::search::dfs::StatsSource;

/// Matches documents containing any term that starts with a prefix.
///
/// Not directly executable: [`rewrite`](Query::rewrite) expands it into a
/// [`BooleanQuery`] of SHOULD term clauses over the snapshot's dictionaries.
#[derive(Debug, Clone)]
pub struct PrefixQuery {
    field: String,
    prefix: String,
    boost: f32,
}

impl PrefixQuery {
    /// Create a new prefix query.
    pub fn new<F, P>(field: F, prefix: P) -> Self
    where
        F: Into<String>,
        P: Into<String>,
    {
        PrefixQuery {
            field: field.into(),
            prefix: prefix.into(),
            boost: 1.0,
        }
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Query for PrefixQuery {
    fn rewrite(&self, snapshot: &IndexSnapshot) -> Result<Option<Arc<dyn Query>>> {
        let mut terms = BTreeSet::new();
        for segment in snapshot.segments() {
            if let Some(field) = segment.field(&self.field) {
                terms.extend(field.terms_with_prefix(&self.prefix).map(str::to_string));
            }
            if terms.len() > MAX_CLAUSE_COUNT {
                return Err(HalberdError::query(format!(
                    "prefix [{}] on field [{}] expands to more than {} terms",
                    self.prefix, self.field, MAX_CLAUSE_COUNT
                )));
            }
        }

        let mut query = BooleanQuery::new();
        for term in terms {
            query.add_should(Arc::new(
                TermQuery::new(self.field.clone(), term).with_boost(self.boost),
            ))?;
        }
        Ok(Some(Arc::new(query)))
    }

    fn create_weight(&self, _stats: &dyn StatsSource) -> Result<Box<dyn Weight>> {
        Err(HalberdError::query(format!(
            "{} must be rewritten before creating a weight",
            self.description()
        )))
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn description(&self) -> String {
        if self.boost == 1.0 {
            format!("{}:{}*", self.field, self.prefix)
        } else {
            format!("{}:{}*^{}", self.field, self.prefix, self.boost)
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexWriter, IndexWriterConfig};

    #[test]
    fn test_rewrite_spans_segments() {
        let mut writer = IndexWriter::with_config(IndexWriterConfig {
            max_buffered_docs: 1,
        });
        writer.add_fields(&[("title", "search")]).unwrap();
        writer.add_fields(&[("title", "seal season")]).unwrap();
        writer.add_fields(&[("title", "apple")]).unwrap();
        let snapshot = writer.snapshot();

        let query = PrefixQuery::new("title", "sea");
        let rewritten = query.rewrite(&snapshot).unwrap().unwrap();
        let boolean = rewritten.as_any().downcast_ref::<BooleanQuery>().unwrap();
        assert_eq!(boolean.description(), "(title:seal title:search title:season)");
        assert!(rewritten.rewrite(&snapshot).unwrap().is_none());
    }

    #[test]
    fn test_weight_requires_rewrite() {
        let snapshot = IndexSnapshot::default();
        let err = PrefixQuery::new("title", "sea")
            .create_weight(&snapshot)
            .unwrap_err();
        assert!(err.to_string().contains("must be rewritten"));
    }

    #[test]
    fn test_description() {
        assert_eq!(PrefixQuery::new("title", "ru").description(), "title:ru*");
        assert_eq!(
            PrefixQuery::new("title", "ru").with_boost(3.0).description(),
            "title:ru*^3"
        );
    }
}
