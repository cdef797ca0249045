//! Terms facet: per-term document counts over one field, gathered as a side
//! effect of a scan.

use std::cmp::Ordering;
use std::sync::Arc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::Segment;
use crate::search::collector::Collector;

/// One facet entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCount {
    /// The term.
    pub term: String,
    /// Number of collected documents containing it.
    pub count: u64,
}

/// Result of a terms facet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermsFacet {
    /// Facet name.
    pub name: String,
    /// Faceted field.
    pub field: String,
    /// Top terms, highest count first, ties by term.
    pub terms: Vec<TermCount>,
    /// Documents without the field.
    pub missing: u64,
    /// Documents seen.
    pub total: u64,
}

/// Counts the terms of one field over every collected document.
#[derive(Debug)]
pub struct TermsFacetCollector {
    name: String,
    field: String,
    size: usize,
    counts: AHashMap<String, u64>,
    missing: u64,
    total: u64,
    segment: Option<Arc<Segment>>,
}

impl TermsFacetCollector {
    /// Create a facet named `name` over `field`, reporting the top `size` terms.
    pub fn new<N, F>(name: N, field: F, size: usize) -> Self
    where
        N: Into<String>,
        F: Into<String>,
    {
        TermsFacetCollector {
            name: name.into(),
            field: field.into(),
            size,
            counts: AHashMap::new(),
            missing: 0,
            total: 0,
            segment: None,
        }
    }

    /// Facet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build the facet result.
    pub fn facet(&self) -> TermsFacet {
        let mut terms: Vec<TermCount> = self
            .counts
            .iter()
            .map(|(term, count)| TermCount {
                term: term.clone(),
                count: *count,
            })
            .collect();
        terms.sort_by(|a, b| match b.count.cmp(&a.count) {
            Ordering::Equal => a.term.cmp(&b.term),
            other => other,
        });
        terms.truncate(self.size);

        TermsFacet {
            name: self.name.clone(),
            field: self.field.clone(),
            terms,
            missing: self.missing,
            total: self.total,
        }
    }
}

impl Collector for TermsFacetCollector {
    fn set_segment(&mut self, segment: &Arc<Segment>) -> Result<()> {
        self.segment = Some(Arc::clone(segment));
        Ok(())
    }

    fn collect(&mut self, doc_id: u64, _score: f32) -> Result<()> {
        self.total += 1;

        let terms = self.segment.as_ref().and_then(|segment| {
            let local = doc_id.checked_sub(segment.doc_base())? as u32;
            segment.field(&self.field).map(|field| field.doc_terms(local))
        });

        match terms {
            Some(terms) if !terms.is_empty() => {
                for term in terms {
                    *self.counts.entry(term.clone()).or_insert(0) += 1;
                }
            }
            _ => self.missing += 1,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexWriter;

    #[test]
    fn test_terms_facet_counts() {
        let mut writer = IndexWriter::new();
        writer.add_fields(&[("tags", "rust search")]).unwrap();
        writer.add_fields(&[("tags", "rust rust")]).unwrap();
        writer.add_fields(&[("title", "untagged")]).unwrap();
        writer.add_fields(&[("tags", "java")]).unwrap();
        let snapshot = writer.snapshot();
        let segment = &snapshot.segments()[0];

        let mut collector = TermsFacetCollector::new("tags", "tags", 2);
        collector.set_segment(segment).unwrap();
        for doc in 0..4 {
            collector.collect(doc, 1.0).unwrap();
        }

        let facet = collector.facet();
        assert_eq!(facet.total, 4);
        assert_eq!(facet.missing, 1);
        assert_eq!(
            facet.terms,
            vec![
                TermCount {
                    term: "rust".to_string(),
                    count: 2
                },
                TermCount {
                    term: "java".to_string(),
                    count: 1
                },
            ]
        );
    }
}
