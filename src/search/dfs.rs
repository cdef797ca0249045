//! Distributed frequency statistics.
//!
//! Each shard reports the local document frequencies of the terms in a
//! query ([`ShardDfs`]); the coordinator sums them ([`AggregatedDfs`]) and
//! ships the result back, where it is installed as a [`CachedDfSource`] so
//! every shard scores with the same idf.

use std::fmt::Debug;

use ahash::AHashMap;
use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::IndexSnapshot;
use crate::query::query::Query;
use crate::query::term::Term;
use crate::search::searcher::rewrite_to_fixpoint;

/// Term statistics consulted while building weights.
pub trait StatsSource: Send + Sync + Debug {
    /// Number of documents containing `term`.
    ///
    /// A source that has never seen `term` reports zero, which gives the
    /// term an idf of zero: documents matching only on it score zero.
    fn doc_freq(&self, term: &Term) -> u64;

    /// Total number of documents.
    fn max_doc(&self) -> u64;

    /// Average token count of `field`, when known.
    fn avg_field_length(&self, field: &str) -> Option<f64> {
        let _ = field;
        None
    }
}

/// Aggregate length statistics for one field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldStatistics {
    /// Number of documents with this field.
    pub doc_count: u64,
    /// Total number of tokens.
    pub total_terms: u64,
}

impl FieldStatistics {
    /// Average field length, if any document has the field.
    pub fn avg_length(&self) -> Option<f64> {
        (self.doc_count > 0).then(|| self.total_terms as f64 / self.doc_count as f64)
    }
}

/// One shard's statistics for the terms of a query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShardDfs {
    /// Local document frequency per term.
    pub doc_freqs: Vec<(Term, u64)>,
    /// Local field statistics for every field a term targets.
    pub fields: Vec<(String, FieldStatistics)>,
    /// Local document count.
    pub max_doc: u64,
}

impl ShardDfs {
    /// Collect local statistics for the terms of `query`.
    ///
    /// The query is rewritten against the snapshot first so that expanding
    /// queries (prefix) report the terms they actually score on.
    pub fn collect(snapshot: &IndexSnapshot, query: &dyn Query) -> Result<Self> {
        let mut terms = Vec::new();
        match rewrite_to_fixpoint(snapshot, query)? {
            Some(rewritten) => rewritten.extract_terms(&mut terms),
            None => query.extract_terms(&mut terms),
        }
        terms.sort();
        terms.dedup();

        let mut fields: Vec<(String, FieldStatistics)> = Vec::new();
        for term in &terms {
            if fields.iter().any(|(name, _)| name == term.field()) {
                continue;
            }
            if let Some(stats) = snapshot.field_stats(term.field()) {
                fields.push((term.field().to_string(), stats));
            }
        }

        let doc_freqs: Vec<(Term, u64)> = terms
            .into_iter()
            .map(|term| {
                let df = snapshot.doc_freq(&term);
                (term, df)
            })
            .collect();

        trace!(
            "collected dfs for {} terms over {} docs",
            doc_freqs.len(),
            snapshot.max_doc()
        );

        Ok(ShardDfs {
            doc_freqs,
            fields,
            max_doc: snapshot.max_doc(),
        })
    }
}

/// Statistics summed over every shard of a request.
#[derive(Debug, Clone, Default)]
pub struct AggregatedDfs {
    doc_freqs: AHashMap<Term, u64>,
    fields: AHashMap<String, FieldStatistics>,
    max_doc: u64,
}

impl AggregatedDfs {
    /// Sum the statistics of several shards.
    pub fn aggregate<'a, I>(shards: I) -> Self
    where
        I: IntoIterator<Item = &'a ShardDfs>,
    {
        let mut aggregated = AggregatedDfs::default();
        for shard in shards {
            aggregated.max_doc += shard.max_doc;
            for (term, df) in &shard.doc_freqs {
                *aggregated.doc_freqs.entry(term.clone()).or_insert(0) += df;
            }
            for (field, stats) in &shard.fields {
                let entry = aggregated.fields.entry(field.clone()).or_default();
                entry.doc_count += stats.doc_count;
                entry.total_terms += stats.total_terms;
            }
        }
        aggregated
    }

    /// Summed document frequency of a term, if any shard reported it.
    pub fn doc_freq(&self, term: &Term) -> Option<u64> {
        self.doc_freqs.get(term).copied()
    }

    /// Summed document count.
    pub fn max_doc(&self) -> u64 {
        self.max_doc
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.doc_freqs.len()
    }

    /// Whether no terms were reported.
    pub fn is_empty(&self) -> bool {
        self.doc_freqs.is_empty()
    }
}

/// An immutable [`StatsSource`] over aggregated statistics.
///
/// Terms absent from the aggregate report a document frequency of zero.
#[derive(Debug, Clone)]
pub struct CachedDfSource {
    dfs: AggregatedDfs,
}

impl CachedDfSource {
    /// Wrap aggregated statistics.
    pub fn new(dfs: AggregatedDfs) -> Self {
        CachedDfSource { dfs }
    }

    /// The wrapped statistics.
    pub fn dfs(&self) -> &AggregatedDfs {
        &self.dfs
    }
}

impl StatsSource for CachedDfSource {
    fn doc_freq(&self, term: &Term) -> u64 {
        self.dfs.doc_freq(term).unwrap_or_else(|| {
            warn!("term {term} missing from aggregated statistics; scoring it with df 0");
            0
        })
    }

    fn max_doc(&self) -> u64 {
        self.dfs.max_doc
    }

    fn avg_field_length(&self, field: &str) -> Option<f64> {
        self.dfs.fields.get(field).and_then(FieldStatistics::avg_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexWriter;
    use crate::query::boolean::BooleanQuery;
    use crate::query::prefix::PrefixQuery;
    use crate::query::term::TermQuery;
    use std::sync::Arc;

    fn shard(docs: &[&str]) -> IndexSnapshot {
        let mut writer = IndexWriter::new();
        for doc in docs {
            writer.add_fields(&[("body", *doc)]).unwrap();
        }
        writer.snapshot()
    }

    #[test]
    fn test_collect_shard_dfs() {
        let snapshot = shard(&["rust search", "rust", "java"]);
        let mut query = BooleanQuery::new();
        query.add_should(Arc::new(TermQuery::new("body", "rust"))).unwrap();
        query.add_should(Arc::new(TermQuery::new("body", "java"))).unwrap();
        query.add_must_not(Arc::new(TermQuery::new("body", "search"))).unwrap();

        let dfs = ShardDfs::collect(&snapshot, &query).unwrap();
        assert_eq!(dfs.max_doc, 3);
        assert_eq!(
            dfs.doc_freqs,
            vec![(Term::new("body", "java"), 1), (Term::new("body", "rust"), 2)]
        );
        assert_eq!(
            dfs.fields,
            vec![(
                "body".to_string(),
                FieldStatistics {
                    doc_count: 3,
                    total_terms: 4
                }
            )]
        );
    }

    #[test]
    fn test_collect_expands_prefix() {
        let snapshot = shard(&["search", "seal", "apple"]);
        let dfs = ShardDfs::collect(&snapshot, &PrefixQuery::new("body", "se")).unwrap();
        let terms: Vec<_> = dfs.doc_freqs.iter().map(|(t, _)| t.text()).collect();
        assert_eq!(terms, vec!["seal", "search"]);
    }

    #[test]
    fn test_aggregate_and_cached_source() {
        let a = ShardDfs::collect(&shard(&["rust", "rust", "go"]), &TermQuery::new("body", "rust"))
            .unwrap();
        let b = ShardDfs::collect(&shard(&["rust lang", "go"]), &TermQuery::new("body", "rust"))
            .unwrap();

        let aggregated = AggregatedDfs::aggregate([&a, &b]);
        assert_eq!(aggregated.max_doc(), 5);
        assert_eq!(aggregated.doc_freq(&Term::new("body", "rust")), Some(3));
        assert_eq!(aggregated.len(), 1);

        let source = CachedDfSource::new(aggregated);
        assert_eq!(source.doc_freq(&Term::new("body", "rust")), 3);
        assert_eq!(source.doc_freq(&Term::new("body", "go")), 0);
        assert_eq!(source.max_doc(), 5);
        assert_eq!(source.avg_field_length("body"), Some(6.0 / 5.0));
        assert_eq!(source.avg_field_length("title"), None);
    }

    #[test]
    fn test_collect_rejects_endless_rewrite() {
        #[derive(Debug)]
        struct Endless;

        impl Query for Endless {
            fn rewrite(&self, _snapshot: &IndexSnapshot) -> Result<Option<Arc<dyn Query>>> {
                Ok(Some(Arc::new(Endless)))
            }

            fn create_weight(&self, _stats: &dyn StatsSource) -> Result<Box<dyn crate::query::Weight>> {
                Err(crate::error::HalberdError::query("never primitive"))
            }

            fn boost(&self) -> f32 {
                1.0
            }

            fn description(&self) -> String {
                "endless".to_string()
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }

        let err = ShardDfs::collect(&shard(&["rust"]), &Endless).unwrap_err();
        assert!(err.to_string().contains("did not reach a fixpoint"));
    }
}
