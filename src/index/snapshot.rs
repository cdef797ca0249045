//! Point-in-time, read-only view over a set of segments.

use std::sync::Arc;

use crate::index::segment::{Segment, StoredDocument};
use crate::query::term::Term;
use crate::search::dfs::{FieldStatistics, StatsSource};

/// An immutable list of segments, cheap to clone and safe to share across
/// threads. A snapshot is also the local-statistics [`StatsSource`].
#[derive(Debug, Clone, Default)]
pub struct IndexSnapshot {
    segments: Arc<[Arc<Segment>]>,
}

impl IndexSnapshot {
    /// Create a snapshot over the given segments.
    pub fn new(segments: Vec<Arc<Segment>>) -> Self {
        IndexSnapshot {
            segments: segments.into(),
        }
    }

    /// The segments, in doc id order.
    pub fn segments(&self) -> &[Arc<Segment>] {
        &self.segments
    }

    /// Total documents including deleted ones.
    pub fn max_doc(&self) -> u64 {
        self.segments.iter().map(|s| s.max_doc() as u64).sum()
    }

    /// Live documents.
    pub fn num_docs(&self) -> u64 {
        self.segments.iter().map(|s| s.num_docs() as u64).sum()
    }

    /// Document frequency summed over all segments.
    pub fn doc_freq(&self, term: &Term) -> u64 {
        self.segments
            .iter()
            .filter_map(|s| s.postings(term.field(), term.text()))
            .map(|p| p.doc_frequency())
            .sum()
    }

    /// Field statistics summed over all segments.
    pub fn field_stats(&self, field: &str) -> Option<FieldStatistics> {
        let mut stats = FieldStatistics::default();
        let mut found = false;
        for field_index in self.segments.iter().filter_map(|s| s.field(field)) {
            found = true;
            stats.doc_count += field_index.doc_count();
            stats.total_terms += field_index.total_terms();
        }
        found.then_some(stats)
    }

    /// Stored fields of a global doc id.
    pub fn document(&self, doc_id: u64) -> Option<&StoredDocument> {
        let segment = self
            .segments
            .iter()
            .find(|s| doc_id >= s.doc_base() && doc_id < s.doc_base() + s.max_doc() as u64)?;
        segment.document((doc_id - segment.doc_base()) as u32)
    }
}

impl StatsSource for IndexSnapshot {
    fn doc_freq(&self, term: &Term) -> u64 {
        IndexSnapshot::doc_freq(self, term)
    }

    fn max_doc(&self) -> u64 {
        IndexSnapshot::max_doc(self)
    }

    fn avg_field_length(&self, field: &str) -> Option<f64> {
        self.field_stats(field).and_then(|s| s.avg_length())
    }
}
