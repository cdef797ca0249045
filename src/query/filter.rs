//! Filters restrict a scan to a per-segment set of documents without
//! affecting scores.

use std::fmt::Debug;
use std::sync::Arc;

use bit_vec::BitVec;

use crate::error::Result;
use crate::index::{IndexSnapshot, NO_MORE_DOCS, Segment};
use crate::query::query::Query;
use crate::query::term::Term;

/// A per-segment document set.
pub trait Filter: Send + Sync + Debug {
    /// Bit set over the segment's local doc ids; set bits pass the filter.
    fn doc_set(&self, snapshot: &IndexSnapshot, segment: &Segment) -> Result<BitVec>;

    /// Get a human-readable description of this filter.
    fn description(&self) -> String;
}

/// Passes documents containing a term.
#[derive(Debug, Clone)]
pub struct TermFilter {
    term: Term,
}

impl TermFilter {
    /// Create a new term filter.
    pub fn new<F, T>(field: F, text: T) -> Self
    where
        F: Into<String>,
        T: Into<String>,
    {
        TermFilter {
            term: Term::new(field, text),
        }
    }
}

impl Filter for TermFilter {
    fn doc_set(&self, _snapshot: &IndexSnapshot, segment: &Segment) -> Result<BitVec> {
        let mut bits = BitVec::from_elem(segment.max_doc() as usize, false);
        if let Some(postings) = segment.postings(self.term.field(), self.term.text()) {
            let mut iter = postings.iter();
            while let Some(posting) = iter.next() {
                bits.set(posting.doc_id as usize, true);
            }
        }
        Ok(bits)
    }

    fn description(&self) -> String {
        self.term.to_string()
    }
}

/// Passes documents matched by a query.
#[derive(Debug, Clone)]
pub struct QueryWrapperFilter {
    query: Arc<dyn Query>,
}

impl QueryWrapperFilter {
    /// Wrap a query as a filter.
    pub fn new(query: Arc<dyn Query>) -> Self {
        QueryWrapperFilter { query }
    }
}

impl Filter for QueryWrapperFilter {
    fn doc_set(&self, snapshot: &IndexSnapshot, segment: &Segment) -> Result<BitVec> {
        let mut query = Arc::clone(&self.query);
        while let Some(rewritten) = query.rewrite(snapshot)? {
            query = rewritten;
        }
        let weight = query.create_weight(snapshot)?;

        let mut bits = BitVec::from_elem(segment.max_doc() as usize, false);
        if let Some(mut scorer) = weight.scorer(segment)? {
            loop {
                let doc = scorer.next()?;
                if doc == NO_MORE_DOCS {
                    break;
                }
                bits.set(doc as usize, true);
            }
        }
        Ok(bits)
    }

    fn description(&self) -> String {
        format!("QueryWrapperFilter({})", self.query.description())
    }
}
