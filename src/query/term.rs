//! Term query implementation for exact term matching.

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::{NO_MORE_DOCS, PostingIterator, Segment};
use crate::query::query::Query;
use crate::query::scorer::{Bm25Similarity, Scorer};
use crate::query::weight::Weight;
use crate::search::dfs::StatsSource;

/// A field/text pair: the unit of term statistics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Term {
    field: String,
    text: String,
}

impl Term {
    /// Create a new term.
    pub fn new<F, T>(field: F, text: T) -> Self
    where
        F: Into<String>,
        T: Into<String>,
    {
        Term {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the term text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.text)
    }
}

/// A query that matches documents containing a specific term.
#[derive(Debug, Clone)]
pub struct TermQuery {
    /// The term to search for.
    term: Term,
    /// The boost factor for this query.
    boost: f32,
}

impl TermQuery {
    /// Create a new term query.
    ///
    /// The term is not analyzed; pass it in its indexed (lower-cased) form.
    pub fn new<F, T>(field: F, term: T) -> Self
    where
        F: Into<String>,
        T: Into<String>,
    {
        TermQuery {
            term: Term::new(field, term),
            boost: 1.0,
        }
    }

    /// Get the term.
    pub fn term(&self) -> &Term {
        &self.term
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl Query for TermQuery {
    fn create_weight(&self, stats: &dyn StatsSource) -> Result<Box<dyn Weight>> {
        Ok(Box::new(TermWeight::new(
            self.term.clone(),
            self.boost,
            stats,
        )))
    }

    fn extract_terms(&self, terms: &mut Vec<Term>) {
        terms.push(self.term.clone());
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn description(&self) -> String {
        if self.boost == 1.0 {
            self.term.to_string()
        } else {
            format!("{}^{}", self.term, self.boost)
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Weight of a [`TermQuery`], carrying the statistics it was built from.
#[derive(Debug, Clone)]
pub struct TermWeight {
    term: Term,
    boost: f32,
    doc_freq: u64,
    doc_count: u64,
    idf: f32,
    avg_field_length: f32,
    similarity: Bm25Similarity,
}

impl TermWeight {
    /// Build a weight from whatever statistics source is in effect.
    pub fn new(term: Term, boost: f32, stats: &dyn StatsSource) -> Self {
        let similarity = Bm25Similarity::default();
        let doc_freq = stats.doc_freq(&term);
        let doc_count = stats.max_doc();
        let avg_field_length = stats.avg_field_length(term.field()).unwrap_or(1.0) as f32;

        TermWeight {
            idf: similarity.idf(doc_freq, doc_count),
            term,
            boost,
            doc_freq,
            doc_count,
            avg_field_length,
            similarity,
        }
    }

    /// The term this weight scores.
    pub fn term(&self) -> &Term {
        &self.term
    }

    /// Document frequency the weight was built with.
    pub fn doc_freq(&self) -> u64 {
        self.doc_freq
    }

    /// Document count the weight was built with.
    pub fn doc_count(&self) -> u64 {
        self.doc_count
    }

    /// Inverse document frequency.
    pub fn idf(&self) -> f32 {
        self.idf
    }
}

impl Weight for TermWeight {
    fn value(&self) -> f32 {
        self.idf * self.boost
    }

    fn scorer<'a>(&'a self, segment: &'a Segment) -> Result<Option<Box<dyn Scorer + 'a>>> {
        let Some(field) = segment.field(self.term.field()) else {
            return Ok(None);
        };
        let Some(postings) = field.postings(self.term.text()) else {
            return Ok(None);
        };

        Ok(Some(Box::new(TermScorer {
            postings: postings.iter(),
            lengths: field.lengths(),
            weight: self,
        })))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Scores one term's postings in one segment.
#[derive(Debug)]
pub struct TermScorer<'a> {
    postings: PostingIterator<'a>,
    lengths: &'a [u32],
    weight: &'a TermWeight,
}

impl Scorer for TermScorer<'_> {
    fn doc_id(&self) -> u32 {
        self.postings.doc_id()
    }

    fn next(&mut self) -> Result<u32> {
        self.postings.next();
        Ok(self.postings.doc_id())
    }

    fn advance(&mut self, target: u32) -> Result<u32> {
        if self.postings.current().is_some_and(|p| p.doc_id >= target) {
            return Ok(self.postings.doc_id());
        }
        if self.postings.is_exhausted() {
            return Ok(NO_MORE_DOCS);
        }
        self.postings.skip_to(target);
        Ok(self.postings.doc_id())
    }

    fn score(&self) -> f32 {
        let doc = self.postings.doc_id();
        let field_length = self.lengths.get(doc as usize).copied().unwrap_or(0) as f32;
        let tf = self.weight.similarity.tf(
            self.postings.frequency() as f32,
            field_length,
            self.weight.avg_field_length,
        );
        self.weight.value() * tf
    }

    fn cost(&self) -> u64 {
        self.postings.len() as u64
    }
}
