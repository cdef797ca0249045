//! Scorers and the BM25 similarity used to rank matches.

use std::fmt::Debug;

use crate::error::Result;
use crate::index::NO_MORE_DOCS;

/// Iterates the matching documents of one segment and scores them.
///
/// Doc ids are segment-local. A fresh scorer is unpositioned; `advance`
/// never moves backwards, so advancing to a target at or before the current
/// doc returns the current doc.
pub trait Scorer: Debug {
    /// Current doc id, or [`NO_MORE_DOCS`].
    fn doc_id(&self) -> u32;

    /// Move to the next matching document.
    fn next(&mut self) -> Result<u32>;

    /// Move to the first matching document `>= target`.
    fn advance(&mut self, target: u32) -> Result<u32>;

    /// Score of the current document.
    fn score(&self) -> f32;

    /// Upper bound on the number of documents this scorer visits.
    fn cost(&self) -> u64;
}

/// Matches every doc id of a segment with a constant score.
#[derive(Debug)]
pub struct AllScorer {
    max_doc: u32,
    current: Option<u32>,
    score: f32,
}

impl AllScorer {
    /// Create a scorer over `0..max_doc`.
    pub fn new(max_doc: u32, score: f32) -> Self {
        AllScorer {
            max_doc,
            current: None,
            score,
        }
    }
}

impl Scorer for AllScorer {
    fn doc_id(&self) -> u32 {
        self.current.unwrap_or(NO_MORE_DOCS)
    }

    fn next(&mut self) -> Result<u32> {
        let target = self.current.map_or(0, |doc| doc.saturating_add(1));
        self.advance(target)
    }

    fn advance(&mut self, target: u32) -> Result<u32> {
        if let Some(doc) = self.current {
            if doc >= target {
                return Ok(doc);
            }
        }
        let doc = if target < self.max_doc { target } else { NO_MORE_DOCS };
        self.current = Some(doc);
        Ok(doc)
    }

    fn score(&self) -> f32 {
        self.score
    }

    fn cost(&self) -> u64 {
        self.max_doc as u64
    }
}

/// BM25 ranking function.
#[derive(Debug, Clone, Copy)]
pub struct Bm25Similarity {
    /// Term frequency saturation.
    pub k1: f32,
    /// Length normalization.
    pub b: f32,
}

impl Default for Bm25Similarity {
    fn default() -> Self {
        Bm25Similarity { k1: 1.2, b: 0.75 }
    }
}

impl Bm25Similarity {
    /// Inverse document frequency.
    ///
    /// `ln(1 + (N - df + 0.5) / (df + 0.5))`, which stays positive even for
    /// terms present in every document.
    pub fn idf(&self, doc_freq: u64, doc_count: u64) -> f32 {
        if doc_freq == 0 {
            return 0.0;
        }
        let n = doc_count.max(doc_freq) as f32;
        let df = doc_freq as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// Term frequency component, normalized by field length.
    pub fn tf(&self, term_freq: f32, field_length: f32, avg_field_length: f32) -> f32 {
        if term_freq == 0.0 {
            return 0.0;
        }
        let avg_len = if avg_field_length > 0.0 {
            avg_field_length
        } else {
            1.0
        };
        let norm_factor = 1.0 - self.b + self.b * (field_length / avg_len);

        (term_freq * (self.k1 + 1.0)) / (term_freq + self.k1 * norm_factor)
    }
}
