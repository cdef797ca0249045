//! Collector implementations for gathering search results.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::Segment;

/// Trait for collecting search results.
///
/// Doc ids handed to [`collect`](Collector::collect) are global
/// (`segment.doc_base() + local id`).
pub trait Collector: Send + Debug {
    /// Called before the first document of each segment.
    fn set_segment(&mut self, segment: &Arc<Segment>) -> Result<()> {
        let _ = segment;
        Ok(())
    }

    /// Collect a document hit.
    fn collect(&mut self, doc_id: u64, score: f32) -> Result<()>;

    /// Whether the scan should keep feeding this collector. Returning false
    /// ends the scan early.
    fn needs_more(&self) -> bool {
        true
    }
}

/// A shared handle, so a caller can keep reading a collector after handing
/// it to a scope registry.
impl<C: Collector> Collector for Arc<Mutex<C>> {
    fn set_segment(&mut self, segment: &Arc<Segment>) -> Result<()> {
        self.lock().set_segment(segment)
    }

    fn collect(&mut self, doc_id: u64, score: f32) -> Result<()> {
        self.lock().collect(doc_id, score)
    }

    fn needs_more(&self) -> bool {
        self.lock().needs_more()
    }
}

/// A scored document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreDoc {
    /// Global document ID.
    pub doc_id: u64,
    /// The relevance score.
    pub score: f32,
}

/// A collector that keeps the top N documents by score.
#[derive(Debug)]
pub struct TopDocsCollector {
    /// Maximum number of documents to collect.
    max_docs: usize,
    /// Minimum score threshold.
    min_score: f32,
    /// Collected hits (min-heap based on score).
    hits: BinaryHeap<ScoredDoc>,
    /// Total number of documents processed.
    total_hits: u64,
    /// Best score seen.
    max_score: f32,
}

/// A scored document for use in the heap.
#[derive(Debug, Clone)]
struct ScoredDoc {
    doc_id: u64,
    score: f32,
}

impl PartialEq for ScoredDoc {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.doc_id == other.doc_id
    }
}

impl Eq for ScoredDoc {}

impl PartialOrd for ScoredDoc {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredDoc {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: lower scores come first, later docs lose ties
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}

impl TopDocsCollector {
    /// Create a new top docs collector.
    pub fn new(max_docs: usize) -> Self {
        Self::with_min_score(max_docs, 0.0)
    }

    /// Create a new top docs collector with minimum score threshold.
    pub fn with_min_score(max_docs: usize, min_score: f32) -> Self {
        TopDocsCollector {
            max_docs,
            min_score,
            hits: BinaryHeap::new(),
            total_hits: 0,
            max_score: 0.0,
        }
    }

    /// Get the maximum number of documents to collect.
    pub fn max_docs(&self) -> usize {
        self.max_docs
    }

    /// Total number of matching documents seen.
    pub fn total_hits(&self) -> u64 {
        self.total_hits
    }

    /// Best score seen.
    pub fn max_score(&self) -> f32 {
        self.max_score
    }

    /// Get the current minimum score in the collection.
    pub fn current_min_score(&self) -> f32 {
        if self.hits.len() < self.max_docs {
            self.min_score
        } else {
            self.hits
                .peek()
                .map(|doc| doc.score)
                .unwrap_or(self.min_score)
        }
    }

    /// Collected hits, best first; ties keep doc id order.
    pub fn top_docs(&self) -> Vec<ScoreDoc> {
        let mut results: Vec<_> = self
            .hits
            .iter()
            .map(|doc| ScoreDoc {
                doc_id: doc.doc_id,
                score: doc.score,
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
        results
    }

    /// Reset the collector for a new search.
    pub fn reset(&mut self) {
        self.hits.clear();
        self.total_hits = 0;
        self.max_score = 0.0;
    }
}

impl Collector for TopDocsCollector {
    fn collect(&mut self, doc_id: u64, score: f32) -> Result<()> {
        self.total_hits += 1;
        self.max_score = self.max_score.max(score);

        if score < self.min_score || self.max_docs == 0 {
            return Ok(());
        }

        let scored_doc = ScoredDoc { doc_id, score };

        if self.hits.len() < self.max_docs {
            self.hits.push(scored_doc);
        } else if let Some(worst) = self.hits.peek() {
            if score > worst.score {
                self.hits.pop();
                self.hits.push(scored_doc);
            }
        }

        Ok(())
    }
}

/// A collector that just counts the number of matching documents.
#[derive(Debug, Default)]
pub struct CountCollector {
    /// Total number of documents that matched.
    count: u64,
}

impl CountCollector {
    /// Create a new count collector.
    pub fn new() -> Self {
        CountCollector::default()
    }

    /// Get the current count.
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl Collector for CountCollector {
    fn collect(&mut self, _doc_id: u64, _score: f32) -> Result<()> {
        self.count += 1;
        Ok(())
    }
}

/// A collector that records every matching document in delivery order.
#[derive(Debug, Default)]
pub struct AllDocsCollector {
    hits: Vec<ScoreDoc>,
}

impl AllDocsCollector {
    /// Create a new all docs collector.
    pub fn new() -> Self {
        AllDocsCollector::default()
    }

    /// Hits in the order they were delivered.
    pub fn hits(&self) -> &[ScoreDoc] {
        &self.hits
    }

    /// Doc ids in the order they were delivered.
    pub fn doc_ids(&self) -> Vec<u64> {
        self.hits.iter().map(|hit| hit.doc_id).collect()
    }

    /// Number of collected hits.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Whether nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

impl Collector for AllDocsCollector {
    fn collect(&mut self, doc_id: u64, score: f32) -> Result<()> {
        self.hits.push(ScoreDoc { doc_id, score });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_docs_collector() {
        let mut collector = TopDocsCollector::new(3);

        assert_eq!(collector.max_docs(), 3);
        assert_eq!(collector.total_hits(), 0);

        collector.collect(1, 0.5).unwrap();
        collector.collect(2, 0.8).unwrap();
        collector.collect(3, 0.3).unwrap();
        assert_eq!(collector.total_hits(), 3);
        assert_eq!(collector.current_min_score(), 0.3);

        // A better document replaces the worst
        collector.collect(4, 0.9).unwrap();
        assert_eq!(collector.total_hits(), 4);
        assert_eq!(collector.max_score(), 0.9);

        let results = collector.top_docs();
        assert_eq!(
            results.iter().map(|d| d.doc_id).collect::<Vec<_>>(),
            vec![4, 2, 1]
        );
    }

    #[test]
    fn test_top_docs_collector_with_min_score() {
        let mut collector = TopDocsCollector::with_min_score(3, 0.5);

        collector.collect(1, 0.3).unwrap(); // Below threshold
        collector.collect(2, 0.8).unwrap();
        collector.collect(3, 0.6).unwrap();

        // Counted, but not kept
        assert_eq!(collector.total_hits(), 3);
        let results = collector.top_docs();
        assert_eq!(results.len(), 2);
        assert!(!results.iter().any(|hit| hit.score == 0.3));
    }

    #[test]
    fn test_top_docs_ties_prefer_earlier_docs() {
        let mut collector = TopDocsCollector::new(2);
        for doc in 0..5 {
            collector.collect(doc, 1.0).unwrap();
        }
        let ids: Vec<_> = collector.top_docs().iter().map(|d| d.doc_id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_count_collector() {
        let mut collector = CountCollector::new();
        assert_eq!(collector.count(), 0);

        collector.collect(1, 0.5).unwrap();
        collector.collect(2, 0.8).unwrap();
        collector.collect(3, 0.3).unwrap();

        assert_eq!(collector.count(), 3);
        assert!(collector.needs_more());
    }

    #[test]
    fn test_all_docs_collector_keeps_delivery_order() {
        let mut collector = AllDocsCollector::new();
        assert!(collector.is_empty());

        collector.collect(7, 0.5).unwrap();
        collector.collect(2, 0.8).unwrap();
        collector.collect(9, 0.3).unwrap();

        assert_eq!(collector.len(), 3);
        assert_eq!(collector.doc_ids(), vec![7, 2, 9]);
    }

    #[test]
    fn test_collector_reset() {
        let mut collector = TopDocsCollector::new(3);
        collector.collect(1, 0.5).unwrap();
        collector.collect(2, 0.8).unwrap();

        collector.reset();

        assert_eq!(collector.total_hits(), 0);
        assert!(collector.top_docs().is_empty());
    }

    #[test]
    fn test_shared_handle() {
        let shared = Arc::new(Mutex::new(CountCollector::new()));
        let mut handle: Box<dyn Collector> = Box::new(Arc::clone(&shared));

        handle.collect(1, 1.0).unwrap();
        handle.collect(2, 1.0).unwrap();

        assert_eq!(shared.lock().count(), 2);
    }

    #[test]
    fn test_scored_doc_ordering() {
        let doc1 = ScoredDoc {
            doc_id: 1,
            score: 0.5,
        };
        let doc2 = ScoredDoc {
            doc_id: 2,
            score: 0.8,
        };
        let doc3 = ScoredDoc {
            doc_id: 3,
            score: 0.8,
        };

        // Higher score is "less" (min-heap)
        assert!(doc2 < doc1);
        // Same score: the later doc is the worse one
        assert!(doc3 > doc2);

        let mut heap = BinaryHeap::new();
        heap.push(doc1);
        heap.push(doc2);
        heap.push(doc3);
        assert_eq!(heap.peek().unwrap().score, 0.5);
    }
}
