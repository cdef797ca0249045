//! Plain searcher over a snapshot: rewrite, weight, scan.

use std::sync::Arc;

use log::trace;

use crate::error::{HalberdError, Result};
use crate::index::{IndexSnapshot, NO_MORE_DOCS};
use crate::query::{Filter, Query, Weight};
use crate::search::collector::Collector;

/// Upper bound on rewrite rounds before a query is considered cyclic.
const MAX_REWRITE_ROUNDS: usize = 64;

/// Executes weights against every segment of a snapshot.
#[derive(Debug, Clone)]
pub struct IndexSearcher {
    snapshot: IndexSnapshot,
}

impl IndexSearcher {
    /// Create a searcher over a snapshot.
    pub fn new(snapshot: IndexSnapshot) -> Self {
        IndexSearcher { snapshot }
    }

    /// The searched snapshot.
    pub fn snapshot(&self) -> &IndexSnapshot {
        &self.snapshot
    }

    /// Rewrite a query until it is primitive.
    pub fn rewrite(&self, query: &Arc<dyn Query>) -> Result<Arc<dyn Query>> {
        Ok(rewrite_to_fixpoint(&self.snapshot, query.as_ref())?.unwrap_or_else(|| Arc::clone(query)))
    }

    /// Build a weight from local statistics.
    pub fn create_weight(&self, query: &dyn Query) -> Result<Box<dyn Weight>> {
        query.create_weight(&self.snapshot)
    }

    /// Scan every segment and deliver matches to `collector`.
    ///
    /// Deleted documents and documents rejected by `filter` are skipped. Doc
    /// ids reach the collector as global ids. The scan stops as soon as the
    /// collector no longer needs more.
    pub fn search(
        &self,
        weight: &dyn Weight,
        filter: Option<&dyn Filter>,
        collector: &mut dyn Collector,
    ) -> Result<()> {
        for segment in self.snapshot.segments() {
            if !collector.needs_more() {
                break;
            }
            collector.set_segment(segment)?;
            if !collector.needs_more() {
                break;
            }

            let Some(mut scorer) = weight.scorer(segment)? else {
                continue;
            };
            let accepted = match filter {
                Some(filter) => Some(filter.doc_set(&self.snapshot, segment)?),
                None => None,
            };

            trace!(
                "scanning segment {} ({} docs)",
                segment.ordinal(),
                segment.max_doc()
            );

            loop {
                let doc = scorer.next()?;
                if doc == NO_MORE_DOCS {
                    break;
                }
                if segment.is_deleted(doc) {
                    continue;
                }
                if let Some(bits) = &accepted {
                    if !bits.get(doc as usize).unwrap_or(false) {
                        continue;
                    }
                }
                collector.collect(segment.doc_base() + doc as u64, scorer.score())?;
                if !collector.needs_more() {
                    break;
                }
            }
        }
        Ok(())
    }
}

/// Rewrite `query` until it is primitive, giving up after
/// `MAX_REWRITE_ROUNDS`. `None` means it was primitive to begin with.
pub(crate) fn rewrite_to_fixpoint(
    snapshot: &IndexSnapshot,
    query: &dyn Query,
) -> Result<Option<Arc<dyn Query>>> {
    let Some(mut current) = query.rewrite(snapshot)? else {
        return Ok(None);
    };
    for _ in 1..MAX_REWRITE_ROUNDS {
        match current.rewrite(snapshot)? {
            Some(rewritten) => current = rewritten,
            None => return Ok(Some(current)),
        }
    }
    Err(HalberdError::query(format!(
        "query {} did not reach a fixpoint after {MAX_REWRITE_ROUNDS} rewrites",
        query.description()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexWriter, IndexWriterConfig};
    use crate::query::{MatchAllQuery, PrefixQuery, TermFilter, TermQuery};
    use crate::search::collector::{AllDocsCollector, CountCollector};

    fn snapshot() -> IndexSnapshot {
        let mut writer = IndexWriter::with_config(IndexWriterConfig {
            max_buffered_docs: 2,
        });
        writer.add_fields(&[("title", "rust search"), ("lang", "en")]).unwrap();
        writer.add_fields(&[("title", "rusty nail"), ("lang", "en")]).unwrap();
        writer.add_fields(&[("title", "rust engine"), ("lang", "de")]).unwrap();
        writer.add_fields(&[("title", "java")]).unwrap();
        writer.add_fields(&[("title", "rust")]).unwrap();
        writer.delete_document(4).unwrap();
        writer.snapshot()
    }

    #[test]
    fn test_global_doc_ids_across_segments() {
        let searcher = IndexSearcher::new(snapshot());
        let query = TermQuery::new("title", "rust");
        let weight = searcher.create_weight(&query).unwrap();

        let mut collector = AllDocsCollector::new();
        searcher.search(weight.as_ref(), None, &mut collector).unwrap();
        assert_eq!(collector.doc_ids(), vec![0, 2]);
    }

    #[test]
    fn test_filter_restricts_matches() {
        let searcher = IndexSearcher::new(snapshot());
        let weight = searcher.create_weight(&MatchAllQuery::new()).unwrap();
        let filter = TermFilter::new("lang", "en");

        let mut collector = AllDocsCollector::new();
        searcher
            .search(weight.as_ref(), Some(&filter), &mut collector)
            .unwrap();
        assert_eq!(collector.doc_ids(), vec![0, 1]);
    }

    #[test]
    fn test_rewrite_reaches_fixpoint() {
        let searcher = IndexSearcher::new(snapshot());
        let query: Arc<dyn Query> = Arc::new(PrefixQuery::new("title", "rust"));
        let rewritten = searcher.rewrite(&query).unwrap();
        assert!(rewritten.rewrite(searcher.snapshot()).unwrap().is_none());

        let weight = searcher.create_weight(rewritten.as_ref()).unwrap();
        let mut collector = CountCollector::new();
        searcher.search(weight.as_ref(), None, &mut collector).unwrap();
        assert_eq!(collector.count(), 3);
    }

    #[test]
    fn test_stops_when_collector_is_full() {
        #[derive(Debug, Default)]
        struct FirstOnly(Vec<u64>);

        impl Collector for FirstOnly {
            fn collect(&mut self, doc_id: u64, _score: f32) -> Result<()> {
                self.0.push(doc_id);
                Ok(())
            }

            fn needs_more(&self) -> bool {
                self.0.is_empty()
            }
        }

        let searcher = IndexSearcher::new(snapshot());
        let weight = searcher.create_weight(&MatchAllQuery::new()).unwrap();
        let mut collector = FirstOnly::default();
        searcher.search(weight.as_ref(), None, &mut collector).unwrap();
        assert_eq!(collector.0, vec![0]);
    }
}
