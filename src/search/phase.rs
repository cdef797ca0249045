//! The query phase of a request: the main scan, then the global scan.

use std::sync::Arc;

use log::debug;

use crate::error::Result;
use crate::query::MatchAllQuery;
use crate::search::collector::{CountCollector, TopDocsCollector};
use crate::search::config::SearchConfig;
use crate::search::context_searcher::ContextIndexSearcher;
use crate::search::scope::Scope;
use crate::search::time_limit::ScanOutcome;

/// Runs the scans of one request against its [`ContextIndexSearcher`].
///
/// The main scan runs the request query with its post filter and stores the
/// requested window of hits in the query result. When collectors are
/// registered under [`Scope::GLOBAL`], a second scan feeds them every live
/// document, ignoring both the query and the filter.
#[derive(Debug, Clone, Default)]
pub struct QueryPhase {
    min_score: f32,
}

impl QueryPhase {
    /// Create a query phase.
    pub fn new() -> Self {
        QueryPhase::default()
    }

    /// Create a query phase from search settings.
    pub fn from_config(config: &SearchConfig) -> Self {
        QueryPhase {
            min_score: config.min_score,
        }
    }

    /// Run the phase. Returns [`ScanOutcome::TimedOut`] if either scan hit
    /// the deadline; partial hits are stored all the same.
    pub fn execute(&self, searcher: &mut ContextIndexSearcher) -> Result<ScanOutcome> {
        let main = self.execute_main(searcher)?;
        let global = if searcher.has_collectors(&Scope::GLOBAL) {
            self.execute_global(searcher)?
        } else {
            ScanOutcome::Completed
        };

        if main.is_timed_out() || global.is_timed_out() {
            searcher.context_mut().query_result_mut().timed_out = true;
            return Ok(ScanOutcome::TimedOut);
        }
        Ok(ScanOutcome::Completed)
    }

    fn execute_main(&self, searcher: &mut ContextIndexSearcher) -> Result<ScanOutcome> {
        let query = Arc::clone(searcher.context().query());
        let filter = searcher.context().filter().cloned();
        let from = searcher.context().from();
        let window = from + searcher.context().size();

        let rewritten = searcher.rewrite(&query)?;
        let weight = searcher.create_weight(rewritten.as_ref())?;
        let mut top_docs = TopDocsCollector::with_min_score(window, self.min_score);

        searcher.set_processing_scope(Scope::MAIN);
        let outcome = searcher.execute(weight.as_ref(), filter.as_deref(), &mut top_docs);
        searcher.end_processing_scope();
        let outcome = outcome?;

        let result = searcher.context_mut().query_result_mut();
        result.top_docs = top_docs.top_docs().into_iter().skip(from).collect();
        result.total_hits = top_docs.total_hits();
        result.max_score = top_docs.max_score();

        debug!(
            "request {} main scan: {} hits, {:?}",
            searcher.context().id(),
            top_docs.total_hits(),
            outcome
        );
        Ok(outcome)
    }

    fn execute_global(&self, searcher: &mut ContextIndexSearcher) -> Result<ScanOutcome> {
        let weight = searcher.create_weight(&MatchAllQuery::new())?;
        let mut count = CountCollector::new();

        searcher.set_processing_scope(Scope::GLOBAL);
        let outcome = searcher.execute(weight.as_ref(), None, &mut count);
        searcher.end_processing_scope();
        let outcome = outcome?;

        debug!(
            "request {} global scan: {} docs, {:?}",
            searcher.context().id(),
            count.count(),
            outcome
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexWriter;
    use crate::query::{Query, TermFilter, TermQuery};
    use crate::search::collector::AllDocsCollector;
    use crate::search::context::SearchContext;
    use parking_lot::Mutex;

    fn searcher(context: SearchContext) -> ContextIndexSearcher {
        let mut writer = IndexWriter::new();
        writer.add_fields(&[("title", "rust rust rust"), ("lang", "en")]).unwrap();
        writer.add_fields(&[("title", "rust"), ("lang", "de")]).unwrap();
        writer.add_fields(&[("title", "java")]).unwrap();
        writer.add_fields(&[("title", "rust search"), ("lang", "en")]).unwrap();
        ContextIndexSearcher::new(writer.snapshot(), context)
    }

    #[test]
    fn test_main_scan_stores_window() {
        let query: Arc<dyn Query> = Arc::new(TermQuery::new("title", "rust"));
        let mut searcher = searcher(SearchContext::new(query).with_window(1, 1));

        let outcome = QueryPhase::new().execute(&mut searcher).unwrap();
        assert_eq!(outcome, ScanOutcome::Completed);

        let result = searcher.context().query_result();
        assert_eq!(result.total_hits, 3);
        assert_eq!(result.top_docs.len(), 1);
        assert!(result.max_score > 0.0);
        assert!(searcher.context().query_rewritten());
    }

    #[test]
    fn test_global_collectors_ignore_query_and_filter() {
        let query: Arc<dyn Query> = Arc::new(TermQuery::new("title", "rust"));
        let context = SearchContext::new(query).with_filter(Arc::new(TermFilter::new("lang", "en")));
        let mut searcher = searcher(context);

        let global = Arc::new(Mutex::new(AllDocsCollector::new()));
        searcher.add_collector(Scope::GLOBAL, Box::new(Arc::clone(&global)));

        QueryPhase::new().execute(&mut searcher).unwrap();

        assert_eq!(searcher.context().query_result().total_hits, 2);
        assert_eq!(global.lock().doc_ids(), vec![0, 1, 2, 3]);
        assert!(!searcher.has_collectors(&Scope::GLOBAL));
        assert_eq!(searcher.processing_scope(), &Scope::NA);
    }
}
