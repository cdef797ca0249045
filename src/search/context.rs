//! Per-request state of a shard-local search.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::query::{Filter, Query};
use crate::search::collector::ScoreDoc;

/// The query a request was parsed into.
#[derive(Debug, Clone)]
pub struct ParsedQuery {
    query: Arc<dyn Query>,
}

impl ParsedQuery {
    /// Wrap a parsed query.
    pub fn new(query: Arc<dyn Query>) -> Self {
        ParsedQuery { query }
    }

    /// The parsed query.
    pub fn query(&self) -> &Arc<dyn Query> {
        &self.query
    }
}

/// What the query phase of a request produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QuerySearchResult {
    /// Best hits, highest score first.
    pub top_docs: Vec<ScoreDoc>,
    /// Matching documents seen by the scan.
    pub total_hits: u64,
    /// Best score seen.
    pub max_score: f32,
    /// Whether the last bounded scan hit its deadline.
    pub timed_out: bool,
}

/// State of one shard-local request.
///
/// Created once per request and owned by the thread executing it.
#[derive(Debug)]
pub struct SearchContext {
    id: Uuid,
    query: Arc<dyn Query>,
    parsed_query: ParsedQuery,
    filter: Option<Arc<dyn Filter>>,
    timeout: Option<Duration>,
    rewritten_query: Option<Arc<dyn Query>>,
    from: usize,
    size: usize,
    query_result: QuerySearchResult,
}

impl SearchContext {
    /// Create a context whose parsed query is `query` itself.
    pub fn new(query: Arc<dyn Query>) -> Self {
        let parsed_query = ParsedQuery::new(Arc::clone(&query));
        Self::with_parsed_query(query, parsed_query)
    }

    /// Create a context with a distinct parsed query.
    pub fn with_parsed_query(query: Arc<dyn Query>, parsed_query: ParsedQuery) -> Self {
        SearchContext {
            id: Uuid::new_v4(),
            query,
            parsed_query,
            filter: None,
            timeout: None,
            rewritten_query: None,
            from: 0,
            size: 10,
            query_result: QuerySearchResult::default(),
        }
    }

    /// Set the scan deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the post filter of the main scan.
    pub fn with_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set the paging window.
    pub fn with_window(mut self, from: usize, size: usize) -> Self {
        self.from = from;
        self.size = size;
        self
    }

    /// Request id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The top-level query.
    pub fn query(&self) -> &Arc<dyn Query> {
        &self.query
    }

    /// The parsed form of the request.
    pub fn parsed_query(&self) -> &ParsedQuery {
        &self.parsed_query
    }

    /// Post filter of the main scan.
    pub fn filter(&self) -> Option<&Arc<dyn Filter>> {
        self.filter.as_ref()
    }

    /// Scan deadline, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// First hit to return.
    pub fn from(&self) -> usize {
        self.from
    }

    /// Number of hits to return.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the top-level query has been rewritten.
    pub fn query_rewritten(&self) -> bool {
        self.rewritten_query.is_some()
    }

    /// The cached rewrite of the top-level query.
    pub fn rewritten_query(&self) -> Option<&Arc<dyn Query>> {
        self.rewritten_query.as_ref()
    }

    /// Record the rewrite of the top-level query.
    pub fn update_rewrite_query(&mut self, rewritten: Arc<dyn Query>) {
        self.rewritten_query = Some(rewritten);
    }

    /// Whether `query` is the top-level query of this request, by identity.
    pub fn is_top_level(&self, query: &Arc<dyn Query>) -> bool {
        Arc::ptr_eq(query, &self.query) || Arc::ptr_eq(query, self.parsed_query.query())
    }

    /// Query phase results.
    pub fn query_result(&self) -> &QuerySearchResult {
        &self.query_result
    }

    /// Mutable query phase results.
    pub fn query_result_mut(&mut self) -> &mut QuerySearchResult {
        &mut self.query_result
    }
}
