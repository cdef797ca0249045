//! The request-aware searcher: rewrite caching, statistics substitution,
//! scoped collector fan-out and deadline-bounded scans.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace};

use crate::error::Result;
use crate::index::IndexSnapshot;
use crate::query::{Filter, Query, Weight};
use crate::search::collector::Collector;
use crate::search::config::SearchConfig;
use crate::search::context::SearchContext;
use crate::search::dfs::StatsSource;
use crate::search::multi_collector::MultiCollector;
use crate::search::scope::{CollectorScopes, Scope};
use crate::search::searcher::IndexSearcher;
use crate::search::time_limit::{ScanOutcome, TimeLimitingCollector};

/// Searcher bound to one request.
///
/// Lifecycle of the scope slot: `NA`, then [`set_processing_scope`],
/// any number of [`execute`] calls, then [`end_processing_scope`], which
/// releases the scope's collectors and returns the slot to `NA`. Setting a
/// new scope without ending the current one leaves the old scope's
/// collectors registered.
///
/// [`set_processing_scope`]: ContextIndexSearcher::set_processing_scope
/// [`execute`]: ContextIndexSearcher::execute
/// [`end_processing_scope`]: ContextIndexSearcher::end_processing_scope
#[derive(Debug)]
pub struct ContextIndexSearcher {
    searcher: IndexSearcher,
    context: SearchContext,
    stats_source: Option<Arc<dyn StatsSource>>,
    scopes: CollectorScopes,
    processing_scope: Scope,
    timeout_check_interval: u32,
}

impl ContextIndexSearcher {
    /// Bind a searcher over `snapshot` to a request.
    pub fn new(snapshot: IndexSnapshot, context: SearchContext) -> Self {
        Self::with_config(snapshot, context, &SearchConfig::default())
    }

    /// Bind a searcher with explicit settings.
    pub fn with_config(snapshot: IndexSnapshot, context: SearchContext, config: &SearchConfig) -> Self {
        ContextIndexSearcher {
            searcher: IndexSearcher::new(snapshot),
            context,
            stats_source: None,
            scopes: CollectorScopes::new(),
            processing_scope: Scope::NA,
            timeout_check_interval: config.timeout_check_interval,
        }
    }

    /// The request context.
    pub fn context(&self) -> &SearchContext {
        &self.context
    }

    /// Mutable request context.
    pub fn context_mut(&mut self) -> &mut SearchContext {
        &mut self.context
    }

    /// Release the request context.
    pub fn into_context(self) -> SearchContext {
        self.context
    }

    /// The searched snapshot.
    pub fn snapshot(&self) -> &IndexSnapshot {
        self.searcher.snapshot()
    }

    /// Score with `source` instead of local statistics from now on.
    pub fn install_stats_source(&mut self, source: Arc<dyn StatsSource>) {
        self.stats_source = Some(source);
    }

    /// Go back to local statistics.
    pub fn clear_stats_source(&mut self) {
        self.stats_source = None;
    }

    /// The installed statistics source, if any.
    pub fn stats_source(&self) -> Option<&Arc<dyn StatsSource>> {
        self.stats_source.as_ref()
    }

    /// Rewrite a query to its primitive form.
    ///
    /// The request's own query (or its parsed form, matched by identity) is
    /// rewritten at most once; later calls return the cached rewrite. Any
    /// other query is rewritten afresh every time.
    pub fn rewrite(&mut self, query: &Arc<dyn Query>) -> Result<Arc<dyn Query>> {
        if !self.context.is_top_level(query) {
            return self.searcher.rewrite(query);
        }
        if let Some(rewritten) = self.context.rewritten_query() {
            return Ok(Arc::clone(rewritten));
        }

        let rewritten = self.searcher.rewrite(query)?;
        trace!(
            "request {} rewrote {} to {}",
            self.context.id(),
            query.description(),
            rewritten.description()
        );
        self.context.update_rewrite_query(Arc::clone(&rewritten));
        Ok(rewritten)
    }

    /// Build a weight, from the installed statistics source when there is
    /// one and from the snapshot otherwise.
    pub fn create_weight(&self, query: &dyn Query) -> Result<Box<dyn Weight>> {
        match &self.stats_source {
            Some(source) => query.create_weight(source.as_ref()),
            None => self.searcher.create_weight(query),
        }
    }

    /// Register a collector for a scope.
    pub fn add_collector(&mut self, scope: Scope, collector: Box<dyn Collector>) {
        self.scopes.add(scope, collector);
    }

    /// Whether a scope has collectors.
    pub fn has_collectors(&self, scope: &Scope) -> bool {
        self.scopes.has(scope)
    }

    /// The collector registry.
    pub fn scopes(&self) -> &CollectorScopes {
        &self.scopes
    }

    /// Make `scope` the target of [`execute`](Self::execute).
    pub fn set_processing_scope(&mut self, scope: Scope) {
        if self.processing_scope != Scope::NA && self.processing_scope != scope {
            debug!(
                "scope {} replaced by {} before it was ended",
                self.processing_scope, scope
            );
        }
        self.processing_scope = scope;
    }

    /// The scope [`execute`](Self::execute) runs in.
    pub fn processing_scope(&self) -> &Scope {
        &self.processing_scope
    }

    /// Mark the current scope processed: its collectors are released and
    /// handed back, and the slot returns to `NA`.
    pub fn end_processing_scope(&mut self) -> Vec<Box<dyn Collector>> {
        let scope = std::mem::replace(&mut self.processing_scope, Scope::NA);
        self.scopes.remove(&scope)
    }

    /// Scan in the current scope.
    pub fn execute(
        &mut self,
        weight: &dyn Weight,
        filter: Option<&dyn Filter>,
        primary: &mut dyn Collector,
    ) -> Result<ScanOutcome> {
        let scope = self.processing_scope.clone();
        self.execute_in_scope(&scope, weight, filter, primary)
    }

    /// Scan once, delivering each match to `primary` and then to the
    /// collectors of `scope` in registration order.
    ///
    /// With a request timeout the scan is bounded: hitting the deadline is
    /// reported as [`ScanOutcome::TimedOut`] and recorded in the query
    /// result, never as an error. Without one, the `timed_out` flag is left
    /// alone and scan errors propagate as they are.
    pub fn execute_in_scope(
        &mut self,
        scope: &Scope,
        weight: &dyn Weight,
        filter: Option<&dyn Filter>,
        primary: &mut dyn Collector,
    ) -> Result<ScanOutcome> {
        let searcher = &self.searcher;
        let mut others: Vec<&mut dyn Collector> = Vec::new();
        for collector in self.scopes.get_mut(scope).iter_mut() {
            others.push(collector.as_mut());
        }

        let Some(timeout) = self.context.timeout() else {
            scan(searcher, weight, filter, primary, others, None)?;
            return Ok(ScanOutcome::Completed);
        };

        let limit = Some((timeout, self.timeout_check_interval));
        let outcome = scan(searcher, weight, filter, primary, others, limit)?;

        if outcome.is_timed_out() {
            debug!(
                "request {} timed out in scope {} after {:?}",
                self.context.id(),
                scope,
                timeout
            );
        }
        self.context.query_result_mut().timed_out = outcome.is_timed_out();
        Ok(outcome)
    }

    /// Rewrite, weigh and execute `query` in the current scope.
    pub fn search(
        &mut self,
        query: &Arc<dyn Query>,
        filter: Option<&dyn Filter>,
        primary: &mut dyn Collector,
    ) -> Result<ScanOutcome> {
        let rewritten = self.rewrite(query)?;
        let weight = self.create_weight(rewritten.as_ref())?;
        self.execute(weight.as_ref(), filter, primary)
    }
}

/// Run one scan. The deadline, when given, wraps the whole fan-out so the
/// document that trips it reaches no collector.
fn scan<'a>(
    searcher: &IndexSearcher,
    weight: &dyn Weight,
    filter: Option<&dyn Filter>,
    primary: &'a mut dyn Collector,
    others: Vec<&'a mut dyn Collector>,
    limit: Option<(Duration, u32)>,
) -> Result<ScanOutcome> {
    let mut multi;
    let sink: &mut dyn Collector = if others.is_empty() {
        primary
    } else {
        multi = MultiCollector::new(primary, others);
        &mut multi
    };

    match limit {
        None => {
            searcher.search(weight, filter, sink)?;
            Ok(ScanOutcome::Completed)
        }
        Some((timeout, check_interval)) => {
            let mut limited = TimeLimitingCollector::new(sink, timeout, check_interval);
            searcher.search(weight, filter, &mut limited)?;
            Ok(limited.outcome())
        }
    }
}
