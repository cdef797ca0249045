//! Shard-local search execution.
//!
//! [`ContextIndexSearcher`] binds an [`IndexSnapshot`](crate::index::IndexSnapshot)
//! to one [`SearchContext`]. It caches the rewrite of the request query,
//! builds weights from an installed [`StatsSource`] when one is present, and
//! runs each scan once while feeding the primary collector and every
//! collector registered for the active [`Scope`].

pub mod collector;
pub mod config;
pub mod context;
pub mod context_searcher;
pub mod dfs;
pub mod facet;
pub mod multi_collector;
pub mod phase;
pub mod scope;
pub mod searcher;
pub mod time_limit;

pub use collector::{AllDocsCollector, Collector, CountCollector, ScoreDoc, TopDocsCollector};
pub use config::SearchConfig;
pub use context::{ParsedQuery, QuerySearchResult, SearchContext};
pub use context_searcher::ContextIndexSearcher;
pub use dfs::{AggregatedDfs, CachedDfSource, FieldStatistics, ShardDfs, StatsSource};
pub use facet::{TermCount, TermsFacet, TermsFacetCollector};
pub use multi_collector::MultiCollector;
pub use phase::QueryPhase;
pub use scope::{CollectorScopes, Scope};
pub use searcher::IndexSearcher;
pub use time_limit::{ScanOutcome, TimeLimitingCollector};
