//! # Halberd
//!
//! Shard-local search execution for a distributed document search engine.
//!
//! ## Features
//!
//! - Request-bound searcher that rewrites the request query once
//! - Cross-shard score consistency through installable term statistics
//! - Scoped collectors fed from a single index scan
//! - Deadline-bounded scans that return partial results
//! - Fluent JSON builders for query, filter and facet descriptors
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use halberd::index::IndexWriter;
//! use halberd::query::{Query, TermQuery};
//! use halberd::search::{ContextIndexSearcher, QueryPhase, SearchContext};
//!
//! let mut writer = IndexWriter::new();
//! writer.add_fields(&[("title", "rust search")]).unwrap();
//! writer.add_fields(&[("title", "java search")]).unwrap();
//!
//! let query: Arc<dyn Query> = Arc::new(TermQuery::new("title", "rust"));
//! let mut searcher = ContextIndexSearcher::new(writer.snapshot(), SearchContext::new(query));
//! QueryPhase::new().execute(&mut searcher).unwrap();
//!
//! assert_eq!(searcher.context().query_result().total_hits, 1);
//! ```

pub mod builder;
pub mod cli;
pub mod error;
pub mod index;
pub mod query;
pub mod search;

pub mod prelude {
    pub use crate::builder::{FacetBuilder, FilterBuilder, QueryBuilder};
    pub use crate::error::{HalberdError, Result};
    pub use crate::index::{IndexSnapshot, IndexWriter};
    pub use crate::query::{Filter, Query, Weight};
    pub use crate::search::{
        Collector, ContextIndexSearcher, ScanOutcome, Scope, SearchContext, StatsSource,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
