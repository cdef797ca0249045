//! Query system: logical queries, their weights and per-segment scorers.

pub mod boolean;
pub mod filter;
pub mod match_all;
pub mod prefix;
#[allow(clippy::module_inception)]
pub mod query;
pub mod scorer;
pub mod term;
pub mod weight;

pub use boolean::{BooleanClause, BooleanQuery, MAX_CLAUSE_COUNT, Occur};
pub use filter::{Filter, QueryWrapperFilter, TermFilter};
pub use match_all::MatchAllQuery;
pub use prefix::PrefixQuery;
pub use query::Query;
pub use scorer::{AllScorer, Bm25Similarity, Scorer};
pub use term::{Term, TermQuery, TermWeight};
pub use weight::Weight;
