//! Fluent builders for JSON query, filter and facet descriptors.
//!
//! Builders only produce descriptors; they never parse or execute them.
//! Object keys come out in the order they were written.

pub mod facet;
pub mod filter;
pub mod query;

pub use facet::{FacetBuilder, FacetOptions, TermsFacetBuilder};
pub use filter::{FilterBuilder, TermFilterBuilder};
pub use query::{FuzzyLikeThisFieldQueryBuilder, PrefixQueryBuilder, QueryBuilder, TermQueryBuilder};
