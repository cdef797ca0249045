//! Weights: per-request scoring state built from a query and term statistics.

use std::any::Any;
use std::fmt::Debug;

use crate::error::Result;
use crate::index::Segment;
use crate::query::scorer::Scorer;

/// The statistics-bound form of a query.
///
/// A weight is built once per request and then asked for one scorer per
/// segment. Two shards building a weight from the same statistics source get
/// the same [`value`](Weight::value).
pub trait Weight: Send + Sync + Debug {
    /// Query-level weight (idf times boost for term queries).
    fn value(&self) -> f32;

    /// Create a scorer over one segment, or `None` if nothing can match there.
    fn scorer<'a>(&'a self, segment: &'a Segment) -> Result<Option<Box<dyn Scorer + 'a>>>;

    /// Get this weight as Any for downcasting.
    fn as_any(&self) -> &dyn Any;
}
