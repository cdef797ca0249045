//! Base query trait.

use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::Result;
use crate::index::IndexSnapshot;
use crate::query::term::Term;
use crate::query::weight::Weight;
use crate::search::dfs::StatsSource;

/// A logical query.
///
/// Queries are shared as `Arc<dyn Query>`; the search layer relies on
/// pointer identity to recognise the top-level query of a request.
pub trait Query: Send + Sync + Debug {
    /// Rewrite this query into a more primitive form.
    ///
    /// Returns `None` when the query is already primitive. Callers repeat
    /// the rewrite until it returns `None`.
    fn rewrite(&self, snapshot: &IndexSnapshot) -> Result<Option<Arc<dyn Query>>> {
        let _ = snapshot;
        Ok(None)
    }

    /// Build the weight for this query from the given term statistics.
    fn create_weight(&self, stats: &dyn StatsSource) -> Result<Box<dyn Weight>>;

    /// Add every term this query scores on to `terms`.
    fn extract_terms(&self, terms: &mut Vec<Term>) {
        let _ = terms;
    }

    /// Get the boost factor for this query.
    fn boost(&self) -> f32;

    /// Get a human-readable description of this query.
    fn description(&self) -> String;

    /// Get this query as Any for downcasting.
    fn as_any(&self) -> &dyn Any;
}
