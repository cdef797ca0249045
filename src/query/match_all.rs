//! Query matching every live document.

use std::any::Any;

use crate::error::Result;
use crate::index::Segment;
use crate::query::query::Query;
use crate::query::scorer::{AllScorer, Scorer};
use crate::query::weight::Weight;
use crate::search::dfs::StatsSource;

/// Matches all documents with a constant score equal to the boost.
#[derive(Debug, Clone)]
pub struct MatchAllQuery {
    boost: f32,
}

impl Default for MatchAllQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchAllQuery {
    /// Create a new match-all query.
    pub fn new() -> Self {
        MatchAllQuery { boost: 1.0 }
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl Query for MatchAllQuery {
    fn create_weight(&self, _stats: &dyn StatsSource) -> Result<Box<dyn Weight>> {
        Ok(Box::new(MatchAllWeight { boost: self.boost }))
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn description(&self) -> String {
        "*:*".to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
struct MatchAllWeight {
    boost: f32,
}

impl Weight for MatchAllWeight {
    fn value(&self) -> f32 {
        self.boost
    }

    fn scorer<'a>(&'a self, segment: &'a Segment) -> Result<Option<Box<dyn Scorer + 'a>>> {
        if segment.max_doc() == 0 {
            return Ok(None);
        }
        Ok(Some(Box::new(AllScorer::new(segment.max_doc(), self.boost))))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
