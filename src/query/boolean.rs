//! Boolean query implementation for combining multiple queries.

use std::any::Any;
use std::sync::Arc;

use crate::error::{HalberdError, Result};
use crate::index::{IndexSnapshot, NO_MORE_DOCS, Segment};
use crate::query::query::Query;
use crate::query::scorer::{AllScorer, Scorer};
use crate::query::term::Term;
use crate::query::weight::Weight;
use crate::search::dfs::StatsSource;

/// Maximum number of clauses a boolean query may hold.
pub const MAX_CLAUSE_COUNT: usize = 1024;

/// Occurrence requirements for boolean clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    /// The clause must match (equivalent to AND).
    Must,
    /// The clause should match (equivalent to OR).
    Should,
    /// The clause must not match (equivalent to NOT).
    MustNot,
}

/// A clause in a boolean query.
#[derive(Debug, Clone)]
pub struct BooleanClause {
    /// The query for this clause.
    pub query: Arc<dyn Query>,
    /// The occurrence requirement.
    pub occur: Occur,
}

impl BooleanClause {
    /// Create a new boolean clause.
    pub fn new(query: Arc<dyn Query>, occur: Occur) -> Self {
        BooleanClause { query, occur }
    }
}

/// A boolean query that combines multiple queries with boolean logic.
///
/// A query made only of `MustNot` clauses matches every document the
/// clauses do not.
#[derive(Debug, Clone)]
pub struct BooleanQuery {
    /// The clauses in this boolean query.
    clauses: Vec<BooleanClause>,
    /// The boost factor for this query.
    boost: f32,
    /// Minimum number of should clauses that must match.
    minimum_should_match: usize,
}

impl Default for BooleanQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl BooleanQuery {
    /// Create a new empty boolean query.
    pub fn new() -> Self {
        BooleanQuery {
            clauses: Vec::new(),
            boost: 1.0,
            minimum_should_match: 0,
        }
    }

    /// Add a clause to this boolean query.
    pub fn add_clause(&mut self, clause: BooleanClause) -> Result<()> {
        if self.clauses.len() >= MAX_CLAUSE_COUNT {
            return Err(HalberdError::query(format!(
                "boolean query exceeds maximum clause count of {MAX_CLAUSE_COUNT}"
            )));
        }
        self.clauses.push(clause);
        Ok(())
    }

    /// Add a MUST clause.
    pub fn add_must(&mut self, query: Arc<dyn Query>) -> Result<()> {
        self.add_clause(BooleanClause::new(query, Occur::Must))
    }

    /// Add a SHOULD clause.
    pub fn add_should(&mut self, query: Arc<dyn Query>) -> Result<()> {
        self.add_clause(BooleanClause::new(query, Occur::Should))
    }

    /// Add a MUST_NOT clause.
    pub fn add_must_not(&mut self, query: Arc<dyn Query>) -> Result<()> {
        self.add_clause(BooleanClause::new(query, Occur::MustNot))
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Set the minimum number of should clauses that must match.
    pub fn with_minimum_should_match(mut self, minimum: usize) -> Self {
        self.minimum_should_match = minimum;
        self
    }

    /// Get the clauses.
    pub fn clauses(&self) -> &[BooleanClause] {
        &self.clauses
    }
}

impl Query for BooleanQuery {
    fn rewrite(&self, snapshot: &IndexSnapshot) -> Result<Option<Arc<dyn Query>>> {
        let mut changed = false;
        let mut clauses = Vec::with_capacity(self.clauses.len());
        for clause in &self.clauses {
            let mut query = Arc::clone(&clause.query);
            while let Some(rewritten) = query.rewrite(snapshot)? {
                query = rewritten;
                changed = true;
            }
            clauses.push(BooleanClause::new(query, clause.occur));
        }

        if !changed {
            return Ok(None);
        }
        Ok(Some(Arc::new(BooleanQuery {
            clauses,
            boost: self.boost,
            minimum_should_match: self.minimum_should_match,
        })))
    }

    fn create_weight(&self, stats: &dyn StatsSource) -> Result<Box<dyn Weight>> {
        let clauses = self
            .clauses
            .iter()
            .map(|clause| Ok((clause.query.create_weight(stats)?, clause.occur)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Box::new(BooleanWeight {
            clauses,
            boost: self.boost,
            minimum_should_match: self.minimum_should_match,
        }))
    }

    fn extract_terms(&self, terms: &mut Vec<Term>) {
        for clause in &self.clauses {
            if clause.occur != Occur::MustNot {
                clause.query.extract_terms(terms);
            }
        }
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn description(&self) -> String {
        let parts: Vec<String> = self
            .clauses
            .iter()
            .map(|clause| {
                let prefix = match clause.occur {
                    Occur::Must => "+",
                    Occur::Should => "",
                    Occur::MustNot => "-",
                };
                format!("{}{}", prefix, clause.query.description())
            })
            .collect();

        let body = format!("({})", parts.join(" "));
        if self.boost == 1.0 {
            body
        } else {
            format!("{}^{}", body, self.boost)
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Weight of a [`BooleanQuery`].
#[derive(Debug)]
pub struct BooleanWeight {
    clauses: Vec<(Box<dyn Weight>, Occur)>,
    boost: f32,
    minimum_should_match: usize,
}

impl Weight for BooleanWeight {
    fn value(&self) -> f32 {
        let sum: f32 = self
            .clauses
            .iter()
            .filter(|(_, occur)| *occur != Occur::MustNot)
            .map(|(weight, _)| weight.value())
            .sum();
        sum * self.boost
    }

    fn scorer<'a>(&'a self, segment: &'a Segment) -> Result<Option<Box<dyn Scorer + 'a>>> {
        let mut required = Vec::new();
        let mut optional = Vec::new();
        let mut prohibited = Vec::new();

        for (weight, occur) in &self.clauses {
            let scorer = weight.scorer(segment)?;
            match (occur, scorer) {
                (Occur::Must, Some(scorer)) => required.push(scorer),
                // A required clause with no matches in this segment
                (Occur::Must, None) => return Ok(None),
                (Occur::Should, Some(scorer)) => optional.push(scorer),
                (Occur::Should, None) => {}
                (Occur::MustNot, Some(scorer)) => prohibited.push(scorer),
                (Occur::MustNot, None) => {}
            }
        }

        let has_positive = self.clauses.iter().any(|(_, occur)| *occur != Occur::MustNot);
        if has_positive && required.is_empty() && optional.is_empty() {
            return Ok(None);
        }
        if self.clauses.is_empty() {
            return Ok(None);
        }
        if required.is_empty() && optional.len() < self.minimum_should_match {
            return Ok(None);
        }

        let all = (!has_positive).then(|| AllScorer::new(segment.max_doc(), self.boost));
        Ok(Some(Box::new(BooleanScorer {
            required,
            optional,
            prohibited,
            all,
            minimum_should_match: self.minimum_should_match,
            boost: self.boost,
            current: None,
            score: 0.0,
        })))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Doc-at-a-time scorer for boolean clauses.
///
/// Candidates come from the conjunction of required clauses, or from the
/// disjunction of optional ones when nothing is required; each candidate is
/// then checked against minimum-should-match and the prohibited clauses.
#[derive(Debug)]
struct BooleanScorer<'a> {
    required: Vec<Box<dyn Scorer + 'a>>,
    optional: Vec<Box<dyn Scorer + 'a>>,
    prohibited: Vec<Box<dyn Scorer + 'a>>,
    all: Option<AllScorer>,
    minimum_should_match: usize,
    boost: f32,
    current: Option<u32>,
    score: f32,
}

impl BooleanScorer<'_> {
    fn next_candidate(&mut self, target: u32) -> Result<u32> {
        if let Some(all) = self.all.as_mut() {
            return all.advance(target);
        }

        if !self.required.is_empty() {
            let mut doc = target;
            'leapfrog: loop {
                for scorer in self.required.iter_mut() {
                    let found = scorer.advance(doc)?;
                    if found == NO_MORE_DOCS {
                        return Ok(NO_MORE_DOCS);
                    }
                    if found > doc {
                        doc = found;
                        continue 'leapfrog;
                    }
                }
                return Ok(doc);
            }
        }

        let mut min = NO_MORE_DOCS;
        for scorer in self.optional.iter_mut() {
            min = min.min(scorer.advance(target)?);
        }
        Ok(min)
    }

    /// Score `doc` if it satisfies the optional and prohibited clauses.
    fn accept(&mut self, doc: u32) -> Result<Option<f32>> {
        for scorer in self.prohibited.iter_mut() {
            if scorer.advance(doc)? == doc {
                return Ok(None);
            }
        }

        let mut score = match self.all.as_ref() {
            Some(all) => all.score(),
            None => self.required.iter().map(|s| s.score()).sum::<f32>() * self.boost,
        };

        let mut matched = 0;
        for scorer in self.optional.iter_mut() {
            if scorer.advance(doc)? == doc {
                matched += 1;
                score += scorer.score() * self.boost;
            }
        }
        if matched < self.minimum_should_match {
            return Ok(None);
        }
        Ok(Some(score))
    }
}

impl Scorer for BooleanScorer<'_> {
    fn doc_id(&self) -> u32 {
        self.current.unwrap_or(NO_MORE_DOCS)
    }

    fn next(&mut self) -> Result<u32> {
        let target = self.current.map_or(0, |doc| doc.saturating_add(1));
        self.advance(target)
    }

    fn advance(&mut self, target: u32) -> Result<u32> {
        if let Some(doc) = self.current {
            if doc >= target {
                return Ok(doc);
            }
        }

        let mut target = target;
        loop {
            let doc = self.next_candidate(target)?;
            if doc == NO_MORE_DOCS {
                self.current = Some(NO_MORE_DOCS);
                return Ok(NO_MORE_DOCS);
            }
            if let Some(score) = self.accept(doc)? {
                self.current = Some(doc);
                self.score = score;
                return Ok(doc);
            }
            target = doc + 1;
        }
    }

    fn score(&self) -> f32 {
        self.score
    }

    fn cost(&self) -> u64 {
        if let Some(all) = self.all.as_ref() {
            return all.cost();
        }
        if !self.required.is_empty() {
            return self.required.iter().map(|s| s.cost()).min().unwrap_or(0);
        }
        self.optional.iter().map(|s| s.cost()).sum()
    }
}
