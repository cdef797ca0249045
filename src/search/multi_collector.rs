//! Fan-out of one scan to several collectors.

use std::sync::Arc;

use crate::error::Result;
use crate::index::Segment;
use crate::search::collector::Collector;

/// Delivers every document to the primary collector and then to each other
/// wrapped collector, in order, before the scan moves to the next document.
///
/// The primary drives the scan: it runs until the primary stops needing
/// more. Other collectors that stop early are skipped from then on.
#[derive(Debug)]
pub struct MultiCollector<'a> {
    primary: &'a mut dyn Collector,
    others: Vec<&'a mut dyn Collector>,
}

impl<'a> MultiCollector<'a> {
    /// Wrap `primary` followed by `others`.
    pub fn new<I>(primary: &'a mut dyn Collector, others: I) -> Self
    where
        I: IntoIterator<Item = &'a mut dyn Collector>,
    {
        MultiCollector {
            primary,
            others: others.into_iter().collect(),
        }
    }

    /// Number of wrapped collectors, primary included.
    pub fn len(&self) -> usize {
        self.others.len() + 1
    }

    /// Always false; the primary is always wrapped.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Collector for MultiCollector<'_> {
    fn set_segment(&mut self, segment: &Arc<Segment>) -> Result<()> {
        self.primary.set_segment(segment)?;
        for collector in self.others.iter_mut() {
            if collector.needs_more() {
                collector.set_segment(segment)?;
            }
        }
        Ok(())
    }

    fn collect(&mut self, doc_id: u64, score: f32) -> Result<()> {
        self.primary.collect(doc_id, score)?;
        for collector in self.others.iter_mut() {
            if collector.needs_more() {
                collector.collect(doc_id, score)?;
            }
        }
        Ok(())
    }

    fn needs_more(&self) -> bool {
        self.primary.needs_more()
    }
}
