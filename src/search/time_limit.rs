//! Deadline-bounded collection.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;

use crate::error::Result;
use crate::index::Segment;
use crate::search::collector::Collector;

/// How a bounded scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Every matching document was delivered.
    Completed,
    /// The deadline passed; collectors hold a partial result.
    TimedOut,
}

impl ScanOutcome {
    /// Whether the scan ended on its deadline.
    pub fn is_timed_out(&self) -> bool {
        matches!(self, ScanOutcome::TimedOut)
    }
}

/// Wraps a collector and stops the scan once a deadline passes.
///
/// The wall clock is read on every segment boundary and on every
/// `check_interval`-th collected document, starting with the first. The
/// document that trips the deadline is not delivered.
#[derive(Debug)]
pub struct TimeLimitingCollector<'a> {
    inner: &'a mut dyn Collector,
    timeout: Duration,
    deadline: Instant,
    check_interval: u32,
    collected: u64,
    timed_out: bool,
}

impl<'a> TimeLimitingCollector<'a> {
    /// Start the clock now.
    pub fn new(inner: &'a mut dyn Collector, timeout: Duration, check_interval: u32) -> Self {
        let started = Instant::now();
        TimeLimitingCollector {
            inner,
            timeout,
            deadline: started.checked_add(timeout).unwrap_or(started),
            check_interval: check_interval.max(1),
            collected: 0,
            timed_out: false,
        }
    }

    /// Whether the deadline was hit.
    pub fn is_timed_out(&self) -> bool {
        self.timed_out
    }

    /// The outcome so far.
    pub fn outcome(&self) -> ScanOutcome {
        if self.timed_out {
            ScanOutcome::TimedOut
        } else {
            ScanOutcome::Completed
        }
    }

    fn check_deadline(&mut self) -> bool {
        if !self.timed_out && Instant::now() >= self.deadline {
            debug!(
                "search deadline of {:?} exceeded after {} docs",
                self.timeout, self.collected
            );
            self.timed_out = true;
        }
        self.timed_out
    }
}

impl Collector for TimeLimitingCollector<'_> {
    fn set_segment(&mut self, segment: &Arc<Segment>) -> Result<()> {
        if self.check_deadline() {
            return Ok(());
        }
        self.inner.set_segment(segment)
    }

    fn collect(&mut self, doc_id: u64, score: f32) -> Result<()> {
        if self.timed_out {
            return Ok(());
        }
        if self.collected % self.check_interval as u64 == 0 && self.check_deadline() {
            return Ok(());
        }
        self.collected += 1;
        self.inner.collect(doc_id, score)
    }

    fn needs_more(&self) -> bool {
        !self.timed_out && self.inner.needs_more()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::collector::AllDocsCollector;

    #[test]
    fn test_zero_timeout_collects_nothing() {
        let mut inner = AllDocsCollector::new();
        let mut limited = TimeLimitingCollector::new(&mut inner, Duration::ZERO, 64);

        limited.collect(0, 1.0).unwrap();
        assert!(limited.is_timed_out());
        assert!(!limited.needs_more());
        assert_eq!(limited.outcome(), ScanOutcome::TimedOut);
        assert!(inner.is_empty());
    }

    #[test]
    fn test_generous_timeout_passes_through() {
        let mut inner = AllDocsCollector::new();
        let mut limited = TimeLimitingCollector::new(&mut inner, Duration::from_secs(60), 1);

        for doc in 0..10 {
            limited.collect(doc, 1.0).unwrap();
        }
        assert!(limited.needs_more());
        assert_eq!(limited.outcome(), ScanOutcome::Completed);
        assert_eq!(inner.len(), 10);
    }

    #[test]
    fn test_deadline_trips_mid_scan() {
        let mut inner = AllDocsCollector::new();
        let mut limited = TimeLimitingCollector::new(&mut inner, Duration::from_millis(5), 1);

        limited.collect(0, 1.0).unwrap();
        std::thread::sleep(Duration::from_millis(10));
        limited.collect(1, 1.0).unwrap();
        limited.collect(2, 1.0).unwrap();

        assert!(limited.is_timed_out());
        assert_eq!(inner.doc_ids(), vec![0]);
    }
}
