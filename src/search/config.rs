//! Search settings.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HalberdError, Result};

/// Settings for shard-local searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Scan deadline in milliseconds; `None` means unbounded.
    pub timeout_ms: Option<u64>,

    /// Read the clock every this many collected documents.
    pub timeout_check_interval: u32,

    /// Number of hits to return.
    pub size: usize,

    /// First hit to return.
    pub from: usize,

    /// Hits scoring below this are counted but not returned.
    pub min_score: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            timeout_ms: None,
            timeout_check_interval: 16,
            size: 10,
            from: 0,
            min_score: 0.0,
        }
    }
}

impl SearchConfig {
    /// Set the scan deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Set the paging window.
    pub fn with_window(mut self, from: usize, size: usize) -> Self {
        self.from = from;
        self.size = size;
        self
    }

    /// Set the clock check interval.
    pub fn with_timeout_check_interval(mut self, interval: u32) -> Self {
        self.timeout_check_interval = interval;
        self
    }

    /// Set the minimum returned score.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// The scan deadline.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Parse settings from JSON; missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SearchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load settings from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_check_interval == 0 {
            return Err(HalberdError::config(
                "timeout_check_interval must be at least 1",
            ));
        }
        if self.min_score.is_nan() {
            return Err(HalberdError::config("min_score must be a number"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_for_missing_keys() {
        let config = SearchConfig::from_json_str(r#"{"timeout_ms": 250}"#).unwrap();
        assert_eq!(config.timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.timeout_check_interval, 16);
        assert_eq!(config.size, 10);
        assert_eq!(config.from, 0);
    }

    #[test]
    fn test_zero_check_interval_rejected() {
        let err = SearchConfig::from_json_str(r#"{"timeout_check_interval": 0}"#).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"size": 3, "from": 1, "min_score": 0.5}}"#).unwrap();

        let config = SearchConfig::from_file(file.path()).unwrap();
        assert_eq!(
            config,
            SearchConfig::default().with_window(1, 3).with_min_score(0.5)
        );
        assert!(config.timeout().is_none());
    }
}
