//! Error types for the Halberd library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`HalberdError`] enum.
//!
//! # Examples
//!
//! ```
//! use halberd::error::{HalberdError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(HalberdError::config("missing field"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Halberd operations.
///
/// Note that an expired search deadline is not an error: it is reported as
/// [`ScanOutcome::TimedOut`](crate::search::ScanOutcome::TimedOut).
#[derive(Error, Debug)]
pub enum HalberdError {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Index-related errors
    #[error("Index error: {0}")]
    Index(String),

    /// Query-related errors (rewrite, weight construction, invalid queries)
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration errors (missing mandatory descriptor fields, bad settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with HalberdError.
pub type Result<T> = std::result::Result<T, HalberdError>;

impl HalberdError {
    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        HalberdError::Index(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        HalberdError::Query(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        HalberdError::Config(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        HalberdError::Other(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        HalberdError::Other(format!("Invalid argument: {}", msg.into()))
    }

    /// Whether this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, HalberdError::Config(_))
    }
}
