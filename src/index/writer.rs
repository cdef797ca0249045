//! In-memory index writer.
//!
//! Documents are tokenized on Unicode word boundaries and lower-cased, then
//! buffered until [`IndexWriter::flush`] seals them into an immutable
//! segment. Readers only ever see [`IndexSnapshot`]s.

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{HalberdError, Result};
use crate::index::segment::{Segment, SegmentBuilder, StoredDocument};
use crate::index::snapshot::IndexSnapshot;

/// Configuration for [`IndexWriter`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexWriterConfig {
    /// Buffered documents that trigger an automatic flush.
    pub max_buffered_docs: usize,
}

impl Default for IndexWriterConfig {
    fn default() -> Self {
        IndexWriterConfig {
            max_buffered_docs: 10_000,
        }
    }
}

/// Tokenize text the way the writer does: Unicode words, lower-cased.
pub fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words().map(str::to_lowercase).collect()
}

/// Builds segments from documents.
#[derive(Debug)]
pub struct IndexWriter {
    config: IndexWriterConfig,
    segments: Vec<Arc<Segment>>,
    buffer: SegmentBuilder,
    next_doc: u64,
}

impl Default for IndexWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexWriter {
    /// Create a writer with the default configuration.
    pub fn new() -> Self {
        Self::with_config(IndexWriterConfig::default())
    }

    /// Create a writer with the given configuration.
    pub fn with_config(config: IndexWriterConfig) -> Self {
        IndexWriter {
            config,
            segments: Vec::new(),
            buffer: SegmentBuilder::new(),
            next_doc: 0,
        }
    }

    /// Add a document from `(field, text)` pairs. Returns its global doc id.
    pub fn add_fields(&mut self, fields: &[(&str, &str)]) -> Result<u64> {
        let doc: StoredDocument = fields
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        self.add_document(doc)
    }

    /// Add a document. Returns its global doc id.
    pub fn add_document(&mut self, doc: StoredDocument) -> Result<u64> {
        if doc.is_empty() {
            return Err(HalberdError::invalid_argument("document has no fields"));
        }

        let mut tokens: Vec<(String, Vec<String>)> = doc
            .iter()
            .map(|(name, value)| (name.clone(), tokenize(value)))
            .collect();
        tokens.sort_by(|a, b| a.0.cmp(&b.0));

        self.buffer.add_document(doc, tokens);
        let doc_id = self.next_doc;
        self.next_doc += 1;

        if self.buffer.len() >= self.config.max_buffered_docs.max(1) {
            self.flush();
        }
        Ok(doc_id)
    }

    /// Delete a document by global id. Already-taken snapshots are unaffected.
    pub fn delete_document(&mut self, doc_id: u64) -> Result<bool> {
        if doc_id >= self.next_doc {
            return Err(HalberdError::index(format!("unknown doc id {doc_id}")));
        }
        self.flush();

        let Some(segment) = self
            .segments
            .iter_mut()
            .find(|s| doc_id >= s.doc_base() && doc_id < s.doc_base() + s.max_doc() as u64)
        else {
            return Ok(false);
        };
        let local = (doc_id - segment.doc_base()) as u32;
        Ok(Arc::make_mut(segment).delete(local))
    }

    /// Seal buffered documents into a new segment.
    pub fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let builder = std::mem::take(&mut self.buffer);
        let doc_base = self.segments.last().map_or(0, |s| s.doc_base() + s.max_doc() as u64);
        let segment = builder.build(self.segments.len() as u32, doc_base);
        debug!(
            "flushed segment {} with {} docs (doc base {})",
            segment.ordinal(),
            segment.max_doc(),
            doc_base
        );
        self.segments.push(Arc::new(segment));
    }

    /// Flush and return a point-in-time view of the index.
    pub fn snapshot(&mut self) -> IndexSnapshot {
        self.flush();
        IndexSnapshot::new(self.segments.clone())
    }

    /// Number of documents ever added.
    pub fn max_doc(&self) -> u64 {
        self.next_doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Hello, World! rust-lang"), vec!["hello", "world", "rust", "lang"]);
    }

    #[test]
    fn test_auto_flush_creates_segments() {
        let mut writer = IndexWriter::with_config(IndexWriterConfig {
            max_buffered_docs: 2,
        });
        for i in 0..5 {
            let id = writer.add_fields(&[("title", format!("doc {i}").as_str())]).unwrap();
            assert_eq!(id, i);
        }

        let snapshot = writer.snapshot();
        let bases: Vec<_> = snapshot.segments().iter().map(|s| s.doc_base()).collect();
        assert_eq!(bases, vec![0, 2, 4]);
        assert_eq!(snapshot.max_doc(), 5);
    }

    #[test]
    fn test_delete_is_invisible_to_earlier_snapshot() {
        let mut writer = IndexWriter::new();
        writer.add_fields(&[("title", "a")]).unwrap();
        writer.add_fields(&[("title", "b")]).unwrap();

        let before = writer.snapshot();
        assert!(writer.delete_document(1).unwrap());
        assert!(!writer.delete_document(1).unwrap());
        let after = writer.snapshot();

        assert_eq!(before.num_docs(), 2);
        assert_eq!(after.num_docs(), 1);
        assert!(writer.delete_document(9).is_err());
    }

    #[test]
    fn test_empty_document_rejected() {
        let mut writer = IndexWriter::new();
        assert!(writer.add_document(StoredDocument::new()).is_err());
    }
}
