//! In-memory segmented inverted index: the scan primitive's storage.

pub mod posting;
pub mod segment;
pub mod snapshot;
pub mod writer;

pub use posting::{NO_MORE_DOCS, Posting, PostingIterator, PostingList};
pub use segment::{FieldIndex, Segment, SegmentBuilder, StoredDocument};
pub use snapshot::IndexSnapshot;
pub use writer::{IndexWriter, IndexWriterConfig, tokenize};
