//! Immutable in-memory index segments.

use std::collections::BTreeMap;
use std::ops::Bound;

use ahash::AHashMap;
use bit_vec::BitVec;

use crate::index::posting::{Posting, PostingList};

/// A stored document: field name to original text.
pub type StoredDocument = AHashMap<String, String>;

/// Per-field inverted data within one segment.
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    /// Sorted term dictionary.
    terms: BTreeMap<String, PostingList>,
    /// Token count of this field per document (0 when absent).
    lengths: Vec<u32>,
    /// Distinct terms of this field per document, in first-seen order.
    doc_terms: Vec<Vec<String>>,
    /// Number of documents that have this field.
    doc_count: u64,
    /// Total tokens over all documents.
    total_terms: u64,
}

impl FieldIndex {
    /// Posting list for a term.
    pub fn postings(&self, term: &str) -> Option<&PostingList> {
        self.terms.get(term)
    }

    /// Terms starting with `prefix`, in sorted order.
    pub fn terms_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.terms
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .map(|(term, _)| term.as_str())
            .take_while(move |term| term.starts_with(prefix))
    }

    /// Field length of a document.
    pub fn length(&self, doc_id: u32) -> u32 {
        self.lengths.get(doc_id as usize).copied().unwrap_or(0)
    }

    /// Per-document field lengths.
    pub fn lengths(&self) -> &[u32] {
        &self.lengths
    }

    /// Distinct terms of a document.
    pub fn doc_terms(&self, doc_id: u32) -> &[String] {
        self.doc_terms
            .get(doc_id as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of documents with this field.
    pub fn doc_count(&self) -> u64 {
        self.doc_count
    }

    /// Total number of tokens.
    pub fn total_terms(&self) -> u64 {
        self.total_terms
    }

    /// Number of unique terms.
    pub fn unique_terms(&self) -> usize {
        self.terms.len()
    }
}

/// An immutable slice of a shard index with its own local doc id space.
///
/// Global doc ids are `doc_base + local id`. Deletions are the only
/// mutation and happen copy-on-write through [`IndexWriter`](crate::index::IndexWriter),
/// so snapshots taken earlier never observe them.
#[derive(Debug, Clone)]
pub struct Segment {
    ordinal: u32,
    doc_base: u64,
    max_doc: u32,
    fields: AHashMap<String, FieldIndex>,
    stored: Vec<StoredDocument>,
    deleted: BitVec,
    num_deleted: u32,
}

impl Segment {
    /// Segment position within its index.
    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// Global id of this segment's first document.
    pub fn doc_base(&self) -> u64 {
        self.doc_base
    }

    /// Number of documents, including deleted ones.
    pub fn max_doc(&self) -> u32 {
        self.max_doc
    }

    /// Number of live documents.
    pub fn num_docs(&self) -> u32 {
        self.max_doc - self.num_deleted
    }

    /// Whether a local doc id is deleted.
    pub fn is_deleted(&self, doc_id: u32) -> bool {
        self.deleted.get(doc_id as usize).unwrap_or(false)
    }

    /// Whether the segment has any deletions.
    pub fn has_deletions(&self) -> bool {
        self.num_deleted > 0
    }

    /// Field data, if any document in this segment has the field.
    pub fn field(&self, field: &str) -> Option<&FieldIndex> {
        self.fields.get(field)
    }

    /// Names of the indexed fields, in no particular order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Posting list for `field:term`.
    pub fn postings(&self, field: &str, term: &str) -> Option<&PostingList> {
        self.field(field).and_then(|f| f.postings(term))
    }

    /// Stored fields of a local document.
    pub fn document(&self, doc_id: u32) -> Option<&StoredDocument> {
        self.stored.get(doc_id as usize)
    }

    /// Mark a local doc id deleted. Returns false if it was already deleted
    /// or out of range.
    pub(crate) fn delete(&mut self, doc_id: u32) -> bool {
        if doc_id >= self.max_doc || self.is_deleted(doc_id) {
            return false;
        }
        self.deleted.set(doc_id as usize, true);
        self.num_deleted += 1;
        true
    }
}

/// Accumulates analyzed documents and seals them into a [`Segment`].
#[derive(Debug, Default)]
pub struct SegmentBuilder {
    fields: AHashMap<String, FieldIndex>,
    stored: Vec<StoredDocument>,
}

impl SegmentBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        SegmentBuilder::default()
    }

    /// Number of buffered documents.
    pub fn len(&self) -> usize {
        self.stored.len()
    }

    /// Whether nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.stored.is_empty()
    }

    /// Add a document given its stored fields and per-field token streams.
    /// Returns the local doc id.
    pub fn add_document(
        &mut self,
        stored: StoredDocument,
        tokens: Vec<(String, Vec<String>)>,
    ) -> u32 {
        let doc_id = self.stored.len() as u32;

        for (field_name, field_tokens) in tokens {
            let field = self.fields.entry(field_name).or_default();

            let mut freqs: Vec<(String, u32)> = Vec::new();
            for token in &field_tokens {
                match freqs.iter_mut().find(|(t, _)| t == token) {
                    Some((_, freq)) => *freq += 1,
                    None => freqs.push((token.clone(), 1)),
                }
            }

            for (term, freq) in &freqs {
                field
                    .terms
                    .entry(term.clone())
                    .or_default()
                    .add_posting(Posting::with_frequency(doc_id, *freq));
            }

            if field.lengths.len() <= doc_id as usize {
                field.lengths.resize(doc_id as usize + 1, 0);
                field.doc_terms.resize(doc_id as usize + 1, Vec::new());
            }
            field.lengths[doc_id as usize] += field_tokens.len() as u32;
            field.doc_terms[doc_id as usize] = freqs.into_iter().map(|(t, _)| t).collect();
            field.doc_count += 1;
            field.total_terms += field_tokens.len() as u64;
        }

        self.stored.push(stored);
        doc_id
    }

    /// Seal the buffered documents into an immutable segment.
    pub fn build(self, ordinal: u32, doc_base: u64) -> Segment {
        let max_doc = self.stored.len() as u32;
        let mut fields = self.fields;
        for field in fields.values_mut() {
            field.lengths.resize(max_doc as usize, 0);
            field.doc_terms.resize(max_doc as usize, Vec::new());
        }

        Segment {
            ordinal,
            doc_base,
            max_doc,
            fields,
            stored: self.stored,
            deleted: BitVec::from_elem(max_doc as usize, false),
            num_deleted: 0,
        }
    }
}
