//! Posting lists for the in-memory inverted index.

/// Sentinel doc id returned by exhausted iterators and scorers.
pub const NO_MORE_DOCS: u32 = u32::MAX;

/// A single posting in a posting list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    /// Segment-local document ID.
    pub doc_id: u32,
    /// Term frequency in the document.
    pub frequency: u32,
}

impl Posting {
    /// Create a posting with frequency.
    pub fn with_frequency(doc_id: u32, frequency: u32) -> Self {
        Posting { doc_id, frequency }
    }
}

/// A posting list for a specific term, sorted by doc id.
#[derive(Debug, Clone, Default)]
pub struct PostingList {
    /// The postings in this list.
    postings: Vec<Posting>,
    /// Total frequency across all documents.
    total_frequency: u64,
}

impl PostingList {
    /// Create a new empty posting list.
    pub fn new() -> Self {
        PostingList::default()
    }

    /// Add a posting to this list.
    pub fn add_posting(&mut self, posting: Posting) {
        self.total_frequency += posting.frequency as u64;

        // Insert in sorted order by doc_id
        match self
            .postings
            .binary_search_by_key(&posting.doc_id, |p| p.doc_id)
        {
            Ok(pos) => {
                // Document already exists, merge the frequency
                self.postings[pos].frequency += posting.frequency;
            }
            Err(pos) => {
                self.postings.insert(pos, posting);
            }
        }
    }

    /// Number of documents containing the term.
    pub fn doc_frequency(&self) -> u64 {
        self.postings.len() as u64
    }

    /// Total occurrences of the term.
    pub fn total_frequency(&self) -> u64 {
        self.total_frequency
    }

    /// Get the length of the posting list.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    /// Check if the posting list is empty.
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Get a cursor over the postings.
    pub fn iter(&self) -> PostingIterator<'_> {
        PostingIterator::new(&self.postings)
    }
}

/// A cursor over a borrowed posting slice.
///
/// Starts positioned *before* the first posting; call [`next`](Self::next)
/// or [`skip_to`](Self::skip_to) to move onto a document.
#[derive(Debug, Clone)]
pub struct PostingIterator<'a> {
    postings: &'a [Posting],
    position: Option<usize>,
}

impl<'a> PostingIterator<'a> {
    /// Create a new posting iterator.
    pub fn new(postings: &'a [Posting]) -> Self {
        PostingIterator {
            postings,
            position: None,
        }
    }

    /// Create an empty iterator.
    pub fn empty() -> Self {
        PostingIterator::new(&[])
    }

    /// Get the current posting.
    pub fn current(&self) -> Option<&'a Posting> {
        self.position.and_then(|pos| self.postings.get(pos))
    }

    /// Current doc id, or [`NO_MORE_DOCS`] when exhausted or unpositioned.
    pub fn doc_id(&self) -> u32 {
        self.current().map(|p| p.doc_id).unwrap_or(NO_MORE_DOCS)
    }

    /// Term frequency at the current posting.
    pub fn frequency(&self) -> u32 {
        self.current().map(|p| p.frequency).unwrap_or(0)
    }

    /// Advance to the next posting.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&'a Posting> {
        let next = self.position.map(|pos| pos + 1).unwrap_or(0);
        self.position = Some(next.min(self.postings.len()));
        self.current()
    }

    /// Skip to the first posting with doc_id >= target.
    pub fn skip_to(&mut self, target_doc_id: u32) -> Option<&'a Posting> {
        let start = self.position.unwrap_or(0);
        let offset = self.postings[start.min(self.postings.len())..]
            .partition_point(|p| p.doc_id < target_doc_id);
        self.position = Some((start + offset).min(self.postings.len()));
        self.current()
    }

    /// Check if the iterator is exhausted.
    pub fn is_exhausted(&self) -> bool {
        matches!(self.position, Some(pos) if pos >= self.postings.len())
    }

    /// Get the total number of postings.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}
