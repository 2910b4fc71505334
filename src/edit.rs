use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// The fundamental edit primitive: byte-span replacement with verification.
///
/// Every rule in the catalog compiles down to this single primitive applied
/// against the in-memory document. Intelligence lives in span acquisition
/// (anchor and shape patterns), not in the application logic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until applied to a document"]
pub struct Edit {
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    /// New text to insert at [byte_start, byte_end)
    pub new_text: String,
    /// Verification of what we expect to find before applying
    pub expected_before: EditVerification,
}

/// Verification strategy for edit safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (faster for large spans)
    Hash(u64),
}

impl EditVerification {
    /// Check if the provided text matches the verification criteria.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("Before-text verification failed at byte {byte_start}")]
    BeforeTextMismatch {
        byte_start: usize,
        byte_end: usize,
        expected: String,
        found: String,
    },

    #[error("Invalid byte range: [{byte_start}, {byte_end}) in document of length {doc_len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        doc_len: usize,
    },

    #[error("Byte range [{byte_start}, {byte_end}) splits a UTF-8 character")]
    NotCharBoundary { byte_start: usize, byte_end: usize },
}

/// Result of applying an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditResult should be checked for success/already-applied"]
pub enum EditResult {
    /// Edit was successfully applied
    Applied { bytes_changed: usize },
    /// Edit was already applied (current text matches new_text)
    AlreadyApplied,
}

impl Edit {
    /// Create a replacement edit with automatic verification generation.
    pub fn replace(
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        expected_before: impl Into<String>,
    ) -> Self {
        let expected = expected_before.into();
        Self {
            byte_start,
            byte_end,
            new_text: new_text.into(),
            expected_before: EditVerification::from_text(&expected),
        }
    }

    /// Create a pure insertion at `at` (an empty span, expected text empty).
    pub fn insert_at(at: usize, text: impl Into<String>) -> Self {
        Self {
            byte_start: at,
            byte_end: at,
            new_text: text.into(),
            expected_before: EditVerification::ExactMatch(String::new()),
        }
    }

    /// Validate the edit against the current document contents.
    ///
    /// Returns the current text at [byte_start, byte_end) if validation succeeds.
    fn validate<'a>(&self, content: &'a str) -> Result<&'a str, EditError> {
        if self.byte_start > self.byte_end || self.byte_end > content.len() {
            return Err(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                doc_len: content.len(),
            });
        }

        if !content.is_char_boundary(self.byte_start) || !content.is_char_boundary(self.byte_end) {
            return Err(EditError::NotCharBoundary {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
            });
        }

        let current_text = &content[self.byte_start..self.byte_end];

        // Check if already applied (idempotency)
        if current_text == self.new_text {
            return Ok(current_text);
        }

        // Verify expected before-text
        if !self.expected_before.matches(current_text) {
            return Err(EditError::BeforeTextMismatch {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                expected: format!("{:?}", self.expected_before),
                found: current_text.to_string(),
            });
        }

        Ok(current_text)
    }

    /// Apply this edit to the in-memory document.
    ///
    /// The document on disk is untouched; persisting is the document's
    /// responsibility once the whole rule sequence has run.
    pub fn apply_to(&self, content: &mut String) -> Result<EditResult, EditError> {
        let current_text = self.validate(content)?;

        if current_text == self.new_text {
            return Ok(EditResult::AlreadyApplied);
        }

        content.replace_range(self.byte_start..self.byte_end, &self.new_text);

        Ok(EditResult::Applied {
            bytes_changed: self.new_text.len(),
        })
    }
}
