use serde::{Deserialize, Serialize};
use serde_json::Number;
use thiserror::Error;

/// A stored book record. Optional fields the client never supplied are
/// omitted from the JSON entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_page: Option<Number>,
    /// `page_count == read_page`, recomputed on every write
    pub finished: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading: Option<bool>,
    pub inserted_at: String,
    pub updated_at: String,
}

impl Book {
    /// Build a new record from a validated draft
    pub fn new(id: String, draft: BookDraft, now: String) -> Self {
        let finished = draft.is_finished();
        Self {
            id,
            name: draft.name,
            year: draft.year,
            author: draft.author,
            summary: draft.summary,
            publisher: draft.publisher,
            page_count: draft.page_count,
            read_page: draft.read_page,
            finished,
            reading: draft.reading,
            inserted_at: now.clone(),
            updated_at: now,
        }
    }

    /// Replace every mutable field; `id` and `inserted_at` are kept.
    pub fn apply(&mut self, draft: BookDraft, now: String) {
        self.finished = draft.is_finished();
        self.name = draft.name;
        self.year = draft.year;
        self.author = draft.author;
        self.summary = draft.summary;
        self.publisher = draft.publisher;
        self.page_count = draft.page_count;
        self.read_page = draft.read_page;
        self.reading = draft.reading;
        self.updated_at = now;
    }

    pub fn to_summary(&self) -> BookSummary {
        BookSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            publisher: self.publisher.clone(),
        }
    }
}

/// Projection returned by the list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

/// Request body for creating or replacing a book.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub name: Option<String>,
    pub year: Option<Number>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: Option<Number>,
    pub read_page: Option<Number>,
    pub reading: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Mohon isi nama buku")]
    MissingName,
    #[error("readPage tidak boleh lebih besar dari pageCount")]
    ReadPageExceedsPageCount,
}

impl BookPayload {
    /// Check the payload in order: name first, then the page relationship.
    pub fn validate(self) -> Result<BookDraft, ValidationError> {
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(ValidationError::MissingName),
        };

        if let (Some(read_page), Some(page_count)) = (&self.read_page, &self.page_count) {
            if as_f64(read_page) > as_f64(page_count) {
                return Err(ValidationError::ReadPageExceedsPageCount);
            }
        }

        Ok(BookDraft {
            name,
            year: self.year,
            author: self.author,
            summary: self.summary,
            publisher: self.publisher,
            page_count: self.page_count,
            read_page: self.read_page,
            reading: self.reading,
        })
    }
}

/// A payload that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct BookDraft {
    pub name: String,
    pub year: Option<Number>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: Option<Number>,
    pub read_page: Option<Number>,
    pub reading: Option<bool>,
}

impl BookDraft {
    // Two absent counts compare equal, so a book without page numbers is finished.
    fn is_finished(&self) -> bool {
        match (&self.page_count, &self.read_page) {
            (None, None) => true,
            (Some(page_count), Some(read_page)) => as_f64(page_count) == as_f64(read_page),
            _ => false,
        }
    }
}

/// Numeric value of a page or year field; `500` and `500.0` are the same number.
fn as_f64(number: &Number) -> f64 {
    number.as_f64().unwrap_or(f64::NAN)
}
