use serde::{Deserialize, Serialize};

use crate::domain::value_objects::PageNumber;

/// A bounded window of page text; the unit that is embedded and retrieved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    document_name: String,
    page: PageNumber,
    text: String,
    /// Offset of the first character of `text` inside the page, in chars.
    char_offset: usize,
    /// Position of the chunk in the build, across all pages.
    ordinal: usize,
}

impl Chunk {
    pub fn new(
        document_name: String,
        page: PageNumber,
        text: String,
        char_offset: usize,
        ordinal: usize,
    ) -> Self {
        Self {
            document_name,
            page,
            text,
            char_offset,
            ordinal,
        }
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    pub fn page(&self) -> PageNumber {
        self.page
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_offset(&self) -> usize {
        self.char_offset
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn same_source(&self, other: &Chunk) -> bool {
        self.document_name == other.document_name && self.page == other.page
    }
}
