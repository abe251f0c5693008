use serde::{Deserialize, Serialize};

use crate::domain::value_objects::PageNumber;

/// A single page of text, as produced by a document loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    document_name: String,
    number: PageNumber,
    text: String,
}

impl Page {
    pub fn new(document_name: impl Into<String>, number: PageNumber, text: impl Into<String>) -> Self {
        Self {
            document_name: document_name.into(),
            number,
            text: text.into(),
        }
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    pub fn number(&self) -> PageNumber {
        self.number
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A document after loading: its display name plus pages in reading order.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    pub name: String,
    pub pages: Vec<Page>,
}

impl LoadedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
