use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::Chunk;
use crate::domain::value_objects::PageNumber;

const ELLIPSIS: &str = "...";

/// Provenance shown next to an answer: which page of which document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub document_name: String,
    pub page: PageNumber,
    pub preview: String,
}

impl Citation {
    pub fn from_chunk(chunk: &Chunk, preview_chars: usize) -> Self {
        Self {
            document_name: chunk.document_name().to_string(),
            page: chunk.page(),
            preview: preview(chunk.text(), preview_chars),
        }
    }

    pub fn key(&self) -> (&str, PageNumber) {
        (&self.document_name, self.page)
    }
}

/// Cuts `text` to `max_chars` characters, marking the cut with `...`.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_end, _)) => format!("{}{}", &text[..byte_end], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Builds the citation list for a set of retrieved chunks.
///
/// One citation per (document, page) pair, in the order pairs are first
/// seen, truncated to `limit` entries.
pub fn derive_citations<'a, I>(chunks: I, limit: usize, preview_chars: usize) -> Vec<Citation>
where
    I: IntoIterator<Item = &'a Chunk>,
{
    let mut seen: HashSet<(String, PageNumber)> = HashSet::new();

    chunks
        .into_iter()
        .filter(|chunk| seen.insert((chunk.document_name().to_string(), chunk.page())))
        .take(limit)
        .map(|chunk| Citation::from_chunk(chunk, preview_chars))
        .collect()
}
