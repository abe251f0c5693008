use tracing::debug;

use crate::application::error::QaError;
use crate::config::ChunkerConfig;
use crate::domain::entities::{Chunk, Page};

/// Fixed-window character chunker with overlap.
///
/// Each page is cut independently into windows of at most `chunk_size`
/// characters; window starts advance by `chunk_size - chunk_overlap`, so
/// neighbouring chunks of a page share exactly `chunk_overlap` characters.
#[derive(Debug, Clone)]
pub struct TextChunker {
    config: ChunkerConfig,
}

impl TextChunker {
    pub fn new(config: ChunkerConfig) -> Result<Self, QaError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> ChunkerConfig {
        self.config
    }

    pub fn chunk_pages(&self, pages: &[Page]) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for page in pages {
            self.chunk_page(page, &mut chunks);
        }

        debug!(
            pages = pages.len(),
            chunks = chunks.len(),
            chunk_size = self.config.chunk_size,
            chunk_overlap = self.config.chunk_overlap,
            "chunked pages"
        );

        chunks
    }

    fn chunk_page(&self, page: &Page, out: &mut Vec<Chunk>) {
        let chars: Vec<char> = page.text().chars().collect();
        let step = self.config.step();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.config.chunk_size).min(chars.len());

            out.push(Chunk::new(
                page.document_name().to_string(),
                page.number(),
                chars[start..end].iter().collect(),
                start,
                out.len(),
            ));

            if end == chars.len() {
                break;
            }
            start += step;
        }
    }
}
