use async_trait::async_trait;
use lopdf::{Document, Object, ObjectId};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::application::ports::DocumentLoader;
use crate::application::ports::document_loader::DocumentLoadError;
use crate::domain::entities::{LoadedDocument, Page};
use crate::domain::value_objects::PageNumber;

/// Object types that never carry page text.
static IGNORE: &[&[u8]] = &[
    b"Length",
    b"BBox",
    b"FormType",
    b"Matrix",
    b"XObject",
    b"Subtype",
    b"Filter",
    b"ColorSpace",
    b"Width",
    b"Height",
    b"BitsPerComponent",
    b"Length1",
    b"Length2",
    b"Length3",
    b"PTEX.FileName",
    b"PTEX.PageNumber",
    b"PTEX.InfoDict",
    b"FontDescriptor",
    b"ExtGState",
    b"MediaBox",
    b"Annot",
];

fn filter_func(object_id: ObjectId, object: &mut Object) -> Option<(ObjectId, Object)> {
    if IGNORE.contains(&object.type_name().unwrap_or_default()) {
        return None;
    }
    if let Ok(d) = object.as_dict_mut() {
        d.remove(b"Producer");
        d.remove(b"ModDate");
        d.remove(b"Creator");
        d.remove(b"ProcSet");
        d.remove(b"Procset");
        d.remove(b"Annots");
        if d.is_empty() {
            return None;
        }
    }
    Some((object_id, object.to_owned()))
}

/// Loads PDFs page by page with `lopdf`, extracting pages in parallel.
/// Encrypted PDFs are opened with the empty user password.
#[derive(Debug, Clone, Default)]
pub struct PdfDocumentLoader;

impl PdfDocumentLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentLoader for PdfDocumentLoader {
    async fn load(&self, path: &Path) -> Result<LoadedDocument, DocumentLoadError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(DocumentLoadError::NotFound(path.display().to_string()));
        }

        let path = path.to_path_buf();

        tokio::task::spawn_blocking(move || extract_document(&path))
            .await
            .map_err(|e| DocumentLoadError::Parse(format!("extraction task failed: {e}")))?
    }
}

fn extract_document(path: &Path) -> Result<LoadedDocument, DocumentLoadError> {
    let start_time = Instant::now();

    let mut doc = Document::load_filtered(path, filter_func)
        .map_err(|e| DocumentLoadError::Parse(format!("{}: {e}", path.display())))?;

    if doc.is_encrypted() {
        doc.decrypt("")
            .map_err(|e| DocumentLoadError::Parse(format!("failed to decrypt: {e}")))?;
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let page_ids = doc.get_pages();
    if page_ids.is_empty() {
        return Err(DocumentLoadError::Parse(format!("{name} has no pages")));
    }

    let mut extracted: Vec<(u32, Result<String, String>)> = page_ids
        .into_par_iter()
        .map(|(page_num, _)| {
            let text = doc
                .extract_text(&[page_num])
                .map(|raw| normalize_page_text(&raw))
                .map_err(|e| e.to_string());
            (page_num, text)
        })
        .collect();
    extracted.sort_by_key(|(page_num, _)| *page_num);

    let total = extracted.len();
    let mut failures = 0;
    let mut pages = Vec::with_capacity(total);

    for (page_num, text) in extracted {
        let Some(number) = PageNumber::from_one_based(page_num) else {
            warn!(document = %name, page_num, "skipping page with invalid number");
            continue;
        };
        let text = text.unwrap_or_else(|e| {
            warn!(document = %name, page = page_num, error = %e, "failed to extract page text");
            failures += 1;
            String::new()
        });
        pages.push(Page::new(name.clone(), number, text));
    }

    if failures == total {
        return Err(DocumentLoadError::Parse(format!(
            "text extraction failed on every page of {name}"
        )));
    }

    info!(
        document = %name,
        pages = pages.len(),
        failed_pages = failures,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "loaded PDF"
    );

    Ok(LoadedDocument { name, pages })
}

/// Trims trailing whitespace and drops blank lines.
fn normalize_page_text(raw: &str) -> String {
    raw.split('\n')
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
