use lopdf::Document;
use tracing::warn;

/// Extracts text page by page, joined with newlines.
///
/// A page whose text cannot be extracted contributes an empty string.
/// Only a document that cannot be parsed at all is an error.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, String> {
    let doc = Document::load_mem(bytes).map_err(|e| e.to_string())?;

    let pages: Vec<String> = doc
        .get_pages()
        .keys()
        .map(|&page_number| {
            doc.extract_text(&[page_number]).unwrap_or_else(|e| {
                warn!("PDF page {page_number} has no extractable text: {e}");
                String::new()
            })
        })
        .collect();

    Ok(pages.join("\n"))
}
