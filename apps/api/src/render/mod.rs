// Document Renderer: the three views of one completion.
// Each view is an independent pure transformation of the same text.

pub mod markdown;
pub mod pdf;
pub mod text;

use anyhow::Result;
use bytes::Bytes;

use crate::layout::{default_page_config, HELVETICA};

pub use markdown::markdown_to_html;
pub use pdf::{text_to_pdf, PDF_FILE_NAME, PDF_MIME};
pub use text::{attachment, data_uri, text_payload, to_base64, TEXT_FILE_NAME, TEXT_MIME};

/// The HTML view, the text download, and the PDF download of one completion.
#[derive(Debug, Clone)]
pub struct RenderedOutput {
    pub html: String,
    pub text: Bytes,
    pub pdf: Bytes,
}

/// Produces all three views with the default page layout.
pub fn render(text: &str) -> Result<RenderedOutput> {
    Ok(RenderedOutput {
        html: markdown_to_html(text),
        text: text_payload(text),
        pdf: render_pdf(text)?,
    })
}

/// The PDF view alone, with the default page layout.
pub fn render_pdf(text: &str) -> Result<Bytes> {
    text_to_pdf(text, &HELVETICA, &default_page_config())
}
