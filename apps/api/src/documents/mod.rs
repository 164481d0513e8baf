//! Uploaded-document text extraction and input resolution.
//!
//! Extraction is CPU-bound; async callers wrap it in `tokio::task::spawn_blocking`.

pub mod docx;
pub mod pdf;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("{file_name} is not a readable PDF: {reason}")]
    Pdf { file_name: String, reason: String },

    #[error("{file_name} is not a readable DOCX: {reason}")]
    Docx { file_name: String, reason: String },

    #[error("{file_name} is not valid UTF-8 text")]
    Encoding { file_name: String },
}

/// A file as received from a form upload.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    /// Chosen by extension, case-insensitively. Anything unknown is read as text.
    pub fn from_file_name(file_name: &str) -> Self {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            DocumentKind::Pdf
        } else if lower.ends_with(".docx") {
            DocumentKind::Docx
        } else {
            DocumentKind::PlainText
        }
    }
}

/// Extracts the plain text of an uploaded document.
pub fn extract_text(doc: &UploadedDocument) -> Result<String, ExtractionError> {
    let kind = DocumentKind::from_file_name(&doc.file_name);
    debug!(
        "Extracting {:?} document ({} bytes)",
        kind,
        doc.bytes.len()
    );

    match kind {
        DocumentKind::Pdf => pdf::extract_pdf_text(&doc.bytes).map_err(|reason| {
            ExtractionError::Pdf {
                file_name: doc.file_name.clone(),
                reason,
            }
        }),
        DocumentKind::Docx => docx::extract_docx_text(&doc.bytes).map_err(|reason| {
            ExtractionError::Docx {
                file_name: doc.file_name.clone(),
                reason,
            }
        }),
        DocumentKind::PlainText => {
            let text = std::str::from_utf8(&doc.bytes).map_err(|_| ExtractionError::Encoding {
                file_name: doc.file_name.clone(),
            })?;
            Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
        }
    }
}

/// Picks the text for one input: an uploaded document wins over pasted text.
///
/// A document that extracts to nothing is not replaced by the pasted text; the
/// pipeline then reports the input as missing.
pub fn resolve_input(
    upload: Option<&UploadedDocument>,
    pasted: &str,
) -> Result<String, ExtractionError> {
    match upload {
        Some(doc) => extract_text(doc),
        None => Ok(pasted.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, bytes: &[u8]) -> UploadedDocument {
        UploadedDocument {
            file_name: name.to_string(),
            bytes: Bytes::copy_from_slice(bytes),
        }
    }

    #[test]
    fn test_kind_from_extension_is_case_insensitive() {
        assert_eq!(DocumentKind::from_file_name("CV.PDF"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_file_name("cv.Docx"), DocumentKind::Docx);
        assert_eq!(DocumentKind::from_file_name("cv.txt"), DocumentKind::PlainText);
        assert_eq!(DocumentKind::from_file_name("cv"), DocumentKind::PlainText);
    }

    #[test]
    fn test_plain_text_upload_is_decoded() {
        let doc = upload("resume.txt", "\u{feff}Jane Doe\nRust".as_bytes());
        assert_eq!(extract_text(&doc).unwrap(), "Jane Doe\nRust");
    }

    #[test]
    fn test_invalid_utf8_is_fatal() {
        let doc = upload("resume.txt", &[0xff, 0xfe, 0x00, 0xc3]);
        assert!(matches!(
            extract_text(&doc),
            Err(ExtractionError::Encoding { .. })
        ));
    }

    #[test]
    fn test_garbage_pdf_is_fatal() {
        let doc = upload("resume.pdf", b"definitely not a pdf");
        let err = extract_text(&doc).unwrap_err();
        assert!(err.to_string().contains("resume.pdf"));
    }

    #[test]
    fn test_upload_takes_precedence_over_paste() {
        let doc = upload("jd.txt", b"from the file");
        assert_eq!(
            resolve_input(Some(&doc), "from the textarea").unwrap(),
            "from the file"
        );
    }

    #[test]
    fn test_paste_used_and_trimmed_without_upload() {
        assert_eq!(resolve_input(None, "  pasted jd \n").unwrap(), "pasted jd");
    }

    #[test]
    fn test_empty_upload_is_not_rescued_by_paste() {
        let doc = upload("empty.txt", b"");
        assert_eq!(resolve_input(Some(&doc), "pasted").unwrap(), "");
    }
}
