use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;

pub const TEXT_FILE_NAME: &str = "Optimized_Resume.txt";
pub const TEXT_MIME: &str = "text/plain; charset=utf-8";

/// The unmodified text as a download payload.
pub fn text_payload(text: &str) -> Bytes {
    Bytes::copy_from_slice(text.as_bytes())
}

/// Base64 of arbitrary bytes, for JSON bodies and `data:` links.
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// A `data:` URI suitable for an `<a download>` link.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", to_base64(bytes))
}

/// `Content-Disposition` value for an attachment named `file_name`.
pub fn attachment(file_name: &str) -> String {
    format!("attachment; filename=\"{file_name}\"")
}
