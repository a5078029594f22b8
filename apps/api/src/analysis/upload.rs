//! Resume upload validation: which files we accept before forwarding.

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const ALLOWED_MIME_TYPES: [&str; 2] = [PDF_MIME, DOCX_MIME];
const GENERIC_MIME: &str = "application/octet-stream";

/// Resolves the MIME type of an uploaded part. The declared content type wins;
/// a missing or generic one falls back to the filename extension.
pub fn resolve_mime(declared: Option<&str>, filename: &str) -> Option<String> {
    let declared = declared
        .and_then(|m| m.split(';').next())
        .map(|m| m.trim().to_ascii_lowercase())
        .filter(|m| !m.is_empty() && m != GENERIC_MIME);

    declared.or_else(|| mime_from_extension(filename).map(String::from))
}

pub fn is_allowed(mime: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime)
}

fn mime_from_extension(filename: &str) -> Option<&'static str> {
    let (_, ext) = filename.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "pdf" => Some(PDF_MIME),
        "docx" => Some(DOCX_MIME),
        _ => None,
    }
}
