use std::path::Path;

use nodekeep_core::Disposition;

/// Map a file extension to a content type and an "is image" flag.
///
/// The leading dot is stripped and lookup is ascii case-insensitive. An
/// unknown or empty extension yields `(None, false)`; callers treat `None`
/// as "generic byte stream, non-inline". Pure function, no I/O.
pub fn classify(extension: &str) -> (Option<String>, bool) {
    let ext = extension.strip_prefix('.').unwrap_or(extension);
    if ext.is_empty() {
        return (None, false);
    }
    match mime_guess::from_ext(ext).first() {
        Some(mime) => {
            let is_image = mime.type_() == mime_guess::mime::IMAGE;
            (Some(mime.essence_str().to_string()), is_image)
        }
        None => (None, false),
    }
}

/// Download decision for a filename: recognized images render inline, and
/// any recognized type carries its content type; everything else is a plain
/// attachment with no content-type override.
pub fn detect(filename: &str) -> (Option<String>, Disposition) {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    let (content_type, is_image) = classify(extension);
    let disposition = if is_image {
        Disposition::Inline
    } else {
        Disposition::Attachment
    };
    (content_type, disposition)
}
