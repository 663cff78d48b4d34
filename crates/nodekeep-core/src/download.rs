use serde::{Deserialize, Serialize};

/// How a downloaded attachment should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// Render in the browser (recognized images only).
    Inline,
    /// Force a download.
    Attachment,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Inline => "inline",
            Disposition::Attachment => "attachment",
        }
    }
}

/// Metadata returned alongside the bytes of a download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadMeta {
    pub filename: String,
    pub size_bytes: u64,
    /// `None` means the extension mapped to no known type; callers should
    /// fall back to a generic byte-stream content type.
    pub content_type: Option<String>,
    pub disposition: Disposition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Disposition::Inline).unwrap(),
            "\"inline\""
        );
        assert_eq!(
            serde_json::to_string(&Disposition::Attachment).unwrap(),
            "\"attachment\""
        );
    }

    #[test]
    fn disposition_as_str_matches_wire_form() {
        assert_eq!(Disposition::Inline.as_str(), "inline");
        assert_eq!(Disposition::Attachment.as_str(), "attachment");
    }
}
