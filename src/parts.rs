//! Conversion of raw user input into content parts.

use crate::ai::mime::detect_image_mime;
use crate::models::{ContentPart, InlineData};
use crate::{Error, Result};
use base64::Engine as _;
use std::path::Path;

/// Wrap text verbatim as a text part.
pub fn encode_text(text: impl Into<String>) -> ContentPart {
    ContentPart::Text { text: text.into() }
}

/// Base64-encode binary media and pair it with its MIME type.
pub fn encode_media(bytes: &[u8], mime_type: &str) -> Result<ContentPart> {
    if bytes.is_empty() {
        return Err(Error::Encoding("media input is empty".to_string()));
    }
    let mime_type = mime_type.trim();
    if mime_type.is_empty() {
        return Err(Error::Encoding("media input has no MIME type".to_string()));
    }

    Ok(ContentPart::InlineMedia {
        inline_data: InlineData {
            mime_type: mime_type.to_string(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        },
    })
}

/// Read an image from disk and encode it, sniffing the MIME type from its
/// contents.
pub async fn encode_file(path: &Path) -> Result<ContentPart> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        tracing::error!("Failed to read media file {}: {}", path.display(), e);
        Error::Encoding(format!("cannot read {}: {}", path.display(), e))
    })?;
    tracing::debug!("Read {} bytes of media from {}", bytes.len(), path.display());

    encode_media(&bytes, detect_image_mime(&bytes))
}

/// Recover the MIME type and raw bytes from an inline media part.
pub fn decode_media(part: &ContentPart) -> Option<(&str, Vec<u8>)> {
    match part {
        ContentPart::InlineMedia { inline_data } => base64::engine::general_purpose::STANDARD
            .decode(&inline_data.data)
            .ok()
            .map(|bytes| (inline_data.mime_type.as_str(), bytes)),
        ContentPart::Text { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_encode_text_is_verbatim() {
        let part = encode_text("  fn main() {}\n");
        assert_eq!(part.as_text(), Some("  fn main() {}\n"));
    }

    #[test]
    fn test_encode_media_round_trips() {
        let bytes: Vec<u8> = (0..=255).collect();
        let part = encode_media(&bytes, "image/jpeg").unwrap();

        let (mime, decoded) = decode_media(&part).unwrap();
        assert_eq!(mime, "image/jpeg");
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn test_encode_media_rejects_empty_input() {
        let err = encode_media(&[], "image/png").unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn test_encode_media_rejects_blank_mime() {
        let err = encode_media(&[1, 2, 3], "  ").unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn test_decode_media_ignores_text() {
        assert!(decode_media(&encode_text("hi")).is_none());
    }

    #[tokio::test]
    async fn test_encode_file_sniffs_mime() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]).unwrap();

        let part = encode_file(file.path()).await.unwrap();
        let (mime, bytes) = decode_media(&part).unwrap();
        assert_eq!(mime, "image/jpeg");
        assert_eq!(bytes.len(), 6);
    }

    #[tokio::test]
    async fn test_encode_file_missing_is_encoding_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = encode_file(&dir.path().join("nope.png")).await.unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }
}
