//! Binary content normalization.
//!
//! Binary values are always stored as base64 text. The source can be a file
//! path, a `file://` URI, a remote URL, raw bytes, already-encoded base64, or
//! a literal string; every form is normalized to the same encoded payload.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::content::RawContent;
use crate::error::{TypeError, TypeResult};

/// Where binary bytes come from, after inspecting the raw input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BinarySource {
    Path(PathBuf),
    Url(String),
    Encoded(String),
    Literal(String),
    Bytes(Vec<u8>),
}

impl BinarySource {
    /// Inspect a textual binary source.
    ///
    /// `file://` URIs and existing paths are files; strings with a URL scheme
    /// are remote; valid base64 is kept as-is. Other text that reads as a
    /// path is still a file source, so a missing file fails to load instead
    /// of being stored as its own name. Anything else is a literal.
    pub fn from_text(text: &str) -> Self {
        let text = text.trim();
        if let Some(path) = text.strip_prefix("file://") {
            return Self::Path(PathBuf::from(path));
        }
        if has_url_scheme(text) {
            return Self::Url(text.to_string());
        }
        if Path::new(text).is_file() {
            return Self::Path(PathBuf::from(text));
        }
        if !text.is_empty() && STANDARD.decode(text).is_ok() {
            return Self::Encoded(text.to_string());
        }
        if looks_like_path(text) {
            return Self::Path(PathBuf::from(text));
        }
        Self::Literal(text.to_string())
    }

    /// Inspect any raw input destined for a binary value.
    pub fn from_raw(raw: &RawContent) -> Self {
        match raw {
            RawContent::File(path) => Self::Path(path.clone()),
            RawContent::Bytes(bytes) => Self::Bytes(bytes.clone()),
            RawContent::Url(url) => Self::from_text(url),
            RawContent::Text(text) => Self::from_text(text),
            other => Self::Literal(other.render()),
        }
    }

    /// The file name implied by a path source, if any.
    pub fn file_name(&self) -> Option<String> {
        match self {
            Self::Path(path) => path.file_name().map(|n| n.to_string_lossy().into_owned()),
            _ => None,
        }
    }
}

fn looks_like_path(text: &str) -> bool {
    text.contains(['/', '\\']) && !text.contains(char::is_whitespace)
}

fn has_url_scheme(text: &str) -> bool {
    match text.split_once("://") {
        Some((scheme, rest)) => {
            !scheme.is_empty()
                && !rest.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Fetches bytes for file and remote binary sources.
pub trait BinaryLoader: Send + Sync {
    /// Read the bytes of a local file.
    fn load_path(&self, path: &Path) -> TypeResult<Vec<u8>>;

    /// Fetch the bytes behind a remote URL.
    fn load_url(&self, url: &str) -> TypeResult<Vec<u8>>;
}

/// Loader backed by the local filesystem. Remote URLs are refused.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsBinaryLoader;

impl BinaryLoader for FsBinaryLoader {
    fn load_path(&self, path: &Path) -> TypeResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| TypeError::Binary(format!("{}: {e}", path.display())))
    }

    fn load_url(&self, url: &str) -> TypeResult<Vec<u8>> {
        Err(TypeError::Binary(format!(
            "no network loader configured for {url}"
        )))
    }
}

/// Encode bytes as standard base64.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64 text.
pub fn decode(encoded: &str) -> TypeResult<Vec<u8>> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| TypeError::Base64(e.to_string()))
}

/// Resolve a source to its base64 payload.
pub fn normalize(source: &BinarySource, loader: &dyn BinaryLoader) -> TypeResult<String> {
    match source {
        BinarySource::Path(path) => Ok(encode(&loader.load_path(path)?)),
        BinarySource::Url(url) => Ok(encode(&loader.load_url(url)?)),
        BinarySource::Encoded(text) => Ok(text.clone()),
        BinarySource::Literal(text) => Ok(encode(text.as_bytes())),
        BinarySource::Bytes(bytes) => Ok(encode(bytes)),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn bytes_roundtrip_exactly() {
        let bytes: Vec<u8> = (0..=255).collect();
        let encoded = normalize(&BinarySource::Bytes(bytes.clone()), &FsBinaryLoader).unwrap();
        assert_eq!(decode(&encoded).unwrap(), bytes);
    }

    #[test]
    fn file_path_and_uri_produce_same_payload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\x00\x01binary\xff").unwrap();
        let path = file.path().to_path_buf();

        let from_path = BinarySource::from_text(&path.display().to_string());
        let from_uri = BinarySource::from_text(&format!("file://{}", path.display()));
        assert_eq!(from_path, BinarySource::Path(path.clone()));

        let a = normalize(&from_path, &FsBinaryLoader).unwrap();
        let b = normalize(&from_uri, &FsBinaryLoader).unwrap();
        assert_eq!(a, b);
        assert_eq!(decode(&a).unwrap(), b"\x00\x01binary\xff");
    }

    #[test]
    fn encoded_text_is_kept() {
        let encoded = encode(b"payload");
        assert_eq!(
            BinarySource::from_text(&encoded),
            BinarySource::Encoded(encoded.clone())
        );
    }

    #[test]
    fn literal_text_is_encoded() {
        let source = BinarySource::from_text("not base64!");
        assert_eq!(source, BinarySource::Literal("not base64!".into()));
        let encoded = normalize(&source, &FsBinaryLoader).unwrap();
        assert_eq!(decode(&encoded).unwrap(), b"not base64!");
    }

    #[test]
    fn missing_file_path_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("trace.bin").display().to_string();
        let source = BinarySource::from_text(&missing);
        assert_eq!(source, BinarySource::Path(PathBuf::from(&missing)));
        assert!(matches!(
            normalize(&source, &FsBinaryLoader),
            Err(TypeError::Binary(_))
        ));
        assert!(matches!(
            BinarySource::from_text("a/b with spaces"),
            BinarySource::Literal(_)
        ));
    }

    #[test]
    fn remote_urls_need_a_network_loader() {
        let source = BinarySource::from_text("https://example.org/data.bin");
        assert!(matches!(source, BinarySource::Url(_)));
        assert!(matches!(
            normalize(&source, &FsBinaryLoader),
            Err(TypeError::Binary(_))
        ));
    }

    #[test]
    fn path_source_exposes_file_name() {
        let source = BinarySource::Path(PathBuf::from("/data/trace.bin"));
        assert_eq!(source.file_name().as_deref(), Some("trace.bin"));
    }
}
