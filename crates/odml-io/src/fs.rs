use std::fs;
use std::path::PathBuf;

use odml_resolve::url::{scheme, split_fragment};
use odml_resolve::{DocumentReader, ResolveError, ResolveResult};
use odml_tree::Document;
use odml_types::TypeEngine;
use tracing::debug;

use crate::reader::read_document_with;

/// [`DocumentReader`] for JSON documents on the local file system.
///
/// Accepts plain paths and `file://` URLs; any other scheme is rejected.
#[derive(Debug, Default)]
pub struct FsDocumentReader {
    engine: TypeEngine,
}

impl FsDocumentReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(engine: TypeEngine) -> Self {
        Self { engine }
    }

    fn path_for(url: &str) -> ResolveResult<PathBuf> {
        let (location, _) = split_fragment(url);
        match scheme(location) {
            None => Ok(PathBuf::from(location)),
            Some(s) if s.eq_ignore_ascii_case("file") => {
                let rest = &location[s.len() + 1..];
                Ok(PathBuf::from(rest.strip_prefix("//").unwrap_or(rest)))
            }
            Some(_) => Err(ResolveError::UnsupportedScheme(url.to_string())),
        }
    }
}

impl DocumentReader for FsDocumentReader {
    fn read(&self, url: &str) -> ResolveResult<Document> {
        let path = Self::path_for(url)?;
        let fetch_error = |reason: String| ResolveError::Fetch {
            url: url.to_string(),
            reason,
        };
        let text = fs::read_to_string(&path).map_err(|e| fetch_error(e.to_string()))?;
        let mut document = read_document_with(&text, &self.engine).map_err(|e| fetch_error(e.to_string()))?;
        document.info.source_url = Some(path.display().to_string());
        debug!(path = %path.display(), sections = document.len(), "read document from disk");
        Ok(document)
    }
}
