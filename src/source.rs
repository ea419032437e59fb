//! Byte sources for messages named by a location string

use crate::error::{ParseError, Result};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// Opens a readable stream for a location.
///
/// The extractor calls [`open`](Self::open) once per extraction, reads the
/// stream sequentially up to the end of the headers and drops it before
/// returning.
pub trait MessageSource {
    type Reader: Read;

    fn open(&self, location: &str) -> Result<Self::Reader>;
}

/// Local files, named by a `file://` URI or a plain path
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl MessageSource for FileSource {
    type Reader = File;

    fn open(&self, location: &str) -> Result<File> {
        let path = resolve_location(location)?;
        File::open(&path).map_err(|e| ParseError::source_unavailable(location, e))
    }
}

/// Map a location to a filesystem path.
///
/// `file://` URIs are percent-decoded (an empty or `localhost` host is
/// accepted); strings without a scheme are taken as paths. Any other scheme
/// is rejected.
pub fn resolve_location(location: &str) -> Result<PathBuf> {
    if location.is_empty() {
        return Err(ParseError::InvalidLocation("empty location".into()));
    }

    if let Some(rest) = location.strip_prefix("file://") {
        let path = rest.strip_prefix("localhost").unwrap_or(rest);
        if !path.starts_with('/') {
            return Err(ParseError::InvalidLocation(format!(
                "file URI with a remote host: {location}"
            )));
        }
        let decoded = urlencoding::decode(path)
            .map_err(|e| ParseError::InvalidLocation(format!("{location}: {e}")))?;
        return Ok(PathBuf::from(decoded.into_owned()));
    }

    if let Some(scheme) = uri_scheme(location) {
        return Err(ParseError::InvalidLocation(format!(
            "unsupported scheme '{scheme}' in {location}"
        )));
    }

    Ok(PathBuf::from(location))
}

/// Scheme of `scheme:...`, ignoring one-letter drive prefixes like `C:`
fn uri_scheme(location: &str) -> Option<&str> {
    let (scheme, _) = location.split_once(':')?;
    let mut chars = scheme.chars();
    let valid = scheme.len() > 1
        && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}
