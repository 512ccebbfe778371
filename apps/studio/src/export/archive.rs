//! HTML5 archive packaging.
//!
//! Layout, one folder per document key:
//!   {key}/index.html
//!   {key}/assets/logo.png   (empty placeholder)
//!   {key}/assets/bg.jpg     (empty placeholder)

use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use thiserror::Error;
use tracing::debug;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::export::naming::parse_document_key;
use crate::synthesis::document::PACKAGE_ASSETS;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Invalid document key {0:?}: expected \"{{width}}x{{height}}\" with optional \"-v{{n}}\"")]
    InvalidKey(String),

    #[error("No documents to package")]
    Empty,

    #[error("Zip error: {0}")]
    Zip(#[from] ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    /// True when the request itself was bad, as opposed to packaging failing.
    pub fn is_input_error(&self) -> bool {
        matches!(self, ArchiveError::InvalidKey(_) | ArchiveError::Empty)
    }
}

/// Rejects an empty set or any key that is not a safe folder name.
pub fn validate_keys(documents: &BTreeMap<String, String>) -> Result<(), ArchiveError> {
    if documents.is_empty() {
        return Err(ArchiveError::Empty);
    }
    match documents.keys().find(|k| parse_document_key(k).is_none()) {
        Some(bad) => Err(ArchiveError::InvalidKey(bad.clone())),
        None => Ok(()),
    }
}

pub fn build_html_archive(documents: &BTreeMap<String, String>) -> Result<Vec<u8>, ArchiveError> {
    validate_keys(documents)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (key, html) in documents {
        zip.add_directory(format!("{key}/"), options)?;
        zip.start_file(format!("{key}/index.html"), options)?;
        zip.write_all(html.as_bytes())?;

        zip.add_directory(format!("{key}/assets/"), options)?;
        for asset in PACKAGE_ASSETS {
            zip.start_file(format!("{key}/{asset}"), options)?;
        }
    }

    let bytes = zip.finish()?.into_inner();
    debug!(
        documents = documents.len(),
        bytes = bytes.len(),
        "packaged html5 archive"
    );
    Ok(bytes)
}
