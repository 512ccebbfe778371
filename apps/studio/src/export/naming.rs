//! Archive file names and document keys.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::synthesis::creative::SizeKey;

/// `{width}x{height}` with an optional `-v{n}` palette-variant suffix.
static DOCUMENT_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([1-9]\d{0,4})x([1-9]\d{0,4})(?:-v[1-9]\d*)?$")
        .expect("valid document key regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Folder per document with `index.html` and the package assets.
    Html5,
    /// One JPEG per document, produced by the remote rasterizer.
    Static,
}

impl ExportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportKind::Html5 => "html5",
            ExportKind::Static => "static",
        }
    }
}

/// `banners-{kind}-{YYYYMMDDTHHMM}.zip`, timestamp in UTC.
pub fn archive_filename(kind: ExportKind, at: DateTime<Utc>) -> String {
    format!("banners-{}-{}.zip", kind.as_str(), at.format("%Y%m%dT%H%M"))
}

pub fn content_disposition(filename: &str) -> String {
    format!("attachment; filename=\"{filename}\"")
}

/// Banner dimensions encoded in a document key, or `None` if the key is not
/// a valid archive entry name.
pub fn parse_document_key(key: &str) -> Option<SizeKey> {
    let caps = DOCUMENT_KEY.captures(key)?;
    Some(SizeKey::new(caps[1].parse().ok()?, caps[2].parse().ok()?))
}
