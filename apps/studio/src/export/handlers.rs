//! Axum route handlers for the Export API.

use std::collections::BTreeMap;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::export::archive::{build_html_archive, validate_keys};
use crate::export::naming::{archive_filename, content_disposition, ExportKind};
use crate::export::rasterizer::RasterJob;
use crate::state::AppState;
use crate::synthesis::color::Rgb;

const DEFAULT_BACKGROUND: &str = "#FFFFFF";
const DEFAULT_QUALITY: f32 = 0.92;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HtmlExportRequest {
    /// Batch key → HTML text.
    pub documents: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct StaticExportRequest {
    pub documents: BTreeMap<String, String>,
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_quality")]
    pub quality: f32,
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}

fn default_quality() -> f32 {
    DEFAULT_QUALITY
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/export/html5
///
/// Packages the documents as an HTML5 archive, one folder per key.
pub async fn handle_export_html5(
    Json(request): Json<HtmlExportRequest>,
) -> Result<Response, AppError> {
    html5_archive_response(&request.documents)
}

/// POST /api/v1/export/static
///
/// Asks the rasterizer for a JPEG archive. Any rasterizer failure degrades to
/// the HTML5 archive; it is never surfaced as an error.
pub async fn handle_export_static(
    State(state): State<AppState>,
    Json(request): Json<StaticExportRequest>,
) -> Result<Response, AppError> {
    validate_keys(&request.documents)?;

    let background = Rgb::parse_hex(&request.background)
        .map_err(|e| AppError::Validation(format!("background: {e}")))?;
    if !(request.quality > 0.0 && request.quality <= 1.0) {
        return Err(AppError::Validation(format!(
            "quality must be in (0, 1], got {}",
            request.quality
        )));
    }

    let rasterized = match RasterJob::new(&request.documents, background, request.quality) {
        Ok(job) => state.rasterizer.rasterize(&job).await,
        Err(e) => Err(e),
    };

    match rasterized {
        Ok(archive) => {
            info!(
                "Static export: {} documents rasterized",
                request.documents.len()
            );
            Ok(zip_response(ExportKind::Static, archive))
        }
        Err(e) => {
            warn!("Rasterization failed, falling back to HTML5 archive: {e}");
            html5_archive_response(&request.documents)
        }
    }
}

fn html5_archive_response(documents: &BTreeMap<String, String>) -> Result<Response, AppError> {
    let archive = build_html_archive(documents)?;
    info!("HTML5 export: {} documents packaged", documents.len());
    Ok(zip_response(ExportKind::Html5, Bytes::from(archive)))
}

fn zip_response(kind: ExportKind, archive: Bytes) -> Response {
    let filename = archive_filename(kind, Utc::now());
    (
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&filename)),
        ],
        archive,
    )
        .into_response()
}
