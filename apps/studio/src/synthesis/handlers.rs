//! Axum route handlers for the Banner API.

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;
use crate::synthesis::batch::{batch_item_count, generate_batch, SizeOverrides};
use crate::synthesis::color::{PalettePreset, BASE_PALETTES, PALETTE_PRESETS};
use crate::synthesis::creative::{CreativeConfig, Palette, SizeKey};
use crate::synthesis::synthesizer::{synthesize, synthesize_preview, GeneratedDocument};
use crate::synthesis::typography::{StandardSize, STANDARD_SIZES};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub sizes: &'static [StandardSize],
    pub palettes: &'static [PalettePreset],
    /// Batch color variants with a fixed foreground on `primary`.
    pub base_palettes: &'static [PalettePreset],
}

#[derive(Debug, Serialize)]
pub struct SynthesizeResponse {
    pub size_key: SizeKey,
    pub html: String,
}

impl From<GeneratedDocument> for SynthesizeResponse {
    fn from(document: GeneratedDocument) -> Self {
        Self {
            size_key: document.size,
            html: document.html,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub sizes: Vec<SizeKey>,
    #[serde(default)]
    pub palettes: Vec<Palette>,
    pub base: CreativeConfig,
    #[serde(default)]
    pub size_overrides: SizeOverrides,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    /// Batch key → HTML text, ready for the export endpoints.
    pub documents: BTreeMap<String, String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/catalog
///
/// Standard banner sizes, palette presets and batch base palettes offered by
/// the configuration UI.
pub async fn handle_catalog() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        sizes: &STANDARD_SIZES,
        palettes: &PALETTE_PRESETS,
        base_palettes: &BASE_PALETTES,
    })
}

/// POST /api/v1/banners/synthesize
pub async fn handle_synthesize(
    Json(config): Json<CreativeConfig>,
) -> Result<Json<SynthesizeResponse>, AppError> {
    let document = synthesize(&config)?;
    Ok(Json(document.into()))
}

/// POST /api/v1/banners/preview
///
/// Same as synthesize, but tolerates an empty destination by substituting an
/// inert placeholder. Output from here must not be exported.
pub async fn handle_preview(
    Json(config): Json<CreativeConfig>,
) -> Result<Json<SynthesizeResponse>, AppError> {
    let document = synthesize_preview(&config)?;
    Ok(Json(document.into()))
}

/// POST /api/v1/banners/batch
///
/// Synthesizes every (size, palette) combination. Any failing combination
/// fails the whole request.
pub async fn handle_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, AppError> {
    if request.sizes.is_empty() {
        return Err(AppError::Validation("sizes cannot be empty".to_string()));
    }

    let items = batch_item_count(&request.sizes, &request.palettes);
    let limit = state.config.max_batch_items;
    if items > limit {
        return Err(AppError::Validation(format!(
            "Batch of {items} documents exceeds the limit of {limit}"
        )));
    }

    let result = tokio::task::spawn_blocking(move || {
        generate_batch(
            &request.sizes,
            &request.palettes,
            &request.base,
            &request.size_overrides,
        )
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Batch task failed: {e}")))??;

    info!("Batch request produced {} documents", result.len());

    Ok(Json(BatchResponse {
        documents: result
            .into_iter()
            .map(|(key, document)| (key, document.html))
            .collect(),
    }))
}
