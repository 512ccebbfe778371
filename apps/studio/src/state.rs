use std::sync::Arc;

use crate::config::Config;
use crate::export::rasterizer::Rasterizer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Remote rasterizer for static export. `UnconfiguredRasterizer` when no endpoint is set.
    pub rasterizer: Arc<dyn Rasterizer>,
}
