//! Rasterizer: the remote collaborator that turns HTML banners into a JPEG archive.
//!
//! The service receives every document with animations disabled so the capture
//! shows the final frame, and answers with a zip holding one `{key}.jpg` per
//! document. All failures are reported to the caller, which decides on fallback.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::export::naming::parse_document_key;
use crate::synthesis::color::Rgb;

const MAX_RETRIES: u32 = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;

static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)(<style>)(.*?)(</style>)").expect("valid style block regex"));

static ANIMATION_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"animation:[^;}]+").expect("valid animation regex"));

/// One nesting level: `@keyframes name{stop{...}stop{...}}`.
static KEYFRAMES_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@keyframes[^{]*\{(?:[^{}]*\{[^{}]*\})*[^{}]*\}\n?").expect("valid keyframes regex")
});

#[derive(Debug, Error)]
pub enum RasterizeError {
    #[error("No rasterization service configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rasterizer error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Document key {0:?} does not encode banner dimensions")]
    InvalidKey(String),

    #[error("Rasterizer returned an empty archive")]
    EmptyArchive,
}

#[derive(Debug, Clone, Serialize)]
pub struct RasterDocument {
    pub key: String,
    pub width: u32,
    pub height: u32,
    pub html: String,
}

/// Wire body sent to the rasterization service.
#[derive(Debug, Clone, Serialize)]
pub struct RasterJob {
    pub documents: Vec<RasterDocument>,
    /// Page background behind transparent banners, `#rrggbb`.
    pub background: String,
    /// JPEG quality in percent.
    pub quality: u8,
    pub format: &'static str,
}

impl RasterJob {
    /// Builds the job from batch output. `quality` is a 0..=1 fraction.
    pub fn new(
        documents: &BTreeMap<String, String>,
        background: Rgb,
        quality: f32,
    ) -> Result<Self, RasterizeError> {
        let documents = documents
            .iter()
            .map(|(key, html)| {
                let size =
                    parse_document_key(key).ok_or_else(|| RasterizeError::InvalidKey(key.clone()))?;
                Ok(RasterDocument {
                    key: key.clone(),
                    width: size.width,
                    height: size.height,
                    html: disable_animations(html),
                })
            })
            .collect::<Result<Vec<_>, RasterizeError>>()?;

        Ok(Self {
            documents,
            background: background.to_hex(),
            quality: (quality.clamp(0.0, 1.0) * 100.0).round() as u8,
            format: "jpeg",
        })
    }
}

/// Sets every `animation:` declaration to `none` and drops `@keyframes`
/// blocks, inside `<style>` elements only.
pub fn disable_animations(html: &str) -> String {
    STYLE_BLOCK
        .replace_all(html, |caps: &regex::Captures| {
            let css = ANIMATION_DECL.replace_all(&caps[2], "animation:none");
            let css = KEYFRAMES_BLOCK.replace_all(&css, "");
            format!("{}{}{}", &caps[1], css, &caps[3])
        })
        .into_owned()
}

#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Returns the raster archive bytes for `job`.
    async fn rasterize(&self, job: &RasterJob) -> Result<Bytes, RasterizeError>;
}

/// Used when no `RASTERIZER_URL` is configured. Always fails, so static export
/// falls back to the HTML archive.
pub struct UnconfiguredRasterizer;

#[async_trait]
impl Rasterizer for UnconfiguredRasterizer {
    async fn rasterize(&self, _job: &RasterJob) -> Result<Bytes, RasterizeError> {
        Err(RasterizeError::NotConfigured)
    }
}

/// HTTP client for the rasterization service.
/// Retries on 429 and 5xx with exponential backoff.
#[derive(Clone)]
pub struct RemoteRasterizer {
    client: Client,
    endpoint: String,
}

impl RemoteRasterizer {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, RasterizeError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint,
        })
    }
}

#[async_trait]
impl Rasterizer for RemoteRasterizer {
    async fn rasterize(&self, job: &RasterJob) -> Result<Bytes, RasterizeError> {
        let mut last_error: Option<RasterizeError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // 500ms, 1s
                let delay = Duration::from_millis(RETRY_BASE_DELAY_MS * (1 << (attempt - 1)));
                warn!(
                    "Rasterizer attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.post(&self.endpoint).json(job).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(RasterizeError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Rasterizer returned {}: {}", status, body);
                last_error = Some(RasterizeError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                return Err(RasterizeError::Api {
                    status: status.as_u16(),
                    message: response.text().await.unwrap_or_default(),
                });
            }

            let archive = response.bytes().await?;
            if archive.is_empty() {
                return Err(RasterizeError::EmptyArchive);
            }

            debug!(
                "Rasterized {} documents into {} bytes",
                job.documents.len(),
                archive.len()
            );
            return Ok(archive);
        }

        Err(last_error.unwrap_or(RasterizeError::EmptyArchive))
    }
}
