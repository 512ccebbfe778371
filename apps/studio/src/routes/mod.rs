pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::export::handlers as export;
use crate::state::AppState;
use crate::synthesis::handlers as banners;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/catalog", get(banners::handle_catalog))
        // Banner API
        .route(
            "/api/v1/banners/synthesize",
            post(banners::handle_synthesize),
        )
        .route("/api/v1/banners/preview", post(banners::handle_preview))
        .route("/api/v1/banners/batch", post(banners::handle_batch))
        // Export API
        .route("/api/v1/export/html5", post(export::handle_export_html5))
        .route("/api/v1/export/static", post(export::handle_export_static))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use bytes::Bytes;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::export::rasterizer::{RasterJob, RasterizeError, Rasterizer, UnconfiguredRasterizer};

    struct StubRasterizer;

    #[async_trait]
    impl Rasterizer for StubRasterizer {
        async fn rasterize(&self, job: &RasterJob) -> Result<Bytes, RasterizeError> {
            assert!(job.documents.iter().all(|d| !d.html.contains("@keyframes")));
            Ok(Bytes::from_static(b"PK-static"))
        }
    }

    fn app_with(rasterizer: Arc<dyn Rasterizer>) -> Router {
        build_router(AppState {
            config: Config {
                max_batch_items: 4,
                ..Config::default()
            },
            rasterizer,
        })
    }

    fn app() -> Router {
        app_with(Arc::new(UnconfiguredRasterizer))
    }

    fn creative() -> Value {
        json!({
            "width": 300,
            "height": 250,
            "headline": "Escolha seu limite",
            "sub": "Crédito rápido e sem taxas",
            "ctaLabel": "Simule agora",
            "mode": "limite",
            "optionLabels": ["R$600", "R$1200", "Outro valor"],
            "palette": {"primary": "#2563EB", "secondary": "#1E40AF", "background": "#FFFFFF"},
            "destinationUrl": "https://example.com"
        })
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn disposition(response: &Response) -> String {
        response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string()
    }

    // ── health / catalog ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_catalog_lists_sizes_and_presets() {
        let response = app()
            .oneshot(Request::get("/api/v1/catalog").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["sizes"].as_array().unwrap().len(), 11);
        assert_eq!(body["sizes"][0]["size"], "300x250");
        assert!(body["sizes"]
            .as_array()
            .unwrap()
            .iter()
            .any(|s| s["size"] == "336x280"));
        assert_eq!(body["palettes"].as_array().unwrap().len(), 6);
        assert_eq!(body["base_palettes"].as_array().unwrap().len(), 5);
        assert_eq!(body["base_palettes"][2]["textOnPrimary"], "#111");
    }

    // ── banners ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_synthesize_returns_document() {
        let response = post_json(app(), "/api/v1/banners/synthesize", creative()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["size_key"], "300x250");
        let html = body["html"].as_str().unwrap();
        assert!(html.contains("window.clickTag = \"https://example.com\";"));
    }

    #[tokio::test]
    async fn test_synthesize_without_destination_is_400() {
        let mut config = creative();
        config["destinationUrl"] = json!("");
        let response = post_json(app(), "/api/v1/banners/synthesize", config).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_synthesize_with_script_destination_is_400() {
        let mut config = creative();
        config["destinationUrl"] = json!("javascript:alert(document.cookie)");
        let response = post_json(app(), "/api/v1/banners/synthesize", config).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_preview_tolerates_missing_destination() {
        let mut config = creative();
        config["destinationUrl"] = json!("");
        let response = post_json(app(), "/api/v1/banners/preview", config).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_batch_returns_one_document_per_combination() {
        let request = json!({
            "sizes": ["300x250", "728x90"],
            "palettes": [
                {"primary": "#2563EB", "secondary": "#1E40AF", "background": "#FFFFFF"},
                {"primary": "#16A34A", "secondary": "#15803D", "background": "#F0FDF4"}
            ],
            "base": creative(),
            "size_overrides": {"728x90": {"compactCta": true}}
        });
        let response = post_json(app(), "/api/v1/banners/batch", request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let documents = json_body(response).await["documents"].clone();
        let keys: Vec<&String> = documents.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec!["300x250-v1", "300x250-v2", "728x90-v1", "728x90-v2"]
        );
    }

    #[tokio::test]
    async fn test_batch_over_limit_is_rejected() {
        let request = json!({
            "sizes": ["300x250", "728x90", "320x50"],
            "palettes": [
                {"primary": "#2563EB", "secondary": "#1E40AF", "background": "#FFFFFF"},
                {"primary": "#16A34A", "secondary": "#15803D", "background": "#F0FDF4"}
            ],
            "base": creative()
        });
        let response = post_json(app(), "/api/v1/banners/batch", request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_batch_with_bad_palette_fails_whole_request() {
        let request = json!({
            "sizes": ["300x250"],
            "palettes": [{"primary": "nope", "secondary": "#1E40AF", "background": "#FFFFFF"}],
            "base": creative()
        });
        let response = post_json(app(), "/api/v1/banners/batch", request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let message = json_body(response).await["error"]["message"].clone();
        assert!(message.as_str().unwrap().contains("300x250"));
    }

    // ── export ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_export_html5_returns_zip() {
        let request = json!({"documents": {"300x250": "<!DOCTYPE html>"}});
        let response = post_json(app(), "/api/v1/export/html5", request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
        assert!(disposition(&response).starts_with("attachment; filename=\"banners-html5-"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.to_vec())).unwrap();
        assert!(archive.file_names().any(|n| n == "300x250/index.html"));
    }

    #[tokio::test]
    async fn test_export_html5_rejects_unsafe_key() {
        let request = json!({"documents": {"../etc": "<!DOCTYPE html>"}});
        let response = post_json(app(), "/api/v1/export/html5", request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_static_uses_rasterizer() {
        let request = json!({
            "documents": {"300x250": "<style>@keyframes f{0%{opacity:0}}</style>"}
        });
        let response = post_json(
            app_with(Arc::new(StubRasterizer)),
            "/api/v1/export/static",
            request,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(disposition(&response).contains("banners-static-"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"PK-static");
    }

    #[tokio::test]
    async fn test_export_static_falls_back_to_html5() {
        let request = json!({"documents": {"728x90-v1": "<!DOCTYPE html>"}, "quality": 0.8});
        let response = post_json(app(), "/api/v1/export/static", request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(disposition(&response).contains("banners-html5-"));
    }

    #[tokio::test]
    async fn test_export_static_rejects_bad_background() {
        let request = json!({"documents": {"300x250": "x"}, "background": "white"});
        let response = post_json(app(), "/api/v1/export/static", request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
