use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use panora_api::config::{GatewayConfig, ServerConfig};
use panora_api::routes;
use panora_api::state::AppState;
use panora_core::catalog::Product;
use panora_core::config::GenerationConfig;
use panora_core::conversation::ChatMessage;
use panora_core::image::{ImageRef, PanoramaImage};
use panora_core::segmenting::Segment;
use panora_pipeline::{FurnitureMatching, SceneOrchestrator, SceneStages, StageError};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        generation_budget_secs: 300,
        gateway: GatewayConfig {
            base_url: "http://gateway.test".to_string(),
            api_token: String::new(),
        },
        vector_index: None,
    }
}

/// Happy-path stage double: description and panorama succeed, segmentation
/// finds nothing, upscaling succeeds. `fail_panorama` turns every panorama
/// call into a non-recoverable failure.
pub struct ScriptedStages {
    pub fail_panorama: bool,
}

impl ScriptedStages {
    pub fn happy() -> Self {
        Self {
            fail_panorama: false,
        }
    }

    pub fn panorama_down() -> Self {
        Self {
            fail_panorama: true,
        }
    }
}

#[async_trait]
impl SceneStages for ScriptedStages {
    async fn describe_room(&self, _messages: &[ChatMessage]) -> Result<String, StageError> {
        Ok("a cozy reading nook with warm oak shelves".to_string())
    }

    async fn generate_panorama(
        &self,
        _description: &str,
        _config: &GenerationConfig,
    ) -> Result<PanoramaImage, StageError> {
        if self.fail_panorama {
            return Err(StageError::new(
                panora_adapters::error::ErrorKind::Service,
                "gateway error (500): render failed",
            ));
        }
        Ok(PanoramaImage {
            durable: ImageRef::new("https://cdn.test/base.png"),
            working: ImageRef::new("https://tmp.test/work.png"),
        })
    }

    async fn segment(&self, _image: &ImageRef) -> Result<Vec<Segment>, StageError> {
        Ok(Vec::new())
    }

    async fn filter_catalogable(
        &self,
        _segments: &[Segment],
        _image: &ImageRef,
    ) -> Result<Vec<String>, StageError> {
        Ok(Vec::new())
    }

    async fn embed_segment(&self, _segment: &Segment) -> Result<Vec<f32>, StageError> {
        Ok(vec![0.0])
    }

    async fn inject_products(
        &self,
        image: &ImageRef,
        _products: &[Product],
    ) -> Result<ImageRef, StageError> {
        Ok(image.clone())
    }

    async fn upscale(&self, _image: &ImageRef) -> Result<ImageRef, StageError> {
        Ok(ImageRef::new("https://cdn.test/upscaled.png"))
    }
}

/// Build the full application router with all middleware layers, using the
/// given stage implementation.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(stages: Arc<dyn SceneStages>) -> Router {
    let config = test_config();
    let orchestrator = Arc::new(SceneOrchestrator::new(stages, FurnitureMatching::Unavailable));

    let state = AppState {
        config: Arc::new(config),
        orchestrator,
        product_search: None,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

/// Issue a GET request against the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Issue a POST request with a JSON body against the app.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body into parsed JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect an SSE response body and parse every `data:` frame as JSON.
pub async fn sse_frames(response: Response<Body>) -> Vec<serde_json::Value> {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    text.split("\n\n")
        .flat_map(|chunk| chunk.lines())
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).expect("SSE data frame must be JSON"))
        .collect()
}
