use std::sync::Arc;

use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::warn;

pub mod pipeline;
pub mod rest;

pub use pipeline::{Verifier, VerifyError};

pub struct AppState {
    pub verifier: Verifier,
}

/// Build the HTTP surface. `allowed_origins` of `None` opens CORS to any
/// origin on every route; a list restricts `/api/*` to those origins.
pub fn router(state: Arc<AppState>, allowed_origins: Option<Vec<String>>) -> Router {
    let mut api = Router::new()
        .route("/analyze_text", post(rest::api_analyze_text))
        .route("/predict_text", post(rest::api_predict_text))
        .route("/predict_url", post(rest::api_predict_url));

    if let Some(origins) = &allowed_origins {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        api = api.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    let mut app = Router::new()
        .route("/", get(rest::health))
        .nest("/api", api)
        .with_state(state);

    if allowed_origins.is_none() {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    app
        // Verdicts are per-request; never cache them
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Logging layer: method + path + status + latency only (no bodies)
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
