//! HTTP middleware placed in front of the compiled routes.
//!
//! Layers run outermost first: request id, trace, compression, CORS, the
//! request-body cap, the timeout, then request-id propagation.
//!
//! Two body limits apply. The request-body cap (`max_request_bytes`) turns
//! away larger requests with a plain 413 before any route runs. Bodies under
//! the cap reach the binder, whose smaller JSON limit answers with the
//! structured `PayloadTooLarge` error instead.

use axum::body::Body;
use axum::extract::Request;
use axum::http::header::{HeaderName, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, Response, StatusCode};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info_span, warn, Span};

use super::config::NetworkConfig;

/// Header carrying the per-request id, assigned when the caller sent none.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Wraps `router` in the HTTP middleware stack configured by `config`.
#[must_use]
pub fn with_http_layers(router: Router, config: &NetworkConfig) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(CompressionLayer::new())
            .layer(cors_layer(&config.cors_origins))
            .map_response(|response: Response<_>| response.map(Body::new))
            .layer(RequestBodyLimitLayer::new(config.max_request_bytes))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                config.request_timeout,
            ))
            .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER)),
    )
}

/// Span for one HTTP exchange, tagged with the id set by the outer layer.
fn request_span(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    info_span!(
        "http",
        method = %request.method(),
        uri = %request.uri(),
        request_id,
    )
}

/// Compiled routes only answer GET and POST, so preflights advertise just those.
/// `"*"` allows any origin; unparsable origins are dropped with a warning.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, REQUEST_ID_HEADER])
        .expose_headers([REQUEST_ID_HEADER])
}
