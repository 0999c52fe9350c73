//! Transport-level HTTP middleware applied to the whole router.
//!
//! Ordering is outer-to-inner: the first layer listed processes the request
//! first and the response last.

use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use routekit_core::HttpMethod;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::NetworkConfig;

/// Wraps `router` with the transport stack:
///
/// 1. `SetRequestId`: assigns a UUID v4 `X-Request-Id` to every request
/// 2. `Tracing`: request/response spans
/// 3. `CORS`: configured origins, every HTTP method
/// 4. `Timeout`: 408 once `request_timeout` elapses
/// 5. `PropagateRequestId`: copies `X-Request-Id` onto the response
#[must_use]
pub fn apply_http_layers<S>(router: Router<S>, config: &NetworkConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let x_request_id = HeaderName::from_static("x-request-id");

    let layers = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&config.cors_origins))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(PropagateRequestIdLayer::new(x_request_id));

    router.layer(layers)
}

/// Builds the CORS layer. A `"*"` entry allows any origin; otherwise each
/// parseable origin is allow-listed.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| o.parse().ok()))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(HttpMethod::ALL.map(http_method).to_vec())
        .allow_headers(Any)
}

/// Maps a method onto the `http` crate's method constant.
#[must_use]
pub fn http_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
        HttpMethod::Trace => Method::TRACE,
        HttpMethod::Connect => Method::CONNECT,
    }
}
