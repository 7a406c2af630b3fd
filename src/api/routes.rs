use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowMethods, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Catalog
    let photos: Router<Arc<AppState>> = Router::new()
        .route(
            "/api/photos",
            get(handlers::list_photos).fallback(handlers::method_not_allowed),
        )
        .layer(cache_control("s-maxage=3600, stale-while-revalidate"))
        .layer(allow_methods("GET, OPTIONS"))
        .layer(cors([Method::GET, Method::OPTIONS]));

    // Likes
    let likes: Router<Arc<AppState>> = Router::new()
        .route(
            "/api/like",
            get(handlers::like_status)
                .post(handlers::like)
                .delete(handlers::unlike)
                .fallback(handlers::method_not_allowed),
        )
        .layer(allow_methods("GET, POST, DELETE, OPTIONS"))
        .layer(cors([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ]));

    // Statistics
    let analytics: Router<Arc<AppState>> = Router::new()
        .route(
            "/api/analytics",
            get(handlers::analytics).fallback(handlers::method_not_allowed),
        )
        .layer(cache_control("s-maxage=60, stale-while-revalidate"))
        .layer(allow_methods("GET, OPTIONS"))
        .layer(cors([Method::GET, Method::OPTIONS]));

    Router::new()
        .merge(photos)
        .merge(likes)
        .merge(analytics)
        // Local catalog content
        .route("/photos/*name", get(handlers::serve_photo))
        // Internal
        .route("/_internal/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors(methods: impl Into<AllowMethods>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(methods)
        .allow_headers([header::CONTENT_TYPE])
}

/// `CorsLayer` only answers preflights with the allowed methods; every other
/// response of the resource carries them too.
fn allow_methods(value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(value),
    )
}

fn cache_control(value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(header::CACHE_CONTROL, HeaderValue::from_static(value))
}
