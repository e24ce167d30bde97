use axum::{
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::Config,
    middleware::logging,
    routes::{health, recent},
    state::AppState,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        recent::get_recent,
        recent::post_recent,
        recent::patch_recent,
    ),
    components(schemas(
        health::HealthResponse,
        recent::RecentChatsResponse,
        recent::BatchUpdateRequest,
        recent::BatchUpdateResponse,
        recent::ClearUnreadRequest,
        recent::SuccessResponse,
    )),
    tags(
        (name = "recent", description = "Recent conversation summaries"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn build_router(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Recent conversations, dispatched on method and `action`
        .route(
            "/api/recent",
            get(recent::get_recent)
                .post(recent::post_recent)
                .patch(recent::patch_recent),
        );

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PATCH,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors.allow_origin(Any)
        } else {
            let parsed_origins: Vec<axum::http::HeaderValue> = config.cors.origins
                .iter()
                .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok())
                .collect();

            cors.allow_origin(parsed_origins)
        }
    } else {
        CorsLayer::permissive()
    }
}
