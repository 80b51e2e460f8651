use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::GameError;
pub use services::AppState;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    // The game front-end is served from another origin
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest(
            "/api/v1",
            api_routes()
                .layer(middleware::from_fn(
                    middlewares::trace::trace_context_middleware,
                ))
                .layer(cors),
        )
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(
                    middlewares::metrics::metrics_middleware,
                )),
        )
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/levels", levels_routes())
        .nest("/players", players_routes())
        .nest("/sessions", sessions_routes())
        .route("/problems", post(handlers::problems::generate_problem))
        .route("/difficulty", post(handlers::difficulty::advise_difficulty))
}

fn levels_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::levels::list_levels))
        .route("/{level_id}", get(handlers::levels::get_level))
}

fn players_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/{player}/progress",
            get(handlers::progress::get_progress).delete(handlers::progress::reset_progress),
        )
        .route(
            "/{player}/levels/{level_id}/stars",
            post(handlers::progress::add_star),
        )
        .route(
            "/{player}/levels/{level_id}/reset",
            post(handlers::progress::reset_level_stars),
        )
        .route(
            "/{player}/levels/{level_id}/complete",
            post(handlers::progress::complete_level),
        )
}

fn sessions_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(handlers::sessions::create_session))
        .route("/{id}", get(handlers::sessions::get_session))
        .route("/{id}/answers", post(handlers::sessions::submit_answer))
}
