//! HTTP surface of the health check service.
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/api/targets` | Create a target |
//! | GET | `/api/targets` | List targets |
//! | GET | `/api/targets/:id` | Get a target |
//! | PUT | `/api/targets/:id` | Partially update a target |
//! | DELETE | `/api/targets/:id` | Delete a target |
//! | POST | `/api/targets/:id/check` | Check a target, `?force=true` bypasses the cache |
//! | GET | `/api/health/results` | Latest result per target |
//! | GET | `/api/health/summary` | Result counts per status |
//! | GET | `/health` | Liveness |

pub mod error;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use health_checker::HealthMonitor;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<HealthMonitor>,
}

pub fn build_router(monitor: Arc<HealthMonitor>) -> Router {
    let state = AppState { monitor };

    let api_routes = Router::new()
        .route(
            "/targets",
            get(handlers::list_targets).post(handlers::create_target),
        )
        .route(
            "/targets/:id",
            get(handlers::get_target)
                .put(handlers::update_target)
                .delete(handlers::delete_target),
        )
        .route("/targets/:id/check", post(handlers::check_target))
        .route("/health/results", get(handlers::last_results))
        .route("/health/summary", get(handlers::summary));

    Router::new()
        .route("/health", get(handlers::health_handler))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
