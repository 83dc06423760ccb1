//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Layers (outermost → innermost): CORS → request logging → 405 body
//! shaping → handler.
//! Caller identity is checked per handler by the `Caller` extractor, so
//! `/api/health` and `POST /api/users` simply do not ask for it.

use std::sync::Arc;

use axum::middleware::from_fn;
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints::{dashboard, dose_records, health, health_metrics, resources, users};
use crate::api::error::ApiError;
use crate::api::middleware::logging::log_access;
use crate::api::middleware::method::json_method_not_allowed;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;
use crate::db::Entity;
use crate::models::{DoseRecord, FamilyMember, HealthMetrics, HealthReport, Medication, User};

/// Build the API router over shared state.
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

/// `GET` list and `POST` create on `/api/<entities>`.
fn collection<E: Entity>() -> MethodRouter<ApiContext> {
    get(resources::list::<E>).post(resources::create::<E>)
}

/// `GET`, `PUT` and `DELETE` on `/api/<entities>/:id`.
fn item<E: Entity>() -> MethodRouter<ApiContext> {
    get(resources::detail::<E>)
        .put(resources::update::<E>)
        .delete(resources::remove::<E>)
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    // Static segments (`generate`, `latest`) win over `:id`.
    let api = Router::new()
        .route("/health", get(health::check))
        .route(
            "/users",
            get(resources::list::<User>).post(users::register),
        )
        .route("/users/:id", item::<User>())
        .route("/medications", collection::<Medication>())
        .route("/medications/:id", item::<Medication>())
        .route(
            "/dose-records",
            get(dose_records::list).post(resources::create::<DoseRecord>),
        )
        .route("/dose-records/generate", post(dose_records::generate))
        .route("/dose-records/:id", item::<DoseRecord>())
        .route("/dose-records/:id/take", post(dose_records::take))
        .route("/dose-records/:id/skip", post(dose_records::skip))
        .route("/health-reports", collection::<HealthReport>())
        .route("/health-reports/:id", item::<HealthReport>())
        .route("/health-metrics", collection::<HealthMetrics>())
        .route("/health-metrics/latest", get(health_metrics::latest))
        .route("/health-metrics/:id", item::<HealthMetrics>())
        .route("/family-members", collection::<FamilyMember>())
        .route("/family-members/:id", item::<FamilyMember>())
        .route("/dashboard/stats", get(dashboard::stats));

    Router::new()
        .nest("/api", api)
        .fallback(route_not_found)
        .layer(from_fn(json_method_not_allowed))
        .layer(from_fn(log_access))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".into())
}
