use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::service::SubmissionsService;
use crate::infra::gate::StoreGate;

/// Build the module router. Cross-cutting middleware (request-id, trace,
/// CORS, body limit) is layered on by the hosting binary.
pub fn router(service: Arc<SubmissionsService>, gate: Arc<StoreGate>) -> Router {
    Router::new()
        .route("/submit-form", post(handlers::submit_form))
        .route("/form-submissions", get(handlers::list_submissions))
        .route("/health", get(handlers::health))
        .layer(Extension(service))
        .layer(Extension(gate))
}
