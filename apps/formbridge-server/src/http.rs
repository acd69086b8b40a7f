use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
};

use form_submissions::domain::service::SubmissionsService;
use form_submissions::infra::gate::StoreGate;

use crate::request_id;

const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Assemble the full application router: module routes plus the
/// cross-cutting middleware stack.
pub fn build_router(service: Arc<SubmissionsService>, gate: Arc<StoreGate>) -> Router {
    let mut router = form_submissions::api::rest::routes::router(service, gate);

    let x_request_id = request_id::header();

    // If the client sent x-request-id, propagate it; otherwise generate one
    router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
    router = router.layer(SetRequestIdLayer::new(
        x_request_id,
        request_id::MakeReqId,
    ));

    // Trace with method/path/request_id
    router = router.layer(request_id::trace_layer());

    // CORS: all origins, the four verbs the deployment contract names
    router = router.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
    );

    // 10MB request body ceiling; axum's own extractor limit must be raised
    // to match, or it caps bodies at its 2MB default first
    router = router.layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES));
    router = router.layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES));

    router
}
