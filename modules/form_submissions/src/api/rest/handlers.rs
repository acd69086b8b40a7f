use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Query},
    http::{header, HeaderMap},
    response::Json,
    Extension,
};
use serde_json::{Map, Value};
use tracing::{error, info};

use crate::api::rest::dto::{HealthResponse, SubmitFormResponse, SubmissionsListResponse};
use crate::api::rest::error::ApiError;
use crate::domain::pagination::PageRequest;
use crate::domain::service::{CallerMeta, SubmissionsService};
use crate::infra::gate::StoreGate;

/// Accept one form submission
pub async fn submit_form(
    Extension(svc): Extension<Arc<SubmissionsService>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<SubmitFormResponse>, ApiError> {
    info!(fields = payload.len(), "received form submission");

    let meta = CallerMeta {
        ip_address: addr.ip().to_string(),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string(),
    };

    match svc.submit(payload, meta).await {
        Ok(id) => Ok(Json(SubmitFormResponse {
            success: true,
            id,
            message: "Form submitted successfully".to_string(),
        })),
        Err(e) => {
            error!(error = %e, "failed to submit form");
            Err(ApiError::from(e))
        }
    }
}

/// List stored submissions, newest first, with pagination metadata
pub async fn list_submissions(
    Extension(svc): Extension<Arc<SubmissionsService>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<SubmissionsListResponse>, ApiError> {
    let page = PageRequest::from_query(
        params.get("page").map(String::as_str),
        params.get("limit").map(String::as_str),
    )
    .map_err(ApiError::from)?;

    match svc.list(page).await {
        Ok(result) => Ok(Json(SubmissionsListResponse::from(result))),
        Err(e) => {
            error!(error = %e, "failed to list submissions");
            Err(ApiError::from(e))
        }
    }
}

/// Health probe; never errors
pub async fn health(Extension(gate): Extension<Arc<StoreGate>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        firebase: if gate.is_ready() {
            "Initialized".to_string()
        } else {
            "Not initialized".to_string()
        },
    })
}
