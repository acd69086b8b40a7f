use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::domain::error::DomainError;
use crate::domain::pagination::{total_pages, PageRequest};
use crate::domain::repo::{NewSubmission, StoredSubmission};
use crate::domain::validate::validate_submission;
use crate::infra::gate::StoreGate;

/// Caller metadata captured at the HTTP boundary.
#[derive(Debug, Clone)]
pub struct CallerMeta {
    pub ip_address: String,
    pub user_agent: String,
}

/// One page of submissions with its count metadata.
#[derive(Debug)]
pub struct SubmissionsPage {
    pub items: Vec<StoredSubmission>,
    pub total_count: u64,
    pub current_page: u32,
    pub total_pages: u64,
    pub limit: u32,
}

/// Domain service for the intake and reader operations.
/// Depends only on the store gate and the repository port behind it.
#[derive(Clone)]
pub struct SubmissionsService {
    gate: Arc<StoreGate>,
}

impl SubmissionsService {
    pub fn new(gate: Arc<StoreGate>) -> Self {
        Self { gate }
    }

    /// Validate and persist one submission, enriched with the server-assigned
    /// timestamp and caller metadata. Returns the store-assigned id.
    #[instrument(
        name = "form_submissions.service.submit",
        skip(self, payload),
        fields(ip = %meta.ip_address)
    )]
    pub async fn submit(
        &self,
        payload: Map<String, Value>,
        meta: CallerMeta,
    ) -> Result<String, DomainError> {
        let repo = self
            .gate
            .ensure_ready()
            .await
            .map_err(|e| DomainError::initialization(e.to_string()))?;

        validate_submission(&payload)?;

        // Shallow copy of the payload; server-assigned fields win on collision.
        let mut fields = payload;
        fields.insert("ipAddress".to_string(), Value::String(meta.ip_address));
        fields.insert("userAgent".to_string(), Value::String(meta.user_agent));

        let id = repo
            .insert(NewSubmission {
                fields,
                submitted_at: Utc::now(),
            })
            .await
            .map_err(|e| DomainError::store(e.to_string()))?;

        info!(%id, "form submission stored");
        Ok(id)
    }

    /// One page of submissions, newest first, with total-count metadata.
    #[instrument(name = "form_submissions.service.list", skip(self))]
    pub async fn list(&self, page: PageRequest) -> Result<SubmissionsPage, DomainError> {
        let repo = self
            .gate
            .ensure_ready()
            .await
            .map_err(|e| DomainError::initialization(e.to_string()))?;

        let total_count = repo
            .count()
            .await
            .map_err(|e| DomainError::store(e.to_string()))?;

        let items = repo
            .list_page(page.offset(), page.limit)
            .await
            .map_err(|e| DomainError::store(e.to_string()))?;

        debug!(total_count, returned = items.len(), "listed submissions");

        Ok(SubmissionsPage {
            items,
            total_count,
            current_page: page.page,
            total_pages: total_pages(total_count, page.limit),
            limit: page.limit,
        })
    }
}
