use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// A submission about to be written: the caller payload merged with the
/// server-assigned metadata fields, plus the write timestamp kept typed so
/// adapters can store it as a real timestamp.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub fields: Map<String, Value>,
    pub submitted_at: DateTime<Utc>,
}

/// A stored submission as read back from the store. `fields` includes
/// `submittedAt` rendered as an RFC 3339 string.
#[derive(Debug, Clone)]
pub struct StoredSubmission {
    pub id: String,
    pub fields: Map<String, Value>,
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait SubmissionsRepository: Send + Sync {
    /// Write one document; returns the store-assigned id.
    async fn insert(&self, submission: NewSubmission) -> anyhow::Result<String>;

    /// Total number of documents in the collection.
    async fn count(&self) -> anyhow::Result<u64>;

    /// Up to `limit` documents ordered by submission time descending,
    /// skipping the first `offset`.
    async fn list_page(&self, offset: u64, limit: u32) -> anyhow::Result<Vec<StoredSubmission>>;
}
