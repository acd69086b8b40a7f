use async_trait::async_trait;
use chrono::SecondsFormat;
use serde_json::json;

use super::client::FirestoreClient;
use super::value::{decode_fields, encode_fields};
use crate::domain::repo::{NewSubmission, StoredSubmission, SubmissionsRepository};

/// Firestore-backed adapter for the submissions port.
pub struct FirestoreSubmissions {
    client: FirestoreClient,
    collection: String,
}

impl FirestoreSubmissions {
    pub fn new(client: FirestoreClient, collection: String) -> Self {
        Self { client, collection }
    }
}

#[async_trait]
impl SubmissionsRepository for FirestoreSubmissions {
    async fn insert(&self, submission: NewSubmission) -> anyhow::Result<String> {
        let mut fields = encode_fields(&submission.fields);
        // stored as a real timestamp so store-side ordering is by time
        fields.insert(
            "submittedAt".to_string(),
            json!({
                "timestampValue": submission
                    .submitted_at
                    .to_rfc3339_opts(SecondsFormat::Micros, true)
            }),
        );

        let id = self.client.create_document(&self.collection, fields).await?;
        Ok(id)
    }

    async fn count(&self) -> anyhow::Result<u64> {
        Ok(self.client.count_documents(&self.collection).await?)
    }

    async fn list_page(&self, offset: u64, limit: u32) -> anyhow::Result<Vec<StoredSubmission>> {
        let documents = self.client.run_query(&self.collection, offset, limit).await?;
        Ok(documents
            .into_iter()
            .map(|(id, fields)| StoredSubmission {
                id,
                fields: decode_fields(&fields),
            })
            .collect())
    }
}
