use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::repo::{NewSubmission, StoredSubmission, SubmissionsRepository};

struct Row {
    id: String,
    fields: Map<String, Value>,
    submitted_at: DateTime<Utc>,
}

/// In-memory adapter for the submissions port, used by `--mock` and tests.
#[derive(Default)]
pub struct InMemorySubmissions {
    rows: RwLock<Vec<Row>>,
}

impl InMemorySubmissions {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubmissionsRepository for InMemorySubmissions {
    async fn insert(&self, submission: NewSubmission) -> anyhow::Result<String> {
        let id = Uuid::new_v4().simple().to_string();

        let mut fields = submission.fields;
        fields.insert(
            "submittedAt".to_string(),
            Value::String(
                submission
                    .submitted_at
                    .to_rfc3339_opts(SecondsFormat::Micros, true),
            ),
        );

        self.rows.write().push(Row {
            id: id.clone(),
            fields,
            submitted_at: submission.submitted_at,
        });
        Ok(id)
    }

    async fn count(&self) -> anyhow::Result<u64> {
        Ok(self.rows.read().len() as u64)
    }

    async fn list_page(&self, offset: u64, limit: u32) -> anyhow::Result<Vec<StoredSubmission>> {
        let rows = self.rows.read();
        let mut ordered: Vec<&Row> = rows.iter().collect();
        // stable: equal timestamps keep insertion order
        ordered.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

        Ok(ordered
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
            .map(|row| StoredSubmission {
                id: row.id.clone(),
                fields: row.fields.clone(),
            })
            .collect())
    }
}
