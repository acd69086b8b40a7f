use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::service::SubmissionsPage;

/// REST DTO for a successful form submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitFormResponse {
    pub success: bool,
    pub id: String,
    pub message: String,
}

/// REST DTO for pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDto {
    pub total_count: u64,
    pub current_page: u32,
    pub total_pages: u64,
    pub limit: u32,
}

/// REST DTO for the submissions listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionsListResponse {
    pub success: bool,
    pub submissions: Vec<Value>,
    pub pagination: PaginationDto,
}

/// REST DTO for the health probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub firebase: String,
}

/// REST DTO for the failure envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl From<SubmissionsPage> for SubmissionsListResponse {
    fn from(page: SubmissionsPage) -> Self {
        let submissions = page
            .items
            .into_iter()
            .map(|stored| {
                // merge the assigned identifier in; it wins over any payload "id"
                let mut doc = stored.fields;
                doc.insert("id".to_string(), Value::String(stored.id));
                Value::Object(doc)
            })
            .collect();

        Self {
            success: true,
            submissions,
            pagination: PaginationDto {
                total_count: page.total_count,
                current_page: page.current_page,
                total_pages: page.total_pages,
                limit: page.limit,
            },
        }
    }
}
