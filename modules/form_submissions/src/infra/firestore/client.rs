use serde_json::{json, Map, Value};
use tracing::debug;

use super::credentials::ServiceAccount;
use super::token::TokenProvider;
use super::FirestoreError;
use runtime::StoreConfig;

const PROD_API_BASE: &str = "https://firestore.googleapis.com/v1";

// The emulator accepts this static bearer and skips real auth.
const EMULATOR_TOKEN: &str = "owner";

enum Auth {
    Oauth(TokenProvider),
    Static(String),
}

/// Thin client over the Firestore REST v1 surface, scoped to one database.
pub struct FirestoreClient {
    http: reqwest::Client,
    auth: Auth,
    documents_root: String,
}

impl FirestoreClient {
    pub fn new(account: &ServiceAccount, config: &StoreConfig) -> Self {
        let (base, auth) = match &config.emulator_host {
            Some(host) => (
                format!("http://{host}/v1"),
                Auth::Static(EMULATOR_TOKEN.to_string()),
            ),
            None => (
                PROD_API_BASE.to_string(),
                Auth::Oauth(TokenProvider::new(account)),
            ),
        };

        Self {
            http: reqwest::Client::new(),
            auth,
            documents_root: format!(
                "{base}/projects/{}/databases/(default)/documents",
                account.project_id
            ),
        }
    }

    async fn bearer(&self) -> Result<String, FirestoreError> {
        match &self.auth {
            Auth::Oauth(provider) => provider.bearer().await,
            Auth::Static(token) => Ok(token.clone()),
        }
    }

    /// Create one document with already-encoded fields; returns the
    /// store-assigned document id.
    pub async fn create_document(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> Result<String, FirestoreError> {
        let url = format!("{}/{collection}", self.documents_root);
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.bearer().await?)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;

        let body = Self::check(response).await?;
        let name = body
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| FirestoreError::decode("created document has no name"))?;
        let id = name
            .rsplit('/')
            .next()
            .ok_or_else(|| FirestoreError::decode("created document has an empty name"))?;

        debug!(%id, collection, "document created");
        Ok(id.to_string())
    }

    /// Documents ordered by `submittedAt` descending, with offset/limit.
    /// Returns (id, encoded fields) pairs.
    pub async fn run_query(
        &self,
        collection: &str,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<(String, Map<String, Value>)>, FirestoreError> {
        let url = format!("{}:runQuery", self.documents_root);
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "orderBy": [{
                    "field": { "fieldPath": "submittedAt" },
                    "direction": "DESCENDING"
                }],
                "offset": offset,
                "limit": limit
            }
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.bearer().await?)
            .json(&body)
            .send()
            .await?;

        let body = Self::check(response).await?;
        let entries = body
            .as_array()
            .ok_or_else(|| FirestoreError::decode("runQuery did not return an array"))?;

        let mut documents = Vec::new();
        for entry in entries {
            // entries without a document carry only a readTime
            let Some(doc) = entry.get("document") else {
                continue;
            };
            let name = doc
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| FirestoreError::decode("queried document has no name"))?;
            let id = name
                .rsplit('/')
                .next()
                .ok_or_else(|| FirestoreError::decode("queried document has an empty name"))?;
            let fields = doc
                .get("fields")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            documents.push((id.to_string(), fields));
        }

        Ok(documents)
    }

    /// COUNT over the whole collection.
    pub async fn count_documents(&self, collection: &str) -> Result<u64, FirestoreError> {
        let url = format!("{}:runAggregationQuery", self.documents_root);
        let body = json!({
            "structuredAggregationQuery": {
                "structuredQuery": { "from": [{ "collectionId": collection }] },
                "aggregations": [{ "alias": "total", "count": {} }]
            }
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.bearer().await?)
            .json(&body)
            .send()
            .await?;

        let body = Self::check(response).await?;
        body.as_array()
            .and_then(|entries| entries.first())
            .and_then(|entry| entry.pointer("/result/aggregateFields/total/integerValue"))
            .and_then(Value::as_str)
            .and_then(|count| count.parse::<u64>().ok())
            .ok_or_else(|| FirestoreError::decode("aggregation result has no count"))
    }

    /// Map non-2xx responses to the store's own error message, verbatim.
    async fn check(response: reqwest::Response) -> Result<Value, FirestoreError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| {
                    v.pointer("/error/message")
                        .and_then(Value::as_str)
                        .map(str::to_owned)
                })
                .unwrap_or(text);
            return Err(FirestoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response.json().await.map_err(Into::into)
    }
}
