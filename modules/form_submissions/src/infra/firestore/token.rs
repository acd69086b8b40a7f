use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::credentials::ServiceAccount;
use super::FirestoreError;

const SCOPE: &str = "https://www.googleapis.com/auth/datastore";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_TTL_SECS: i64 = 3600;
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Serialize)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// OAuth 2.0 JWT-bearer token source for a service account. The access
/// token is cached and refreshed shortly before it expires.
pub struct TokenProvider {
    http: reqwest::Client,
    client_email: String,
    private_key: String,
    token_url: String,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenProvider {
    pub fn new(account: &ServiceAccount) -> Self {
        Self::with_token_url(account, account.token_uri.clone())
    }

    pub fn with_token_url(account: &ServiceAccount, token_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_email: account.client_email.clone(),
            private_key: account.private_key.clone(),
            token_url,
            cached: Mutex::new(None),
        }
    }

    /// Current bearer token, fetching a fresh one when the cache is empty
    /// or about to expire.
    pub async fn bearer(&self) -> Result<String, FirestoreError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at > Utc::now() + Duration::seconds(EXPIRY_SKEW_SECS) {
                return Ok(token.token.clone());
            }
        }

        debug!("refreshing store access token");
        let assertion = self.sign(Utc::now())?;
        let token = self.exchange(&assertion).await?;
        let bearer = token.token.clone();
        *cached = Some(token);
        Ok(bearer)
    }

    fn sign(&self, now: DateTime<Utc>) -> Result<String, FirestoreError> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| FirestoreError::token(format!("invalid private key: {e}")))?;
        let claims = Self::claims(&self.client_email, &self.token_url, now);
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| FirestoreError::token(e.to_string()))
    }

    fn claims(client_email: &str, token_url: &str, now: DateTime<Utc>) -> Claims {
        Claims {
            iss: client_email.to_string(),
            scope: SCOPE.to_string(),
            aud: token_url.to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + TOKEN_TTL_SECS,
        }
    }

    /// Trade a signed assertion for an access token.
    pub async fn exchange(&self, assertion: &str) -> Result<AccessToken, FirestoreError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FirestoreError::token(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| FirestoreError::token(e.to_string()))?;

        Ok(AccessToken {
            token: token.access_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn claims_carry_scope_audience_and_hour_expiry() {
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 10, 0, 0).unwrap();
        let claims = TokenProvider::claims(
            "svc@demo-project.iam.gserviceaccount.com",
            "https://oauth2.googleapis.com/token",
            now,
        );

        assert_eq!(claims.iss, "svc@demo-project.iam.gserviceaccount.com");
        assert_eq!(claims.scope, SCOPE);
        assert_eq!(claims.aud, "https://oauth2.googleapis.com/token");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.iat, now.timestamp());
    }

    #[test]
    fn garbage_private_key_is_rejected_at_signing() {
        let account = ServiceAccount {
            account_type: "service_account".to_string(),
            project_id: "demo-project".to_string(),
            private_key_id: "abc".to_string(),
            private_key: "not a pem".to_string(),
            client_email: "svc@demo-project.iam.gserviceaccount.com".to_string(),
            client_id: "123".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
        };
        let provider = TokenProvider::new(&account);
        assert!(matches!(
            provider.sign(Utc::now()),
            Err(FirestoreError::Token { .. })
        ));
    }
}
