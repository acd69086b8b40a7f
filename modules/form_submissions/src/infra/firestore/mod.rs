pub mod client;
pub mod credentials;
pub mod repo;
pub mod token;
pub mod value;

use thiserror::Error;

/// Failures talking to the document store. `Api` carries the store's own
/// error message and displays it verbatim, which is what the request
/// boundary surfaces to callers.
#[derive(Error, Debug)]
pub enum FirestoreError {
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("token request failed: {reason}")]
    Token { reason: String },

    #[error("unexpected response from document store: {reason}")]
    Decode { reason: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl FirestoreError {
    pub fn token(reason: impl Into<String>) -> Self {
        Self::Token {
            reason: reason.into(),
        }
    }

    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }
}
