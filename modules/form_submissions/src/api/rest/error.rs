use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::api::rest::dto::ErrorBody;
use crate::domain::error::DomainError;

/// Request-boundary error: status plus the message put into the
/// `{success:false, error}` envelope.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        let status = if e.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                success: false,
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_400() {
        let err = ApiError::from(DomainError::missing_field("username"));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Missing required field: username");

        let err = ApiError::from(DomainError::invalid_email("nope"));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Invalid email format");
    }

    #[test]
    fn init_and_store_errors_map_to_500() {
        let err = ApiError::from(DomainError::initialization("no credentials"));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let err = ApiError::from(DomainError::store("Quota exceeded"));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Quota exceeded");
    }
}
