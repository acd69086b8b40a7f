use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid email format")]
    InvalidEmail { email: String },

    #[error("Invalid {param} parameter: must be a positive integer")]
    InvalidPagination { param: String, value: i64 },

    #[error("{message}")]
    Initialization { message: String },

    #[error("{message}")]
    Store { message: String },
}

impl DomainError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn invalid_email(email: impl Into<String>) -> Self {
        Self::InvalidEmail {
            email: email.into(),
        }
    }

    pub fn invalid_pagination(param: impl Into<String>, value: i64) -> Self {
        Self::InvalidPagination {
            param: param.into(),
            value,
        }
    }

    pub fn initialization(message: impl Into<String>) -> Self {
        Self::Initialization {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Validation failures map to 400, everything else to 500.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. } | Self::InvalidEmail { .. } | Self::InvalidPagination { .. }
        )
    }
}
