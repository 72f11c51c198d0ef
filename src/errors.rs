use serde::Serialize;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    /// The engine's contract is binary: the message carries only the
    /// collection and operation, never which predicate failed.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Unauthenticated(_) => "unauthenticated",
            StoreError::PermissionDenied(_) => "permission_denied",
            StoreError::NotFound(_) => "not_found",
            StoreError::Conflict(_) => "conflict",
            StoreError::BadRequest(_) => "bad_request",
            StoreError::Internal(_) => "internal",
        }
    }
}

#[derive(Serialize)]
pub struct ErrorPayload {
    pub error: String,
    pub message: String,
}

impl From<&StoreError> for ErrorPayload {
    fn from(value: &StoreError) -> Self {
        ErrorPayload {
            error: value.code().to_string(),
            message: value.to_string(),
        }
    }
}

impl From<anyhow::Error> for StoreError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value.to_string())
    }
}
