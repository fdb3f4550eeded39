use crate::db::{dao::DaoLayerError, entities::todo::ParsePriorityError};

/// Errors surfaced to API callers. `BadRequest` carries validation failures,
/// `NotFound` unknown ids; `Internal` is everything the caller cannot fix.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(message) | Self::NotFound(message) | Self::Internal(message) => {
                message.as_str()
            }
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::BadRequest(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

impl From<DaoLayerError> for AppError {
    fn from(err: DaoLayerError) -> Self {
        match err {
            DaoLayerError::NotFound { .. } => AppError::not_found(err.to_string()),
            DaoLayerError::InvalidPagination { .. } => AppError::bad_request(err.to_string()),
            DaoLayerError::Db(ref db_err) => {
                tracing::error!(error = %db_err, "database operation failed");
                AppError::internal("Database operation failed")
            }
        }
    }
}

impl From<ParsePriorityError> for AppError {
    fn from(err: ParsePriorityError) -> Self {
        AppError::bad_request(err.to_string())
    }
}
