use crate::validators::ValidationError;

/// Failures of the persistence layer, classified so callers never look at SQL errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage failure: {0}")]
    Storage(#[source] sqlx::Error),
}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        StoreError::InvalidInput(err.0)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                // unique_violation
                Some("23505") => return StoreError::Conflict(db_err.message().to_string()),
                // foreign_key_violation, check_violation, invalid_text_representation, not_null_violation
                Some("23503") | Some("23514") | Some("22P02") | Some("23502") => {
                    return StoreError::InvalidInput(db_err.message().to_string())
                }
                _ => {}
            }
        }
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("row"),
            sqlx::Error::ColumnDecode { source, .. } => StoreError::InvalidInput(source.to_string()),
            err => StoreError::Storage(err),
        }
    }
}

impl StoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::InvalidInput(_) => "invalid_input",
            StoreError::NotFound(_) => "not_found",
            StoreError::Conflict(_) => "conflict",
            StoreError::Storage(_) => "storage",
        }
    }
}

/// Logs a failed statement before handing the classified error back.
pub(crate) fn log_failure(action: &str, err: sqlx::Error) -> StoreError {
    let err = StoreError::from(err);
    match &err {
        StoreError::Storage(source) => {
            tracing::error!("Failed to {}, error: {:?}", action, source)
        }
        other => tracing::warn!("Failed to {}: {}", action, other),
    }
    err
}
