use thiserror::Error;

/// Main error type for the guest sheet crate.
/// Aggregates the errors of every module so callers can use a single `?` type.
#[derive(Error, Debug)]
pub enum GuestSheetError {
    #[error("{0}")]
    WithContextError(String),

    #[error("{0}")]
    AnyhowError(#[from] anyhow::Error),

    // Guest module errors
    #[error("{0}")]
    ValidationError(#[from] crate::guest::validate::ValidationError),

    #[error("{0}")]
    SchemaError(#[from] crate::guest::schema::SchemaError),

    #[error("{0}")]
    RepositoryError(#[from] crate::guest::repository::RepositoryError),

    // Store and workbook errors
    #[error("{0}")]
    StoreError(#[from] crate::store::StoreError),

    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    ConfigError(#[from] crate::config::ConfigError),
}

pub trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, GuestSheetError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| GuestSheetError::WithContextError(format!("{}: {}", message, e)))
    }
}
