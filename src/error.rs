use thiserror::Error;

/// Result type for datasource operations
pub type Result<T> = std::result::Result<T, DatasourceError>;

#[derive(Debug, Error)]
pub enum DatasourceError {
    #[error("invalid datasource parameter `{field}`: {reason}")]
    InvalidParam { field: &'static str, reason: String },

    #[error("password encoding failed: {0}")]
    PasswordEncode(String),

    #[error("password decoding failed: {0}")]
    PasswordDecode(String),

    #[error("unterminated {region} starting at byte {offset}")]
    UnterminatedRegion { region: &'static str, offset: usize },

    #[error("unsupported database type: {0}")]
    UnsupportedDbType(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQL Server error: {0}")]
    Driver(#[from] tiberius::error::Error),
}

impl DatasourceError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        DatasourceError::InvalidParam {
            field,
            reason: reason.into(),
        }
    }
}
