use thiserror::Error;

/// Error types for the compute module
#[derive(Error, Debug)]
pub enum ComputeError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A query produced data that could not be interpreted
    #[error("Query error: {0}")]
    Query(String),

    /// Caller-supplied SQL that is not a single read-only statement
    #[error("Rejected SQL: {0}")]
    RejectedSql(String),

    /// Error while rendering an export file
    #[error("Export error: {0}")]
    Export(String),

    /// A source document that could not be ingested
    #[error("Ingest error: {0}")]
    Ingest(String),
}

impl From<csv::Error> for ComputeError {
    fn from(error: csv::Error) -> Self {
        ComputeError::Export(format!("CSV: {}", error))
    }
}

impl From<rust_xlsxwriter::XlsxError> for ComputeError {
    fn from(error: rust_xlsxwriter::XlsxError) -> Self {
        ComputeError::Export(format!("XLSX: {}", error))
    }
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
