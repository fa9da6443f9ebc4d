use thiserror::Error;

#[derive(Debug, Error)]
pub enum TafweejError {
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read or write sheet: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to read or write backup: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Unknown status: {0}")]
    UnknownStatus(String),
    #[error("Unknown vehicle class: {0}")]
    UnknownVehicleClass(String),
    #[error("Backup version not supported: {0}")]
    UnsupportedBackupVersion(u32),
    #[error("Sheet contains no data rows")]
    EmptySheet,
}

pub type TResult<T> = Result<T, TafweejError>;
