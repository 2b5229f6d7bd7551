use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListwashError {
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parquet write failed: {message}")]
    Parquet { message: String },
}

pub type Result<T> = std::result::Result<T, ListwashError>;
