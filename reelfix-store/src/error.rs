use thiserror::Error;

use crate::schema::SchemaError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Document encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Record not found: '{id}'")]
    NotFound { id: String },
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
