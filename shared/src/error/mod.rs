use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database {operation} error: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// A store that cannot serve any request, such as the in-memory test
    /// store in failing mode.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

// Helper function to map sqlx errors, tagging the failing operation
pub fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    StoreError::Database {
        operation,
        source: err,
    }
}
