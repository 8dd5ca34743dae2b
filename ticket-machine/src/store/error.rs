//! Storage error types.

/// Errors that can occur when reading or replacing stored configuration.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// Stored data could not be (de)serialized
    #[error("JSON error: {message}")]
    Json { message: String },

    /// Another writer panicked while holding the store
    #[error("store lock poisoned")]
    Poisoned,
}
