//! Error types for pantry_planner
//!
//! The shopping and nutrition engines never fail; everything in here comes
//! from the layers around them (storage, file import, validation).

use thiserror::Error;

/// Unified error type for pantry_planner operations
#[derive(Debug, Error)]
pub enum PantryError {
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Failed to parse or write JSON
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Failed to read CSV input
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Input rejected at the storage boundary
    #[error("Invalid input: {0}")]
    Validation(String),
    /// Recipe or inventory item does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result alias for pantry_planner operations
pub type Result<T> = std::result::Result<T, PantryError>;
