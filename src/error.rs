//! Error types for the fallible edges of the crate.
//!
//! The transformation passes themselves never fail; only decoding an element
//! tree handed over from the editing surface can.

use thiserror::Error;

/// Failure to move an element tree across the JSON boundary.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("invalid element tree JSON: {0}")]
    Json(#[from] serde_json::Error),
}
