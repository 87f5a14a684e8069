//! Layout errors

use galley_core::AreaError;
use thiserror::Error;

/// Error type for layout operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Nesting depth {depth} exceeds limit of {limit} (cyclic embedding or annotation?)")]
    NestingTooDeep { depth: usize, limit: usize },

    #[error("Invalid area tree: {0}")]
    Area(#[from] AreaError),
}

/// Result type for layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;
