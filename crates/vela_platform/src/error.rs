//! Platform error types

use thiserror::Error;

/// Platform-related errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PlatformError {
    /// The host reported a surface size that cannot be drawn into
    #[error("Invalid surface extent: {width}x{height}")]
    InvalidExtent { width: u32, height: u32 },
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
