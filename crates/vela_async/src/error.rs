//! Error types
//!
//! None of these cross the producer/consumer boundary. Plan errors are
//! swallowed by the context (the background is skipped), config errors are
//! reported at startup.

use thiserror::Error;

use crate::style::BackgroundType;

/// Why a style's background could not be turned into a paint plan
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanError {
    /// The background type has no async renderer (gradients)
    #[error("Unsupported background type: {0:?}")]
    UnsupportedBackground(BackgroundType),

    /// The background is fully transparent; there is nothing to paint
    #[error("Background is fully transparent")]
    Transparent,
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse render config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid render config: {0}")]
    Invalid(String),
}
