//! Registry error types
//!
//! Error types for track and source registry operations.

use super::frame::{SourceId, TrackId};

/// Error type for registry operations
///
/// Every variant is surfaced synchronously to the caller; none is fatal, and
/// a rejected operation leaves prior state untouched.
#[derive(Debug, Clone)]
pub enum RegistryError {
    /// Operation referenced a disposed or never-created track
    UnknownTrack(TrackId),
    /// Operation referenced a disposed or never-created source
    UnknownSource(SourceId),
    /// Rejected configuration (non-positive fps or dimension)
    InvalidConfig(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::UnknownTrack(id) => write!(f, "Unknown track: {}", id),
            RegistryError::UnknownSource(id) => write!(f, "Unknown source: {}", id),
            RegistryError::InvalidConfig(reason) => {
                write!(f, "Invalid configuration: {}", reason)
            }
        }
    }
}

impl std::error::Error for RegistryError {}
