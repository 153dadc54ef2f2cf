//! Error types for the host scene graph and configuration loading
//!
//! The simulation core itself never fails: a missing root joint or a
//! degenerate rig simply turns a step into a no-op. Errors only surface where
//! callers hand us data we cannot interpret.

use thiserror::Error;

use crate::scene::NodeId;

/// Errors raised at the crate's boundaries
#[derive(Debug, Error)]
pub enum SwayError {
    /// A node id that the scene graph never issued
    #[error("unknown scene node: {0}")]
    UnknownNode(NodeId),

    /// Reading a settings file failed
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    /// A settings document could not be parsed
    #[error("invalid settings document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Fixed tick length must be positive and finite
    #[error("invalid fixed timestep: {0}")]
    InvalidTimestep(f32),
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, SwayError>;
