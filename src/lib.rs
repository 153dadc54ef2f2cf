// src/lib.rs
//! Sway
//!
//! Secondary motion for joint hierarchies: hair, tails and cloth edges that
//! lag, swing and settle behind an animated object, simulated as Verlet
//! particle chains.

pub mod config;
pub mod error;
pub mod prelude;
pub mod scene;
pub mod simulation;

pub use config::{ChainSettings, Clock, UpdateMode};
pub use error::{Result, SwayError};
pub use scene::{JointHierarchy, NodeId, SceneGraph};
pub use simulation::{SecondaryMotion, SimulationManager};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
