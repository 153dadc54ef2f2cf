//! # Sway Prelude
//!
//! Commonly used types and traits in one import.
//!
//! ```no_run
//! use cgmath::Vector3;
//! use sway::prelude::*;
//!
//! fn main() -> Result<(), SwayError> {
//!     let mut scene = SceneGraph::new();
//!     let body = scene.add_root("body", Vector3::new(0.0, 1.0, 0.0));
//!     let tail = scene.add_chain(body, "tail", 5, Vector3::new(0.0, 0.0, -0.3))?;
//!
//!     let motion = SecondaryMotion::builder(body)
//!         .with_root_joint(tail[0])
//!         .with_settings(presets::tail())
//!         .build(&scene);
//!
//!     let mut manager = SimulationManager::new();
//!     manager.attach_simulation(Box::new(motion), &mut scene);
//!     manager.advance(1.0 / 60.0, &mut scene);
//!     Ok(())
//! }
//! ```

// Configuration and errors
pub use crate::config::{ChainSettings, Clock, UpdateMode};
pub use crate::error::SwayError;

// Host hierarchy
pub use crate::scene::{JointHierarchy, Node, NodeId, SceneGraph};

// Simulation framework
pub use crate::simulation::manager::SimulationManager;
pub use crate::simulation::presets;
pub use crate::simulation::secondary::SecondaryMotion;
pub use crate::simulation::traits::Simulation;
