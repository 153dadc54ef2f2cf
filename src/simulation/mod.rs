// src/simulation/mod.rs
//! Simulation system
//!
//! Verlet particle chains that add secondary motion to joint hierarchies,
//! layered from the raw data up to the scheduled component:
//!
//! - [`particle`] and [`chain`]: the simulated state built from a joint subtree
//! - [`solver`]: one integration and constraint step
//! - [`secondary`]: the per-chain component hosts attach to animated objects
//! - [`manager`]: frame and fixed-tick clocks plus the global on/off toggle

pub mod chain;
pub mod manager;
pub mod particle;
pub mod presets;
pub mod secondary;
pub mod solver;
pub mod stats;
pub mod traits;

pub use chain::ParticleChain;
pub use manager::SimulationManager;
pub use particle::Particle;
pub use secondary::{SecondaryMotion, SecondaryMotionBuilder};
pub use solver::Simulator;
pub use stats::StepStats;
pub use traits::Simulation;
