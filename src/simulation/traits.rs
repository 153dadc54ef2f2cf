//! Core simulation traits
//!
//! Defines the lifecycle a scheduled component goes through when it is driven
//! by a [`SimulationManager`](super::manager::SimulationManager).

use super::stats::StepStats;
use crate::config::Clock;
use crate::scene::JointHierarchy;

/// A component stepped by the host's clocks
///
/// The manager calls `update` once per fixed tick with [`Clock::FixedTick`]
/// and once per rendered frame with [`Clock::Frame`]. Each implementation
/// decides which of the two it reacts to.
pub trait Simulation {
    /// Initialize the simulation
    ///
    /// Called once when the simulation is attached to a manager. Use this to
    /// capture bind poses and build internal state from the hierarchy.
    fn initialize(&mut self, host: &mut dyn JointHierarchy);

    /// Update simulation state
    ///
    /// # Arguments
    /// * `clock` - Which host callback is running
    /// * `delta_time` - Time covered by this callback in seconds
    /// * `host` - Hierarchy to read joints from and write results into
    fn update(&mut self, clock: Clock, delta_time: f32, host: &mut dyn JointHierarchy);

    /// Get simulation name for display
    fn name(&self) -> &str;

    /// Whether simulation is currently stepping
    fn is_running(&self) -> bool;

    /// Start/stop simulation
    fn set_running(&mut self, running: bool, host: &mut dyn JointHierarchy);

    /// Reset simulation to its initial state
    fn reset(&mut self, host: &mut dyn JointHierarchy);

    /// Step bookkeeping, for simulations that keep it
    fn stats(&self) -> Option<&StepStats> {
        None
    }

    /// Optional: Custom cleanup when simulation is removed
    fn cleanup(&mut self, _host: &mut dyn JointHierarchy) {
        // Default: no cleanup needed
    }
}
