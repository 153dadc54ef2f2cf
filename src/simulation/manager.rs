//! Simulation manager
//!
//! Drives any number of [`Simulation`]s from the host's two clocks and owns
//! the global on/off toggle.

use log::{debug, info, trace};

use super::traits::Simulation;
use crate::config::Clock;
use crate::error::{Result, SwayError};
use crate::scene::JointHierarchy;

/// Fixed tick length used until the host picks another
pub const DEFAULT_FIXED_TIMESTEP: f32 = 1.0 / 50.0;

/// Upper bound on fixed ticks run by a single [`SimulationManager::advance`]
const MAX_FIXED_TICKS_PER_FRAME: u32 = 8;

/// Schedules simulations on frame and fixed-tick clocks
pub struct SimulationManager {
    simulations: Vec<Box<dyn Simulation>>,
    active: bool,
    is_paused: bool,
    time_scale: f32,
    accumulated_time: f32,
    fixed_timestep: f32,
}

impl Default for SimulationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationManager {
    /// Create a new simulation manager
    pub fn new() -> Self {
        Self {
            simulations: Vec::new(),
            active: true,
            is_paused: false,
            time_scale: 1.0,
            accumulated_time: 0.0,
            fixed_timestep: DEFAULT_FIXED_TIMESTEP,
        }
    }

    /// Attach a simulation
    ///
    /// # Arguments
    /// * `simulation` - Boxed simulation implementing the Simulation trait
    /// * `host` - Hierarchy to initialize the simulation with
    ///
    /// # Returns
    /// Index of the simulation within the manager
    pub fn attach_simulation(
        &mut self,
        mut simulation: Box<dyn Simulation>,
        host: &mut dyn JointHierarchy,
    ) -> usize {
        simulation.initialize(host);
        if !self.active {
            simulation.set_running(false, host);
        }
        debug!("attached simulation '{}'", simulation.name());
        self.simulations.push(simulation);
        self.simulations.len() - 1
    }

    /// Remove a simulation, leaving its joints in their bind pose
    ///
    /// # Returns
    /// The detached simulation, or `None` for an unknown index
    pub fn detach_simulation(
        &mut self,
        index: usize,
        host: &mut dyn JointHierarchy,
    ) -> Option<Box<dyn Simulation>> {
        if index >= self.simulations.len() {
            return None;
        }
        let mut simulation = self.simulations.remove(index);
        simulation.cleanup(host);
        debug!("detached simulation '{}'", simulation.name());
        Some(simulation)
    }

    /// Remove every simulation
    pub fn detach_all(&mut self, host: &mut dyn JointHierarchy) {
        for mut simulation in self.simulations.drain(..) {
            simulation.cleanup(host);
        }
        self.accumulated_time = 0.0;
    }

    /// Advance by one rendered frame
    ///
    /// Runs as many fixed ticks as the accumulated time allows, then a single
    /// frame update with the scaled frame time.
    ///
    /// # Arguments
    /// * `delta_time` - Time elapsed since last frame in seconds
    /// * `host` - Hierarchy to update with simulation results
    pub fn advance(&mut self, delta_time: f32, host: &mut dyn JointHierarchy) {
        if self.is_paused {
            return;
        }
        let scaled_delta = (delta_time * self.time_scale).max(0.0);

        self.accumulated_time += scaled_delta;
        let mut ticks = 0;
        while self.accumulated_time >= self.fixed_timestep {
            if ticks == MAX_FIXED_TICKS_PER_FRAME {
                debug!(
                    "dropping {:.4}s of fixed-tick backlog",
                    self.accumulated_time
                );
                self.accumulated_time = 0.0;
                break;
            }
            self.fixed_tick(host);
            self.accumulated_time -= self.fixed_timestep;
            ticks += 1;
        }

        self.frame(scaled_delta, host);
    }

    /// Runs one fixed tick of `fixed_timestep` seconds
    pub fn fixed_tick(&mut self, host: &mut dyn JointHierarchy) {
        let dt = self.fixed_timestep;
        self.dispatch(Clock::FixedTick, dt, host);
    }

    /// Runs one frame update covering `delta_time` seconds
    pub fn frame(&mut self, delta_time: f32, host: &mut dyn JointHierarchy) {
        self.dispatch(Clock::Frame, delta_time, host);
    }

    fn dispatch(&mut self, clock: Clock, delta_time: f32, host: &mut dyn JointHierarchy) {
        trace!("{:?} update, dt = {}", clock, delta_time);
        for simulation in &mut self.simulations {
            simulation.update(clock, delta_time, host);
        }
    }

    /// Reset every simulation to its initial state
    pub fn reset(&mut self, host: &mut dyn JointHierarchy) {
        for simulation in &mut self.simulations {
            simulation.reset(host);
        }
        self.accumulated_time = 0.0;
    }

    /// Switch secondary motion on or off for every managed simulation
    ///
    /// Switching off restores the bind pose of every simulated joint.
    pub fn set_active(&mut self, active: bool, host: &mut dyn JointHierarchy) {
        self.active = active;
        for simulation in &mut self.simulations {
            simulation.set_running(active, host);
        }
        info!("{}", self.status_label());
    }

    /// Flip the on/off toggle
    pub fn toggle(&mut self, host: &mut dyn JointHierarchy) {
        self.set_active(!self.active, host);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Text for an on/off indicator
    pub fn status_label(&self) -> &'static str {
        if self.active {
            "Secondary motion on"
        } else {
            "Secondary motion off"
        }
    }

    /// Check if the manager is paused
    ///
    /// Pausing freezes the joints where they are; it does not restore the
    /// bind pose.
    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    /// Set pause state
    pub fn set_paused(&mut self, paused: bool) {
        self.is_paused = paused;
    }

    /// Set the fixed tick length
    ///
    /// # Arguments
    /// * `timestep` - Tick length in seconds; must be positive and finite
    pub fn set_fixed_timestep(&mut self, timestep: f32) -> Result<()> {
        if !timestep.is_finite() || timestep <= 0.0 {
            return Err(SwayError::InvalidTimestep(timestep));
        }
        self.fixed_timestep = timestep;
        self.accumulated_time = 0.0;
        Ok(())
    }

    pub fn fixed_timestep(&self) -> f32 {
        self.fixed_timestep
    }

    /// Get current time scale
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Set time scale
    ///
    /// # Arguments
    /// * `scale` - Time scale multiplier (1.0 = normal speed)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn len(&self) -> usize {
        self.simulations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simulations.is_empty()
    }

    pub fn simulation(&self, index: usize) -> Option<&dyn Simulation> {
        self.simulations.get(index).map(|s| s.as_ref())
    }

    /// Names of the attached simulations, in attach order
    pub fn simulation_names(&self) -> Vec<&str> {
        self.simulations.iter().map(|s| s.name()).collect()
    }
}
