//! # Secondary Motion
//!
//! [`SecondaryMotion`] is the per-chain component a host attaches to an
//! animated object: it owns the particle chain built from a root joint, the
//! solver, and the settings, and it decides on each host callback whether to
//! step.
//!
//! ## Example
//! ```no_run
//! use cgmath::Vector3;
//! use sway::prelude::*;
//!
//! let mut scene = SceneGraph::new();
//! let body = scene.add_root("body", Vector3::new(0.0, 1.5, 0.0));
//! let hair = scene.add_chain(body, "hair", 4, Vector3::new(0.0, -0.2, 0.0)).unwrap();
//!
//! let mut motion = SecondaryMotion::builder(body)
//!     .with_name("ponytail")
//!     .with_root_joint(hair[0])
//!     .with_damping(0.2)
//!     .with_stiffness(0.05)
//!     .with_force([0.0, -0.5, 0.0])
//!     .build(&scene);
//!
//! // once per rendered frame
//! motion.update(Clock::Frame, 1.0 / 60.0, &mut scene);
//! ```

use log::debug;

use super::chain::ParticleChain;
use super::solver::Simulator;
use super::stats::StepStats;
use super::traits::Simulation;
use crate::config::{ChainSettings, Clock, UpdateMode};
use crate::scene::{JointHierarchy, NodeId};

/// Secondary motion for one joint subtree hanging off an owner object
pub struct SecondaryMotion {
    name: String,
    owner: NodeId,
    root_joint: Option<NodeId>,
    settings: ChainSettings,
    /// Mode restored when a disabled component is switched back on
    resume_mode: UpdateMode,
    chain: ParticleChain,
    simulator: Simulator,
    stats: StepStats,
}

impl SecondaryMotion {
    /// Creates a builder for a component owned by `owner`
    pub fn builder(owner: NodeId) -> SecondaryMotionBuilder {
        SecondaryMotionBuilder::new(owner)
    }

    pub fn owner(&self) -> NodeId {
        self.owner
    }

    pub fn root_joint(&self) -> Option<NodeId> {
        self.root_joint
    }

    pub fn settings(&self) -> &ChainSettings {
        &self.settings
    }

    pub fn chain(&self) -> &ParticleChain {
        &self.chain
    }

    pub fn stats(&self) -> &StepStats {
        &self.stats
    }

    pub fn update_mode(&self) -> UpdateMode {
        self.settings.update_mode
    }

    /// Restores the bind pose and builds a fresh chain from the hierarchy
    pub fn rebuild(&mut self, host: &mut dyn JointHierarchy) {
        self.chain.reset(host);
        let owner_position = host.world_position(self.owner);
        self.chain = ParticleChain::build(
            &*host,
            self.root_joint,
            owner_position,
            self.settings.damping,
            self.settings.stiffness,
        );
    }

    /// Points the component at a different joint subtree
    pub fn set_root_joint(&mut self, root_joint: Option<NodeId>, host: &mut dyn JointHierarchy) {
        self.root_joint = root_joint;
        self.rebuild(host);
    }

    /// Changes damping for every particle; rebuilds the chain
    pub fn set_damping(&mut self, damping: f32, host: &mut dyn JointHierarchy) {
        let settings = self.settings.clone().with_damping(damping);
        self.apply_settings(settings, host);
    }

    /// Changes stiffness for every particle; rebuilds the chain
    pub fn set_stiffness(&mut self, stiffness: f32, host: &mut dyn JointHierarchy) {
        let settings = self.settings.clone().with_stiffness(stiffness);
        self.apply_settings(settings, host);
    }

    /// Changes the external force; takes effect on the next step
    pub fn set_force(&mut self, force: [f32; 3]) {
        self.settings.external_force = force;
        self.simulator.set_force(self.settings.force());
    }

    /// Replaces all settings at once
    ///
    /// The chain is rebuilt only when damping or stiffness actually changed.
    pub fn apply_settings(&mut self, settings: ChainSettings, host: &mut dyn JointHierarchy) {
        let settings = settings.clamped();
        let rebuild = settings.damping != self.settings.damping
            || settings.stiffness != self.settings.stiffness;
        let mode = settings.update_mode;

        self.settings.damping = settings.damping;
        self.settings.stiffness = settings.stiffness;
        self.set_force(settings.external_force);
        if rebuild {
            self.rebuild(host);
        }
        self.set_update_mode(mode, host);
    }

    /// Switches the clock that drives stepping
    ///
    /// Disabling restores the bind pose so the skeleton shows its authored
    /// shape while the effect is off.
    pub fn set_update_mode(&mut self, mode: UpdateMode, host: &mut dyn JointHierarchy) {
        let previous = self.settings.update_mode;
        if previous == mode {
            return;
        }
        if mode == UpdateMode::Disabled {
            self.resume_mode = previous;
            self.chain.reset(host);
        }
        self.settings.update_mode = mode;
        debug!("{}: update mode {:?} -> {:?}", self.name, previous, mode);
    }

    /// Restores the bind pose and advances the chain by `delta_time`
    pub fn step(&mut self, delta_time: f32, host: &mut dyn JointHierarchy) {
        self.chain.reset(host);
        if self.root_joint.is_none() || self.chain.is_empty() {
            return;
        }
        let owner_position = host.world_position(self.owner);
        self.simulator
            .step(&mut self.chain, host, owner_position, delta_time);
        self.stats.record_step(delta_time.max(0.0));
    }
}

impl Simulation for SecondaryMotion {
    fn initialize(&mut self, host: &mut dyn JointHierarchy) {
        self.rebuild(host);
    }

    fn update(&mut self, clock: Clock, delta_time: f32, host: &mut dyn JointHierarchy) {
        if self.settings.update_mode.runs_on(clock) {
            self.step(delta_time, host);
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_running(&self) -> bool {
        self.settings.update_mode.is_enabled()
    }

    fn set_running(&mut self, running: bool, host: &mut dyn JointHierarchy) {
        if running {
            if !self.is_running() {
                self.set_update_mode(self.resume_mode, host);
            }
        } else {
            self.set_update_mode(UpdateMode::Disabled, host);
        }
    }

    fn reset(&mut self, host: &mut dyn JointHierarchy) {
        self.rebuild(host);
        self.stats.reset();
    }

    fn stats(&self) -> Option<&StepStats> {
        Some(&self.stats)
    }

    fn cleanup(&mut self, host: &mut dyn JointHierarchy) {
        self.chain.reset(host);
    }
}

/// Builder for [`SecondaryMotion`]
pub struct SecondaryMotionBuilder {
    name: String,
    owner: NodeId,
    root_joint: Option<NodeId>,
    settings: ChainSettings,
}

impl SecondaryMotionBuilder {
    fn new(owner: NodeId) -> Self {
        Self {
            name: "Secondary Motion".to_string(),
            owner,
            root_joint: None,
            settings: ChainSettings::default(),
        }
    }

    /// Sets the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the joint the chain hangs from
    pub fn with_root_joint(mut self, root_joint: NodeId) -> Self {
        self.root_joint = Some(root_joint);
        self
    }

    /// Replaces all settings
    pub fn with_settings(mut self, settings: ChainSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets damping factor
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.settings.damping = damping;
        self
    }

    /// Sets stiffness factor
    pub fn with_stiffness(mut self, stiffness: f32) -> Self {
        self.settings.stiffness = stiffness;
        self
    }

    /// Sets the constant external force
    pub fn with_force(mut self, force: [f32; 3]) -> Self {
        self.settings.external_force = force;
        self
    }

    /// Sets which clock drives stepping
    pub fn with_update_mode(mut self, mode: UpdateMode) -> Self {
        self.settings.update_mode = mode;
        self
    }

    /// Builds the component and its chain from the current hierarchy
    pub fn build<H: JointHierarchy + ?Sized>(self, host: &H) -> SecondaryMotion {
        let settings = self.settings.clamped();
        let chain = ParticleChain::build(
            host,
            self.root_joint,
            host.world_position(self.owner),
            settings.damping,
            settings.stiffness,
        );
        let resume_mode = match settings.update_mode {
            UpdateMode::Disabled => UpdateMode::PerFrame,
            mode => mode,
        };

        SecondaryMotion {
            name: self.name,
            owner: self.owner,
            root_joint: self.root_joint,
            simulator: Simulator::new(settings.force()),
            settings,
            resume_mode,
            chain,
            stats: StepStats::new(),
        }
    }
}
