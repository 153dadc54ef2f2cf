//! # Chain Settings
//!
//! The recognised configuration surface of a simulated chain: damping,
//! stiffness, a constant external force and the clock that drives stepping.
//! Settings can be built in code with the fluent `with_*` methods or loaded
//! from a YAML document:
//!
//! ```yaml
//! damping: 0.2
//! stiffness: 0.05
//! external_force: [0.0, -0.5, 0.0]
//! update_mode: per-fixed-tick
//! ```
//!
//! Out-of-range values are never an error. Damping and stiffness are clamped
//! into `[0, 1]` and a warning is logged.

use std::path::Path;

use cgmath::Vector3;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which host callback drives the simulation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateMode {
    /// Step once per rendered frame with the frame's elapsed time
    #[default]
    PerFrame,
    /// Step once per fixed physics tick with the fixed tick length
    PerFixedTick,
    /// Never step
    Disabled,
}

/// The clock a host callback belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    Frame,
    FixedTick,
}

impl UpdateMode {
    /// Whether a callback on `clock` should step a chain in this mode
    pub fn runs_on(self, clock: Clock) -> bool {
        matches!(
            (self, clock),
            (UpdateMode::PerFrame, Clock::Frame) | (UpdateMode::PerFixedTick, Clock::FixedTick)
        )
    }

    pub fn is_enabled(self) -> bool {
        self != UpdateMode::Disabled
    }
}

/// Per-chain simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    /// Fraction of the previous step's velocity removed each step
    pub damping: f32,
    /// Blend factor toward the parent-relative rest shape
    pub stiffness: f32,
    /// Constant force applied every step. Small values go a long way.
    pub external_force: [f32; 3],
    pub update_mode: UpdateMode,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            damping: 0.1,
            stiffness: 0.1,
            external_force: [0.0, 0.0, 0.0],
            update_mode: UpdateMode::PerFrame,
        }
    }
}

impl ChainSettings {
    /// Sets the damping factor
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Sets the stiffness factor
    pub fn with_stiffness(mut self, stiffness: f32) -> Self {
        self.stiffness = stiffness;
        self
    }

    /// Sets the external force
    pub fn with_force(mut self, force: [f32; 3]) -> Self {
        self.external_force = force;
        self
    }

    /// Sets the update mode
    pub fn with_update_mode(mut self, mode: UpdateMode) -> Self {
        self.update_mode = mode;
        self
    }

    /// External force as a vector
    pub fn force(&self) -> Vector3<f32> {
        Vector3::from(self.external_force)
    }

    /// Returns a copy with damping and stiffness clamped into `[0, 1]`
    pub fn clamped(mut self) -> Self {
        self.damping = clamp_unit("damping", self.damping);
        self.stiffness = clamp_unit("stiffness", self.stiffness);
        self
    }

    /// Parses settings from a YAML string, clamping the result
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let settings: ChainSettings = serde_yaml::from_str(s)?;
        Ok(settings.clamped())
    }

    /// Loads settings from a YAML file, clamping the result
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&data)
    }
}

fn clamp_unit(name: &str, value: f32) -> f32 {
    let clamped = if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    };
    if clamped != value {
        warn!("{} {} is outside [0, 1], using {}", name, value, clamped);
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_authoring_values() {
        let settings = ChainSettings::default();
        assert_eq!(settings.damping, 0.1);
        assert_eq!(settings.stiffness, 0.1);
        assert_eq!(settings.force(), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(settings.update_mode, UpdateMode::PerFrame);
    }

    #[test]
    fn test_clamping() {
        let settings = ChainSettings::default()
            .with_damping(1.5)
            .with_stiffness(-0.25)
            .clamped();
        assert_eq!(settings.damping, 1.0);
        assert_eq!(settings.stiffness, 0.0);

        let settings = ChainSettings::default().with_damping(f32::NAN).clamped();
        assert_eq!(settings.damping, 0.0);
    }

    #[test]
    fn test_yaml_loading() {
        let yaml = "damping: 0.3\nexternal_force: [0.0, -1.0, 0.0]\nupdate_mode: per-fixed-tick\n";
        let settings = ChainSettings::from_yaml_str(yaml).unwrap();
        assert_eq!(settings.damping, 0.3);
        // Missing keys fall back to defaults
        assert_eq!(settings.stiffness, 0.1);
        assert_eq!(settings.force(), Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(settings.update_mode, UpdateMode::PerFixedTick);
    }

    #[test]
    fn test_yaml_values_are_clamped() {
        let settings = ChainSettings::from_yaml_str("stiffness: 4.0\n").unwrap();
        assert_eq!(settings.stiffness, 1.0);
    }

    #[test]
    fn test_yaml_rejects_unknown_mode() {
        assert!(ChainSettings::from_yaml_str("update_mode: sometimes\n").is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = ChainSettings::load_from_path("/definitely/not/here.yaml");
        assert!(matches!(result, Err(crate::error::SwayError::Io(_))));
    }

    #[test]
    fn test_mode_clocks() {
        assert!(UpdateMode::PerFrame.runs_on(Clock::Frame));
        assert!(!UpdateMode::PerFrame.runs_on(Clock::FixedTick));
        assert!(UpdateMode::PerFixedTick.runs_on(Clock::FixedTick));
        assert!(!UpdateMode::PerFixedTick.runs_on(Clock::Frame));
        assert!(!UpdateMode::Disabled.runs_on(Clock::Frame));
        assert!(!UpdateMode::Disabled.runs_on(Clock::FixedTick));
        assert!(!UpdateMode::Disabled.is_enabled());
    }
}
