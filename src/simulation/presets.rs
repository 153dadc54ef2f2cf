//! # Settings Presets
//!
//! Tuned [`ChainSettings`] for common kinds of dangling geometry. Each preset
//! can be refined further with the `with_*` methods.

use crate::config::{ChainSettings, UpdateMode};

/// Names accepted by [`by_name`]
pub const PRESET_NAMES: [&str; 3] = ["hair", "tail", "cloak-edge"];

/// Soft, heavily damped strands that settle quickly
pub fn hair() -> ChainSettings {
    ChainSettings::default()
        .with_damping(0.35)
        .with_stiffness(0.05)
        .with_force([0.0, -0.5, 0.0])
}

/// Springy chain that keeps most of its authored curve
pub fn tail() -> ChainSettings {
    ChainSettings::default()
        .with_damping(0.08)
        .with_stiffness(0.4)
}

/// Loose cloth edge pulled down by a gravity-like force, stepped on the
/// fixed clock
pub fn cloak_edge() -> ChainSettings {
    ChainSettings::default()
        .with_damping(0.15)
        .with_stiffness(0.02)
        .with_force([0.0, -9.8, 0.0])
        .with_update_mode(UpdateMode::PerFixedTick)
}

/// Looks a preset up by name, ignoring case; `_` and `-` are interchangeable
pub fn by_name(name: &str) -> Option<ChainSettings> {
    match name.to_ascii_lowercase().replace('_', "-").as_str() {
        "hair" => Some(hair()),
        "tail" => Some(tail()),
        "cloak-edge" | "cloak" => Some(cloak_edge()),
        _ => None,
    }
}
