// Centralized configuration for the simulation kernel

use serde::{Deserialize, Serialize};

use crate::units;

// ====================
// Physics Engine
// ====================
/// Velocity retained (and reflected) on a `bounce` boundary hit.
pub const RESTITUTION: f64 = 0.9;
/// Largest displacement (px) allowed in one sub-step when continuous collision is on.
pub const MAX_STEP_DISTANCE: f64 = 12.0;
pub const MAX_SUB_STEPS: usize = 50;
/// m/s²
pub const DEFAULT_GRAVITY: f64 = units::STANDARD_GRAVITY;
pub const DEFAULT_PIXELS_PER_METER: f64 = 1.0;

// ====================
// Trajectories
// ====================
pub const DEFAULT_TRAJECTORY_LENGTH: usize = 500;
/// Internal cap for unbounded trajectories.
pub const TRAJECTORY_HARD_CAP: usize = 20_000;
/// Fraction of the newest points kept at full resolution when the hard cap downsamples.
pub const TRAJECTORY_KEEP_RECENT: f64 = 0.6;

// ====================
// Scene editing
// ====================
pub const DUPLICATE_OFFSET: f64 = 20.0;
/// Extra picking tolerance (px) around particles.
pub const PARTICLE_PICK_TOLERANCE: f64 = 5.0;
/// Picking radius (px) of point-like emitters.
pub const EMITTER_PICK_RADIUS: f64 = 18.0;
pub const SCENE_VERSION: &str = "1.0";

// ====================
// Demo zoom
// ====================
pub const DEMO_ZOOM_STEP: f64 = 1.1;
pub const DEMO_MIN_ZOOM: f64 = 0.1;
pub const DEMO_MAX_ZOOM: f64 = 20.0;

// ====================
// Tangency
// ====================
pub const TANGENCY_TOLERANCE_PX: f64 = 2.0;

// ====================
// Headless runner
// ====================
/// Seconds per tick (one 60 Hz frame).
pub const DEFAULT_DT: f64 = 1.0 / 60.0;
pub const DEFAULT_STEPS: usize = 600;
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 800.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 600.0;

/// What happens to a particle leaving the world bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryMode {
    Remove,
    #[default]
    Bounce,
    Wrap,
    Margin,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneMode {
    #[default]
    Normal,
    Demo,
}

/// Scene-wide settings, serialized with the scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSettings {
    #[serde(default = "default_gravity")]
    pub gravity: f64,
    #[serde(default)]
    pub boundary_mode: BoundaryMode,
    #[serde(default = "default_boundary_margin")]
    pub boundary_margin: f64,
    #[serde(default = "default_pixels_per_meter")]
    pub pixels_per_meter: f64,
    #[serde(default = "default_true")]
    pub show_grid: bool,
    #[serde(default = "default_grid_size")]
    pub grid_size: f64,
    #[serde(default = "default_true")]
    pub show_trajectories: bool,
    #[serde(default = "default_true")]
    pub show_energy: bool,
    #[serde(default = "default_true")]
    pub show_field_vectors: bool,
    #[serde(default)]
    pub mode: SceneMode,
    /// Seed for the emitter random source.
    #[serde(default)]
    pub rng_seed: u64,
}

fn default_gravity() -> f64 {
    DEFAULT_GRAVITY
}

fn default_boundary_margin() -> f64 {
    200.0
}

fn default_pixels_per_meter() -> f64 {
    DEFAULT_PIXELS_PER_METER
}

fn default_grid_size() -> f64 {
    50.0
}

fn default_true() -> bool {
    true
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            boundary_mode: BoundaryMode::default(),
            boundary_margin: default_boundary_margin(),
            pixels_per_meter: default_pixels_per_meter(),
            show_grid: true,
            grid_size: default_grid_size(),
            show_trajectories: true,
            show_energy: true,
            show_field_vectors: true,
            mode: SceneMode::default(),
            rng_seed: 0,
        }
    }
}

impl SceneSettings {
    /// Check ranges; returns the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        if !self.gravity.is_finite() {
            return Err("gravity must be finite".into());
        }
        if !(self.pixels_per_meter.is_finite() && self.pixels_per_meter > 0.0) {
            return Err("pixelsPerMeter must be a positive number".into());
        }
        if !(self.boundary_margin.is_finite() && self.boundary_margin >= 0.0) {
            return Err("boundaryMargin must be a non-negative number".into());
        }
        if !(self.grid_size.is_finite() && self.grid_size > 0.0) {
            return Err("gridSize must be a positive number".into());
        }
        Ok(())
    }

    /// Margin applied around the world bounds for the current boundary mode.
    pub fn effective_margin(&self) -> f64 {
        match self.boundary_mode {
            BoundaryMode::Margin => self.boundary_margin.max(0.0),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_settings_fields_take_defaults() {
        let s: SceneSettings = serde_json::from_str(r#"{"boundaryMode":"wrap"}"#).unwrap();
        assert_eq!(s.boundary_mode, BoundaryMode::Wrap);
        assert_eq!(s.gravity, 9.8);
        assert_eq!(s.pixels_per_meter, 1.0);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_scale() {
        let s = SceneSettings { pixels_per_meter: 0.0, ..Default::default() };
        assert!(s.validate().is_err());
    }

    #[test]
    fn margin_only_applies_in_margin_mode() {
        let mut s = SceneSettings { boundary_margin: 30.0, ..Default::default() };
        s.boundary_mode = BoundaryMode::Remove;
        assert_eq!(s.effective_margin(), 0.0);
        s.boundary_mode = BoundaryMode::Margin;
        assert_eq!(s.effective_margin(), 30.0);
    }
}
