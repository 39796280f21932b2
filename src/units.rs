//! Physical constants used by the sandbox.
//!
//! Lengths on the canvas are pixels, `SceneSettings::pixels_per_meter`
//! converts them to meters. Masses are kilograms and charges coulombs.

/// Elementary charge in coulombs.
pub const ELEMENTARY_CHARGE: f64 = 1.602e-19;
/// Electron rest mass in kilograms.
pub const ELECTRON_MASS: f64 = 9.109e-31;
/// Proton rest mass in kilograms.
pub const PROTON_MASS: f64 = 1.672e-27;
/// Alpha particle mass in kilograms.
pub const ALPHA_MASS: f64 = 6.644e-27;

/// Standard gravity used as the scene default (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.8;
