//! Force contributions on a single particle.
//!
//! Positions and velocities are in px and px/s, fields in SI units. The
//! magnetic term converts velocity to m/s with `pixelsPerMeter`; electric
//! and gravity terms do not depend on the pixel scale.

use crate::objects::Particle;
use crate::scene::Scene;
use crate::vector::Vec2;

/// Per-source forces on a particle (N) plus their sum.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ForceBreakdown {
    pub electric: Vec2,
    pub magnetic: Vec2,
    pub gravity: Vec2,
    pub total: Vec2,
}

/// `F = qE`.
pub fn electric_force(charge: f64, field: Vec2) -> Vec2 {
    field * charge
}

/// Lorentz force for in-plane motion under an out-of-screen field `bz`.
///
/// Screen y grows downward, so a positive charge moving in +x under a
/// positive `bz` is pushed toward +y.
pub fn magnetic_force(charge: f64, velocity: Vec2, bz: f64, pixels_per_meter: f64) -> Vec2 {
    let v = velocity / sanitize_ppm(pixels_per_meter);
    Vec2::new(-charge * v.y * bz, charge * v.x * bz)
}

/// `(0, m·g)`, or zero when gravity is ignored or not a number.
pub fn gravity_force(mass: f64, gravity: f64, ignore_gravity: bool) -> Vec2 {
    if ignore_gravity || !mass.is_finite() || !gravity.is_finite() {
        return Vec2::zero();
    }
    Vec2::new(0.0, mass * gravity)
}

fn sanitize_ppm(ppm: f64) -> f64 {
    if ppm.is_finite() && ppm > 0.0 {
        ppm
    } else {
        1.0
    }
}

/// Forces on `particle` as if it were at `position` moving with `velocity`
/// at scene time `t`.
pub fn breakdown_at(particle: &Particle, position: Vec2, velocity: Vec2, scene: &Scene, t: f64) -> ForceBreakdown {
    let electric = electric_force(particle.charge, scene.electric_field_at(position, t));
    let magnetic = magnetic_force(
        particle.charge,
        velocity,
        scene.magnetic_field(position),
        scene.settings.pixels_per_meter,
    );
    let gravity = gravity_force(particle.mass, scene.settings.gravity, particle.ignore_gravity);
    ForceBreakdown { electric, magnetic, gravity, total: electric + magnetic + gravity }
}

/// Forces on `particle` in its current state at the scene's current time.
pub fn breakdown(particle: &Particle, scene: &Scene) -> ForceBreakdown {
    breakdown_at(particle, particle.position, particle.velocity, scene, scene.time)
}

/// Acceleration (px/s²) from a net force; zero for a non-positive mass.
pub fn acceleration(force: Vec2, mass: f64) -> Vec2 {
    if !(mass.is_finite() && mass > 0.0) {
        return Vec2::zero();
    }
    force / mass
}
