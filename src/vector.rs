//! Vector primitives shared by the kernel.
//!
//! Positions and velocities live in the xy-plane of the canvas (screen-Y down).
//! Serialized scenes carry them as `[x, y, z]` arrays, so helpers for the
//! array round-trip live here too.

pub use ultraviolet::{DVec2 as Vec2, DVec3 as Vec3};

/// Unit vector for an angle given in degrees (0 = +x, 90 = screen-down).
pub fn from_degrees(angle_deg: f64) -> Vec2 {
    let rad = angle_deg.to_radians();
    Vec2::new(rad.cos(), rad.sin())
}

/// Build a 2D vector from an array slice, missing components read as zero.
pub fn vec2_from_slice(values: &[f64]) -> Vec2 {
    Vec2::new(
        values.first().copied().unwrap_or(0.0),
        values.get(1).copied().unwrap_or(0.0),
    )
}

/// Build a 3D vector from an array slice, missing components read as zero.
pub fn vec3_from_slice(values: &[f64]) -> Vec3 {
    Vec3::new(
        values.first().copied().unwrap_or(0.0),
        values.get(1).copied().unwrap_or(0.0),
        values.get(2).copied().unwrap_or(0.0),
    )
}

/// Lift a planar vector into 3D with `z = 0`.
pub fn lift(v: Vec2) -> Vec3 {
    Vec3::new(v.x, v.y, 0.0)
}

pub fn to_array3(v: Vec3) -> [f64; 3] {
    [v.x, v.y, v.z]
}

pub fn is_finite(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

/// Normalize `v`, returning `None` for zero-length or non-finite input.
pub fn try_normalized(v: Vec2) -> Option<Vec2> {
    let len = v.mag();
    if len > 0.0 && len.is_finite() {
        Some(v / len)
    } else {
        None
    }
}
