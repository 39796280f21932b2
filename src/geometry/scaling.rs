// geometry/scaling.rs
// Real (world-unit) sizes versus on-screen pixel sizes per object
//
// display = real * pixels_per_meter * object_scale

use crate::objects::{DimensionKey, GeometryState, SceneObject};

/// Decimal places kept for both real and display values.
pub const GEOMETRY_DECIMALS: i32 = 2;

fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn finite_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Scene scale with a fallback of 1 for unusable values.
pub fn sanitize_scale(pixels_per_meter: f64) -> f64 {
    if finite_positive(pixels_per_meter) {
        pixels_per_meter
    } else {
        1.0
    }
}

pub fn object_scale(object: &SceneObject) -> f64 {
    object.geometry.as_ref().map_or(1.0, |g| sanitize_scale(g.object_scale))
}

/// Fill in any missing real values from the current display sizes.
pub fn ensure_geometry_state(object: &mut SceneObject, pixels_per_meter: f64) -> &mut GeometryState {
    let SceneObject { kind, geometry, .. } = object;
    let state = geometry.get_or_insert_with(GeometryState::default);
    state.object_scale = sanitize_scale(state.object_scale);
    let divisor = sanitize_scale(pixels_per_meter) * state.object_scale;
    for key in DimensionKey::ALL {
        if state.real_values.get(&key).is_some_and(|v| v.is_finite()) {
            continue;
        }
        if let Some(display) = kind.dimension(key).filter(|v| v.is_finite()) {
            state.real_values.insert(key, round_to(display / divisor, GEOMETRY_DECIMALS));
        }
    }
    state
}

/// Re-derive every real value from the current pixel geometry, keeping the
/// object scale. Used after a raw resize that bypassed the setters.
pub fn capture_real_geometry(object: &mut SceneObject, pixels_per_meter: f64) -> bool {
    let SceneObject { kind, geometry, .. } = object;
    let state = geometry.get_or_insert_with(GeometryState::default);
    state.object_scale = sanitize_scale(state.object_scale);
    let divisor = sanitize_scale(pixels_per_meter) * state.object_scale;
    let mut changed = false;
    for key in DimensionKey::ALL {
        let Some(display) = kind.dimension(key).filter(|v| v.is_finite()) else {
            continue;
        };
        let real = round_to(display / divisor, GEOMETRY_DECIMALS);
        if state.real_values.insert(key, real) != Some(real) {
            changed = true;
        }
    }
    changed
}

/// Write display sizes back from the real values.
pub fn sync_display_geometry(object: &mut SceneObject, pixels_per_meter: f64) -> bool {
    let factor = sanitize_scale(pixels_per_meter) * ensure_geometry_state(object, pixels_per_meter).object_scale;
    let SceneObject { kind, geometry, .. } = object;
    let Some(state) = geometry.as_ref() else {
        return false;
    };
    let mut changed = false;
    for (&key, &real) in &state.real_values {
        if !real.is_finite() {
            continue;
        }
        let next = round_to(real * factor, GEOMETRY_DECIMALS);
        if kind.dimension(key).is_some_and(|current| current != next) && kind.set_dimension(key, next) {
            changed = true;
        }
    }
    changed
}

pub fn real_dimension(object: &mut SceneObject, key: DimensionKey, pixels_per_meter: f64) -> Option<f64> {
    object.kind.dimension(key)?;
    ensure_geometry_state(object, pixels_per_meter)
        .real_values
        .get(&key)
        .copied()
        .filter(|v| v.is_finite())
}

/// Change the authoritative size; the display size follows at the current
/// object scale. Negative and non-finite values are rejected.
pub fn set_real_dimension(
    object: &mut SceneObject,
    key: DimensionKey,
    real: f64,
    pixels_per_meter: f64,
) -> bool {
    if !real.is_finite() || real < 0.0 || object.kind.dimension(key).is_none() {
        return false;
    }
    ensure_geometry_state(object, pixels_per_meter)
        .real_values
        .insert(key, round_to(real, GEOMETRY_DECIMALS));
    sync_display_geometry(object, pixels_per_meter);
    true
}

/// Change only the object scale so that `key` shows at `display` pixels.
/// Every other scaled key follows, so proportions are kept. The real value
/// is never touched.
pub fn set_display_dimension(
    object: &mut SceneObject,
    key: DimensionKey,
    display: f64,
    pixels_per_meter: f64,
) -> bool {
    if !finite_positive(display) || object.kind.dimension(key).is_none() {
        return false;
    }
    let scene_scale = sanitize_scale(pixels_per_meter);
    let state = ensure_geometry_state(object, pixels_per_meter);
    let Some(real) = state.real_values.get(&key).copied().filter(|v| finite_positive(*v)) else {
        return false;
    };
    let next_scale = display / (real * scene_scale);
    if !finite_positive(next_scale) {
        return false;
    }
    state.object_scale = next_scale;
    sync_display_geometry(object, pixels_per_meter);
    true
}
