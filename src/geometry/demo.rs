// geometry/demo.rs
// Demo-mode zoom: re-project the whole scene to a new pixels-per-meter

use crate::config::{DEMO_MAX_ZOOM, DEMO_MIN_ZOOM, DEMO_ZOOM_STEP};
use crate::objects::{DimensionKey, ObjectKind};
use crate::scene::Scene;
use crate::vector::Vec2;

/// Zoom level after one wheel notch; scrolling up (`delta_y < 0`) zooms in.
pub fn next_demo_zoom(current: f64, delta_y: f64) -> f64 {
    let now = if current.is_finite() && current > 0.0 { current } else { 1.0 };
    let factor = if delta_y < 0.0 { DEMO_ZOOM_STEP } else { 1.0 / DEMO_ZOOM_STEP };
    (now * factor).clamp(DEMO_MIN_ZOOM, DEMO_MAX_ZOOM)
}

fn around(value: Vec2, anchor: Vec2, factor: f64) -> Vec2 {
    anchor + (value - anchor) * factor
}

fn scale_speeds(speed: &mut f64, min: &mut Option<f64>, max: &mut Option<f64>, list: &mut [f64], factor: f64) {
    *speed *= factor;
    for bound in [min, max].into_iter().flatten() {
        *bound *= factor;
    }
    for value in list.iter_mut().filter(|v| v.is_finite()) {
        *value *= factor;
    }
}

fn scale_kind(kind: &mut ObjectKind, factor: f64, anchor: Vec2) {
    let position = kind.position();
    if position.x.is_finite() && position.y.is_finite() {
        kind.set_position(around(position, anchor, factor));
    }
    for key in DimensionKey::ALL {
        if let Some(value) = kind.dimension(key).filter(|v| v.is_finite()) {
            kind.set_dimension(key, value * factor);
        }
    }
    match kind {
        ObjectKind::Particle(p) => {
            p.velocity *= factor;
            for point in p.trajectory.iter_mut() {
                let scaled = around(Vec2::new(point.x, point.y), anchor, factor);
                point.x = scaled.x;
                point.y = scaled.y;
            }
        }
        ObjectKind::ElectronGun(g) => g.emission_speed *= factor,
        ObjectKind::ProgrammableEmitter(e) => scale_speeds(
            &mut e.emission_speed,
            &mut e.speed_min,
            &mut e.speed_max,
            &mut e.speed_list,
            factor,
        ),
        ObjectKind::FluorescentScreen(s) => {
            for hit in s.hits.iter_mut() {
                hit.x *= factor;
                hit.y *= factor;
            }
        }
        _ => {}
    }
}

/// Switch the scene to `new_pixels_per_meter`, scaling every position around
/// `anchor` together with velocities, sizes, emitter speeds, trajectories,
/// screen hits and the boundary margin. Real sizes are unchanged because
/// both sides of the projection scale together.
///
/// Returns `false` (after still storing the new scale when it is valid) if
/// nothing had to move.
pub fn apply_demo_zoom(scene: &mut Scene, new_pixels_per_meter: f64, anchor: Vec2) -> bool {
    if !(new_pixels_per_meter.is_finite() && new_pixels_per_meter > 0.0) {
        return false;
    }
    let old = crate::geometry::sanitize_scale(scene.settings.pixels_per_meter);
    let factor = new_pixels_per_meter / old;
    if !(factor.is_finite() && factor > 0.0) || (factor - 1.0).abs() < 1e-12 {
        scene.settings.pixels_per_meter = new_pixels_per_meter;
        return false;
    }
    let anchor = Vec2::new(
        if anchor.x.is_finite() { anchor.x } else { 0.0 },
        if anchor.y.is_finite() { anchor.y } else { 0.0 },
    );

    for object in scene.objects_mut() {
        scale_kind(&mut object.kind, factor, anchor);
    }
    if scene.settings.boundary_margin.is_finite() {
        scene.settings.boundary_margin *= factor;
    }
    scene.settings.pixels_per_meter = new_pixels_per_meter;
    log::info!("demo zoom: {old} -> {new_pixels_per_meter} px/m around ({}, {})", anchor.x, anchor.y);
    true
}
