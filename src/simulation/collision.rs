// simulation/collision.rs
// Per-particle collision hooks run after every integration sub-step

use crate::objects::{Category, ObjectKind, Particle, PlateFrame};
use crate::profile_scope;
use crate::scene::Scene;
use crate::vector::Vec2;

/// Slack (px) so a particle pinned to a face still counts as touching it.
const CONTACT_EPSILON: f64 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookOutcome {
    /// Nothing hit; later hooks and boundary handling still run.
    Pass,
    /// Pinned to a capacitor plate. Sub-stepping stops; the particle stays.
    Frozen,
    /// Absorbed; the particle must be removed.
    Removed,
}

pub type CollisionHook = fn(&mut Particle, &mut Scene) -> HookOutcome;

/// Hooks in priority order. The first one that does not pass wins.
pub const HOOKS: [(&str, CollisionHook); 3] = [
    ("capacitor", capacitor_hit),
    ("disappear_zone", disappear_zone_hit),
    ("fluorescent_screen", screen_hit),
];

pub fn run_hooks(particle: &mut Particle, scene: &mut Scene) -> HookOutcome {
    profile_scope!("collision_hooks");
    for (_, hook) in HOOKS {
        match hook(particle, scene) {
            HookOutcome::Pass => continue,
            outcome => return outcome,
        }
    }
    HookOutcome::Pass
}

fn plate_frames(scene: &Scene) -> impl Iterator<Item = PlateFrame> + '_ {
    scene
        .ids(Category::ElectricField)
        .iter()
        .filter_map(move |&id| scene.object(id))
        .filter_map(|obj| obj.kind.plate_frame())
}

/// Resting point on a plate for a particle at `p`: within the plate span and
/// at or beyond half the gap, it is pinned to the inner face on its side.
pub fn plate_contact(frame: &PlateFrame, p: Vec2) -> Option<Vec2> {
    let (span, gap) = frame.project(p);
    if span.abs() > frame.half_span || gap.abs() < frame.half_gap - CONTACT_EPSILON {
        return None;
    }
    let side = if gap < 0.0 { -1.0 } else { 1.0 };
    Some(frame.unproject(span, side * frame.half_gap))
}

/// Resting point of a frozen particle under the current plate geometry, or
/// `None` when no capacitor holds it any more.
pub fn held_position(p: Vec2, scene: &Scene) -> Option<Vec2> {
    plate_frames(scene).find_map(|frame| plate_contact(&frame, p))
}

/// Freeze a particle that reached a capacitor plate.
pub fn capacitor_hit(particle: &mut Particle, scene: &mut Scene) -> HookOutcome {
    match held_position(particle.position, scene) {
        Some(rest) => {
            particle.position = rest;
            particle.velocity = Vec2::zero();
            particle.stuck_to_capacitor = true;
            HookOutcome::Frozen
        }
        None => HookOutcome::Pass,
    }
}

/// Remove a particle whose last step passed through a disappear zone.
pub fn disappear_zone_hit(particle: &mut Particle, scene: &mut Scene) -> HookOutcome {
    let prev = particle.prev_position.unwrap_or(particle.position);
    let hit = scene
        .ids(Category::DisappearZone)
        .iter()
        .filter_map(|&id| scene.object(id))
        .any(|obj| match &obj.kind {
            ObjectKind::DisappearZone(zone) => zone.length > 0.0 && zone.is_hit_by(prev, particle.position),
            _ => false,
        });
    if hit {
        HookOutcome::Removed
    } else {
        HookOutcome::Pass
    }
}

/// Record a hit on the first screen struck, pin the particle to its face
/// and remove it.
pub fn screen_hit(particle: &mut Particle, scene: &mut Scene) -> HookOutcome {
    let prev = particle.prev_position.unwrap_or(particle.position);
    let curr = particle.position;
    let hit = scene.ids(Category::Screen).iter().find_map(|&id| match &scene.object(id)?.kind {
        ObjectKind::FluorescentScreen(screen) => screen.detect_hit(prev, curr).map(|p| (id, p)),
        _ => None,
    });
    let Some((id, point)) = hit else {
        return HookOutcome::Pass;
    };
    let now = scene.time;
    if let Some(ObjectKind::FluorescentScreen(screen)) = scene.object_mut(id).map(|obj| &mut obj.kind) {
        screen.record_hit(point, now);
    }
    particle.position = point;
    HookOutcome::Removed
}
