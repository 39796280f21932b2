// simulation/boundary.rs
// World-bounds policy: remove, margin, wrap or bounce

use crate::config::{BoundaryMode, SceneSettings};
use crate::objects::Particle;
use crate::scene::Bounds;
use crate::vector;

/// Apply the boundary policy to a particle. Returns `true` when the particle
/// must be removed. Particles are treated as points.
///
/// A non-finite position or velocity is always removed, even when there are
/// no bounds to check against.
pub fn handle_boundaries(
    particle: &mut Particle,
    bounds: Option<Bounds>,
    settings: &SceneSettings,
    restitution: f64,
) -> bool {
    if !vector::is_finite(particle.position) || !vector::is_finite(particle.velocity) {
        return true;
    }
    let Some(Bounds { min, max }) = bounds else {
        return false;
    };
    let p = particle.position;

    match settings.boundary_mode {
        BoundaryMode::Remove | BoundaryMode::Margin => {
            let m = settings.effective_margin();
            p.x < min.x - m || p.x > max.x + m || p.y < min.y - m || p.y > max.y + m
        }
        BoundaryMode::Wrap => {
            let mut wrapped = false;
            if p.x < min.x {
                particle.position.x = max.x;
                wrapped = true;
            } else if p.x > max.x {
                particle.position.x = min.x;
                wrapped = true;
            }
            if p.y < min.y {
                particle.position.y = max.y;
                wrapped = true;
            } else if p.y > max.y {
                particle.position.y = min.y;
                wrapped = true;
            }
            if wrapped {
                particle.clear_trajectory();
            }
            false
        }
        BoundaryMode::Bounce => {
            let v = particle.velocity;
            let mut bounced = false;
            if p.x < min.x {
                particle.position.x = min.x;
                particle.velocity.x = v.x.abs() * restitution;
                bounced = true;
            } else if p.x > max.x {
                particle.position.x = max.x;
                particle.velocity.x = -v.x.abs() * restitution;
                bounced = true;
            }
            if p.y < min.y {
                particle.position.y = min.y;
                particle.velocity.y = v.y.abs() * restitution;
                bounced = true;
            } else if p.y > max.y {
                particle.position.y = max.y;
                particle.velocity.y = -v.y.abs() * restitution;
                bounced = true;
            }
            if bounced {
                particle.clear_trajectory();
            }
            false
        }
    }
}
