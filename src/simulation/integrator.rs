// simulation/integrator.rs
// Classic fourth-order Runge-Kutta step for a single particle

use crate::objects::Particle;
use crate::scene::Scene;
use crate::vector::Vec2;

use super::forces;

#[derive(Clone, Copy)]
struct Derivative {
    velocity: Vec2,
    acceleration: Vec2,
}

fn derive(particle: &Particle, position: Vec2, velocity: Vec2, scene: &Scene, t: f64) -> Derivative {
    let force = forces::breakdown_at(particle, position, velocity, scene, t).total;
    Derivative { velocity, acceleration: forces::acceleration(force, particle.mass) }
}

/// Advance `particle` by `dt` seconds. Fields are sampled at scene time `t`
/// for all four stages. No randomness and no clock reads.
pub fn rk4_step(particle: &mut Particle, scene: &Scene, dt: f64, t: f64) {
    let p0 = particle.position;
    let v0 = particle.velocity;

    let k1 = derive(particle, p0, v0, scene, t);
    let k2 = derive(particle, p0 + k1.velocity * (dt * 0.5), v0 + k1.acceleration * (dt * 0.5), scene, t);
    let k3 = derive(particle, p0 + k2.velocity * (dt * 0.5), v0 + k2.acceleration * (dt * 0.5), scene, t);
    let k4 = derive(particle, p0 + k3.velocity * dt, v0 + k3.acceleration * dt, scene, t);

    let dx = (k1.velocity + k2.velocity * 2.0 + k3.velocity * 2.0 + k4.velocity) * (dt / 6.0);
    let dv = (k1.acceleration + k2.acceleration * 2.0 + k3.acceleration * 2.0 + k4.acceleration) * (dt / 6.0);

    particle.position = p0 + dx;
    particle.velocity = v0 + dv;
}
