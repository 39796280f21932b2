// simulation/engine.rs
// Per-tick orchestration: emitters, sub-stepped integration, collisions, boundaries

use crate::config::{MAX_STEP_DISTANCE, MAX_SUB_STEPS, RESTITUTION};
use crate::objects::{Category, ObjectId, ObjectKind, Particle};
use crate::profile_scope;
use crate::scene::{Bounds, Scene};
use crate::vector::Vec2;

use super::boundary::handle_boundaries;
use super::collision::{self, HookOutcome};
use super::integrator::rk4_step;

/// What one call to [`PhysicsEngine::update`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub emitted: usize,
    pub removed: usize,
    pub frozen: usize,
}

/// Stateless apart from its tuning; every run-time quantity lives in the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsEngine {
    pub restitution: f64,
    /// Largest displacement (px) a sub-step may cover when continuous
    /// colliders are present.
    pub max_step_distance: f64,
    pub max_sub_steps: usize,
}

impl Default for PhysicsEngine {
    fn default() -> Self {
        Self {
            restitution: RESTITUTION,
            max_step_distance: MAX_STEP_DISTANCE,
            max_sub_steps: MAX_SUB_STEPS,
        }
    }
}

/// Per-tick values shared by every particle.
#[derive(Clone, Copy)]
struct TickContext {
    dt: f64,
    now: f64,
    continuous: bool,
    bounds: Option<Bounds>,
}

enum Fate {
    Keep,
    Frozen,
    Remove,
}

impl PhysicsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the scene by `dt` seconds.
    ///
    /// Order: scene time, emitters, particles (in insertion order, newly
    /// emitted ones included), removals, screen hit pruning.
    pub fn update(&self, scene: &mut Scene, dt: f64) -> StepReport {
        profile_scope!("physics_update");
        let mut report = StepReport::default();
        if !(dt.is_finite() && dt > 0.0) {
            return report;
        }
        scene.time += dt;
        report.emitted = self.run_emitters(scene, dt);

        let ctx = TickContext {
            dt,
            now: scene.time,
            continuous: scene.has_continuous_colliders(),
            bounds: scene.world_bounds(),
        };
        let ids: Vec<ObjectId> = scene.ids(Category::Particle).to_vec();
        let mut doomed = Vec::new();
        for id in ids {
            // Take the particle out so the rest of the scene stays borrowable.
            let Some(slot) = scene.particle_mut(id) else {
                continue;
            };
            let mut particle = std::mem::take(slot);
            let fate = self.advance(&mut particle, scene, &ctx);
            if let Some(slot) = scene.particle_mut(id) {
                *slot = particle;
            }
            match fate {
                Fate::Keep => {}
                Fate::Frozen => report.frozen += 1,
                Fate::Remove => doomed.push(id),
            }
        }
        report.removed = scene.remove_objects(&doomed);

        for object in scene.objects_mut() {
            if let ObjectKind::FluorescentScreen(screen) = &mut object.kind {
                screen.prune_hits(ctx.now);
            }
        }

        if report != StepReport::default() {
            log::debug!(
                "t={:.4}: emitted {}, removed {}, frozen {}",
                ctx.now,
                report.emitted,
                report.removed,
                report.frozen
            );
        }
        report
    }

    fn run_emitters(&self, scene: &mut Scene, dt: f64) -> usize {
        profile_scope!("emitters");
        let now = scene.time;
        let mut spawned: Vec<Particle> = Vec::new();
        let Scene { objects, rng, .. } = &mut *scene;
        for object in objects.iter_mut() {
            match &mut object.kind {
                ObjectKind::ElectronGun(gun) => spawned.extend(gun.update(dt)),
                ObjectKind::ProgrammableEmitter(emitter) => spawned.extend(emitter.update(now, dt, rng)),
                _ => {}
            }
        }
        let count = spawned.len();
        for particle in spawned {
            scene.add_object(particle);
        }
        count
    }

    /// Number of sub-steps needed so one step moves at most `max_step_distance`.
    pub fn sub_steps(&self, velocity: Vec2, dt: f64, continuous: bool) -> usize {
        if !continuous {
            return 1;
        }
        let speed = velocity.mag();
        let displacement = if speed.is_finite() { speed * dt } else { 0.0 };
        let steps = (displacement / self.max_step_distance).ceil();
        if steps.is_finite() && steps > 1.0 {
            (steps as usize).min(self.max_sub_steps.max(1))
        } else {
            1
        }
    }

    fn advance(&self, particle: &mut Particle, scene: &mut Scene, ctx: &TickContext) -> Fate {
        if !particle.active {
            return Fate::Keep;
        }
        if particle.stuck_to_capacitor {
            if let Some(rest) = collision::held_position(particle.position, scene) {
                particle.position = rest;
                return Fate::Keep;
            }
            particle.stuck_to_capacitor = false;
        }
        particle.apply_velocity_expressions(ctx.now, scene.variables());

        let sub_steps = self.sub_steps(particle.velocity, ctx.dt, ctx.continuous);
        let step_dt = ctx.dt / sub_steps as f64;
        let start = ctx.now - ctx.dt;
        for step in 0..sub_steps {
            particle.prev_position = Some(particle.position);
            rk4_step(particle, scene, step_dt, ctx.now);
            particle.record_trajectory(start + step_dt * (step + 1) as f64);

            match collision::run_hooks(particle, scene) {
                HookOutcome::Pass => {}
                HookOutcome::Frozen => return Fate::Frozen,
                HookOutcome::Removed => return Fate::Remove,
            }
            if handle_boundaries(particle, ctx.bounds, &scene.settings, self.restitution) {
                return Fate::Remove;
            }
        }
        Fate::Keep
    }
}
