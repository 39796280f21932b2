// objects/emitter.rs
// Electron gun and programmable emitter; both only keep emission bookkeeping
// and hand new particles back to the caller.

use serde::{Deserialize, Serialize};

use super::Particle;
use crate::config::EMITTER_PICK_RADIUS;
use crate::species;
use crate::units;
use crate::vector::{self, Vec2};

/// Properties stamped onto every emitted particle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "TemplateRecord", rename_all = "camelCase")]
pub struct ParticleTemplate {
    pub particle_type: String,
    #[serde(rename = "particleCharge")]
    pub charge: f64,
    #[serde(rename = "particleMass")]
    pub mass: f64,
    #[serde(rename = "particleRadius")]
    pub radius: f64,
    pub ignore_gravity: bool,
}

impl Default for ParticleTemplate {
    fn default() -> Self {
        Self {
            particle_type: "electron".to_string(),
            charge: -units::ELEMENTARY_CHARGE,
            mass: units::ELECTRON_MASS,
            radius: 6.0,
            ignore_gravity: true,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemplateRecord {
    particle_type: Option<String>,
    particle_charge: Option<f64>,
    particle_mass: Option<f64>,
    particle_radius: Option<f64>,
    ignore_gravity: Option<bool>,
}

impl From<TemplateRecord> for ParticleTemplate {
    fn from(r: TemplateRecord) -> Self {
        let mut template = ParticleTemplate::default();
        if let Some(kind) = r.particle_type.filter(|k| !k.is_empty()) {
            template.particle_type = kind;
        }
        // A preset only fills in charge and mass when neither was given.
        if r.particle_charge.is_none() && r.particle_mass.is_none() {
            if let Some(preset) = species::preset(&template.particle_type) {
                template.charge = preset.charge;
                template.mass = preset.mass;
            }
        }
        if let Some(charge) = r.particle_charge {
            template.charge = charge;
        }
        if let Some(mass) = r.particle_mass {
            template.mass = mass;
        }
        if let Some(radius) = r.particle_radius {
            template.radius = radius;
        }
        if let Some(ignore) = r.ignore_gravity {
            template.ignore_gravity = ignore;
        }
        template
    }
}

impl ParticleTemplate {
    pub fn with_preset(name: &str) -> Self {
        let mut template = ParticleTemplate { particle_type: name.to_string(), ..Default::default() };
        if let Some(preset) = species::preset(name) {
            template.charge = preset.charge;
            template.mass = preset.mass;
        }
        template
    }

    /// Build a particle, or `None` when the template or kinematics are unusable.
    pub fn spawn(&self, position: Vec2, velocity: Vec2) -> Option<Particle> {
        if !vector::is_finite(position) || !vector::is_finite(velocity) {
            return None;
        }
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return None;
        }
        let charge = if self.charge.is_finite() { self.charge } else { 0.0 };
        let radius = if self.radius.is_finite() && self.radius > 0.0 { self.radius } else { 6.0 };
        Some(Particle {
            radius,
            ignore_gravity: self.ignore_gravity,
            ..Particle::new(position, velocity, self.mass, charge)
        })
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Muzzle position and velocity for a shot at `angle_deg` and `speed`.
fn muzzle(center: Vec2, barrel: f64, angle_deg: f64, speed: f64) -> (Vec2, Vec2) {
    let dir = vector::from_degrees(angle_deg);
    (center + dir * finite_or(barrel, 0.0), dir * speed)
}

/// Continuous source firing `emission_rate` particles per second along `direction`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElectronGun {
    pub x: f64,
    pub y: f64,
    pub direction: f64,
    pub emission_rate: f64,
    /// px/s
    pub emission_speed: f64,
    pub barrel_length: f64,
    pub show_velocity: bool,
    pub show_energy: bool,
    #[serde(flatten)]
    pub template: ParticleTemplate,
    #[serde(skip)]
    pub(crate) emit_accumulator: f64,
}

impl Default for ElectronGun {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            direction: 0.0,
            emission_rate: 1.0,
            emission_speed: 200.0,
            barrel_length: 25.0,
            show_velocity: false,
            show_energy: false,
            template: ParticleTemplate::default(),
            emit_accumulator: 0.0,
        }
    }
}

impl ElectronGun {
    pub fn contains_point(&self, p: Vec2) -> bool {
        (p - Vec2::new(self.x, self.y)).mag() <= EMITTER_PICK_RADIUS
    }

    pub fn reset_runtime(&mut self) {
        self.emit_accumulator = 0.0;
    }

    /// Advance the emission clock by `dt` and return the particles fired.
    pub fn update(&mut self, dt: f64) -> Vec<Particle> {
        let mut out = Vec::new();
        if !(self.emission_rate.is_finite() && self.emission_rate > 0.0) || !(dt.is_finite() && dt > 0.0) {
            return out;
        }
        let interval = 1.0 / self.emission_rate;
        self.emit_accumulator += dt;
        while self.emit_accumulator >= interval {
            self.emit_accumulator -= interval;
            let (pos, vel) = muzzle(
                Vec2::new(self.x, self.y),
                self.barrel_length,
                finite_or(self.direction, 0.0),
                finite_or(self.emission_speed, 0.0),
            );
            out.extend(self.template.spawn(pos, vel));
        }
        out
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmissionMode {
    /// Everything at `startTime`.
    #[default]
    Burst,
    /// One particle every `emissionInterval` from `startTime`.
    Sequence,
    /// At `startTime + offset` for each offset of `timeList`.
    TimeList,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleMode {
    #[default]
    Fixed,
    Random,
    List,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedMode {
    #[default]
    Fixed,
    Random,
    List,
    Arithmetic,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListOrder {
    #[default]
    Sequential,
    Random,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct EmitterRuntime {
    emitted: usize,
    burst_done: bool,
    time_list_index: usize,
    angle_index: usize,
    speed_index: usize,
}

/// Emitter following a timing plan with per-shot angle and speed planning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgrammableEmitter {
    pub x: f64,
    pub y: f64,
    pub direction: f64,
    pub emission_speed: f64,
    pub barrel_length: f64,
    pub start_time: f64,
    pub emission_mode: EmissionMode,
    pub emission_count: usize,
    pub emission_interval: f64,
    pub time_list: Vec<f64>,
    pub angle_mode: AngleMode,
    pub angle_min: f64,
    pub angle_max: f64,
    pub angle_list: Vec<f64>,
    pub angle_list_mode: ListOrder,
    pub angle_list_loop: bool,
    pub speed_mode: SpeedMode,
    /// Defaults to `emissionSpeed`.
    pub speed_min: Option<f64>,
    /// Defaults to `emissionSpeed`.
    pub speed_max: Option<f64>,
    pub speed_list: Vec<f64>,
    pub speed_list_mode: ListOrder,
    pub speed_list_loop: bool,
    #[serde(flatten)]
    pub template: ParticleTemplate,
    pub keep_trajectory: bool,
    #[serde(skip)]
    pub(crate) runtime: EmitterRuntime,
}

impl Default for ProgrammableEmitter {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            direction: 0.0,
            emission_speed: 200.0,
            barrel_length: 25.0,
            start_time: 0.0,
            emission_mode: EmissionMode::Burst,
            emission_count: 6,
            emission_interval: 0.2,
            time_list: Vec::new(),
            angle_mode: AngleMode::Fixed,
            angle_min: 0.0,
            angle_max: 360.0,
            angle_list: Vec::new(),
            angle_list_mode: ListOrder::Sequential,
            angle_list_loop: true,
            speed_mode: SpeedMode::Fixed,
            speed_min: None,
            speed_max: None,
            speed_list: Vec::new(),
            speed_list_mode: ListOrder::Sequential,
            speed_list_loop: true,
            template: ParticleTemplate::default(),
            keep_trajectory: true,
            runtime: EmitterRuntime::default(),
        }
    }
}

/// Pick from a cleaned list, advancing `cursor` for sequential order.
fn pick_from_list(
    list: &[f64],
    order: ListOrder,
    looping: bool,
    cursor: &mut usize,
    rng: &mut fastrand::Rng,
) -> Option<f64> {
    if list.is_empty() {
        return None;
    }
    if order == ListOrder::Random {
        return Some(list[rng.usize(..list.len())]);
    }
    let idx = *cursor;
    if idx >= list.len() {
        if looping {
            *cursor = 1;
            return Some(list[0]);
        }
        return list.last().copied();
    }
    *cursor += 1;
    Some(list[idx])
}

impl ProgrammableEmitter {
    pub fn contains_point(&self, p: Vec2) -> bool {
        (p - Vec2::new(self.x, self.y)).mag() <= EMITTER_PICK_RADIUS
    }

    pub fn reset_runtime(&mut self) {
        self.runtime = EmitterRuntime::default();
    }

    pub fn emitted_count(&self) -> usize {
        self.runtime.emitted
    }

    /// Finite, non-negative time offsets in ascending order.
    pub fn time_offsets(&self) -> Vec<f64> {
        let mut offsets: Vec<f64> =
            self.time_list.iter().copied().filter(|v| v.is_finite()).map(|v| v.max(0.0)).collect();
        offsets.sort_by(f64::total_cmp);
        offsets
    }

    /// Fire everything scheduled up to scene time `now`.
    pub fn update(&mut self, now: f64, dt: f64, rng: &mut fastrand::Rng) -> Vec<Particle> {
        let mut out = Vec::new();
        if !(dt.is_finite() && dt > 0.0) || self.emission_count == 0 {
            return out;
        }
        let total = self.emission_count;
        let start = finite_or(self.start_time, 0.0);
        let offsets = self.time_offsets();
        let planned = match self.emission_mode {
            EmissionMode::TimeList => total.min(offsets.len()),
            _ => total,
        };

        let interval = finite_or(self.emission_interval, 0.0);
        match self.emission_mode {
            EmissionMode::Burst => self.fire_burst(now, start, planned, rng, &mut out),
            // A non-positive interval degenerates to a burst.
            EmissionMode::Sequence if interval <= 0.0 => {
                self.fire_burst(now, start, planned, rng, &mut out)
            }
            EmissionMode::Sequence => {
                while self.runtime.emitted < total {
                    let emit_time = start + self.runtime.emitted as f64 * interval;
                    if emit_time > now {
                        break;
                    }
                    self.fire(planned, rng, &mut out);
                }
            }
            EmissionMode::TimeList => {
                while self.runtime.emitted < total && self.runtime.time_list_index < offsets.len() {
                    let emit_time = start + offsets[self.runtime.time_list_index];
                    if emit_time > now {
                        break;
                    }
                    self.fire(planned, rng, &mut out);
                    self.runtime.time_list_index += 1;
                }
            }
        }
        out
    }

    fn fire_burst(
        &mut self,
        now: f64,
        start: f64,
        planned: usize,
        rng: &mut fastrand::Rng,
        out: &mut Vec<Particle>,
    ) {
        if self.runtime.burst_done || now < start {
            return;
        }
        for _ in 0..self.emission_count {
            self.fire(planned, rng, out);
        }
        self.runtime.burst_done = true;
    }

    fn fire(&mut self, planned: usize, rng: &mut fastrand::Rng, out: &mut Vec<Particle>) {
        let angle = self.pick_angle_deg(rng);
        let speed = self.pick_speed(planned, rng);
        let (pos, vel) = muzzle(Vec2::new(self.x, self.y), self.barrel_length, angle, speed);
        if let Some(mut particle) = self.template.spawn(pos, vel) {
            particle.show_trajectory = self.keep_trajectory;
            particle.max_trajectory_length = None;
            out.push(particle);
        }
        self.runtime.emitted += 1;
    }

    fn pick_angle_deg(&mut self, rng: &mut fastrand::Rng) -> f64 {
        let fallback = finite_or(self.direction, 0.0);
        match self.angle_mode {
            AngleMode::Fixed => fallback,
            AngleMode::Random => {
                let mut a = finite_or(self.angle_min, 0.0);
                let mut b = finite_or(self.angle_max, 360.0);
                if b < a {
                    std::mem::swap(&mut a, &mut b);
                }
                a + rng.f64() * (b - a)
            }
            AngleMode::List => {
                let list: Vec<f64> = self.angle_list.iter().copied().filter(|v| v.is_finite()).collect();
                pick_from_list(
                    &list,
                    self.angle_list_mode,
                    self.angle_list_loop,
                    &mut self.runtime.angle_index,
                    rng,
                )
                .unwrap_or(fallback)
            }
        }
    }

    fn pick_speed(&mut self, planned: usize, rng: &mut fastrand::Rng) -> f64 {
        let fallback = finite_or(self.emission_speed, 0.0);
        match self.speed_mode {
            SpeedMode::Fixed => fallback,
            SpeedMode::Random | SpeedMode::Arithmetic => {
                let mut min = finite_or(self.speed_min.unwrap_or(fallback), fallback).max(0.0);
                let mut max = finite_or(self.speed_max.unwrap_or(fallback), fallback).max(0.0);
                if max < min {
                    std::mem::swap(&mut min, &mut max);
                }
                if self.speed_mode == SpeedMode::Random {
                    return min + rng.f64() * (max - min);
                }
                let count = planned.max(1);
                if count <= 1 {
                    return min;
                }
                let i = self.runtime.emitted.min(count - 1);
                min + (max - min) / (count - 1) as f64 * i as f64
            }
            SpeedMode::List => {
                let list: Vec<f64> = self
                    .speed_list
                    .iter()
                    .copied()
                    .filter(|v| v.is_finite())
                    .map(|v| v.max(0.0))
                    .collect();
                pick_from_list(
                    &list,
                    self.speed_list_mode,
                    self.speed_list_loop,
                    &mut self.runtime.speed_index,
                    rng,
                )
                .unwrap_or(fallback)
            }
        }
    }
}
