// objects/particle.rs
// Point-mass particle, its trajectory buffer and velocity override formulas

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize, Serializer};

use super::Formula;
use crate::config::{
    DEFAULT_TRAJECTORY_LENGTH, PARTICLE_PICK_TOLERANCE, TRAJECTORY_HARD_CAP,
    TRAJECTORY_KEEP_RECENT,
};
use crate::expression::ExpressionError;
use crate::units;
use crate::vector::{self, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub x: f64,
    pub y: f64,
    pub t: f64,
}

/// Retention policy for a trajectory.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrajectoryLimit {
    /// Keep points no older than this many seconds.
    Window(f64),
    /// Keep at most this many points.
    Points(usize),
    /// Keep everything up to the hard cap, then thin out the oldest part.
    Unbounded,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    points: VecDeque<TrajectoryPoint>,
}

impl Trajectory {
    pub fn push(&mut self, point: TrajectoryPoint, limit: TrajectoryLimit) {
        self.points.push_back(point);
        match limit {
            TrajectoryLimit::Window(window) => {
                let cutoff = point.t - window;
                while self.points.front().is_some_and(|p| p.t < cutoff) {
                    self.points.pop_front();
                }
            }
            TrajectoryLimit::Points(max) => {
                while self.points.len() > max {
                    self.points.pop_front();
                }
            }
            TrajectoryLimit::Unbounded => {
                if self.points.len() > TRAJECTORY_HARD_CAP {
                    self.downsample_head();
                }
            }
        }
    }

    /// Halve the resolution of the oldest points, keeping the newest
    /// `TRAJECTORY_KEEP_RECENT` share of the cap untouched.
    fn downsample_head(&mut self) {
        let keep_recent = (TRAJECTORY_HARD_CAP as f64 * TRAJECTORY_KEEP_RECENT).ceil() as usize;
        let head_len = self.points.len().saturating_sub(keep_recent);
        let mut thinned: VecDeque<TrajectoryPoint> =
            self.points.iter().take(head_len).step_by(2).copied().collect();
        thinned.extend(self.points.iter().skip(head_len).copied());
        self.points = thinned;
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TrajectoryPoint> + ExactSizeIterator {
        self.points.iter()
    }

    pub fn last(&self) -> Option<&TrajectoryPoint> {
        self.points.back()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TrajectoryPoint> {
        self.points.iter_mut()
    }
}

/// Charged point mass. `radius` is display-only; physics treats the particle as a point.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "ParticleRecord")]
pub struct Particle {
    pub position: Vec2,
    /// px/s
    pub velocity: Vec2,
    /// kg
    pub mass: f64,
    /// C
    pub charge: f64,
    pub radius: f64,
    pub ignore_gravity: bool,
    pub show_trajectory: bool,
    pub show_velocity: bool,
    pub show_energy: bool,
    pub show_force: bool,
    /// `None` keeps the trajectory unbounded (up to the hard cap).
    pub max_trajectory_length: Option<usize>,
    /// Seconds of history to keep; takes precedence over the point cap.
    pub trajectory_window: Option<f64>,
    pub velocity_expression_x: Option<Formula>,
    pub velocity_expression_y: Option<Formula>,
    pub trajectory: Trajectory,
    pub active: bool,
    pub stuck_to_capacitor: bool,
    /// Position before the current sub-step, for swept collision tests.
    pub prev_position: Option<Vec2>,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec2::zero(),
            velocity: Vec2::zero(),
            mass: units::ELECTRON_MASS,
            charge: -units::ELEMENTARY_CHARGE,
            radius: 6.0,
            ignore_gravity: true,
            show_trajectory: true,
            show_velocity: false,
            show_energy: true,
            show_force: false,
            max_trajectory_length: Some(DEFAULT_TRAJECTORY_LENGTH),
            trajectory_window: None,
            velocity_expression_x: None,
            velocity_expression_y: None,
            trajectory: Trajectory::default(),
            active: true,
            stuck_to_capacitor: false,
            prev_position: None,
        }
    }
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, mass: f64, charge: f64) -> Self {
        Self { position, velocity, mass, charge, ..Default::default() }
    }

    /// Kinetic energy in joules; velocity is converted from px/s with `pixels_per_meter`.
    pub fn kinetic_energy(&self, pixels_per_meter: f64) -> f64 {
        let v = self.velocity.mag() / pixels_per_meter;
        0.5 * self.mass * v * v
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        (p - self.position).mag() <= self.radius + PARTICLE_PICK_TOLERANCE
    }

    pub fn trajectory_limit(&self) -> TrajectoryLimit {
        match (self.trajectory_window, self.max_trajectory_length) {
            (Some(window), _) if window.is_finite() && window > 0.0 => TrajectoryLimit::Window(window),
            (_, Some(max)) => TrajectoryLimit::Points(max),
            _ => TrajectoryLimit::Unbounded,
        }
    }

    /// Append the current position to the trajectory if it is shown.
    pub fn record_trajectory(&mut self, t: f64) {
        if !self.show_trajectory {
            return;
        }
        let limit = self.trajectory_limit();
        let point = TrajectoryPoint { x: self.position.x, y: self.position.y, t };
        self.trajectory.push(point, limit);
    }

    pub fn clear_trajectory(&mut self) {
        self.trajectory.clear();
    }

    pub fn has_velocity_expression(&self) -> bool {
        self.velocity_expression_x.is_some() || self.velocity_expression_y.is_some()
    }

    pub(crate) fn compile_velocity_expressions(
        &mut self,
        variables: &[String],
        errors: &mut Vec<ExpressionError>,
    ) {
        for formula in [&mut self.velocity_expression_x, &mut self.velocity_expression_y]
            .into_iter()
            .flatten()
        {
            if let Err(err) = formula.compile(variables) {
                errors.push(err);
            }
        }
    }

    /// Override velocity components that carry a compiled formula.
    pub fn apply_velocity_expressions(&mut self, t: f64, variables: &BTreeMap<String, f64>) {
        if let Some(vx) = self.velocity_expression_x.as_ref().and_then(|f| f.evaluate(t, variables)) {
            self.velocity.x = vx;
        }
        if let Some(vy) = self.velocity_expression_y.as_ref().and_then(|f| f.evaluate(t, variables)) {
            self.velocity.y = vy;
        }
    }
}

/// Wire form of a particle. Both `x/y/vx/vy` and the `position`/`velocity`
/// arrays are written; on read the arrays win when present.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParticleRecord {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default)]
    vx: f64,
    #[serde(default)]
    vy: f64,
    #[serde(default)]
    position: Option<Vec<f64>>,
    #[serde(default)]
    velocity: Option<Vec<f64>>,
    #[serde(default = "default_mass")]
    mass: f64,
    #[serde(default = "default_charge")]
    charge: f64,
    #[serde(default = "default_radius")]
    radius: f64,
    #[serde(default = "default_true")]
    ignore_gravity: bool,
    #[serde(default = "default_true")]
    show_trajectory: bool,
    #[serde(default)]
    show_velocity: bool,
    #[serde(default = "default_true")]
    show_energy: bool,
    #[serde(default)]
    show_force: bool,
    #[serde(default = "default_max_trajectory_length")]
    max_trajectory_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trajectory_window: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    velocity_expression_x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    velocity_expression_y: Option<String>,
}

fn default_mass() -> f64 {
    units::ELECTRON_MASS
}

fn default_charge() -> f64 {
    -units::ELEMENTARY_CHARGE
}

fn default_radius() -> f64 {
    6.0
}

fn default_true() -> bool {
    true
}

fn default_max_trajectory_length() -> Option<usize> {
    Some(DEFAULT_TRAJECTORY_LENGTH)
}

fn non_empty_formula(source: Option<String>) -> Option<Formula> {
    source.filter(|s| !s.trim().is_empty()).map(Formula::from)
}

impl TryFrom<ParticleRecord> for Particle {
    type Error = String;

    fn try_from(r: ParticleRecord) -> Result<Self, Self::Error> {
        let position = match r.position {
            Some(values) if values.len() >= 2 => vector::vec2_from_slice(&values),
            _ => Vec2::new(r.x, r.y),
        };
        let velocity = match r.velocity {
            Some(values) if values.len() >= 2 => vector::vec2_from_slice(&values),
            _ => Vec2::new(r.vx, r.vy),
        };
        if !vector::is_finite(position) || !vector::is_finite(velocity) {
            return Err("particle position and velocity must be finite".into());
        }
        if !(r.mass.is_finite() && r.mass > 0.0) {
            return Err(format!("particle mass must be a positive number, got {}", r.mass));
        }
        if !r.charge.is_finite() {
            return Err("particle charge must be finite".into());
        }
        Ok(Particle {
            position,
            velocity,
            mass: r.mass,
            charge: r.charge,
            radius: if r.radius.is_finite() && r.radius > 0.0 { r.radius } else { default_radius() },
            ignore_gravity: r.ignore_gravity,
            show_trajectory: r.show_trajectory,
            show_velocity: r.show_velocity,
            show_energy: r.show_energy,
            show_force: r.show_force,
            max_trajectory_length: r.max_trajectory_length,
            trajectory_window: r.trajectory_window,
            velocity_expression_x: non_empty_formula(r.velocity_expression_x),
            velocity_expression_y: non_empty_formula(r.velocity_expression_y),
            ..Default::default()
        })
    }
}

impl From<&Particle> for ParticleRecord {
    fn from(p: &Particle) -> Self {
        ParticleRecord {
            x: p.position.x,
            y: p.position.y,
            vx: p.velocity.x,
            vy: p.velocity.y,
            position: Some(vector::to_array3(vector::lift(p.position)).to_vec()),
            velocity: Some(vector::to_array3(vector::lift(p.velocity)).to_vec()),
            mass: p.mass,
            charge: p.charge,
            radius: p.radius,
            ignore_gravity: p.ignore_gravity,
            show_trajectory: p.show_trajectory,
            show_velocity: p.show_velocity,
            show_energy: p.show_energy,
            show_force: p.show_force,
            max_trajectory_length: p.max_trajectory_length,
            trajectory_window: p.trajectory_window,
            velocity_expression_x: p.velocity_expression_x.as_ref().map(|f| f.source().to_string()),
            velocity_expression_y: p.velocity_expression_y.as_ref().map(|f| f.source().to_string()),
        }
    }
}

impl Serialize for Particle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ParticleRecord::from(self).serialize(serializer)
    }
}
