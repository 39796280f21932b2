//! Scene objects.
//!
//! The set of object kinds is closed: [`ObjectKind`] is a tagged enum whose
//! serde tag is the `type` string used in scene JSON, and every per-kind
//! behaviour (containment, field queries, scalable dimensions) is a `match`
//! over it.

mod capacitor;
mod detector;
mod emitter;
mod fields;
mod particle;


use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::expression::{self, CompiledExpression, ExpressionError};
use crate::vector::Vec2;

pub use capacitor::{
    CapacitorSource, ParallelPlateCapacitor, PlateFrame, SourceType,
    VerticalParallelPlateCapacitor, Waveform,
};
pub use detector::{DisappearZone, FluorescentScreen, ScreenHit};
pub use emitter::{
    AngleMode, ElectronGun, EmissionMode, ListOrder, ParticleTemplate, ProgrammableEmitter,
    SpeedMode,
};
pub use fields::{
    CircleElectricField, MagneticField, MagneticShape, RectElectricField,
    SemiCircleElectricField,
};
pub use particle::{Particle, Trajectory, TrajectoryLimit, TrajectoryPoint};

/// Opaque handle into the scene's object arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

/// Index a scene object belongs to. Membership is exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    ElectricField,
    MagneticField,
    Emitter,
    DisappearZone,
    Screen,
    Particle,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::ElectricField,
        Category::MagneticField,
        Category::Emitter,
        Category::DisappearZone,
        Category::Screen,
        Category::Particle,
    ];
}

/// Geometry keys that take part in real/display scaling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DimensionKey {
    Width,
    Height,
    Radius,
    Length,
    PlateDistance,
    Depth,
    ViewGap,
    SpotSize,
    LineWidth,
    ParticleRadius,
    BarrelLength,
}

impl DimensionKey {
    pub const ALL: [DimensionKey; 11] = [
        DimensionKey::Width,
        DimensionKey::Height,
        DimensionKey::Radius,
        DimensionKey::Length,
        DimensionKey::PlateDistance,
        DimensionKey::Depth,
        DimensionKey::ViewGap,
        DimensionKey::SpotSize,
        DimensionKey::LineWidth,
        DimensionKey::ParticleRadius,
        DimensionKey::BarrelLength,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DimensionKey::Width => "width",
            DimensionKey::Height => "height",
            DimensionKey::Radius => "radius",
            DimensionKey::Length => "length",
            DimensionKey::PlateDistance => "plateDistance",
            DimensionKey::Depth => "depth",
            DimensionKey::ViewGap => "viewGap",
            DimensionKey::SpotSize => "spotSize",
            DimensionKey::LineWidth => "lineWidth",
            DimensionKey::ParticleRadius => "particleRadius",
            DimensionKey::BarrelLength => "barrelLength",
        }
    }

    pub fn from_name(name: &str) -> Option<DimensionKey> {
        DimensionKey::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

/// Per-object real/display scale bookkeeping, see `geometry::scaling`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryState {
    #[serde(default)]
    pub real_values: BTreeMap<DimensionKey, f64>,
    #[serde(default = "unit_scale")]
    pub object_scale: f64,
}

fn unit_scale() -> f64 {
    1.0
}

impl Default for GeometryState {
    fn default() -> Self {
        Self { real_values: BTreeMap::new(), object_scale: 1.0 }
    }
}

/// A user formula kept as source text plus its compiled form.
///
/// Serialized as the plain source string. The compiled form is refreshed by
/// the scene whenever the variable set changes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Formula {
    source: String,
    compiled: Option<CompiledExpression>,
}

impl From<String> for Formula {
    fn from(source: String) -> Self {
        Self { source, compiled: None }
    }
}

impl From<Formula> for String {
    fn from(formula: Formula) -> Self {
        formula.source
    }
}

impl Formula {
    pub fn new(source: impl Into<String>) -> Self {
        Self::from(source.into())
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    /// Compile against `t` and the given variable names. On failure the
    /// formula stays uncompiled and evaluates to nothing.
    pub fn compile<S: AsRef<str>>(&mut self, variables: &[S]) -> Result<(), ExpressionError> {
        match expression::compile(&self.source, variables) {
            Ok(compiled) => {
                self.compiled = Some(compiled);
                Ok(())
            }
            Err(err) => {
                self.compiled = None;
                Err(err)
            }
        }
    }

    pub fn evaluate(&self, t: f64, variables: &BTreeMap<String, f64>) -> Option<f64> {
        self.compiled.as_ref().map(|c| c.evaluate_at(t, variables))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectKind {
    #[serde(rename = "electric-field-rect")]
    RectElectricField(RectElectricField),
    #[serde(rename = "electric-field-circle")]
    CircleElectricField(CircleElectricField),
    #[serde(rename = "semicircle-electric-field")]
    SemiCircleElectricField(SemiCircleElectricField),
    #[serde(rename = "parallel-plate-capacitor")]
    ParallelPlateCapacitor(ParallelPlateCapacitor),
    #[serde(rename = "vertical-parallel-plate-capacitor")]
    VerticalParallelPlateCapacitor(VerticalParallelPlateCapacitor),
    #[serde(rename = "magnetic-field")]
    MagneticField(MagneticField),
    #[serde(rename = "particle")]
    Particle(Particle),
    #[serde(rename = "electron-gun")]
    ElectronGun(ElectronGun),
    #[serde(rename = "programmable-emitter")]
    ProgrammableEmitter(ProgrammableEmitter),
    #[serde(rename = "disappear-zone")]
    DisappearZone(DisappearZone),
    #[serde(rename = "fluorescent-screen")]
    FluorescentScreen(FluorescentScreen),
}

/// Every `type` string [`ObjectKind`] accepts.
pub const OBJECT_TYPES: [&str; 11] = [
    "electric-field-rect",
    "electric-field-circle",
    "semicircle-electric-field",
    "parallel-plate-capacitor",
    "vertical-parallel-plate-capacitor",
    "magnetic-field",
    "particle",
    "electron-gun",
    "programmable-emitter",
    "disappear-zone",
    "fluorescent-screen",
];

pub fn is_known_type(name: &str) -> bool {
    OBJECT_TYPES.contains(&name)
}

impl ObjectKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ObjectKind::RectElectricField(_) => "electric-field-rect",
            ObjectKind::CircleElectricField(_) => "electric-field-circle",
            ObjectKind::SemiCircleElectricField(_) => "semicircle-electric-field",
            ObjectKind::ParallelPlateCapacitor(_) => "parallel-plate-capacitor",
            ObjectKind::VerticalParallelPlateCapacitor(_) => "vertical-parallel-plate-capacitor",
            ObjectKind::MagneticField(_) => "magnetic-field",
            ObjectKind::Particle(_) => "particle",
            ObjectKind::ElectronGun(_) => "electron-gun",
            ObjectKind::ProgrammableEmitter(_) => "programmable-emitter",
            ObjectKind::DisappearZone(_) => "disappear-zone",
            ObjectKind::FluorescentScreen(_) => "fluorescent-screen",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            ObjectKind::RectElectricField(_)
            | ObjectKind::CircleElectricField(_)
            | ObjectKind::SemiCircleElectricField(_)
            | ObjectKind::ParallelPlateCapacitor(_)
            | ObjectKind::VerticalParallelPlateCapacitor(_) => Category::ElectricField,
            ObjectKind::MagneticField(_) => Category::MagneticField,
            ObjectKind::Particle(_) => Category::Particle,
            ObjectKind::ElectronGun(_) | ObjectKind::ProgrammableEmitter(_) => Category::Emitter,
            ObjectKind::DisappearZone(_) => Category::DisappearZone,
            ObjectKind::FluorescentScreen(_) => Category::Screen,
        }
    }

    /// Anchor point: top-left corner for rectangular fields, centre otherwise.
    pub fn position(&self) -> Vec2 {
        match self {
            ObjectKind::RectElectricField(f) => Vec2::new(f.x, f.y),
            ObjectKind::CircleElectricField(f) => Vec2::new(f.x, f.y),
            ObjectKind::SemiCircleElectricField(f) => Vec2::new(f.x, f.y),
            ObjectKind::ParallelPlateCapacitor(c) => Vec2::new(c.x, c.y),
            ObjectKind::VerticalParallelPlateCapacitor(c) => Vec2::new(c.x, c.y),
            ObjectKind::MagneticField(f) => Vec2::new(f.x, f.y),
            ObjectKind::Particle(p) => p.position,
            ObjectKind::ElectronGun(g) => Vec2::new(g.x, g.y),
            ObjectKind::ProgrammableEmitter(e) => Vec2::new(e.x, e.y),
            ObjectKind::DisappearZone(z) => Vec2::new(z.x, z.y),
            ObjectKind::FluorescentScreen(s) => Vec2::new(s.x, s.y),
        }
    }

    pub fn set_position(&mut self, p: Vec2) {
        let (x, y) = match self {
            ObjectKind::Particle(particle) => {
                particle.position = p;
                return;
            }
            ObjectKind::RectElectricField(f) => (&mut f.x, &mut f.y),
            ObjectKind::CircleElectricField(f) => (&mut f.x, &mut f.y),
            ObjectKind::SemiCircleElectricField(f) => (&mut f.x, &mut f.y),
            ObjectKind::ParallelPlateCapacitor(c) => (&mut c.x, &mut c.y),
            ObjectKind::VerticalParallelPlateCapacitor(c) => (&mut c.x, &mut c.y),
            ObjectKind::MagneticField(f) => (&mut f.x, &mut f.y),
            ObjectKind::ElectronGun(g) => (&mut g.x, &mut g.y),
            ObjectKind::ProgrammableEmitter(e) => (&mut e.x, &mut e.y),
            ObjectKind::DisappearZone(z) => (&mut z.x, &mut z.y),
            ObjectKind::FluorescentScreen(s) => (&mut s.x, &mut s.y),
        };
        *x = p.x;
        *y = p.y;
    }

    pub fn translate(&mut self, delta: Vec2) {
        let p = self.position();
        self.set_position(p + delta);
    }

    /// Hit test used for picking and as the region of field objects.
    pub fn contains_point(&self, p: Vec2) -> bool {
        match self {
            ObjectKind::RectElectricField(f) => f.contains_point(p),
            ObjectKind::CircleElectricField(f) => f.contains_point(p),
            ObjectKind::SemiCircleElectricField(f) => f.contains_point(p),
            ObjectKind::ParallelPlateCapacitor(c) => c.contains_point(p),
            ObjectKind::VerticalParallelPlateCapacitor(c) => c.contains_point(p),
            ObjectKind::MagneticField(f) => f.contains_point(p),
            ObjectKind::Particle(particle) => particle.contains_point(p),
            ObjectKind::ElectronGun(g) => g.contains_point(p),
            ObjectKind::ProgrammableEmitter(e) => e.contains_point(p),
            ObjectKind::DisappearZone(z) => z.contains_point(p),
            ObjectKind::FluorescentScreen(s) => s.contains_point(p),
        }
    }

    /// Electric field contribution at `p`; zero for non-electric objects.
    pub fn electric_field_at(&self, p: Vec2, t: f64, variables: &BTreeMap<String, f64>) -> Vec2 {
        match self {
            ObjectKind::RectElectricField(f) => f.field_at(p),
            ObjectKind::CircleElectricField(f) => f.field_at(p),
            ObjectKind::SemiCircleElectricField(f) => f.field_at(p),
            ObjectKind::ParallelPlateCapacitor(c) => c.field_at(p, t, variables),
            ObjectKind::VerticalParallelPlateCapacitor(c) => c.field_at(p, t, variables),
            _ => Vec2::zero(),
        }
    }

    /// Scalar Bz at `p`; zero for non-magnetic objects.
    pub fn magnetic_field_at(&self, p: Vec2) -> f64 {
        match self {
            ObjectKind::MagneticField(f) => f.field_at(p),
            _ => 0.0,
        }
    }

    pub fn is_time_varying(&self) -> bool {
        match self {
            ObjectKind::ParallelPlateCapacitor(c) => c.source.is_time_varying(),
            ObjectKind::VerticalParallelPlateCapacitor(c) => c.source.is_time_varying(),
            _ => false,
        }
    }

    /// Plate geometry for capacitor kinds.
    pub fn plate_frame(&self) -> Option<PlateFrame> {
        match self {
            ObjectKind::ParallelPlateCapacitor(c) => Some(c.plate_frame()),
            ObjectKind::VerticalParallelPlateCapacitor(c) => Some(c.plate_frame()),
            _ => None,
        }
    }

    /// Current value of a scalable dimension, if this kind has it.
    pub fn dimension(&self, key: DimensionKey) -> Option<f64> {
        use DimensionKey::*;
        match (self, key) {
            (ObjectKind::RectElectricField(f), Width) => Some(f.width),
            (ObjectKind::RectElectricField(f), Height) => Some(f.height),
            (ObjectKind::CircleElectricField(f), Radius) => Some(f.radius),
            (ObjectKind::SemiCircleElectricField(f), Radius) => Some(f.radius),
            (ObjectKind::ParallelPlateCapacitor(c), Width) => Some(c.width),
            (ObjectKind::ParallelPlateCapacitor(c), PlateDistance) => Some(c.plate_distance),
            (ObjectKind::VerticalParallelPlateCapacitor(c), Height) => Some(c.height),
            (ObjectKind::VerticalParallelPlateCapacitor(c), PlateDistance) => {
                Some(c.plate_distance)
            }
            (ObjectKind::MagneticField(f), Width) => Some(f.width),
            (ObjectKind::MagneticField(f), Height) => Some(f.height),
            (ObjectKind::MagneticField(f), Radius) => Some(f.radius),
            (ObjectKind::Particle(p), Radius) => Some(p.radius),
            (ObjectKind::ElectronGun(g), BarrelLength) => Some(g.barrel_length),
            (ObjectKind::ElectronGun(g), ParticleRadius) => Some(g.template.radius),
            (ObjectKind::ProgrammableEmitter(e), BarrelLength) => Some(e.barrel_length),
            (ObjectKind::ProgrammableEmitter(e), ParticleRadius) => Some(e.template.radius),
            (ObjectKind::DisappearZone(z), Length) => Some(z.length),
            (ObjectKind::DisappearZone(z), LineWidth) => Some(z.line_width),
            (ObjectKind::FluorescentScreen(s), Width) => Some(s.width),
            (ObjectKind::FluorescentScreen(s), Height) => Some(s.height),
            (ObjectKind::FluorescentScreen(s), Depth) => Some(s.depth),
            (ObjectKind::FluorescentScreen(s), ViewGap) => Some(s.view_gap),
            (ObjectKind::FluorescentScreen(s), SpotSize) => Some(s.spot_size),
            _ => None,
        }
    }

    /// Write a scalable dimension. Returns `false` if this kind has no such key.
    pub fn set_dimension(&mut self, key: DimensionKey, value: f64) -> bool {
        use DimensionKey::*;
        let slot = match (self, key) {
            (ObjectKind::RectElectricField(f), Width) => &mut f.width,
            (ObjectKind::RectElectricField(f), Height) => &mut f.height,
            (ObjectKind::CircleElectricField(f), Radius) => &mut f.radius,
            (ObjectKind::SemiCircleElectricField(f), Radius) => &mut f.radius,
            (ObjectKind::ParallelPlateCapacitor(c), Width) => &mut c.width,
            (ObjectKind::ParallelPlateCapacitor(c), PlateDistance) => &mut c.plate_distance,
            (ObjectKind::VerticalParallelPlateCapacitor(c), Height) => &mut c.height,
            (ObjectKind::VerticalParallelPlateCapacitor(c), PlateDistance) => {
                &mut c.plate_distance
            }
            (ObjectKind::MagneticField(f), Width) => &mut f.width,
            (ObjectKind::MagneticField(f), Height) => &mut f.height,
            (ObjectKind::MagneticField(f), Radius) => &mut f.radius,
            (ObjectKind::Particle(p), Radius) => &mut p.radius,
            (ObjectKind::ElectronGun(g), BarrelLength) => &mut g.barrel_length,
            (ObjectKind::ElectronGun(g), ParticleRadius) => &mut g.template.radius,
            (ObjectKind::ProgrammableEmitter(e), BarrelLength) => &mut e.barrel_length,
            (ObjectKind::ProgrammableEmitter(e), ParticleRadius) => &mut e.template.radius,
            (ObjectKind::DisappearZone(z), Length) => &mut z.length,
            (ObjectKind::DisappearZone(z), LineWidth) => &mut z.line_width,
            (ObjectKind::FluorescentScreen(s), Width) => &mut s.width,
            (ObjectKind::FluorescentScreen(s), Height) => &mut s.height,
            (ObjectKind::FluorescentScreen(s), Depth) => &mut s.depth,
            (ObjectKind::FluorescentScreen(s), ViewGap) => &mut s.view_gap,
            (ObjectKind::FluorescentScreen(s), SpotSize) => &mut s.spot_size,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Recompile every formula the object carries. Returns the failures.
    pub fn compile_formulas(&mut self, variables: &[String]) -> Vec<ExpressionError> {
        let mut errors = Vec::new();
        match self {
            ObjectKind::ParallelPlateCapacitor(c) => c.source.compile(variables, &mut errors),
            ObjectKind::VerticalParallelPlateCapacitor(c) => {
                c.source.compile(variables, &mut errors)
            }
            ObjectKind::Particle(p) => p.compile_velocity_expressions(variables, &mut errors),
            _ => {}
        }
        errors
    }

    /// Clear per-run state: trajectories, emitter cursors, screen hits.
    pub fn reset_runtime(&mut self) {
        match self {
            ObjectKind::Particle(p) => {
                p.trajectory.clear();
                p.stuck_to_capacitor = false;
                p.prev_position = None;
            }
            ObjectKind::ElectronGun(g) => g.reset_runtime(),
            ObjectKind::ProgrammableEmitter(e) => e.reset_runtime(),
            ObjectKind::FluorescentScreen(s) => s.hits.clear(),
            _ => {}
        }
    }

    pub fn as_particle(&self) -> Option<&Particle> {
        match self {
            ObjectKind::Particle(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_particle_mut(&mut self) -> Option<&mut Particle> {
        match self {
            ObjectKind::Particle(p) => Some(p),
            _ => None,
        }
    }
}

/// An object owned by the scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Assigned by the scene; ids found in imported JSON are ignored.
    #[serde(skip_deserializing)]
    pub id: ObjectId,
    #[serde(flatten)]
    pub kind: ObjectKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GeometryState>,
}

impl SceneObject {
    pub fn new(kind: ObjectKind) -> Self {
        Self { id: ObjectId::default(), kind, geometry: None }
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

impl From<ObjectKind> for SceneObject {
    fn from(kind: ObjectKind) -> Self {
        SceneObject::new(kind)
    }
}

macro_rules! impl_into_object {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for ObjectKind {
                fn from(value: $variant) -> Self {
                    ObjectKind::$variant(value)
                }
            }

            impl From<$variant> for SceneObject {
                fn from(value: $variant) -> Self {
                    SceneObject::new(ObjectKind::$variant(value))
                }
            }
        )*
    };
}

impl_into_object!(
    RectElectricField,
    CircleElectricField,
    SemiCircleElectricField,
    ParallelPlateCapacitor,
    VerticalParallelPlateCapacitor,
    MagneticField,
    Particle,
    ElectronGun,
    ProgrammableEmitter,
    DisappearZone,
    FluorescentScreen,
);
