// objects/capacitor.rs
// Parallel-plate capacitors and their DC / AC / custom source model

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use super::Formula;
use crate::expression::ExpressionError;
use crate::vector::{self, Vec2};

pub const DEFAULT_CUSTOM_EXPRESSION: &str = "Math.sin(2 * Math.PI * 50 * t)";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Dc,
    Ac,
    Custom,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Triangle,
}

impl Waveform {
    /// Unit-amplitude wave at phase angle `theta` (radians).
    pub fn sample(self, theta: f64) -> f64 {
        match self {
            Waveform::Sine => theta.sin(),
            Waveform::Square => {
                if theta.sin() >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => {
                let frac = theta / TAU;
                let pos = frac - frac.floor();
                if pos < 0.5 {
                    pos * 4.0 - 1.0
                } else {
                    3.0 - pos * 4.0
                }
            }
        }
    }
}

/// How a capacitor's field strength evolves over time.
///
/// `dc` uses the capacitor's `strength`. `ac` produces
/// `dcBias + acAmplitude * wave(2π·f·t + phase)`. `custom` produces
/// `dcBias + acAmplitude * expr(t)`. A missing `acAmplitude` falls back to
/// the capacitor's `strength`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CapacitorSource {
    pub source_type: SourceType,
    pub ac_amplitude: Option<f64>,
    pub ac_frequency: f64,
    /// Degrees.
    pub ac_phase: f64,
    pub dc_bias: f64,
    pub waveform: Waveform,
    pub custom_expression: Formula,
}

impl Default for CapacitorSource {
    fn default() -> Self {
        Self {
            source_type: SourceType::Dc,
            ac_amplitude: None,
            ac_frequency: 50.0,
            ac_phase: 0.0,
            dc_bias: 0.0,
            waveform: Waveform::Sine,
            custom_expression: Formula::new(DEFAULT_CUSTOM_EXPRESSION),
        }
    }
}

impl CapacitorSource {
    pub fn is_time_varying(&self) -> bool {
        matches!(self.source_type, SourceType::Ac | SourceType::Custom)
    }

    pub fn effective_strength(&self, strength: f64, t: f64, variables: &BTreeMap<String, f64>) -> f64 {
        let amplitude = self.ac_amplitude.unwrap_or(strength);
        let value = match self.source_type {
            SourceType::Dc => strength,
            SourceType::Ac => {
                let theta = TAU * self.ac_frequency * t + self.ac_phase.to_radians();
                self.dc_bias + amplitude * self.waveform.sample(theta)
            }
            SourceType::Custom => {
                let wave = self.custom_expression.evaluate(t, variables).unwrap_or(0.0);
                self.dc_bias + amplitude * wave
            }
        };
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }

    pub(crate) fn compile(&mut self, variables: &[String], errors: &mut Vec<ExpressionError>) {
        if let Err(err) = self.custom_expression.compile(variables) {
            // Only matters when the custom source is selected.
            if self.source_type == SourceType::Custom {
                errors.push(err);
            }
        }
    }
}

/// Plate pair geometry in a capacitor-local frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlateFrame {
    pub center: Vec2,
    /// Unit axis across the gap, from one plate to the other.
    pub gap_axis: Vec2,
    /// Unit axis along the plates.
    pub span_axis: Vec2,
    pub half_gap: f64,
    pub half_span: f64,
}

impl PlateFrame {
    /// Offset of `p` from the centre as `(along_span, along_gap)`.
    pub fn project(&self, p: Vec2) -> (f64, f64) {
        let d = p - self.center;
        (d.dot(self.span_axis), d.dot(self.gap_axis))
    }

    pub fn unproject(&self, along_span: f64, along_gap: f64) -> Vec2 {
        self.center + self.span_axis * along_span + self.gap_axis * along_gap
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        let (span, gap) = self.project(p);
        span.abs() <= self.half_span && gap.abs() <= self.half_gap
    }

    /// The two plates as segments, the `-gap` plate first.
    pub fn plates(&self) -> [(Vec2, Vec2); 2] {
        let plate = |side: f64| {
            (
                self.unproject(-self.half_span, side * self.half_gap),
                self.unproject(self.half_span, side * self.half_gap),
            )
        };
        [plate(-1.0), plate(1.0)]
    }
}

/// Capacitor whose field points along `direction`; plates run perpendicular to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParallelPlateCapacitor {
    pub x: f64,
    pub y: f64,
    /// Plate length.
    pub width: f64,
    pub plate_distance: f64,
    pub strength: f64,
    pub direction: f64,
    /// `1` or `-1`.
    pub polarity: f64,
    #[serde(flatten)]
    pub source: CapacitorSource,
}

impl Default for ParallelPlateCapacitor {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 200.0,
            plate_distance: 80.0,
            strength: 1000.0,
            direction: 90.0,
            polarity: 1.0,
            source: CapacitorSource::default(),
        }
    }
}

impl ParallelPlateCapacitor {
    pub fn plate_frame(&self) -> PlateFrame {
        PlateFrame {
            center: Vec2::new(self.x, self.y),
            gap_axis: vector::from_degrees(self.direction),
            span_axis: vector::from_degrees(self.direction + 90.0),
            half_gap: self.plate_distance / 2.0,
            half_span: self.width / 2.0,
        }
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        self.plate_frame().contains_point(p)
    }

    pub fn effective_strength(&self, t: f64, variables: &BTreeMap<String, f64>) -> f64 {
        self.source.effective_strength(self.strength, t, variables)
    }

    pub fn field_at(&self, p: Vec2, t: f64, variables: &BTreeMap<String, f64>) -> Vec2 {
        if !self.contains_point(p) {
            return Vec2::zero();
        }
        vector::from_degrees(self.direction) * (self.effective_strength(t, variables) * self.polarity)
    }
}

/// Capacitor drawn as a centred vertical strip; the gap runs along x and
/// the field along y.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VerticalParallelPlateCapacitor {
    pub x: f64,
    pub y: f64,
    pub height: f64,
    pub plate_distance: f64,
    pub strength: f64,
    pub polarity: f64,
    #[serde(flatten)]
    pub source: CapacitorSource,
}

impl Default for VerticalParallelPlateCapacitor {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            height: 200.0,
            plate_distance: 80.0,
            strength: 1000.0,
            polarity: 1.0,
            source: CapacitorSource::default(),
        }
    }
}

impl VerticalParallelPlateCapacitor {
    pub fn plate_frame(&self) -> PlateFrame {
        PlateFrame {
            center: Vec2::new(self.x, self.y),
            gap_axis: Vec2::new(1.0, 0.0),
            span_axis: Vec2::new(0.0, 1.0),
            half_gap: self.plate_distance / 2.0,
            half_span: self.height / 2.0,
        }
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        self.plate_frame().contains_point(p)
    }

    pub fn effective_strength(&self, t: f64, variables: &BTreeMap<String, f64>) -> f64 {
        self.source.effective_strength(self.strength, t, variables)
    }

    pub fn field_at(&self, p: Vec2, t: f64, variables: &BTreeMap<String, f64>) -> Vec2 {
        if !self.contains_point(p) {
            return Vec2::zero();
        }
        Vec2::new(0.0, self.effective_strength(t, variables) * self.polarity)
    }
}
