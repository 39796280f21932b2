// objects/fields.rs
// Uniform electric field regions and the magnetic field region

use serde::{Deserialize, Serialize};

use crate::vector::{self, Vec2};

const DEFAULT_STRENGTH: f64 = 1000.0;
const DEFAULT_DIRECTION: f64 = 90.0;

fn uniform(strength: f64, direction_deg: f64) -> Vec2 {
    vector::from_degrees(direction_deg) * strength
}

/// Rectangular field anchored at its top-left corner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RectElectricField {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Field magnitude (V/m).
    pub strength: f64,
    /// Field direction in degrees, 0 = +x, 90 = screen-down.
    pub direction: f64,
}

impl Default for RectElectricField {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 200.0,
            height: 150.0,
            strength: DEFAULT_STRENGTH,
            direction: DEFAULT_DIRECTION,
        }
    }
}

impl RectElectricField {
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    pub fn field_at(&self, p: Vec2) -> Vec2 {
        if self.contains_point(p) {
            uniform(self.strength, self.direction)
        } else {
            Vec2::zero()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CircleElectricField {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub strength: f64,
    pub direction: f64,
}

impl Default for CircleElectricField {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, radius: 100.0, strength: DEFAULT_STRENGTH, direction: DEFAULT_DIRECTION }
    }
}

impl CircleElectricField {
    pub fn contains_point(&self, p: Vec2) -> bool {
        (p - Vec2::new(self.x, self.y)).mag_sq() <= self.radius * self.radius
    }

    pub fn field_at(&self, p: Vec2) -> Vec2 {
        if self.contains_point(p) {
            uniform(self.strength, self.direction)
        } else {
            Vec2::zero()
        }
    }
}

/// Half disc: points within `radius` and within ±90° of `orientation`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SemiCircleElectricField {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub orientation: f64,
    pub strength: f64,
    pub direction: f64,
}

impl Default for SemiCircleElectricField {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            radius: 100.0,
            orientation: 0.0,
            strength: DEFAULT_STRENGTH,
            direction: DEFAULT_DIRECTION,
        }
    }
}

impl SemiCircleElectricField {
    pub fn contains_point(&self, p: Vec2) -> bool {
        let d = p - Vec2::new(self.x, self.y);
        if d.mag() > self.radius {
            return false;
        }
        let angle = d.y.atan2(d.x).to_degrees();
        // signed difference folded into [-180, 180)
        let diff = (angle - self.orientation + 180.0).rem_euclid(360.0) - 180.0;
        diff.abs() <= 90.0
    }

    pub fn field_at(&self, p: Vec2) -> Vec2 {
        if self.contains_point(p) {
            uniform(self.strength, self.direction)
        } else {
            Vec2::zero()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MagneticShape {
    #[default]
    Rect,
    Circle,
    Triangle,
}

/// Region of uniform out-of-screen field `Bz` (tesla).
///
/// Rect and triangle shapes use `(x, y)` as the top-left corner of their
/// bounding box; the triangle is isosceles with its apex at the top centre.
/// The circle shape is centred on `(x, y)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MagneticField {
    pub x: f64,
    pub y: f64,
    pub shape: MagneticShape,
    pub width: f64,
    pub height: f64,
    pub radius: f64,
    pub strength: f64,
}

impl Default for MagneticField {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            shape: MagneticShape::Rect,
            width: 200.0,
            height: 150.0,
            radius: 90.0,
            strength: 0.5,
        }
    }
}

impl MagneticField {
    pub fn contains_point(&self, p: Vec2) -> bool {
        match self.shape {
            MagneticShape::Rect => {
                p.x >= self.x
                    && p.x <= self.x + self.width
                    && p.y >= self.y
                    && p.y <= self.y + self.height
            }
            MagneticShape::Circle => {
                (p - Vec2::new(self.x, self.y)).mag_sq() <= self.radius * self.radius
            }
            MagneticShape::Triangle => {
                let [a, b, c] = self.triangle_vertices();
                let v0 = c - a;
                let v1 = b - a;
                let v2 = p - a;
                let dot00 = v0.dot(v0);
                let dot01 = v0.dot(v1);
                let dot02 = v0.dot(v2);
                let dot11 = v1.dot(v1);
                let dot12 = v1.dot(v2);
                let denom = dot00 * dot11 - dot01 * dot01;
                if denom == 0.0 {
                    return false;
                }
                let u = (dot11 * dot02 - dot01 * dot12) / denom;
                let v = (dot00 * dot12 - dot01 * dot02) / denom;
                u >= 0.0 && v >= 0.0 && u + v <= 1.0
            }
        }
    }

    /// Apex, bottom-left, bottom-right.
    pub fn triangle_vertices(&self) -> [Vec2; 3] {
        [
            Vec2::new(self.x + self.width / 2.0, self.y),
            Vec2::new(self.x, self.y + self.height),
            Vec2::new(self.x + self.width, self.y + self.height),
        ]
    }

    pub fn field_at(&self, p: Vec2) -> f64 {
        if self.contains_point(p) {
            self.strength
        } else {
            0.0
        }
    }
}
