// objects/detector.rs
// Passive geometry consulted by the physics engine: disappear zones and fluorescent screens

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::geometry::Segment;
use crate::vector::{self, Vec2};

/// Extra picking slack (px) around a disappear zone line.
const ZONE_PICK_SLACK: f64 = 6.0;

/// Line segment centred on `(x, y)` that absorbs particles passing through it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisappearZone {
    pub x: f64,
    pub y: f64,
    pub length: f64,
    /// Degrees.
    pub angle: f64,
    pub line_width: f64,
}

impl Default for DisappearZone {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, length: 320.0, angle: 0.0, line_width: 6.0 }
    }
}

impl DisappearZone {
    pub fn segment(&self) -> Segment {
        let half = vector::from_degrees(self.angle) * (self.length / 2.0);
        let c = Vec2::new(self.x, self.y);
        Segment::new(c - half, c + half)
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        self.segment().distance_to_point(p) <= self.line_width / 2.0 + ZONE_PICK_SLACK
    }

    /// Whether a particle moving `prev -> curr` passes through the zone.
    pub fn is_hit_by(&self, prev: Vec2, curr: Vec2) -> bool {
        let path = Segment::new(prev, curr);
        path.distance_to_segment(&self.segment()) <= self.line_width / 2.0
    }
}

/// A recorded impact, relative to the screen's front-view centre line.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreenHit {
    pub x: f64,
    pub y: f64,
    pub time: f64,
}

/// Detector centred on `(x, y)`; particles strike its left face.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FluorescentScreen {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub view_gap: f64,
    pub spot_size: f64,
    /// Seconds a hit stays visible.
    pub persistence: f64,
    #[serde(skip)]
    pub hits: VecDeque<ScreenHit>,
}

impl Default for FluorescentScreen {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 150.0,
            height: 150.0,
            depth: 30.0,
            view_gap: 12.0,
            spot_size: 6.0,
            persistence: 0.5,
            hits: VecDeque::new(),
        }
    }
}

impl FluorescentScreen {
    pub fn face_x(&self) -> f64 {
        self.x - self.width / 2.0
    }

    pub fn top(&self) -> f64 {
        self.y - self.height / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        (p.x - self.x).abs() <= self.width / 2.0 && (p.y - self.y).abs() <= self.height / 2.0
    }

    /// Impact point for a particle moving `prev -> curr`, if it struck the
    /// face this step or already sits inside the screen body.
    pub fn detect_hit(&self, prev: Vec2, curr: Vec2) -> Option<Vec2> {
        let face = self.face_x();
        let dx = curr.x - prev.x;
        if dx != 0.0 && (prev.x - face) * (curr.x - face) <= 0.0 {
            let t = (face - prev.x) / dx;
            let hit_y = prev.y + (curr.y - prev.y) * t;
            if hit_y >= self.top() && hit_y <= self.bottom() {
                return Some(Vec2::new(face, hit_y));
            }
        }
        if self.contains_point(curr) {
            return Some(Vec2::new(face, curr.y));
        }
        None
    }

    /// Store a hit at `p`; points outside the screen height are ignored.
    pub fn record_hit(&mut self, p: Vec2, time: f64) {
        let rel_y = p.y - self.y;
        if rel_y.abs() <= self.height / 2.0 {
            self.hits.push_back(ScreenHit { x: 0.0, y: rel_y, time });
        }
    }

    /// Drop hits older than `persistence` seconds.
    pub fn prune_hits(&mut self, now: f64) {
        let cutoff = now - self.persistence;
        self.hits.retain(|hit| hit.time >= cutoff);
    }
}
