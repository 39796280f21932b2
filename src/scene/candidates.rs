// scene/candidates.rs
// Shapes scene objects expose to tangency snapping

use super::Scene;
use crate::geometry::{Candidate, CandidateShape, Circle, Segment};
use crate::objects::{MagneticShape, ObjectId, ObjectKind};
use crate::vector::{self, Vec2};

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn rect_segments(x: f64, y: f64, w: f64, h: f64) -> Vec<Segment> {
    if !(x.is_finite() && y.is_finite() && positive(w) && positive(h)) {
        return Vec::new();
    }
    let tl = Vec2::new(x, y);
    let tr = Vec2::new(x + w, y);
    let br = Vec2::new(x + w, y + h);
    let bl = Vec2::new(x, y + h);
    vec![Segment::new(tl, tr), Segment::new(tr, br), Segment::new(br, bl), Segment::new(bl, tl)]
}

/// Circular outline of an object, if it has one.
pub(super) fn circle_of(kind: &ObjectKind) -> Option<Circle> {
    let circle = match kind {
        ObjectKind::CircleElectricField(f) => Circle::new(Vec2::new(f.x, f.y), f.radius),
        ObjectKind::MagneticField(f) if f.shape == MagneticShape::Circle => {
            Circle::new(Vec2::new(f.x, f.y), f.radius)
        }
        _ => return None,
    };
    (vector::is_finite(circle.center) && positive(circle.radius)).then_some(circle)
}

/// Point-like objects (emitters) snap by their centre.
pub(super) fn point_of(kind: &ObjectKind) -> Option<Vec2> {
    match kind {
        ObjectKind::ElectronGun(_) | ObjectKind::ProgrammableEmitter(_) => {
            Some(kind.position()).filter(|p| vector::is_finite(*p))
        }
        _ => None,
    }
}

pub(super) fn segments_of(kind: &ObjectKind) -> Vec<Segment> {
    match kind {
        ObjectKind::RectElectricField(f) => rect_segments(f.x, f.y, f.width, f.height),
        ObjectKind::MagneticField(f) => match f.shape {
            MagneticShape::Rect => rect_segments(f.x, f.y, f.width, f.height),
            MagneticShape::Triangle if positive(f.width) && positive(f.height) => {
                let [a, b, c] = f.triangle_vertices();
                vec![Segment::new(a, b), Segment::new(b, c), Segment::new(c, a)]
            }
            _ => Vec::new(),
        },
        ObjectKind::DisappearZone(z) if positive(z.length) => vec![z.segment()],
        ObjectKind::ParallelPlateCapacitor(_) | ObjectKind::VerticalParallelPlateCapacitor(_) => kind
            .plate_frame()
            .map(|frame| frame.plates().into_iter().map(|(a, b)| Segment::new(a, b)).collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

impl Scene {
    /// Snap candidates from every object except `exclude`.
    pub fn tangency_candidates(&self, exclude: Option<ObjectId>) -> Vec<Candidate> {
        let mut out = Vec::new();
        for object in self.objects.iter().filter(|obj| Some(obj.id) != exclude) {
            let owner = Some(object.id);
            if let Some(circle) = circle_of(&object.kind) {
                out.push(Candidate::new(owner, CandidateShape::Circle(circle)));
                continue;
            }
            if let Some(point) = point_of(&object.kind) {
                out.push(Candidate::new(owner, CandidateShape::Point(point)));
                continue;
            }
            out.extend(
                segments_of(&object.kind)
                    .into_iter()
                    .map(|segment| Candidate::new(owner, CandidateShape::Segment(segment))),
            );
        }
        out
    }

    /// The circle to snap with when `id` is being dragged as a circle.
    pub fn circle_boundary(&self, id: ObjectId) -> Option<Circle> {
        circle_of(&self.object(id)?.kind)
    }

    pub fn point_boundary(&self, id: ObjectId) -> Option<Vec2> {
        point_of(&self.object(id)?.kind)
    }
}
