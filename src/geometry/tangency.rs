// geometry/tangency.rs
// Near-tangent snapping between a dragged circle (or point) and nearby shapes

use crate::geometry::Segment;
use crate::objects::ObjectId;
use crate::vector::{self, Vec2};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TangencyMode {
    /// Keep the radius, nudge the centre.
    #[default]
    Move,
    /// Keep the centre, adjust the radius.
    Resize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Vec2, radius: f64) -> Self {
        Self { center, radius }
    }

    fn is_valid(&self) -> bool {
        vector::is_finite(self.center) && self.radius.is_finite() && self.radius > 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CandidateShape {
    Circle(Circle),
    Segment(Segment),
    Point(Vec2),
}

/// A shape the dragged object may snap against, tagged with its owner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub object_id: Option<ObjectId>,
    pub shape: CandidateShape,
}

impl Candidate {
    pub fn new(object_id: Option<ObjectId>, shape: CandidateShape) -> Self {
        Self { object_id, shape }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchKind {
    CircleCircle,
    CircleSegment,
    CirclePoint,
    PointCircle,
    PointSegment,
}

impl MatchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchKind::CircleCircle => "circle-circle",
            MatchKind::CircleSegment => "circle-segment",
            MatchKind::CirclePoint => "circle-point",
            MatchKind::PointCircle => "point-circle",
            MatchKind::PointSegment => "point-segment",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    Outer,
    Inner,
    /// The dragged point lies on the candidate.
    On,
}

/// Where the dragged shape should go to be exactly tangent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SnapTarget {
    pub center: Option<Vec2>,
    pub radius: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TangencyMatch {
    pub kind: MatchKind,
    pub relation: Relation,
    /// Distance from exact tangency (px).
    pub error_px: f64,
    /// How far the drag has to be corrected to snap (px).
    pub movement_px: f64,
    pub candidate: Candidate,
    pub snap_target: SnapTarget,
}

/// Lowest error wins; ties go to the smaller correction.
pub fn pick_best(matches: impl IntoIterator<Item = TangencyMatch>) -> Option<TangencyMatch> {
    matches.into_iter().min_by(|a, b| {
        a.error_px
            .total_cmp(&b.error_px)
            .then_with(|| a.movement_px.total_cmp(&b.movement_px))
    })
}

fn direction_or_x(d: Vec2) -> (Vec2, f64) {
    let len = d.mag();
    if len > 0.0 {
        (d / len, len)
    } else {
        (Vec2::new(1.0, 0.0), 0.0)
    }
}

fn resize_match(
    kind: MatchKind,
    relation: Relation,
    active: &Circle,
    target_radius: f64,
    tolerance: f64,
    candidate: &Candidate,
) -> Option<TangencyMatch> {
    if !(target_radius > 0.0) {
        return None;
    }
    let error_px = (active.radius - target_radius).abs();
    if error_px > tolerance {
        return None;
    }
    Some(TangencyMatch {
        kind,
        relation,
        error_px,
        movement_px: error_px,
        candidate: *candidate,
        snap_target: SnapTarget { center: None, radius: Some(target_radius) },
    })
}

pub fn circle_circle(
    active: &Circle,
    other: &Circle,
    candidate: &Candidate,
    tolerance: f64,
    mode: TangencyMode,
) -> Option<TangencyMatch> {
    if !active.is_valid() || !other.is_valid() {
        return None;
    }
    let (dir, d) = direction_or_x(active.center - other.center);

    if mode == TangencyMode::Resize {
        let targets = [
            (Relation::Outer, d - other.radius),
            (Relation::Inner, (other.radius - d).abs()),
            (Relation::Inner, other.radius + d),
        ];
        return pick_best(targets.into_iter().filter_map(|(relation, r)| {
            resize_match(MatchKind::CircleCircle, relation, active, r, tolerance, candidate)
        }));
    }

    let outer_error = (d - (active.radius + other.radius)).abs();
    let inner_error = (d - (active.radius - other.radius).abs()).abs();
    let (relation, error_px, target_distance) = if outer_error <= inner_error {
        (Relation::Outer, outer_error, active.radius + other.radius)
    } else {
        (Relation::Inner, inner_error, (active.radius - other.radius).abs())
    };
    if error_px > tolerance {
        return None;
    }
    let target = other.center + dir * target_distance;
    Some(TangencyMatch {
        kind: MatchKind::CircleCircle,
        relation,
        error_px,
        movement_px: (target - active.center).mag(),
        candidate: *candidate,
        snap_target: SnapTarget { center: Some(target), radius: Some(active.radius) },
    })
}

pub fn circle_segment(
    active: &Circle,
    segment: &Segment,
    candidate: &Candidate,
    tolerance: f64,
    mode: TangencyMode,
) -> Option<TangencyMatch> {
    if !active.is_valid() || !vector::is_finite(segment.a) || !vector::is_finite(segment.b) {
        return None;
    }
    let (nearest, _) = segment.closest_point(active.center);
    let distance = (active.center - nearest).mag();

    if mode == TangencyMode::Resize {
        return resize_match(
            MatchKind::CircleSegment,
            Relation::Outer,
            active,
            distance,
            tolerance,
            candidate,
        );
    }

    let error_px = (distance - active.radius).abs();
    if error_px > tolerance {
        return None;
    }
    let normal = if distance > 0.0 {
        (active.center - nearest) / distance
    } else {
        // centre on the line: push out along the left-hand normal
        let d = segment.b - segment.a;
        direction_or_x(Vec2::new(-d.y, d.x)).0
    };
    let target = nearest + normal * active.radius;
    Some(TangencyMatch {
        kind: MatchKind::CircleSegment,
        relation: Relation::Outer,
        error_px,
        movement_px: (target - active.center).mag(),
        candidate: *candidate,
        snap_target: SnapTarget { center: Some(target), radius: Some(active.radius) },
    })
}

/// Circle boundary passing through a fixed point.
pub fn circle_point(
    active: &Circle,
    point: Vec2,
    candidate: &Candidate,
    tolerance: f64,
    mode: TangencyMode,
) -> Option<TangencyMatch> {
    if !active.is_valid() || !vector::is_finite(point) {
        return None;
    }
    let (dir, d) = direction_or_x(active.center - point);

    if mode == TangencyMode::Resize {
        return resize_match(MatchKind::CirclePoint, Relation::On, active, d, tolerance, candidate);
    }

    let error_px = (d - active.radius).abs();
    if error_px > tolerance {
        return None;
    }
    let target = point + dir * active.radius;
    Some(TangencyMatch {
        kind: MatchKind::CirclePoint,
        relation: Relation::On,
        error_px,
        movement_px: (target - active.center).mag(),
        candidate: *candidate,
        snap_target: SnapTarget { center: Some(target), radius: Some(active.radius) },
    })
}

/// Dragged point onto a circle boundary.
pub fn point_circle(point: Vec2, circle: &Circle, candidate: &Candidate, tolerance: f64) -> Option<TangencyMatch> {
    if !vector::is_finite(point) || !circle.is_valid() {
        return None;
    }
    let (dir, d) = direction_or_x(point - circle.center);
    let error_px = (d - circle.radius).abs();
    if error_px > tolerance {
        return None;
    }
    let target = circle.center + dir * circle.radius;
    Some(TangencyMatch {
        kind: MatchKind::PointCircle,
        relation: Relation::On,
        error_px,
        movement_px: (target - point).mag(),
        candidate: *candidate,
        snap_target: SnapTarget { center: Some(target), radius: None },
    })
}

/// Dragged point onto a segment.
pub fn point_segment(point: Vec2, segment: &Segment, candidate: &Candidate, tolerance: f64) -> Option<TangencyMatch> {
    if !vector::is_finite(point) {
        return None;
    }
    let (nearest, _) = segment.closest_point(point);
    let error_px = (point - nearest).mag();
    if !(error_px <= tolerance) {
        return None;
    }
    Some(TangencyMatch {
        kind: MatchKind::PointSegment,
        relation: Relation::On,
        error_px,
        movement_px: error_px,
        candidate: *candidate,
        snap_target: SnapTarget { center: Some(nearest), radius: None },
    })
}

/// Best tangency between a dragged circle and `candidates`, or `None`.
pub fn compute_tangency_match(
    active: &Circle,
    candidates: &[Candidate],
    tolerance: f64,
    mode: TangencyMode,
) -> Option<TangencyMatch> {
    if !active.is_valid() {
        return None;
    }
    pick_best(candidates.iter().filter_map(|c| match &c.shape {
        CandidateShape::Circle(other) => circle_circle(active, other, c, tolerance, mode),
        CandidateShape::Segment(segment) => circle_segment(active, segment, c, tolerance, mode),
        CandidateShape::Point(point) => circle_point(active, *point, c, tolerance, mode),
    }))
}

/// Best snap for a dragged point. Point candidates are ignored.
pub fn compute_point_tangency_match(
    point: Vec2,
    candidates: &[Candidate],
    tolerance: f64,
) -> Option<TangencyMatch> {
    pick_best(candidates.iter().filter_map(|c| match &c.shape {
        CandidateShape::Circle(circle) => point_circle(point, circle, c, tolerance),
        CandidateShape::Segment(segment) => point_segment(point, segment, c, tolerance),
        CandidateShape::Point(_) => None,
    }))
}
