// geometry/segment.rs
// Line segment helpers shared by collision and tangency code

use crate::vector::Vec2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
}

impl Segment {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    pub fn length(&self) -> f64 {
        (self.b - self.a).mag()
    }

    /// Closest point on the segment to `p` and its parameter in `[0, 1]`.
    pub fn closest_point(&self, p: Vec2) -> (Vec2, f64) {
        let d = self.b - self.a;
        let len_sq = d.mag_sq();
        if len_sq <= 0.0 {
            return (self.a, 0.0);
        }
        let t = ((p - self.a).dot(d) / len_sq).clamp(0.0, 1.0);
        (self.a + d * t, t)
    }

    pub fn distance_to_point(&self, p: Vec2) -> f64 {
        (p - self.closest_point(p).0).mag()
    }

    /// True when the two segments touch or cross, collinear overlap included.
    pub fn intersects(&self, other: &Segment) -> bool {
        let (p1, q1, p2, q2) = (self.a, self.b, other.a, other.b);
        let o1 = orientation(p1, q1, p2);
        let o2 = orientation(p1, q1, q2);
        let o3 = orientation(p2, q2, p1);
        let o4 = orientation(p2, q2, q1);

        if o1 != o2 && o3 != o4 {
            return true;
        }
        (o1 == 0 && on_segment(p1, p2, q1))
            || (o2 == 0 && on_segment(p1, q2, q1))
            || (o3 == 0 && on_segment(p2, p1, q2))
            || (o4 == 0 && on_segment(p2, q1, q2))
    }

    /// Minimum distance between two segments; zero when they intersect.
    pub fn distance_to_segment(&self, other: &Segment) -> f64 {
        if self.intersects(other) {
            return 0.0;
        }
        self.distance_to_point(other.a)
            .min(self.distance_to_point(other.b))
            .min(other.distance_to_point(self.a))
            .min(other.distance_to_point(self.b))
    }
}

/// 0 = collinear, 1 = clockwise, 2 = counter-clockwise.
fn orientation(p: Vec2, q: Vec2, r: Vec2) -> u8 {
    let val = (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y);
    if val.abs() < 1e-12 {
        0
    } else if val > 0.0 {
        1
    } else {
        2
    }
}

/// Whether `q` lies within the bounding box of `p`..`r`.
fn on_segment(p: Vec2, q: Vec2, r: Vec2) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}
