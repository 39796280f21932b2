//! Geometry helpers: segments, real/display size scaling, demo zoom and
//! tangency snapping.

mod demo;
mod scaling;
mod segment;
pub mod tangency;


pub use demo::{apply_demo_zoom, next_demo_zoom};
pub use scaling::{
    capture_real_geometry, ensure_geometry_state, object_scale, real_dimension, sanitize_scale,
    set_display_dimension, set_real_dimension, sync_display_geometry, GEOMETRY_DECIMALS,
};
pub use segment::Segment;
pub use tangency::{
    compute_point_tangency_match, compute_tangency_match, pick_best, Candidate, CandidateShape,
    Circle, MatchKind, Relation, SnapTarget, TangencyMatch, TangencyMode,
};
