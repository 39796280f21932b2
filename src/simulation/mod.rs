// simulation/mod.rs
// Re-exports and module declarations for simulation submodules

pub mod boundary;
pub mod collision;
mod engine;
pub mod forces;
pub mod integrator;

pub use engine::{PhysicsEngine, StepReport};
pub use forces::ForceBreakdown;

#[cfg(test)]
mod tests;
