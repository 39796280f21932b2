pub mod config;
pub mod expression;
pub mod geometry;
pub mod init_config;
pub mod io;
pub mod objects;
pub mod profiler;
pub mod scene;
pub mod simulation;
pub mod species;
pub mod units;
pub mod vector;

pub mod app;

#[cfg(feature = "profiling")]
use once_cell::sync::Lazy;
#[cfg(feature = "profiling")]
use parking_lot::Mutex;

#[cfg(feature = "profiling")]
pub static PROFILER: Lazy<Mutex<profiler::Profiler>> =
    Lazy::new(|| Mutex::new(profiler::Profiler::new()));
