// init_config.rs
// Optional TOML run configuration for the headless runner

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RunConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// Seconds per tick.
    pub dt: Option<f64>,
    pub steps: Option<usize>,
    pub viewport_width: Option<f64>,
    pub viewport_height: Option<f64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    pub path: Option<PathBuf>,
    /// Gzip the output; defaults to the output path's extension.
    pub compress: Option<bool>,
    /// Decimal places for the printed replay signature.
    pub precision: Option<u32>,
}

impl SimulationConfig {
    /// Viewport size, if both dimensions are given.
    pub fn viewport(&self) -> Option<(f64, f64)> {
        Some((self.viewport_width?, self.viewport_height?))
    }
}

impl RunConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: RunConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
