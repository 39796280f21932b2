// app/plan.rs
// Resolves command-line flags and the TOML run config into one run plan

use std::path::PathBuf;

use anyhow::{bail, Result};

use super::Cli;
use crate::config::{DEFAULT_DT, DEFAULT_STEPS, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH};
use crate::init_config::RunConfig;
use crate::io;
use crate::scene::SIGNATURE_DECIMALS;

/// Everything a run needs. Flags win over the config file, which wins over
/// the built-in defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct RunPlan {
    pub dt: f64,
    pub steps: usize,
    pub viewport: (f64, f64),
    pub out: Option<PathBuf>,
    pub compress: bool,
    pub precision: u32,
    pub print_signature: bool,
}

impl RunPlan {
    pub fn resolve(cli: &Cli, config: &RunConfig) -> Result<Self> {
        let sim = &config.simulation;
        let dt = cli.dt.or(sim.dt).unwrap_or(DEFAULT_DT);
        if !(dt.is_finite() && dt > 0.0) {
            bail!("dt must be a positive number, got {dt}");
        }
        let width = cli.width.or(sim.viewport_width).unwrap_or(DEFAULT_VIEWPORT_WIDTH);
        let height = cli.height.or(sim.viewport_height).unwrap_or(DEFAULT_VIEWPORT_HEIGHT);
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            bail!("viewport must be positive, got {width}x{height}");
        }
        let out = cli.out.clone().or_else(|| config.output.path.clone());
        let compress = config
            .output
            .compress
            .unwrap_or_else(|| out.as_ref().is_some_and(io::wants_gzip));
        Ok(Self {
            dt,
            steps: cli.steps.or(sim.steps).unwrap_or(DEFAULT_STEPS),
            viewport: (width, height),
            out,
            compress,
            precision: config.output.precision.unwrap_or(SIGNATURE_DECIMALS),
            print_signature: cli.signature,
        })
    }
}
