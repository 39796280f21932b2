// app/mod.rs
// Headless runner: load a scene, step it, write the result or its replay signature

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;

use crate::init_config::RunConfig;
use crate::io;
use crate::scene::{presets, Scene};
use crate::simulation::{PhysicsEngine, StepReport};

mod plan;

pub use plan::RunPlan;

#[cfg(test)]
mod tests;

#[derive(Debug, Parser)]
#[command(name = "em_sandbox", about = "Step an electromagnetism sandbox scene headlessly")]
pub struct Cli {
    /// Scene file (`.json` or gzip-compressed).
    pub scene: Option<PathBuf>,
    /// Start from a built-in preset instead of a file.
    #[arg(long, conflicts_with = "scene")]
    pub preset: Option<String>,
    /// List built-in presets and exit.
    #[arg(long)]
    pub list_presets: bool,
    /// TOML run configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub steps: Option<usize>,
    /// Seconds per step.
    #[arg(long)]
    pub dt: Option<f64>,
    #[arg(long)]
    pub width: Option<f64>,
    #[arg(long)]
    pub height: Option<f64>,
    /// Write the final scene here (gzip when the name ends in `.gz`).
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Print the replay signature of the final scene.
    #[arg(long)]
    pub signature: bool,
}

fn initial_scene(cli: &Cli, plan: &RunPlan) -> Result<Scene> {
    let data = match (&cli.scene, &cli.preset) {
        (Some(path), _) => {
            io::load_scene(path).with_context(|| format!("reading scene {}", path.display()))?
        }
        (None, Some(name)) => presets::get(name)
            .map(|preset| preset.data.clone())
            .ok_or_else(|| anyhow!("unknown preset \"{name}\""))?,
        (None, None) => bail!("give a scene file or --preset"),
    };
    let mut scene = Scene::new();
    scene.set_viewport(plan.viewport.0, plan.viewport.1);
    scene.load_from_data(&data)?;
    Ok(scene)
}

/// Step `scene` `steps` times and sum the per-step reports.
pub fn simulate(scene: &mut Scene, engine: &PhysicsEngine, dt: f64, steps: usize) -> StepReport {
    let mut total = StepReport::default();
    for _ in 0..steps {
        let report = engine.update(scene, dt);
        total.emitted += report.emitted;
        total.removed += report.removed;
        total.frozen += report.frozen;
    }
    total
}

pub fn run(cli: Cli) -> Result<()> {
    if cli.list_presets {
        for name in presets::names() {
            if let Some(preset) = presets::get(name) {
                println!("{name:<24} {}", preset.title);
            }
        }
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => RunConfig::load_from_file(path)
            .map_err(|err| anyhow!("reading config {}: {err}", path.display()))?,
        None => RunConfig::default(),
    };
    let plan = RunPlan::resolve(&cli, &config)?;
    let mut scene = initial_scene(&cli, &plan)?;

    let engine = PhysicsEngine::new();
    let total = simulate(&mut scene, &engine, plan.dt, plan.steps);
    log::info!(
        "ran {} steps to t={:.4}s: {} particles left, {} emitted, {} removed",
        plan.steps,
        scene.time,
        scene.particles().count(),
        total.emitted,
        total.removed
    );
    #[cfg(feature = "profiling")]
    crate::PROFILER.lock().log_and_clear();

    if plan.print_signature {
        let signature = scene.signature(plan.precision)?;
        println!("{}", serde_json::to_string_pretty(&signature)?);
    }
    if let Some(out) = &plan.out {
        io::save_scene(out, &scene.serialize()?, plan.compress)
            .with_context(|| format!("writing {}", out.display()))?;
        log::info!("saved scene to {}", out.display());
    }
    Ok(())
}
