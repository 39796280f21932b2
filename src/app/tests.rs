use super::*;
use crate::init_config::{OutputConfig, SimulationConfig};
use crate::config::{DEFAULT_DT, DEFAULT_STEPS};

fn cli(args: &[&str]) -> Cli {
    Cli::parse_from(std::iter::once("em_sandbox").chain(args.iter().copied()))
}

mod plans {
    use super::*;

    #[test]
    fn defaults_apply_without_flags_or_config() {
        let plan = RunPlan::resolve(&cli(&["scene.json"]), &RunConfig::default()).unwrap();
        assert_eq!(plan.dt, DEFAULT_DT);
        assert_eq!(plan.steps, DEFAULT_STEPS);
        assert_eq!(plan.out, None);
        assert!(!plan.compress);
        assert!(!plan.print_signature);
    }

    #[test]
    fn flags_override_config() {
        let config = RunConfig {
            simulation: SimulationConfig { dt: Some(0.5), steps: Some(3), ..Default::default() },
            output: OutputConfig { path: Some("from_config.json".into()), ..Default::default() },
        };
        let plan = RunPlan::resolve(&cli(&["s.json", "--steps", "7", "--out", "x.json.gz"]), &config).unwrap();
        assert_eq!(plan.dt, 0.5);
        assert_eq!(plan.steps, 7);
        assert_eq!(plan.out, Some(PathBuf::from("x.json.gz")));
        assert!(plan.compress);
    }

    #[test]
    fn bad_dt_is_rejected() {
        assert!(RunPlan::resolve(&cli(&["s.json", "--dt", "0"]), &RunConfig::default()).is_err());
    }

    #[test]
    fn preset_and_scene_conflict() {
        let parsed = Cli::try_parse_from(["em_sandbox", "s.json", "--preset", "cyclotron"]);
        assert!(parsed.is_err());
    }
}

mod running {
    use super::*;

    #[test]
    fn preset_run_accumulates_reports() {
        let c = cli(&["--preset", "capacitor-deflection"]);
        let plan = RunPlan::resolve(&c, &RunConfig::default()).unwrap();
        let mut scene = initial_scene(&c, &plan).unwrap();
        assert_eq!(scene.viewport.map(|v| (v.width, v.height)), Some(plan.viewport));

        let total = simulate(&mut scene, &PhysicsEngine::new(), plan.dt, 10);
        assert_eq!(total.emitted, 0);
        assert!((scene.time - 10.0 * plan.dt).abs() < 1e-12);
    }

    #[test]
    fn missing_source_is_an_error() {
        let c = cli(&[]);
        let plan = RunPlan::resolve(&c, &RunConfig::default()).unwrap();
        assert!(initial_scene(&c, &plan).is_err());
        let c = cli(&["--preset", "nope"]);
        assert!(initial_scene(&c, &plan).is_err());
    }
}
