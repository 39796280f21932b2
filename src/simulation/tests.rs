use super::boundary::handle_boundaries;
use super::collision::{self, HookOutcome};
use super::forces::{self, gravity_force, magnetic_force};
use super::integrator::rk4_step;
use super::*;
use crate::config::{BoundaryMode, SceneSettings};
use crate::objects::{
    DisappearZone, ElectronGun, FluorescentScreen, Formula, MagneticField, ObjectId, ObjectKind, Particle,
    ParticleTemplate, RectElectricField, ScreenHit, VerticalParallelPlateCapacitor,
};
use crate::scene::{Bounds, Scene};
use crate::vector::Vec2;

fn unit_particle(x: f64, y: f64, vx: f64, vy: f64) -> Particle {
    Particle::new(Vec2::new(x, y), Vec2::new(vx, vy), 1.0, 1.0)
}

fn approx(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

mod force_terms {
    use super::*;

    #[test]
    fn magnetic_force_points_screen_down_for_positive_charge() {
        let f = magnetic_force(1.0, Vec2::new(10.0, 0.0), 1.0, 1.0);
        assert_eq!(f, Vec2::new(0.0, 10.0));

        let f = magnetic_force(3.0, Vec2::new(5.0, 0.0), -2.0, 1.0);
        assert_eq!(f.y, -30.0);
    }

    #[test]
    fn magnetic_force_uses_metres_per_second() {
        let f = magnetic_force(1.0, Vec2::new(100.0, 0.0), 1.0, 100.0);
        assert!(approx(f.y, 1.0, 1e-12));
    }

    #[test]
    fn gravity_respects_ignore_flag() {
        assert_eq!(gravity_force(2.0, 9.8, false), Vec2::new(0.0, 19.6));
        assert_eq!(gravity_force(2.0, 9.8, true), Vec2::zero());
    }

    #[test]
    fn breakdown_sums_all_sources() {
        let mut scene = Scene::new();
        scene.settings.pixels_per_meter = 2.0;
        scene.add_object(RectElectricField {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            strength: 10.0,
            direction: 0.0,
        });
        scene.add_object(MagneticField {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            strength: 2.0,
            ..Default::default()
        });
        let p = Particle { charge: 2.0, ignore_gravity: false, ..unit_particle(50.0, 50.0, 10.0, 0.0) };

        let b = forces::breakdown(&p, &scene);
        assert_eq!(b.electric, Vec2::new(20.0, 0.0));
        assert!(approx(b.magnetic.y, 20.0, 1e-12));
        assert_eq!(b.gravity, Vec2::new(0.0, 9.8));
        assert!(approx(b.total.x, 20.0, 1e-12));
        assert!(approx(b.total.y, 29.8, 1e-12));
    }
}

mod integration {
    use super::*;

    #[test]
    fn constant_field_is_integrated_exactly() {
        let mut scene = Scene::new();
        scene.add_object(RectElectricField {
            x: 0.0,
            y: 0.0,
            width: 1000.0,
            height: 1000.0,
            strength: 10.0,
            direction: 0.0,
        });
        let mut p = unit_particle(100.0, 100.0, 0.0, 0.0);
        rk4_step(&mut p, &scene, 0.1, 0.0);
        assert!(approx(p.position.x, 100.05, 1e-12));
        assert!(approx(p.velocity.x, 1.0, 1e-12));
        assert_eq!(p.position.y, 100.0);
    }

    #[test]
    fn magnetic_motion_keeps_speed() {
        let mut scene = Scene::new();
        scene.add_object(MagneticField {
            x: -1000.0,
            y: -1000.0,
            width: 2000.0,
            height: 2000.0,
            strength: 1.0,
            ..Default::default()
        });
        let mut p = unit_particle(0.0, 0.0, 10.0, 0.0);
        rk4_step(&mut p, &scene, 0.01, 0.0);
        assert!(p.velocity.y > 0.0);
        for _ in 0..99 {
            rk4_step(&mut p, &scene, 0.01, 0.0);
        }
        assert!(approx(p.velocity.mag(), 10.0, 1e-6));
    }
}

mod boundaries {
    use super::*;

    fn bounds() -> Option<Bounds> {
        Some(Bounds::new(Vec2::zero(), Vec2::new(100.0, 100.0)))
    }

    fn settings(mode: BoundaryMode, margin: f64) -> SceneSettings {
        SceneSettings { boundary_mode: mode, boundary_margin: margin, ..Default::default() }
    }

    #[test]
    fn bounce_clamps_and_damps() {
        let mut p = unit_particle(105.0, 50.0, 10.0, 3.0);
        p.record_trajectory(0.0);
        let removed = handle_boundaries(&mut p, bounds(), &settings(BoundaryMode::Bounce, 0.0), 0.9);
        assert!(!removed);
        assert_eq!(p.position.x, 100.0);
        assert!(approx(p.velocity.x, -9.0, 1e-12));
        assert_eq!(p.velocity.y, 3.0);
        assert!(p.trajectory.is_empty());
    }

    #[test]
    fn wrap_teleports_to_opposite_edge() {
        let mut p = unit_particle(-1.0, 50.0, -10.0, 0.0);
        p.record_trajectory(0.0);
        assert!(!handle_boundaries(&mut p, bounds(), &settings(BoundaryMode::Wrap, 0.0), 0.9));
        assert_eq!(p.position.x, 100.0);
        assert_eq!(p.velocity.x, -10.0);
        assert!(p.trajectory.is_empty());
    }

    #[test]
    fn remove_ignores_margin_and_margin_mode_uses_it() {
        let mut p = unit_particle(100.5, 50.0, 0.0, 0.0);
        assert!(handle_boundaries(&mut p, bounds(), &settings(BoundaryMode::Remove, 10.0), 0.9));

        let margin = settings(BoundaryMode::Margin, 10.0);
        let mut inside = unit_particle(109.9, 50.0, 0.0, 0.0);
        assert!(!handle_boundaries(&mut inside, bounds(), &margin, 0.9));
        let mut outside = unit_particle(110.1, 50.0, 0.0, 0.0);
        assert!(handle_boundaries(&mut outside, bounds(), &margin, 0.9));
    }

    #[test]
    fn non_finite_state_is_removed_without_bounds() {
        let mut p = unit_particle(f64::NAN, 0.0, 0.0, 0.0);
        assert!(handle_boundaries(&mut p, None, &SceneSettings::default(), 0.9));
        let mut q = unit_particle(500.0, 500.0, 0.0, 0.0);
        assert!(!handle_boundaries(&mut q, None, &SceneSettings::default(), 0.9));
    }
}

mod capacitors {
    use super::*;

    fn strip(plate_distance: f64) -> VerticalParallelPlateCapacitor {
        VerticalParallelPlateCapacitor { height: 200.0, plate_distance, strength: 0.0, ..Default::default() }
    }

    fn set_plate_distance(scene: &mut Scene, cap: ObjectId, plate_distance: f64) {
        if let Some(ObjectKind::VerticalParallelPlateCapacitor(c)) =
            scene.object_mut(cap).map(|obj| &mut obj.kind)
        {
            c.plate_distance = plate_distance;
        }
    }

    #[test]
    fn leaving_the_gap_freezes_on_inner_face() {
        let mut scene = Scene::new();
        let cap = scene.add_object(strip(80.0));
        let id = scene.add_object(unit_particle(35.0, 0.0, 100.0, 0.0));

        let report = PhysicsEngine::new().update(&mut scene, 0.1);
        assert_eq!(report.frozen, 1);
        let p = scene.particle(id).unwrap();
        assert!(p.stuck_to_capacitor);
        assert!(approx(p.position.x, 40.0, 1e-9));
        assert_eq!(p.velocity, Vec2::zero());

        PhysicsEngine::new().update(&mut scene, 0.1);
        assert!(scene.particle(id).unwrap().stuck_to_capacitor);

        set_plate_distance(&mut scene, cap, 120.0);
        PhysicsEngine::new().update(&mut scene, 0.1);
        let p = scene.particle(id).unwrap();
        assert!(!p.stuck_to_capacitor);
        assert!(approx(p.position.x, 40.0, 1e-9));
    }

    #[test]
    fn frozen_particle_follows_a_narrowing_gap() {
        let mut scene = Scene::new();
        let cap = scene.add_object(strip(80.0));
        let id = scene.add_object(unit_particle(35.0, 0.0, 100.0, 0.0));
        let engine = PhysicsEngine::new();
        engine.update(&mut scene, 0.1);

        set_plate_distance(&mut scene, cap, 40.0);
        engine.update(&mut scene, 0.1);
        let p = scene.particle(id).unwrap();
        assert!(p.stuck_to_capacitor);
        assert!(approx(p.position.x, 20.0, 1e-9));
    }

    #[test]
    fn resting_beyond_the_plate_is_pinned_to_inner_face() {
        let mut scene = Scene::new();
        scene.add_object(strip(80.0));
        let id = scene.add_object(unit_particle(60.0, 0.0, 0.0, 0.0));

        let report = PhysicsEngine::new().update(&mut scene, 0.1);
        assert_eq!(report.frozen, 1);
        let p = scene.particle(id).unwrap();
        assert!(p.stuck_to_capacitor);
        assert!(approx(p.position.x, 40.0, 1e-9));
    }

    #[test]
    fn arriving_from_outside_rests_on_inner_face() {
        let mut scene = Scene::new();
        scene.add_object(strip(80.0));
        let id = scene.add_object(unit_particle(-60.0, 0.0, 100.0, 0.0));

        PhysicsEngine::new().update(&mut scene, 0.1);
        let p = scene.particle(id).unwrap();
        assert!(p.stuck_to_capacitor);
        assert!(approx(p.position.x, -40.0, 1e-9));
        assert_eq!(p.velocity, Vec2::zero());
    }

    #[test]
    fn outside_the_span_is_ignored() {
        let frame = strip(80.0).plate_frame();
        assert!(collision::plate_contact(&frame, Vec2::new(45.0, 150.0)).is_none());
        assert!(collision::plate_contact(&frame, Vec2::new(10.0, 0.0)).is_none());
        assert_eq!(collision::plate_contact(&frame, Vec2::new(45.0, 50.0)), Some(Vec2::new(40.0, 50.0)));
    }
}

mod detectors {
    use super::*;

    #[test]
    fn disappear_zone_removes_crossing_particle() {
        let mut scene = Scene::new();
        scene.add_object(DisappearZone { x: 50.0, y: 0.0, length: 100.0, angle: 90.0, line_width: 6.0 });
        let id = scene.add_object(unit_particle(40.0, 0.0, 200.0, 0.0));
        scene.select(id).unwrap();

        let report = PhysicsEngine::new().update(&mut scene, 0.1);
        assert_eq!(report.removed, 1);
        assert!(scene.particle(id).is_none());
        assert_eq!(scene.selected(), None);
    }

    #[test]
    fn screen_records_hit_on_its_face() {
        let mut scene = Scene::new();
        let screen = scene.add_object(FluorescentScreen { x: 100.0, y: 0.0, width: 20.0, height: 50.0, ..Default::default() });
        let id = scene.add_object(unit_particle(80.0, 5.0, 300.0, 0.0));

        let report = PhysicsEngine::new().update(&mut scene, 0.1);
        assert_eq!(report.removed, 1);
        assert!(scene.particle(id).is_none());
        match &scene.object(screen).unwrap().kind {
            ObjectKind::FluorescentScreen(s) => {
                assert_eq!(s.hits.len(), 1);
                assert_eq!(s.hits[0], ScreenHit { x: 0.0, y: 5.0, time: 0.1 });
            }
            other => panic!("unexpected kind {other:?}"),
        }
        assert!(scene.has_time_varying_fields());
    }

    #[test]
    fn hook_table_order() {
        let names: Vec<&str> = collision::HOOKS.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["capacitor", "disappear_zone", "fluorescent_screen"]);
        let mut scene = Scene::new();
        let mut p = unit_particle(0.0, 0.0, 0.0, 0.0);
        assert_eq!(collision::run_hooks(&mut p, &mut scene), HookOutcome::Pass);
    }
}

mod engine {
    use super::*;

    #[test]
    fn sub_steps_bound_displacement() {
        let engine = PhysicsEngine::new();
        assert_eq!(engine.sub_steps(Vec2::new(1200.0, 0.0), 0.1, true), 10);
        assert_eq!(engine.sub_steps(Vec2::new(1e6, 0.0), 0.1, true), 50);
        assert_eq!(engine.sub_steps(Vec2::new(1200.0, 0.0), 0.1, false), 1);
        assert_eq!(engine.sub_steps(Vec2::new(f64::NAN, 0.0), 0.1, true), 1);
        assert_eq!(engine.sub_steps(Vec2::zero(), 0.1, true), 1);
    }

    #[test]
    fn update_advances_time_and_ignores_bad_dt() {
        let mut scene = Scene::new();
        let engine = PhysicsEngine::new();
        engine.update(&mut scene, 0.25);
        assert_eq!(scene.time, 0.25);
        assert_eq!(engine.update(&mut scene, -1.0), StepReport::default());
        assert_eq!(engine.update(&mut scene, f64::NAN), StepReport::default());
        assert_eq!(scene.time, 0.25);
    }

    #[test]
    fn viewport_bounce() {
        let mut scene = Scene::new();
        scene.set_viewport(100.0, 100.0);
        let id = scene.add_object(unit_particle(95.0, 50.0, 100.0, 0.0));
        PhysicsEngine::new().update(&mut scene, 0.1);
        let p = scene.particle(id).unwrap();
        assert_eq!(p.position.x, 100.0);
        assert!(approx(p.velocity.x, -90.0, 1e-9));
    }

    #[test]
    fn camera_offset_shifts_bounds() {
        let mut scene = Scene::new();
        scene.set_viewport(100.0, 100.0);
        scene.set_camera(50.0, 0.0);
        scene.settings.boundary_mode = BoundaryMode::Remove;
        let id = scene.add_object(unit_particle(40.0, 50.0, 200.0, 0.0));
        PhysicsEngine::new().update(&mut scene, 0.1);
        assert!(scene.particle(id).is_none());
    }

    #[test]
    fn non_finite_particle_removed_without_viewport() {
        let mut scene = Scene::new();
        let id = scene.add_object(unit_particle(0.0, 0.0, f64::INFINITY, 0.0));
        let report = PhysicsEngine::new().update(&mut scene, 0.1);
        assert_eq!(report.removed, 1);
        assert!(scene.particle(id).is_none());
    }

    #[test]
    fn inactive_particles_do_not_move() {
        let mut scene = Scene::new();
        let id = scene.add_object(Particle { active: false, ..unit_particle(10.0, 10.0, 50.0, 0.0) });
        PhysicsEngine::new().update(&mut scene, 0.1);
        assert_eq!(scene.particle(id).unwrap().position, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn emitted_particles_move_in_the_same_tick() {
        let mut scene = Scene::new();
        scene.add_object(ElectronGun { emission_rate: 10.0, ..Default::default() });
        let report = PhysicsEngine::new().update(&mut scene, 0.1);
        assert_eq!(report.emitted, 1);
        let (_, p) = scene.particles().next().unwrap();
        assert!(approx(p.position.x, 45.0, 1e-9));
    }

    #[test]
    fn velocity_expression_overrides_component() {
        let mut scene = Scene::new();
        let id = scene.add_object(Particle {
            velocity_expression_x: Some(Formula::new("k * t")),
            ..unit_particle(0.0, 0.0, 0.0, 7.0)
        });
        scene.set_variable("k", 2.0).unwrap();
        PhysicsEngine::new().update(&mut scene, 0.5);
        let p = scene.particle(id).unwrap();
        assert!(approx(p.velocity.x, 1.0, 1e-12));
        assert!(approx(p.position.x, 0.5, 1e-12));
        assert!(approx(p.position.y, 3.5, 1e-12));
    }

    #[test]
    fn trajectory_times_follow_sub_steps() {
        let mut scene = Scene::new();
        scene.add_object(DisappearZone { x: 1000.0, y: 1000.0, ..Default::default() });
        let id = scene.add_object(unit_particle(0.0, 0.0, 240.0, 0.0));
        PhysicsEngine::new().update(&mut scene, 0.1);
        let times: Vec<f64> = scene.particle(id).unwrap().trajectory.iter().map(|pt| pt.t).collect();
        assert_eq!(times.len(), 2);
        assert!(approx(times[0], 0.05, 1e-12));
        assert!(approx(times[1], 0.1, 1e-12));
    }

    fn replay_scene() -> Scene {
        let mut scene = Scene::new();
        scene.set_viewport(400.0, 300.0);
        scene.add_object(MagneticField { x: 0.0, y: 0.0, width: 400.0, height: 300.0, strength: 1.0, ..Default::default() });
        scene.add_object(unit_particle(200.0, 150.0, 50.0, 0.0));
        scene.add_object(ElectronGun {
            x: 50.0,
            y: 50.0,
            emission_rate: 5.0,
            emission_speed: 40.0,
            template: ParticleTemplate { charge: 1.0, mass: 1.0, ..Default::default() },
            ..Default::default()
        });
        scene
    }

    #[test]
    fn identical_scenes_replay_identically() {
        let engine = PhysicsEngine::new();
        let mut a = replay_scene();
        let mut b = replay_scene();
        for _ in 0..300 {
            engine.update(&mut a, 1.0 / 60.0);
            engine.update(&mut b, 1.0 / 60.0);
        }
        assert!(a.particles().count() > 1);
        assert_eq!(a.default_signature().unwrap(), b.default_signature().unwrap());
    }
}
