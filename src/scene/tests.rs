use serde_json::json;

use super::*;
use crate::objects::{
    CapacitorSource, CircleElectricField, ElectronGun, Formula, ParallelPlateCapacitor, Particle,
    RectElectricField, SourceType, VerticalParallelPlateCapacitor,
};

fn particle_at(x: f64, y: f64) -> Particle {
    Particle::new(Vec2::new(x, y), Vec2::zero(), 1.0, 1.0)
}

mod arena {
    use super::*;

    #[test]
    fn category_index_tracks_adds_and_removes() {
        let mut scene = Scene::new();
        let field = scene.add_object(RectElectricField::default());
        let p = scene.add_object(particle_at(1.0, 2.0));
        let gun = scene.add_object(ElectronGun::default());

        assert_eq!(scene.ids(Category::ElectricField), &[field]);
        assert_eq!(scene.ids(Category::Particle), &[p]);
        assert_eq!(scene.ids(Category::Emitter), &[gun]);
        assert_eq!(scene.len(), 3);

        assert!(scene.remove_object(p).is_some());
        assert!(scene.ids(Category::Particle).is_empty());
        assert!(scene.remove_object(p).is_none());
        assert_eq!(scene.object(gun).map(|o| o.id), Some(gun));
    }

    #[test]
    fn adding_a_present_object_is_a_no_op() {
        let mut scene = Scene::new();
        let id = scene.add_object(particle_at(0.0, 0.0));
        let copy = scene.object(id).cloned().unwrap();
        assert_eq!(scene.add_object(copy), id);
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.ids(Category::Particle).len(), 1);
    }

    #[test]
    fn object_moved_between_scenes_keeps_its_state() {
        let mut a = Scene::new();
        a.add_object(particle_at(0.0, 0.0));
        let moved_id = a.add_object(particle_at(7.0, 3.0));
        let moved = a.remove_object(moved_id).unwrap();

        let mut b = Scene::new();
        let first = b.add_object(particle_at(20.0, 20.0));
        let second = b.add_object(particle_at(30.0, 30.0));
        assert_eq!(second, moved_id, "same counter value in both scenes");

        let id = b.add_object(moved);
        assert_eq!(b.len(), 3);
        assert!(id != first && id != second);
        assert_eq!(b.particle(id).unwrap().position, Vec2::new(7.0, 3.0));
        assert_eq!(b.particle(second).unwrap().position, Vec2::new(30.0, 30.0));
        assert_eq!(b.ids(Category::Particle), &[first, second, id]);
    }

    #[test]
    fn ids_are_fresh_and_increasing() {
        let mut scene = Scene::new();
        let a = scene.add_object(particle_at(0.0, 0.0));
        let b = scene.add_object(particle_at(0.0, 0.0));
        assert!(b > a);
        scene.remove_object(b);
        let c = scene.add_object(particle_at(0.0, 0.0));
        assert!(c > b);
    }

    #[test]
    fn duplicate_offsets_and_clears_run_state() {
        let mut scene = Scene::new();
        let id = scene.add_object(particle_at(10.0, 10.0));
        scene.particle_mut(id).unwrap().record_trajectory(0.0);

        let dup = scene.duplicate_object(id).unwrap();
        assert_ne!(dup, id);
        let p = scene.particle(dup).unwrap();
        assert_eq!(p.position, Vec2::new(30.0, 30.0));
        assert!(p.trajectory.is_empty());
        assert_eq!(scene.particle(id).unwrap().trajectory.len(), 1);
        assert_eq!(scene.ids(Category::Particle), &[id, dup]);

        assert!(matches!(scene.duplicate_object(ObjectId(999)), Err(SceneError::NotFound(_))));
    }

    #[test]
    fn bulk_remove_ignores_repeats_and_unknown_ids() {
        let mut scene = Scene::new();
        let a = scene.add_object(particle_at(0.0, 0.0));
        let b = scene.add_object(particle_at(1.0, 0.0));
        assert_eq!(scene.remove_objects(&[a, a, ObjectId(999)]), 1);
        assert_eq!(scene.ids(Category::Particle), &[b]);
        assert_eq!(scene.object(b).map(|o| o.id), Some(b));
    }

    #[test]
    fn find_object_returns_top_most() {
        let mut scene = Scene::new();
        scene.add_object(CircleElectricField { radius: 50.0, ..Default::default() });
        let top = scene.add_object(CircleElectricField { x: 10.0, radius: 50.0, ..Default::default() });
        assert_eq!(scene.find_object_at(Vec2::new(5.0, 0.0)), Some(top));
        assert_eq!(scene.find_object_at(Vec2::new(500.0, 0.0)), None);
    }

    #[test]
    fn removal_clears_selection() {
        let mut scene = Scene::new();
        let id = scene.add_object(particle_at(0.0, 0.0));
        scene.select(id).unwrap();
        assert_eq!(scene.selected_object().map(|o| o.id), Some(id));
        scene.remove_objects(&[id]);
        assert_eq!(scene.selected(), None);
        assert!(scene.select(id).is_err());
    }

    #[test]
    fn clear_keeps_settings_and_variables() {
        let mut scene = Scene::new();
        scene.settings.gravity = 1.5;
        scene.set_variable("k", 2.0).unwrap();
        scene.add_object(particle_at(0.0, 0.0));
        scene.time = 3.0;
        scene.clear();
        assert!(scene.is_empty());
        assert_eq!(scene.time, 0.0);
        assert_eq!(scene.settings.gravity, 1.5);
        assert_eq!(scene.variables().get("k"), Some(&2.0));
    }
}

mod camera {
    use super::*;

    #[test]
    fn screen_world_round_trip() {
        let mut scene = Scene::new();
        scene.set_camera(15.0, -5.0);
        let world = scene.to_world_point(Vec2::new(100.0, 100.0));
        assert_eq!(world, Vec2::new(85.0, 105.0));
        assert_eq!(scene.to_screen_point(world), Vec2::new(100.0, 100.0));
    }

    #[test]
    fn world_bounds_follow_viewport_and_override() {
        let mut scene = Scene::new();
        assert_eq!(scene.world_bounds(), None);
        scene.set_viewport(100.0, 50.0);
        scene.set_camera(10.0, 20.0);
        assert_eq!(
            scene.world_bounds(),
            Some(Bounds::new(Vec2::new(-10.0, -20.0), Vec2::new(90.0, 30.0)))
        );

        let fixed = Bounds::new(Vec2::zero(), Vec2::new(5.0, 5.0));
        scene.bounds_override = Some(fixed);
        assert_eq!(scene.world_bounds(), Some(fixed));

        scene.bounds_override = None;
        scene.set_viewport(0.0, 50.0);
        assert_eq!(scene.world_bounds(), None);
    }
}

mod variables {
    use super::*;

    #[test]
    fn names_and_values_are_validated() {
        let mut scene = Scene::new();
        for bad in ["2x", "__proto__", "constructor", "a b", ""] {
            assert!(matches!(scene.set_variable(bad, 1.0), Err(SceneError::InvalidVariable { .. })), "{bad}");
        }
        assert!(scene.set_variable("k", f64::NAN).is_err());
        scene.set_variable("k", 1.0).unwrap();
        scene.set_variable("_rate2", 4.0).unwrap();
        assert_eq!(scene.variable_names(), ["_rate2", "k"]);
        assert!(scene.remove_variable("k"));
        assert!(!scene.remove_variable("k"));
    }

    #[test]
    fn formulas_recompile_when_names_change() {
        let mut scene = Scene::new();
        let id = scene.add_object(Particle {
            velocity_expression_x: Some(Formula::new("k * 2")),
            ..particle_at(0.0, 0.0)
        });
        let compiled = |scene: &Scene| {
            scene.particle(id).and_then(|p| p.velocity_expression_x.as_ref()).is_some_and(Formula::is_compiled)
        };
        assert!(!compiled(&scene));
        scene.set_variable("k", 3.0).unwrap();
        assert!(compiled(&scene));
        scene.remove_variable("k");
        assert!(!compiled(&scene));
    }
}

mod fields {
    use super::*;

    #[test]
    fn any_capacitor_turns_on_continuous_collision() {
        let mut scene = Scene::new();
        scene.add_object(RectElectricField::default());
        assert!(!scene.has_continuous_colliders());

        let vertical = scene.add_object(VerticalParallelPlateCapacitor::default());
        assert!(scene.has_continuous_colliders());
        scene.remove_object(vertical);
        assert!(!scene.has_continuous_colliders());

        scene.add_object(ParallelPlateCapacitor { direction: 30.0, ..Default::default() });
        assert!(scene.has_continuous_colliders());
    }

    #[test]
    fn time_varying_sources_are_reported() {
        let mut scene = Scene::new();
        scene.add_object(ParallelPlateCapacitor::default());
        assert!(!scene.has_time_varying_fields());
        scene.add_object(ParallelPlateCapacitor {
            source: CapacitorSource { source_type: SourceType::Ac, ..Default::default() },
            ..Default::default()
        });
        assert!(scene.has_time_varying_fields());
    }

    #[test]
    fn fields_superpose() {
        let mut scene = Scene::new();
        let rect = RectElectricField { width: 10.0, height: 10.0, strength: 3.0, direction: 0.0, ..Default::default() };
        scene.add_object(rect.clone());
        scene.add_object(rect);
        assert_eq!(scene.electric_field(Vec2::new(5.0, 5.0)), Vec2::new(6.0, 0.0));
        assert_eq!(scene.electric_field(Vec2::new(50.0, 5.0)), Vec2::zero());
    }
}

mod candidates {
    use super::*;
    use crate::geometry::CandidateShape;

    #[test]
    fn shapes_per_object_kind() {
        let mut scene = Scene::new();
        let rect = scene.add_object(RectElectricField::default());
        scene.add_object(CircleElectricField::default());
        scene.add_object(ElectronGun::default());
        scene.add_object(ParallelPlateCapacitor::default());
        scene.add_object(particle_at(0.0, 0.0));

        let all = scene.tangency_candidates(None);
        let count = |f: fn(&CandidateShape) -> bool| all.iter().filter(|c| f(&c.shape)).count();
        assert_eq!(count(|s| matches!(s, CandidateShape::Segment(_))), 6);
        assert_eq!(count(|s| matches!(s, CandidateShape::Circle(_))), 1);
        assert_eq!(count(|s| matches!(s, CandidateShape::Point(_))), 1);

        let without_rect = scene.tangency_candidates(Some(rect));
        assert_eq!(without_rect.len(), all.len() - 4);
        assert!(without_rect.iter().all(|c| c.object_id != Some(rect)));
    }
}

mod persistence {
    use super::*;

    fn sample() -> serde_json::Value {
        json!({
            "version": "1.0",
            "settings": { "gravity": 0, "boundaryMode": "wrap", "pixelsPerMeter": 2 },
            "camera": { "offsetX": 5, "offsetY": 6 },
            "variables": { "k": 2, "bad name": 1, "s": "text" },
            "objects": [
                { "type": "electric-field-rect", "id": 77, "x": 0, "y": 0, "width": 100, "height": 50 },
                { "type": "hologram", "x": 1 },
                { "type": "particle", "x": 1.23456789, "y": 2, "vx": 3, "vy": 4, "mass": 1, "charge": 1 }
            ]
        })
    }

    #[test]
    fn load_skips_unknown_types_and_assigns_fresh_ids() {
        let mut scene = Scene::new();
        let summary = scene.load_from_data(&sample()).unwrap();
        assert_eq!(summary, LoadSummary { loaded: 2, skipped: 1, dropped_variables: 2 });
        assert_eq!(scene.ids(Category::ElectricField), &[ObjectId(1)]);
        assert_eq!(scene.settings.boundary_mode, crate::config::BoundaryMode::Wrap);
        assert_eq!(scene.camera, Camera { offset_x: 5.0, offset_y: 6.0 });
        assert_eq!(scene.variable_names(), ["k"]);
        assert_eq!(scene.particles().count(), 1);
    }

    #[test]
    fn failed_load_leaves_scene_untouched() {
        let mut scene = Scene::new();
        scene.set_viewport(10.0, 10.0);
        scene.add_object(particle_at(0.0, 0.0));

        let missing_type = json!({ "objects": [{ "x": 1 }] });
        assert!(matches!(scene.load_from_data(&missing_type), Err(SceneError::InvalidObject { index: 0, .. })));
        let bad_particle = json!({ "objects": [{ "type": "particle", "mass": 0 }] });
        assert!(matches!(scene.load_from_data(&bad_particle), Err(SceneError::InvalidObject { .. })));
        let bad_settings = json!({ "settings": { "pixelsPerMeter": 0 } });
        assert!(matches!(scene.load_from_data(&bad_settings), Err(SceneError::Validation(_))));
        assert!(matches!(scene.load_from_data(&json!([1, 2])), Err(SceneError::Validation(_))));
        assert!(scene.load_from_str("{ not json").is_err());
        assert_eq!(scene.len(), 1);

        scene.load_from_data(&json!({})).unwrap();
        assert!(scene.is_empty());
        assert_eq!(scene.viewport, Some(Viewport { width: 10.0, height: 10.0 }));
    }

    #[test]
    fn serialized_document_shape() {
        let mut scene = Scene::new();
        scene.load_from_data(&sample()).unwrap();
        let doc = scene.serialize_at(42).unwrap();
        assert_eq!(doc["version"], "1.0");
        assert_eq!(doc["timestamp"], 42);
        assert_eq!(doc["settings"]["boundaryMode"], "wrap");
        assert_eq!(doc["camera"]["offsetX"], 5.0);
        assert_eq!(doc["variables"]["k"], 2.0);
        let objects = doc["objects"].as_array().unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0]["type"], "electric-field-rect");
        assert_eq!(objects[1]["type"], "particle");
        assert_eq!(objects[1]["vx"], 3.0);
    }

    #[test]
    fn reload_reproduces_signature() {
        let mut a = Scene::new();
        a.load_from_data(&sample()).unwrap();
        let mut b = Scene::new();
        b.load_from_data(&a.serialize().unwrap()).unwrap();
        assert_eq!(a.default_signature().unwrap(), b.default_signature().unwrap());
    }

    #[test]
    fn signature_drops_ids_and_timestamp_and_rounds() {
        let mut scene = Scene::new();
        scene.load_from_data(&sample()).unwrap();
        let sig = scene.signature(6).unwrap();
        assert!(sig.get("timestamp").is_none());
        let objects = sig["objects"].as_array().unwrap();
        assert!(objects.iter().all(|o| o.get("id").is_none()));
        assert_eq!(objects[1]["x"].as_f64(), Some(1.234568));
    }

    #[test]
    fn presets_load() {
        assert_eq!(presets::names().count(), 3);
        for name in presets::names() {
            let preset = presets::get(name).unwrap();
            let mut scene = Scene::new();
            let summary = scene.load_from_data(&preset.data).unwrap();
            assert_eq!(summary.loaded, 2, "{name}");
            assert_eq!(scene.particles().count(), 1, "{name}");
        }
        assert!(presets::get("warp-drive").is_none());
    }

    #[test]
    fn baseline_restores_a_copy() {
        let mut scene = Scene::new();
        scene.add_object(particle_at(1.0, 1.0));
        let mut baseline = ResetBaseline::new();
        assert!(!baseline.is_set());
        assert_eq!(baseline.restore(&mut scene).unwrap(), None);

        baseline.capture(&scene).unwrap();
        scene.add_object(particle_at(2.0, 2.0));
        assert_eq!(scene.len(), 2);
        assert!(baseline.restore(&mut scene).unwrap().is_some());
        assert_eq!(scene.len(), 1);

        let mut copy = baseline.snapshot().unwrap();
        copy["objects"] = json!([]);
        assert_eq!(copy["objects"], json!([]));
        assert_eq!(baseline.snapshot().unwrap()["objects"].as_array().map(Vec::len), Some(1));

        assert!(matches!(baseline.set(&json!("nope")), Err(SceneError::Validation(_))));
        baseline.clear();
        assert!(!baseline.is_set());
    }
}
