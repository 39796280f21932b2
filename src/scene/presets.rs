// scene/presets.rs
// Built-in demonstration scenes, loadable with `Scene::load_from_data`

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::units::{ELECTRON_MASS, ELEMENTARY_CHARGE};

#[derive(Clone, Debug)]
pub struct Preset {
    pub title: &'static str,
    pub description: &'static str,
    pub data: Value,
}

fn electron(x: f64, y: f64, vx: f64, vy: f64) -> Value {
    json!({
        "type": "particle",
        "x": x,
        "y": y,
        "vx": vx,
        "vy": vy,
        "mass": ELECTRON_MASS,
        "charge": -ELEMENTARY_CHARGE,
        "ignoreGravity": true
    })
}

pub static PRESETS: Lazy<BTreeMap<&'static str, Preset>> = Lazy::new(|| {
    let mut m = BTreeMap::new();
    m.insert(
        "uniform-acceleration",
        Preset {
            title: "Uniform acceleration",
            description: "A charged particle accelerating in a uniform electric field",
            data: json!({
                "objects": [
                    {
                        "type": "electric-field-rect",
                        "x": 100, "y": 100, "width": 600, "height": 400,
                        "strength": 1000, "direction": 90
                    },
                    electron(400.0, 150.0, 0.0, 0.0)
                ]
            }),
        },
    );
    m.insert(
        "cyclotron",
        Preset {
            title: "Cyclotron motion",
            description: "A charged particle circling in a uniform magnetic field",
            data: json!({
                "objects": [
                    {
                        "type": "magnetic-field",
                        "x": 200, "y": 150, "width": 400, "height": 300,
                        "strength": 0.5
                    },
                    electron(400.0, 300.0, 100000.0, 0.0)
                ]
            }),
        },
    );
    m.insert(
        "capacitor-deflection",
        Preset {
            title: "Capacitor deflection",
            description: "A charged particle deflected between parallel plates",
            data: json!({
                "objects": [
                    {
                        "type": "electric-field-rect",
                        "x": 300, "y": 200, "width": 400, "height": 200,
                        "strength": 2000, "direction": 90
                    },
                    electron(200.0, 300.0, 200.0, 0.0)
                ]
            }),
        },
    );
    m
});

pub fn get(name: &str) -> Option<&'static Preset> {
    PRESETS.get(name)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    PRESETS.keys().copied()
}
