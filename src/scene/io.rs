// scene/io.rs
// Scene JSON: all-or-nothing loading, serialization and replay signatures

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{Camera, Scene, SceneError};
use crate::config::{SceneSettings, SCENE_VERSION};
use crate::expression;
use crate::objects::{self, SceneObject};

/// Decimal places used by [`Scene::signature`] unless told otherwise.
pub const SIGNATURE_DECIMALS: u32 = 6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    /// Entries with an unknown `type`.
    pub skipped: usize,
    /// Variables dropped for a bad name or value.
    pub dropped_variables: usize,
}

#[derive(Serialize)]
struct SceneRecord<'a> {
    version: &'static str,
    timestamp: u64,
    settings: &'a SceneSettings,
    camera: &'a Camera,
    variables: &'a BTreeMap<String, f64>,
    objects: &'a [SceneObject],
}

fn from_json<T: DeserializeOwned>(value: &Value) -> Result<T, serde_json::Error> {
    T::deserialize(value)
}

fn parse_settings(data: &Map<String, Value>) -> Result<SceneSettings, SceneError> {
    let settings = match data.get("settings") {
        None | Some(Value::Null) => SceneSettings::default(),
        Some(value) => from_json(value)?,
    };
    settings.validate().map_err(SceneError::Validation)?;
    Ok(settings)
}

fn parse_variables(data: &Map<String, Value>, summary: &mut LoadSummary) -> Result<BTreeMap<String, f64>, SceneError> {
    let mut out = BTreeMap::new();
    let entries = match data.get("variables") {
        None | Some(Value::Null) => return Ok(out),
        Some(Value::Object(entries)) => entries,
        Some(_) => return Err(SceneError::Validation("variables must be an object".into())),
    };
    for (name, value) in entries {
        match value.as_f64().filter(|v| v.is_finite()) {
            Some(v) if expression::is_valid_variable_name(name) => {
                out.insert(name.clone(), v);
            }
            _ => {
                log::warn!("dropping variable \"{name}\": invalid name or non-finite value");
                summary.dropped_variables += 1;
            }
        }
    }
    Ok(out)
}

fn parse_objects(data: &Map<String, Value>, summary: &mut LoadSummary) -> Result<Vec<SceneObject>, SceneError> {
    let entries = match data.get("objects") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(SceneError::Validation("objects must be an array".into())),
    };
    let mut out = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let Some(kind) = entry.get("type").and_then(Value::as_str) else {
            return Err(SceneError::InvalidObject {
                index,
                kind: String::new(),
                reason: "missing \"type\"".into(),
            });
        };
        if !objects::is_known_type(kind) {
            log::warn!("skipping object #{index}: {}", SceneError::UnknownObjectType(kind.to_string()));
            summary.skipped += 1;
            continue;
        }
        let object = from_json::<SceneObject>(entry).map_err(|err| SceneError::InvalidObject {
            index,
            kind: kind.to_string(),
            reason: err.to_string(),
        })?;
        out.push(object);
    }
    Ok(out)
}

fn round_numbers(value: &mut Value, factor: f64) {
    match value {
        Value::Number(n) if n.is_f64() => {
            if let Some(f) = n.as_f64() {
                let rounded = (f * factor).round() / factor;
                // -0.0 and 0.0 must compare equal in signatures
                let rounded = if rounded == 0.0 { 0.0 } else { rounded };
                if let Some(num) = serde_json::Number::from_f64(rounded) {
                    *n = num;
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|v| round_numbers(v, factor)),
        Value::Object(map) => {
            map.remove("id");
            map.values_mut().for_each(|v| round_numbers(v, factor));
        }
        _ => {}
    }
}

impl Scene {
    /// Replace the scene with `data`. Nothing changes unless the whole
    /// document is valid; entries with an unknown `type` are skipped.
    /// Imported ids are discarded and fresh ones assigned.
    pub fn load_from_data(&mut self, data: &Value) -> Result<LoadSummary, SceneError> {
        let Value::Object(map) = data else {
            return Err(SceneError::Validation("scene data must be an object".into()));
        };
        let mut summary = LoadSummary::default();
        let settings = parse_settings(map)?;
        let camera = match map.get("camera") {
            None | Some(Value::Null) => Camera::default(),
            Some(value) => from_json(value)?,
        };
        let variables = parse_variables(map, &mut summary)?;
        let objects = parse_objects(map, &mut summary)?;

        let mut next = Scene::with_settings(settings);
        next.camera = camera;
        next.viewport = self.viewport;
        next.bounds_override = self.bounds_override;
        next.variables = variables;
        for mut object in objects {
            object.kind.reset_runtime();
            next.add_object(object);
        }
        summary.loaded = next.len();
        *self = next;
        log::info!(
            "loaded scene: {} objects, {} skipped, {} variables",
            summary.loaded,
            summary.skipped,
            self.variables.len()
        );
        Ok(summary)
    }

    pub fn load_from_str(&mut self, json: &str) -> Result<LoadSummary, SceneError> {
        let value: Value = serde_json::from_str(json)?;
        self.load_from_data(&value)
    }

    /// Serialize with the current wall-clock time as `timestamp` (ms).
    pub fn serialize(&self) -> Result<Value, SceneError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        self.serialize_at(now)
    }

    pub fn serialize_at(&self, timestamp: u64) -> Result<Value, SceneError> {
        let record = SceneRecord {
            version: SCENE_VERSION,
            timestamp,
            settings: &self.settings,
            camera: &self.camera,
            variables: &self.variables,
            objects: &self.objects,
        };
        Ok(serde_json::to_value(record)?)
    }

    /// Canonical form for replay comparison: sorted keys, no ids or
    /// timestamp, floats rounded to `decimals` places.
    pub fn signature(&self, decimals: u32) -> Result<Value, SceneError> {
        let mut value = self.serialize_at(0)?;
        if let Value::Object(map) = &mut value {
            map.remove("timestamp");
        }
        round_numbers(&mut value, 10f64.powi(decimals as i32));
        Ok(value)
    }

    pub fn default_signature(&self) -> Result<Value, SceneError> {
        self.signature(SIGNATURE_DECIMALS)
    }
}
