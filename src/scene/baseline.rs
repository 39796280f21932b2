// scene/baseline.rs
// Snapshot of a serialized scene that "reset" returns to

use serde_json::Value;

use super::{LoadSummary, Scene, SceneError};

#[derive(Clone, Debug, Default)]
pub struct ResetBaseline {
    snapshot: Option<Value>,
}

impl ResetBaseline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Store a copy of `data`. Only JSON objects are accepted.
    pub fn set(&mut self, data: &Value) -> Result<(), SceneError> {
        if !data.is_object() {
            return Err(SceneError::Validation("baseline snapshot must be a JSON object".into()));
        }
        self.snapshot = Some(data.clone());
        Ok(())
    }

    pub fn capture(&mut self, scene: &Scene) -> Result<(), SceneError> {
        let data = scene.serialize()?;
        self.set(&data)
    }

    /// A fresh copy of the stored snapshot; callers may mutate it freely.
    pub fn snapshot(&self) -> Option<Value> {
        self.snapshot.clone()
    }

    /// Reload `scene` from the snapshot. `Ok(None)` when nothing is stored.
    pub fn restore(&self, scene: &mut Scene) -> Result<Option<LoadSummary>, SceneError> {
        match &self.snapshot {
            Some(data) => scene.load_from_data(data).map(Some),
            None => Ok(None),
        }
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
    }
}
