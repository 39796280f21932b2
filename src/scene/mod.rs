//! The scene: authoritative owner of every object, the settings, camera,
//! viewport and user variables.
//!
//! Objects live in one arena (`objects`) in insertion order. Category index
//! arrays hold ids only and are kept in sync by every mutation, so each id
//! in an index is also in the arena and belongs to exactly one category.

mod baseline;
mod candidates;
mod error;
mod io;
pub mod presets;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::{SceneSettings, DUPLICATE_OFFSET};
use crate::expression;
use crate::geometry;
use crate::objects::{Category, ObjectId, ObjectKind, Particle, SceneObject};
use crate::vector::Vec2;

pub use baseline::ResetBaseline;
pub use error::SceneError;
pub use io::{LoadSummary, SIGNATURE_DECIMALS};

/// Screen to world offset: `world = screen - offset`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Camera {
    pub offset_x: f64,
    pub offset_y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Axis-aligned world rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct CategoryIndex {
    electric_fields: Vec<ObjectId>,
    magnetic_fields: Vec<ObjectId>,
    emitters: Vec<ObjectId>,
    disappear_zones: Vec<ObjectId>,
    screens: Vec<ObjectId>,
    particles: Vec<ObjectId>,
}

impl CategoryIndex {
    fn list(&self, category: Category) -> &Vec<ObjectId> {
        match category {
            Category::ElectricField => &self.electric_fields,
            Category::MagneticField => &self.magnetic_fields,
            Category::Emitter => &self.emitters,
            Category::DisappearZone => &self.disappear_zones,
            Category::Screen => &self.screens,
            Category::Particle => &self.particles,
        }
    }

    fn list_mut(&mut self, category: Category) -> &mut Vec<ObjectId> {
        match category {
            Category::ElectricField => &mut self.electric_fields,
            Category::MagneticField => &mut self.magnetic_fields,
            Category::Emitter => &mut self.emitters,
            Category::DisappearZone => &mut self.disappear_zones,
            Category::Screen => &mut self.screens,
            Category::Particle => &mut self.particles,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Scene {
    pub(crate) objects: Vec<SceneObject>,
    slots: HashMap<ObjectId, usize>,
    index: CategoryIndex,
    pub settings: SceneSettings,
    pub camera: Camera,
    pub viewport: Option<Viewport>,
    /// Explicit world bounds; takes precedence over the viewport.
    pub bounds_override: Option<Bounds>,
    variables: BTreeMap<String, f64>,
    selected: Option<ObjectId>,
    /// Simulation time (s).
    pub time: f64,
    pub(crate) rng: fastrand::Rng,
    next_id: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::with_settings(SceneSettings::default())
    }

    pub fn with_settings(settings: SceneSettings) -> Self {
        let rng = fastrand::Rng::with_seed(settings.rng_seed);
        Self {
            objects: Vec::new(),
            slots: HashMap::new(),
            index: CategoryIndex::default(),
            settings,
            camera: Camera::default(),
            viewport: None,
            bounds_override: None,
            variables: BTreeMap::new(),
            selected: None,
            time: 0.0,
            rng,
            next_id: 1,
        }
    }

    // ====================
    // Object arena
    // ====================

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Mutable access to every object. Ids and kinds must not be swapped
    /// through this slice.
    pub fn objects_mut(&mut self) -> &mut [SceneObject] {
        &mut self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.slots.get(&id).map(|&slot| &self.objects[slot])
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        let slot = *self.slots.get(&id)?;
        self.objects.get_mut(slot)
    }

    /// Ids of one category, in insertion order.
    pub fn ids(&self, category: Category) -> &[ObjectId] {
        self.index.list(category)
    }

    pub fn particles(&self) -> impl Iterator<Item = (ObjectId, &Particle)> + '_ {
        self.index
            .particles
            .iter()
            .filter_map(|&id| Some((id, self.object(id)?.kind.as_particle()?)))
    }

    pub fn particle(&self, id: ObjectId) -> Option<&Particle> {
        self.object(id)?.kind.as_particle()
    }

    pub fn particle_mut(&mut self, id: ObjectId) -> Option<&mut Particle> {
        self.object_mut(id)?.kind.as_particle_mut()
    }

    /// Add an object and return its id. Re-adding an exact copy of an object
    /// already stored under the same id is a no-op; anything else (including
    /// an object carrying an id from another scene) gets a fresh id.
    pub fn add_object(&mut self, object: impl Into<SceneObject>) -> ObjectId {
        let mut object = object.into();
        if self.object(object.id) == Some(&object) {
            return object.id;
        }
        object.id = ObjectId(self.next_id);
        self.next_id += 1;

        let names = self.variable_names();
        for err in object.kind.compile_formulas(&names) {
            log::warn!("{} #{}: expression ignored: {err}", object.type_name(), object.id.0);
        }
        geometry::ensure_geometry_state(&mut object, self.settings.pixels_per_meter);

        let id = object.id;
        self.index.list_mut(object.category()).push(id);
        self.slots.insert(id, self.objects.len());
        self.objects.push(object);
        id
    }

    /// Remove one object; clears the selection if it pointed at it.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<SceneObject> {
        let slot = *self.slots.get(&id)?;
        let removed = self.objects.remove(slot);
        self.index.list_mut(removed.category()).retain(|&other| other != id);
        self.rebuild_slots();
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(removed)
    }

    /// Remove many objects in one pass. Unknown and repeated ids are ignored.
    /// Returns how many were removed.
    pub fn remove_objects(&mut self, ids: &[ObjectId]) -> usize {
        let doomed: HashSet<ObjectId> = ids.iter().copied().filter(|id| self.contains(*id)).collect();
        if doomed.is_empty() {
            return 0;
        }
        self.objects.retain(|obj| !doomed.contains(&obj.id));
        for category in Category::ALL {
            self.index.list_mut(category).retain(|id| !doomed.contains(id));
        }
        self.rebuild_slots();
        if self.selected.is_some_and(|id| doomed.contains(&id)) {
            self.selected = None;
        }
        doomed.len()
    }

    fn rebuild_slots(&mut self) {
        self.slots = self.objects.iter().enumerate().map(|(slot, obj)| (obj.id, slot)).collect();
    }

    /// Copy an object under a fresh id, shifted by the duplicate offset, with
    /// its run state (trajectory, emitter cursors, screen hits) cleared.
    pub fn duplicate_object(&mut self, id: ObjectId) -> Result<ObjectId, SceneError> {
        let mut copy = self.object(id).cloned().ok_or(SceneError::NotFound(id))?;
        copy.id = ObjectId::default();
        copy.kind.translate(Vec2::new(DUPLICATE_OFFSET, DUPLICATE_OFFSET));
        copy.kind.reset_runtime();
        Ok(self.add_object(copy))
    }

    /// Drop every object and reset the clock; settings and variables stay.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.slots.clear();
        self.index = CategoryIndex::default();
        self.selected = None;
        self.time = 0.0;
        self.reseed();
    }

    pub fn reseed(&mut self) {
        self.rng = fastrand::Rng::with_seed(self.settings.rng_seed);
    }

    /// Top-most (last added) object under `p`.
    pub fn find_object_at(&self, p: Vec2) -> Option<ObjectId> {
        self.objects.iter().rev().find(|obj| obj.kind.contains_point(p)).map(|obj| obj.id)
    }

    // ====================
    // Selection
    // ====================

    pub fn selected(&self) -> Option<ObjectId> {
        self.selected
    }

    pub fn selected_object(&self) -> Option<&SceneObject> {
        self.object(self.selected?)
    }

    pub fn select(&mut self, id: ObjectId) -> Result<(), SceneError> {
        if !self.contains(id) {
            return Err(SceneError::NotFound(id));
        }
        self.selected = Some(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // ====================
    // Camera & viewport
    // ====================

    pub fn set_camera(&mut self, offset_x: f64, offset_y: f64) {
        self.camera = Camera { offset_x, offset_y };
    }

    pub fn to_world_point(&self, screen: Vec2) -> Vec2 {
        Vec2::new(screen.x - self.camera.offset_x, screen.y - self.camera.offset_y)
    }

    pub fn to_screen_point(&self, world: Vec2) -> Vec2 {
        Vec2::new(world.x + self.camera.offset_x, world.y + self.camera.offset_y)
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Some(Viewport { width, height });
    }

    /// World rectangle particles are kept in, or `None` when the scene has
    /// no usable viewport.
    pub fn world_bounds(&self) -> Option<Bounds> {
        if let Some(bounds) = self.bounds_override {
            return Some(bounds);
        }
        let vp = self.viewport?;
        if !(vp.width.is_finite() && vp.width > 0.0 && vp.height.is_finite() && vp.height > 0.0) {
            return None;
        }
        let min = Vec2::new(-self.camera.offset_x, -self.camera.offset_y);
        Some(Bounds::new(min, min + Vec2::new(vp.width, vp.height)))
    }

    // ====================
    // Variables
    // ====================

    pub fn variables(&self) -> &BTreeMap<String, f64> {
        &self.variables
    }

    pub fn variable_names(&self) -> Vec<String> {
        self.variables.keys().cloned().collect()
    }

    /// Bind `name` to `value` and recompile every formula.
    pub fn set_variable(&mut self, name: &str, value: f64) -> Result<(), SceneError> {
        if !expression::is_valid_variable_name(name) {
            return Err(SceneError::InvalidVariable {
                name: name.to_string(),
                reason: "not a valid identifier".into(),
            });
        }
        if !value.is_finite() {
            return Err(SceneError::InvalidVariable {
                name: name.to_string(),
                reason: "value must be finite".into(),
            });
        }
        let is_new = self.variables.insert(name.to_string(), value).is_none();
        if is_new {
            self.recompile_formulas();
        }
        Ok(())
    }

    pub fn remove_variable(&mut self, name: &str) -> bool {
        let removed = self.variables.remove(name).is_some();
        if removed {
            self.recompile_formulas();
        }
        removed
    }

    /// Recompile against the current variable names. Formulas that no longer
    /// compile are kept as text and evaluate as absent.
    pub fn recompile_formulas(&mut self) {
        let names = self.variable_names();
        for object in &mut self.objects {
            for err in object.kind.compile_formulas(&names) {
                log::warn!("{} #{}: expression ignored: {err}", object.kind.type_name(), object.id.0);
            }
        }
    }

    // ====================
    // Field queries
    // ====================

    /// Superposed electric field (V/m) at `p` at the current scene time.
    pub fn electric_field(&self, p: Vec2) -> Vec2 {
        self.electric_field_at(p, self.time)
    }

    pub fn electric_field_at(&self, p: Vec2, t: f64) -> Vec2 {
        self.index
            .electric_fields
            .iter()
            .filter_map(|&id| self.object(id))
            .fold(Vec2::zero(), |acc, obj| acc + obj.kind.electric_field_at(p, t, &self.variables))
    }

    /// Superposed out-of-screen magnetic field Bz (T) at `p`.
    pub fn magnetic_field(&self, p: Vec2) -> f64 {
        self.index
            .magnetic_fields
            .iter()
            .filter_map(|&id| self.object(id))
            .map(|obj| obj.kind.magnetic_field_at(p))
            .sum()
    }

    /// True if anything changes without particles moving: AC or custom
    /// capacitor sources, or screens still showing hits.
    pub fn has_time_varying_fields(&self) -> bool {
        let varying = self
            .index
            .electric_fields
            .iter()
            .filter_map(|&id| self.object(id))
            .any(|obj| obj.kind.is_time_varying());
        varying
            || self.index.screens.iter().filter_map(|&id| self.object(id)).any(|obj| {
                matches!(&obj.kind, ObjectKind::FluorescentScreen(s) if !s.hits.is_empty())
            })
    }

    /// Whether particles need swept collision tests (and sub-stepping).
    pub fn has_continuous_colliders(&self) -> bool {
        !self.index.disappear_zones.is_empty()
            || !self.index.screens.is_empty()
            || self.index.electric_fields.iter().any(|&id| {
                self.object(id).is_some_and(|obj| obj.kind.plate_frame().is_some())
            })
    }

    /// Geometry-scale pass over every object after a scene-scale change.
    pub fn sync_display_geometry(&mut self) -> bool {
        let ppm = self.settings.pixels_per_meter;
        let mut changed = false;
        for object in &mut self.objects {
            changed |= geometry::sync_display_geometry(object, ppm);
        }
        changed
    }
}
