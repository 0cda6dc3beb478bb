//! Placed objects and the in-memory scene store.
//!
//! Each [`PlacedObject`] memoizes two encodings: its properties hypervector
//! (shape ⊗ color ⊗ size) and its full hypervector (properties ⊗ nearest
//! named position). Every mutator that touches one of those inputs drops
//! both caches, so a cached value is never stale.

use std::fmt;

use serde::Serialize;

use crate::error::SceneError;
use crate::hdc::hypervector::Hypervector;
use crate::scene::geometry::Point;

/// Conceptual properties of one object. Absent fields encode as `NONE`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObjectProperties<'a> {
    pub shape: Option<&'a str>,
    pub color: Option<&'a str>,
    pub size: Option<&'a str>,
}

/// One element of the scene.
#[derive(Clone, Serialize)]
pub struct PlacedObject {
    id: String,
    shape: String,
    color: String,
    size_label: String,
    visual_size: f64,
    position: Point,

    #[serde(skip)]
    properties_hv: Option<Hypervector>,
    #[serde(skip)]
    full_hv: Option<Hypervector>,
}

impl PlacedObject {
    /// Build an object with empty encoding caches.
    pub fn new(
        id: &str,
        shape: &str,
        color: &str,
        size_label: &str,
        position: Point,
        visual_size: f64,
    ) -> Self {
        Self {
            id: id.to_string(),
            shape: shape.to_string(),
            color: color.to_string(),
            size_label: size_label.to_string(),
            visual_size,
            position,
            properties_hv: None,
            full_hv: None,
        }
    }

    /// Canvas-assigned id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Shape label.
    pub fn shape(&self) -> &str {
        &self.shape
    }

    /// Color label.
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Size label (`small`, `medium`, `large`).
    pub fn size_label(&self) -> &str {
        &self.size_label
    }

    /// Drawn size in pixels.
    pub fn visual_size(&self) -> f64 {
        self.visual_size
    }

    /// Absolute canvas position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Shape, color and size as encoder input.
    pub fn properties(&self) -> ObjectProperties<'_> {
        ObjectProperties {
            shape: Some(&self.shape),
            color: Some(&self.color),
            size: Some(&self.size_label),
        }
    }

    /// Change the shape and drop cached encodings.
    pub fn set_shape(&mut self, shape: &str) {
        self.shape = shape.to_string();
        self.invalidate();
    }

    /// Change the color and drop cached encodings.
    pub fn set_color(&mut self, color: &str) {
        self.color = color.to_string();
        self.invalidate();
    }

    /// Change the size label and drop cached encodings.
    pub fn set_size_label(&mut self, size_label: &str) {
        self.size_label = size_label.to_string();
        self.invalidate();
    }

    /// Move the object and drop cached encodings.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
        self.invalidate();
    }

    /// Cached properties hypervector, if still valid.
    pub fn cached_properties_hv(&self) -> Option<&Hypervector> {
        self.properties_hv.as_ref()
    }

    /// Cached full (properties ⊗ position) hypervector, if still valid.
    pub fn cached_full_hv(&self) -> Option<&Hypervector> {
        self.full_hv.as_ref()
    }

    /// Replace both cached vectors.
    pub(crate) fn store_encoding(&mut self, properties: Hypervector, full: Hypervector) {
        self.properties_hv = Some(properties);
        self.full_hv = Some(full);
    }

    /// Both cached vectors, running `compute` first if either is missing.
    pub(crate) fn encoding_or_insert_with<E>(
        &mut self,
        compute: impl FnOnce(&PlacedObject) -> Result<(Hypervector, Hypervector), E>,
    ) -> Result<(&Hypervector, &Hypervector), E> {
        let (properties, full) = match (self.properties_hv.take(), self.full_hv.take()) {
            (Some(p), Some(f)) => (p, f),
            _ => compute(self)?,
        };
        let properties = self.properties_hv.insert(properties);
        let full = self.full_hv.insert(full);
        Ok((&*properties, &*full))
    }

    fn invalidate(&mut self) {
        self.properties_hv = None;
        self.full_hv = None;
    }
}

impl fmt::Debug for PlacedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PlacedObject(id={}, shape='{}', color='{}', size='{}', pos={})",
            self.id, self.shape, self.color, self.size_label, self.position
        )
    }
}

/// The mutable scene store. Objects keep insertion order, which is the
/// encounter order used for match tie-breaking.
#[derive(Debug, Default, Serialize)]
pub struct Canvas {
    objects: Vec<PlacedObject>,
    #[serde(skip)]
    next_id: u64,
}

impl Canvas {
    /// Empty canvas; ids start at `canvas_0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new object under a fresh `canvas_<n>` id and return the id.
    pub fn add(
        &mut self,
        shape: &str,
        color: &str,
        size_label: &str,
        position: Point,
        visual_size: f64,
    ) -> String {
        let id = loop {
            let candidate = format!("canvas_{}", self.next_id);
            self.next_id += 1;
            if self.get(&candidate).is_none() {
                break candidate;
            }
        };
        let obj = PlacedObject::new(&id, shape, color, size_label, position, visual_size);
        tracing::debug!(?obj, "canvas: added");
        self.objects.push(obj);
        id
    }

    /// Insert a pre-built object, keeping its id.
    pub fn insert(&mut self, obj: PlacedObject) -> Result<(), SceneError> {
        if self.get(obj.id()).is_some() {
            return Err(SceneError::DuplicateObject(obj.id().to_string()));
        }
        self.objects.push(obj);
        Ok(())
    }

    /// Remove and return the object with `id`.
    pub fn remove(&mut self, id: &str) -> Result<PlacedObject, SceneError> {
        let idx = self
            .objects
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| SceneError::UnknownObject(id.to_string()))?;
        let removed = self.objects.remove(idx);
        tracing::debug!(?removed, "canvas: removed");
        Ok(removed)
    }

    /// Look up an object by id.
    pub fn get(&self, id: &str) -> Option<&PlacedObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Mutable lookup by id.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut PlacedObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Set the position of the object with `id`.
    pub fn move_object(&mut self, id: &str, position: Point) -> Result<(), SceneError> {
        let obj = self
            .get_mut(id)
            .ok_or_else(|| SceneError::UnknownObject(id.to_string()))?;
        obj.set_position(position);
        tracing::debug!(id, %position, "canvas: moved");
        Ok(())
    }

    /// Set the color of the object with `id`.
    pub fn change_color(&mut self, id: &str, color: &str) -> Result<(), SceneError> {
        let obj = self
            .get_mut(id)
            .ok_or_else(|| SceneError::UnknownObject(id.to_string()))?;
        obj.set_color(color);
        tracing::debug!(id, color, "canvas: recolored");
        Ok(())
    }

    /// Remove every object. The id counter keeps counting.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Objects in insertion order.
    pub fn objects(&self) -> &[PlacedObject] {
        &self.objects
    }

    /// Objects in insertion order, for cache filling.
    pub fn objects_mut(&mut self) -> &mut [PlacedObject] {
        &mut self.objects
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when the canvas holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.objects.is_empty() {
            return write!(f, "Canvas(empty)");
        }
        write!(f, "Canvas with {} objects:", self.objects.len())?;
        for obj in &self.objects {
            write!(f, "\n  {:?}", obj)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hdc::hypervector::{Encoding, VectorSpace};

    fn canvas_with_circle() -> (Canvas, String) {
        let mut canvas = Canvas::new();
        let id = canvas.add("circle", "red", "medium", Point::new(400.0, 300.0), 30.0);
        (canvas, id)
    }

    #[test]
    fn test_add_assigns_sequential_ids() {
        let mut canvas = Canvas::new();
        let a = canvas.add("circle", "red", "small", Point::new(1.0, 1.0), 15.0);
        let b = canvas.add("square", "blue", "large", Point::new(2.0, 2.0), 45.0);
        assert_eq!(a, "canvas_0");
        assert_eq!(b, "canvas_1");
        assert_eq!(canvas.len(), 2);
    }

    #[test]
    fn test_add_skips_taken_ids() {
        let mut canvas = Canvas::new();
        canvas
            .insert(PlacedObject::new(
                "canvas_0",
                "circle",
                "red",
                "small",
                Point::new(0.0, 0.0),
                15.0,
            ))
            .unwrap();
        let id = canvas.add("square", "blue", "large", Point::new(2.0, 2.0), 45.0);
        assert_eq!(id, "canvas_1");
    }

    #[test]
    fn test_insert_rejects_duplicate() {
        let (mut canvas, id) = canvas_with_circle();
        let dup = PlacedObject::new(&id, "square", "blue", "small", Point::new(0.0, 0.0), 15.0);
        assert_eq!(canvas.insert(dup), Err(SceneError::DuplicateObject(id)));
    }

    #[test]
    fn test_move_and_recolor() {
        let (mut canvas, id) = canvas_with_circle();
        canvas.move_object(&id, Point::new(10.0, 20.0)).unwrap();
        canvas.change_color(&id, "blue").unwrap();
        let obj = canvas.get(&id).unwrap();
        assert_eq!(obj.position(), Point::new(10.0, 20.0));
        assert_eq!(obj.color(), "blue");
    }

    #[test]
    fn test_unknown_object_errors() {
        let mut canvas = Canvas::new();
        assert_eq!(
            canvas.move_object("ghost", Point::new(0.0, 0.0)),
            Err(SceneError::UnknownObject("ghost".into()))
        );
        assert!(canvas.remove("ghost").is_err());
    }

    #[test]
    fn test_mutation_invalidates_cache() {
        let (mut canvas, id) = canvas_with_circle();
        let space = VectorSpace::new(16, Encoding::Binary);
        let obj = canvas.get_mut(&id).unwrap();
        obj.store_encoding(space.zeros(), space.zeros());
        assert!(obj.cached_properties_hv().is_some());

        obj.set_color("green");
        assert!(obj.cached_properties_hv().is_none());
        assert!(obj.cached_full_hv().is_none());

        obj.store_encoding(space.zeros(), space.zeros());
        obj.set_position(Point::new(1.0, 1.0));
        assert!(obj.cached_full_hv().is_none());

        obj.store_encoding(space.zeros(), space.zeros());
        obj.set_shape("triangle");
        assert!(obj.cached_properties_hv().is_none());
        assert!(obj.cached_full_hv().is_none());
        assert_eq!(obj.shape(), "triangle");

        obj.store_encoding(space.zeros(), space.zeros());
        obj.set_size_label("large");
        assert!(obj.cached_properties_hv().is_none());
        assert!(obj.cached_full_hv().is_none());
        assert_eq!(obj.size_label(), "large");
    }

    #[test]
    fn test_clear_empties_store() {
        let (mut canvas, id) = canvas_with_circle();
        canvas.clear();
        assert!(canvas.is_empty());
        assert!(canvas.get(&id).is_none());
        let next = canvas.add("square", "blue", "small", Point::new(0.0, 0.0), 15.0);
        assert_ne!(next, id);
    }

    #[test]
    fn test_display_lists_objects() {
        let (canvas, _) = canvas_with_circle();
        let text = canvas.to_string();
        assert!(text.starts_with("Canvas with 1 objects:"));
        assert!(text.contains("shape='circle'"));
        assert_eq!(Canvas::new().to_string(), "Canvas(empty)");
    }
}
