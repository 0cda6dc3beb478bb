//! Scene encoder: objects, scenes and goals to hypervectors.
//!
//! - properties: `shape ⊗ color ⊗ size`, bound in exactly that order
//! - placed object: `properties ⊗ nearest_named_position`
//! - scene: bundle of placed-object vectors (`EMPTY_SCENE_ELEMENT` if empty)
//! - target: bundle of goal-object vectors; only absolute positions are bound in

use rand::Rng;

use crate::error::HdcError;
use crate::hdc::hypervector::{bind, bundle, Hypervector};
use crate::hdc::lexicon::{Lexicon, NONE_CONCEPT};
use crate::scene::canvas::{ObjectProperties, PlacedObject};
use crate::scene::geometry::{CanvasGeometry, Point};
use crate::scene::goal::GoalObject;

/// Stateless encoding layer over an owned lexicon and canvas geometry.
pub struct SceneEncoder {
    lexicon: Lexicon,
    geometry: CanvasGeometry,
}

impl SceneEncoder {
    /// Encoder over `lexicon`, placing positions on `geometry`.
    pub fn new(lexicon: Lexicon, geometry: CanvasGeometry) -> Self {
        Self { lexicon, geometry }
    }

    /// Lexicon every encoding is built from.
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Canvas geometry used for position labels and grid cells.
    pub fn geometry(&self) -> &CanvasGeometry {
        &self.geometry
    }

    /// `shape ⊗ color ⊗ size`; absent fields resolve through `NONE`.
    pub fn encode_properties(&self, props: &ObjectProperties<'_>) -> Result<Hypervector, HdcError> {
        debug_assert!(
            props.shape.map_or(true, |s| !s.trim().is_empty()),
            "object properties carry an empty shape"
        );
        let lookup = |field: Option<&str>| self.lexicon.get(field.unwrap_or(NONE_CONCEPT));
        let bound = bind(lookup(props.shape), lookup(props.color))?;
        bind(&bound, lookup(props.size))
    }

    /// Properties and full vectors of a placed object, without caching.
    fn compute_encoding(&self, obj: &PlacedObject) -> Result<(Hypervector, Hypervector), HdcError> {
        let props_hv = self.encode_properties(&obj.properties())?;
        let position_label = self
            .geometry
            .nearest_label(&obj.position())
            .unwrap_or(NONE_CONCEPT);
        let full_hv = bind(&props_hv, self.lexicon.get(position_label))?;
        tracing::debug!(id = obj.id(), position_label, "encoded placed object");
        Ok((props_hv, full_hv))
    }

    /// Encode a placed object and cache both its properties and full vectors
    /// on it. Returns the full vector.
    pub fn encode_placed_object(&self, obj: &mut PlacedObject) -> Result<Hypervector, HdcError> {
        let (props_hv, full_hv) = self.compute_encoding(obj)?;
        obj.store_encoding(props_hv, full_hv.clone());
        Ok(full_hv)
    }

    /// Properties vector of a placed object, computing and caching it if needed.
    pub fn properties_hv<'o>(
        &self,
        obj: &'o mut PlacedObject,
    ) -> Result<&'o Hypervector, HdcError> {
        let (props_hv, _) = obj.encoding_or_insert_with(|o| self.compute_encoding(o))?;
        Ok(props_hv)
    }

    /// Full vector of a placed object, computing and caching it if needed.
    pub fn full_hv<'o>(&self, obj: &'o mut PlacedObject) -> Result<&'o Hypervector, HdcError> {
        let (_, full_hv) = obj.encoding_or_insert_with(|o| self.compute_encoding(o))?;
        Ok(full_hv)
    }

    /// Bundle every object's full vector into one scene vector.
    pub fn encode_scene<R: Rng + ?Sized>(
        &self,
        objects: &mut [PlacedObject],
        rng: &mut R,
    ) -> Result<Hypervector, HdcError> {
        if objects.is_empty() {
            return Ok(self.lexicon.empty_scene().clone());
        }
        for obj in objects.iter_mut() {
            self.full_hv(obj)?;
        }
        let hvs: Vec<&Hypervector> = objects
            .iter()
            .filter_map(PlacedObject::cached_full_hv)
            .collect();
        bundle(&hvs, self.lexicon.space(), rng)
    }

    /// Representation of one goal object: properties, bound with the
    /// position vector when the object names an absolute position.
    /// Relational and free objects stay position-less here.
    pub fn encode_goal_object(&self, goal: &GoalObject) -> Result<Hypervector, HdcError> {
        let props_hv = self.encode_properties(&goal.properties())?;
        match goal.absolute_position() {
            Some(label) => bind(&props_hv, self.lexicon.get(label)),
            None => Ok(props_hv),
        }
    }

    /// Bundle every goal object's representation into one target vector.
    pub fn encode_target<R: Rng + ?Sized>(
        &self,
        goal: &[GoalObject],
        rng: &mut R,
    ) -> Result<Hypervector, HdcError> {
        if goal.is_empty() {
            return Ok(self.lexicon.empty_scene().clone());
        }
        let hvs = goal
            .iter()
            .map(|g| self.encode_goal_object(g))
            .collect::<Result<Vec<_>, _>>()?;
        let refs: Vec<&Hypervector> = hvs.iter().collect();
        bundle(&refs, self.lexicon.space(), rng)
    }

    /// Fine-grained position vector: the grid cell containing `point`.
    pub fn encode_grid_position(&self, point: &Point) -> &Hypervector {
        match self.lexicon.grid_cells() {
            Some(cells) => {
                let (x, y) = self.geometry.grid_cell(point, cells.x, cells.y);
                self.lexicon.get_grid_cell(x, y)
            }
            None => self.lexicon.get_grid_cell(0, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hdc::hypervector::{similarity, Encoding, VectorSpace};
    use crate::hdc::lexicon::{GridCells, Vocabulary, EMPTY_SCENE, UNKNOWN_CONCEPT};
    use crate::scene::goal::RelationKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn encoder(encoding: Encoding) -> SceneEncoder {
        let geometry = CanvasGeometry::default();
        let lexicon = Lexicon::new(
            VectorSpace::new(10_000, encoding),
            Vocabulary::default(),
            geometry.positions.iter().map(|p| p.label.as_str()),
            Some(45),
        )
        .with_position_grid(GridCells { x: 10, y: 10 });
        SceneEncoder::new(lexicon, geometry)
    }

    fn circle_at(x: f64, y: f64) -> PlacedObject {
        PlacedObject::new("o", "circle", "red", "medium", Point::new(x, y), 30.0)
    }

    fn props<'a>(shape: &'a str, color: &'a str, size: &'a str) -> ObjectProperties<'a> {
        ObjectProperties {
            shape: Some(shape),
            color: Some(color),
            size: Some(size),
        }
    }

    #[test]
    fn test_properties_fixed_bind_order() {
        let enc = encoder(Encoding::Binary);
        let lex = enc.lexicon();
        let shape_color = bind(lex.get("circle"), lex.get("red")).unwrap();
        let expected = bind(&shape_color, lex.get("medium")).unwrap();
        let got = enc.encode_properties(&props("circle", "red", "medium")).unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_missing_fields_use_none() {
        let enc = encoder(Encoding::Bipolar);
        let lex = enc.lexicon();
        let partial = ObjectProperties {
            shape: Some("square"),
            ..Default::default()
        };
        let none = lex.get(NONE_CONCEPT);
        let expected = bind(&bind(lex.get("square"), none).unwrap(), none).unwrap();
        assert_eq!(enc.encode_properties(&partial).unwrap(), expected);
    }

    #[test]
    fn test_properties_discriminate_color() {
        let enc = encoder(Encoding::Bipolar);
        let red = enc.encode_properties(&props("circle", "red", "medium")).unwrap();
        let blue = enc.encode_properties(&props("circle", "blue", "medium")).unwrap();
        assert!(similarity(&red, &blue).unwrap().abs() < 0.05);
    }

    #[test]
    fn test_placed_object_binds_nearest_position() {
        let enc = encoder(Encoding::Binary);
        let mut obj = circle_at(390.0, 310.0);
        let full = enc.encode_placed_object(&mut obj).unwrap();
        let props_hv = enc.encode_properties(&props("circle", "red", "medium")).unwrap();
        assert_eq!(full, bind(&props_hv, enc.lexicon().get("center")).unwrap());
        assert_eq!(obj.cached_properties_hv(), Some(&props_hv));
        assert_eq!(obj.cached_full_hv(), Some(&full));
    }

    #[test]
    fn test_cache_recomputed_after_move() {
        let enc = encoder(Encoding::Binary);
        let mut obj = circle_at(400.0, 300.0);
        let at_center = enc.full_hv(&mut obj).unwrap().clone();
        obj.set_position(Point::new(200.0, 150.0));
        let at_top_left = enc.full_hv(&mut obj).unwrap().clone();
        assert_ne!(at_center, at_top_left);
    }

    #[test]
    fn test_cached_vectors_are_reused() {
        let enc = encoder(Encoding::Binary);
        let mut obj = circle_at(400.0, 300.0);
        let zeros = enc.lexicon().space().zeros();
        obj.store_encoding(zeros.clone(), zeros.clone());
        assert_eq!(enc.properties_hv(&mut obj).unwrap(), &zeros);
        assert_eq!(enc.full_hv(&mut obj).unwrap(), &zeros);

        obj.set_size_label("large");
        let expected = enc.encode_properties(&props("circle", "red", "large")).unwrap();
        assert_eq!(enc.properties_hv(&mut obj).unwrap(), &expected);
        assert_eq!(obj.cached_properties_hv(), Some(&expected));
        assert!(obj.cached_full_hv().is_some());
    }

    #[test]
    fn test_empty_scene_and_target_use_sentinel() {
        let enc = encoder(Encoding::Binary);
        let mut rng = StdRng::seed_from_u64(0);
        let sentinel = enc.lexicon().get(EMPTY_SCENE).clone();
        assert_eq!(enc.encode_scene(&mut [], &mut rng).unwrap(), sentinel);
        assert_eq!(enc.encode_target(&[], &mut rng).unwrap(), sentinel);
        assert!(!sentinel.is_zero());
    }

    #[test]
    fn test_scene_matching_target_is_similar() {
        let enc = encoder(Encoding::Bipolar);
        let mut rng = StdRng::seed_from_u64(3);
        let goal = vec![
            GoalObject::new("obj_0", "circle").with_color("red").at("center"),
            GoalObject::new("obj_1", "square").with_color("blue").at("top_left"),
            GoalObject::new("obj_2", "triangle").with_color("green").at("bottom_right"),
        ];
        let mut objects = vec![
            PlacedObject::new("a", "circle", "red", "medium", Point::new(400.0, 300.0), 30.0),
            PlacedObject::new("b", "square", "blue", "medium", Point::new(200.0, 150.0), 30.0),
            PlacedObject::new("c", "triangle", "green", "medium", Point::new(600.0, 450.0), 30.0),
        ];
        let target = enc.encode_target(&goal, &mut rng).unwrap();
        let scene = enc.encode_scene(&mut objects, &mut rng).unwrap();
        assert!(similarity(&target, &scene).unwrap() > 0.9);

        objects[0].set_color("yellow");
        let drifted = enc.encode_scene(&mut objects, &mut rng).unwrap();
        assert!(similarity(&target, &drifted).unwrap() < 0.9);
    }

    #[test]
    fn test_relational_goal_encodes_properties_only() {
        let enc = encoder(Encoding::Binary);
        let goal = GoalObject::new("obj_1", "square").related(RelationKind::Above, "obj_0");
        let expected = enc.encode_properties(&goal.properties()).unwrap();
        assert_eq!(enc.encode_goal_object(&goal).unwrap(), expected);
    }

    #[test]
    fn test_grid_position_lookup() {
        let enc = encoder(Encoding::Binary);
        let lex = enc.lexicon();
        assert_eq!(enc.encode_grid_position(&Point::new(405.0, 305.0)), lex.get_grid_cell(5, 5));
        assert_ne!(enc.encode_grid_position(&Point::new(5.0, 5.0)), lex.get(UNKNOWN_CONCEPT));
    }
}
