//! Greedy goal-to-canvas assignment.
//!
//! Goal objects are visited in list order; each takes the unassigned placed
//! object with the highest properties similarity. Placed objects are scanned
//! in canvas insertion order with a strict `>` comparison, so on equal
//! similarity the first-seen object wins. A pairing is accepted only when
//! the similarity strictly exceeds the match threshold; accepted objects are
//! excluded for later goal objects, which keeps the map injective.

use std::collections::HashSet;

use crate::error::HdcError;
use crate::hdc::hypervector::similarity;
use crate::hdc::scene_encoder::SceneEncoder;
use crate::scene::canvas::Canvas;
use crate::scene::goal::GoalObject;

/// One accepted pairing.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub object_id: String,
    pub similarity: f64,
}

/// Goal id → placed object, rebuilt on every guidance call.
#[derive(Clone, Debug, Default)]
pub struct AssignmentMap {
    entries: Vec<(String, Assignment)>,
}

impl AssignmentMap {
    /// Assignment for a goal id, if it was matched.
    pub fn get(&self, goal_id: &str) -> Option<&Assignment> {
        self.entries
            .iter()
            .find(|(id, _)| id == goal_id)
            .map(|(_, a)| a)
    }

    /// Whether the goal id received an object.
    pub fn is_matched(&self, goal_id: &str) -> bool {
        self.get(goal_id).is_some()
    }

    /// Pairings in goal order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Assignment)> {
        self.entries.iter().map(|(id, a)| (id.as_str(), a))
    }

    /// Number of matched goal objects.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was matched.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the assignment map for `goal` against the current `canvas`,
/// caching properties vectors on the placed objects as a side effect.
pub fn assign(
    goal: &[GoalObject],
    encoder: &SceneEncoder,
    canvas: &mut Canvas,
    threshold: f64,
) -> Result<AssignmentMap, HdcError> {
    let mut map = AssignmentMap::default();
    let mut taken: HashSet<String> = HashSet::new();

    for target in goal {
        let target_hv = encoder.encode_properties(&target.properties())?;

        let mut best: Option<Assignment> = None;
        for obj in canvas.objects_mut() {
            if taken.contains(obj.id()) {
                continue;
            }
            let sim = similarity(&target_hv, encoder.properties_hv(obj)?)?;
            if best.as_ref().map_or(true, |b| sim > b.similarity) {
                best = Some(Assignment {
                    object_id: obj.id().to_string(),
                    similarity: sim,
                });
            }
        }

        match best {
            Some(found) if found.similarity > threshold => {
                tracing::debug!(
                    goal = %target.id,
                    object = %found.object_id,
                    similarity = found.similarity,
                    "matched"
                );
                taken.insert(found.object_id.clone());
                map.entries.push((target.id.clone(), found));
            }
            Some(found) => {
                tracing::debug!(
                    goal = %target.id,
                    best = %found.object_id,
                    similarity = found.similarity,
                    threshold,
                    "best candidate below threshold"
                );
            }
            None => tracing::debug!(goal = %target.id, "no unassigned candidates"),
        }
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hdc::hypervector::{Encoding, VectorSpace};
    use crate::hdc::lexicon::{Lexicon, Vocabulary};
    use crate::scene::geometry::{CanvasGeometry, Point};

    fn encoder(encoding: Encoding) -> SceneEncoder {
        let geometry = CanvasGeometry::default();
        let lexicon = Lexicon::new(
            VectorSpace::new(10_000, encoding),
            Vocabulary::default(),
            geometry.positions.iter().map(|p| p.label.as_str()),
            Some(45),
        );
        SceneEncoder::new(lexicon, geometry)
    }

    #[test]
    fn test_exact_match_preferred() {
        let enc = encoder(Encoding::Bipolar);
        let mut canvas = Canvas::new();
        canvas.add("square", "blue", "medium", Point::new(100.0, 100.0), 30.0);
        let red = canvas.add("circle", "red", "medium", Point::new(400.0, 300.0), 30.0);

        let goal = vec![GoalObject::new("obj_0", "circle").with_color("red")];
        let map = assign(&goal, &enc, &mut canvas, 0.2).unwrap();
        let a = map.get("obj_0").unwrap();
        assert_eq!(a.object_id, red);
        assert!((a.similarity - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_below_threshold_unmatched() {
        let enc = encoder(Encoding::Bipolar);
        let mut canvas = Canvas::new();
        canvas.add("square", "blue", "small", Point::new(100.0, 100.0), 15.0);

        let goal = vec![GoalObject::new("obj_0", "circle").with_color("red")];
        let map = assign(&goal, &enc, &mut canvas, 0.2).unwrap();
        assert!(!map.is_matched("obj_0"));
        assert!(map.is_empty());
    }

    #[test]
    fn test_assignment_is_injective() {
        let enc = encoder(Encoding::Binary);
        let mut canvas = Canvas::new();
        canvas.add("circle", "red", "medium", Point::new(100.0, 100.0), 30.0);
        canvas.add("circle", "red", "medium", Point::new(600.0, 400.0), 30.0);

        let goal = vec![
            GoalObject::new("obj_0", "circle").with_color("red"),
            GoalObject::new("obj_1", "circle").with_color("red"),
            GoalObject::new("obj_2", "circle").with_color("red"),
        ];
        let map = assign(&goal, &enc, &mut canvas, 0.2).unwrap();
        assert_eq!(map.len(), 2);
        let ids: HashSet<&str> = map.iter().map(|(_, a)| a.object_id.as_str()).collect();
        assert_eq!(ids.len(), map.len());
        assert!(!map.is_matched("obj_2"));
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let enc = encoder(Encoding::Bipolar);
        let mut canvas = Canvas::new();
        let first = canvas.add("circle", "red", "medium", Point::new(600.0, 400.0), 30.0);
        canvas.add("circle", "red", "medium", Point::new(100.0, 100.0), 30.0);

        let goal = vec![GoalObject::new("obj_0", "circle").with_color("red")];
        let map = assign(&goal, &enc, &mut canvas, 0.2).unwrap();
        assert_eq!(map.get("obj_0").unwrap().object_id, first);
    }

    #[test]
    fn test_earlier_goal_has_first_pick() {
        let enc = encoder(Encoding::Bipolar);
        let mut canvas = Canvas::new();
        let only = canvas.add("circle", "red", "medium", Point::new(400.0, 300.0), 30.0);

        let goal = vec![
            GoalObject::new("obj_0", "circle").with_color("red"),
            GoalObject::new("obj_1", "circle").with_color("red"),
        ];
        let map = assign(&goal, &enc, &mut canvas, 0.2).unwrap();
        assert_eq!(map.get("obj_0").unwrap().object_id, only);
        assert!(!map.is_matched("obj_1"));
    }

    #[test]
    fn test_assign_caches_properties() {
        let enc = encoder(Encoding::Binary);
        let mut canvas = Canvas::new();
        let id = canvas.add("circle", "red", "medium", Point::new(400.0, 300.0), 30.0);
        let goal = vec![GoalObject::new("obj_0", "circle")];
        assign(&goal, &enc, &mut canvas, 0.2).unwrap();
        assert!(canvas.get(&id).unwrap().cached_properties_hv().is_some());
    }
}
