//! Guidance system: one corrective action per call.
//!
//! Each call to [`GuidanceSystem::propose_action`] rebuilds the assignment
//! map from scratch and walks three phases in priority order:
//! 1. **ADD** the first goal object with no match
//! 2. **MOVE** the first matched object that is too far from its absolute
//!    target or from its relation target
//! 3. **CHANGE_COLOR** the first matched object whose color differs
//!
//! `Ok(None)` means the scene satisfies the goal up to the thresholds.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::GoalError;
use crate::guidance::action::Action;
use crate::guidance::matching::{assign, AssignmentMap};
use crate::hdc::scene_encoder::SceneEncoder;
use crate::scene::canvas::Canvas;
use crate::scene::geometry::Point;
use crate::scene::goal::{validate_goal, GoalObject, Placement};

/// Thresholds and distances for the decision procedure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceSettings {
    /// A pairing is accepted only when similarity is strictly above this.
    pub object_match_threshold: f64,

    /// Objects closer than this (pixels) to their target are not moved.
    pub move_threshold: f64,

    /// Distance (pixels) between a related object and its reference.
    pub relation_offset: f64,

    /// Free objects are added at least this far (pixels) from the canvas edge.
    pub placement_margin: f64,
}

impl Default for GuidanceSettings {
    fn default() -> Self {
        Self {
            object_match_threshold: config::OBJECT_MATCH_THRESHOLD,
            move_threshold: config::MOVE_STEP_THRESHOLD,
            relation_offset: config::RELATION_OFFSET,
            placement_margin: config::ADD_MARGIN,
        }
    }
}

/// The decision engine for one goal.
pub struct GuidanceSystem {
    goal: Vec<GoalObject>,
    settings: GuidanceSettings,
    rng: StdRng,
}

impl GuidanceSystem {
    /// `seed` drives random placement of position-less ADDs.
    pub fn new(
        goal: Vec<GoalObject>,
        settings: GuidanceSettings,
        seed: Option<u64>,
    ) -> Result<Self, GoalError> {
        validate_goal(&goal)?;
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            goal,
            settings,
            rng,
        })
    }

    /// Validated goal list.
    pub fn goal(&self) -> &[GoalObject] {
        &self.goal
    }

    /// Thresholds and offsets in use.
    pub fn settings(&self) -> &GuidanceSettings {
        &self.settings
    }

    /// Matching pass only.
    pub fn match_objects(
        &self,
        encoder: &SceneEncoder,
        canvas: &mut Canvas,
    ) -> crate::Result<AssignmentMap> {
        Ok(assign(
            &self.goal,
            encoder,
            canvas,
            self.settings.object_match_threshold,
        )?)
    }

    /// Propose at most one corrective action for the current scene.
    pub fn propose_action(
        &mut self,
        encoder: &SceneEncoder,
        canvas: &mut Canvas,
    ) -> crate::Result<Option<Action>> {
        let map = self.match_objects(encoder, canvas)?;
        tracing::debug!(
            matched = map.len(),
            goal_objects = self.goal.len(),
            "matching complete"
        );

        let action = self
            .propose_add(encoder, &map)
            .or_else(|| self.propose_move(encoder, canvas, &map))
            .or_else(|| self.propose_color_change(canvas, &map));

        match &action {
            Some(a) => tracing::info!(action = %a, "proposed action"),
            None => tracing::info!("no action: scene satisfies the goal"),
        }
        Ok(action)
    }

    fn propose_add(&mut self, encoder: &SceneEncoder, map: &AssignmentMap) -> Option<Action> {
        let target = self.goal.iter().find(|g| !map.is_matched(&g.id))?;
        let geometry = encoder.geometry();
        let position = match target.absolute_position() {
            Some(label) => geometry.resolve_or_center(label),
            None => {
                let m = self.settings.placement_margin;
                Point::new(
                    random_within(&mut self.rng, m, geometry.width - m),
                    random_within(&mut self.rng, m, geometry.height - m),
                )
            }
        };
        Some(Action::Add {
            shape: target.shape.clone(),
            color: target.color.clone(),
            size: target.size.clone(),
            position,
        })
    }

    fn propose_move(
        &self,
        encoder: &SceneEncoder,
        canvas: &Canvas,
        map: &AssignmentMap,
    ) -> Option<Action> {
        for target in &self.goal {
            let Some(assignment) = map.get(&target.id) else {
                continue;
            };
            let Some(obj) = canvas.get(&assignment.object_id) else {
                continue;
            };

            let destination = match &target.placement {
                Placement::Absolute(label) => encoder.geometry().resolve_or_center(label),
                Placement::Relative(relation) => {
                    let reference = relation
                        .reference
                        .as_deref()
                        .and_then(|ref_id| map.get(ref_id))
                        .and_then(|a| canvas.get(&a.object_id));
                    let Some(reference) = reference else {
                        tracing::debug!(
                            goal = %target.id,
                            relation = %relation.kind,
                            "relation reference not matched yet, skipping"
                        );
                        continue;
                    };
                    let (dx, dy) = relation.kind.displacement(self.settings.relation_offset);
                    reference.position().offset(dx, dy)
                }
                Placement::Free => continue,
            };

            if obj.position().distance(&destination) > self.settings.move_threshold {
                return Some(Action::Move {
                    object_id: obj.id().to_string(),
                    new_position: destination,
                });
            }
        }
        None
    }

    fn propose_color_change(&self, canvas: &Canvas, map: &AssignmentMap) -> Option<Action> {
        map.iter().find_map(|(goal_id, assignment)| {
            let target = self.goal.iter().find(|g| g.id == goal_id)?;
            let obj = canvas.get(&assignment.object_id)?;
            (obj.color() != target.color).then(|| Action::ChangeColor {
                object_id: obj.id().to_string(),
                new_color: target.color.clone(),
            })
        })
    }
}

fn random_within(rng: &mut StdRng, low: f64, high: f64) -> f64 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        (low + high) / 2.0
    }
}
