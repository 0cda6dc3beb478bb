//! Compose loop: guidance proposes, agent applies, repeat.
//!
//! Each iteration asks the guidance system for one action against the
//! current canvas. The loop stops when no action is proposed (converged) or
//! after `run.max_iterations` calls. Scene-to-target similarity is tracked
//! for reporting only; it never drives a decision.

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::guidance::action::Action;
use crate::guidance::system::GuidanceSystem;
use crate::hdc::hypervector::{similarity, Hypervector};
use crate::hdc::lexicon::Lexicon;
use crate::hdc::scene_encoder::SceneEncoder;
use crate::runtime::settings::ComposerSettings;
use crate::scene::agent::Agent;
use crate::scene::canvas::{Canvas, PlacedObject};
use crate::scene::goal::GoalObject;

/// Outcome of [`Composer::run`].
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Guidance calls made, including the final one that proposed nothing.
    pub iterations: usize,

    /// Whether guidance ran out of corrections before the iteration bound.
    pub converged: bool,

    /// Actions applied, in order.
    pub actions: Vec<Action>,

    /// Cosine similarity between the final scene and the goal's target vector.
    pub final_similarity: f64,

    /// `final_similarity >= run.scene_similarity_target`.
    pub target_reached: bool,

    /// Final canvas contents.
    pub objects: Vec<PlacedObject>,
}

/// Owns everything one composition needs.
pub struct Composer {
    settings: ComposerSettings,
    encoder: SceneEncoder,
    guidance: GuidanceSystem,
    agent: Agent,
    canvas: Canvas,
    /// Tie-breaking for scene/target bundling.
    rng: StdRng,
    target_hv: Hypervector,
}

impl Composer {
    /// Build the lexicon and guidance system for `goal`.
    ///
    /// With a configured seed `s` the lexicon uses `s`, random placement
    /// `s + 1` and bundling `s + 2`, so runs are reproducible end to end.
    pub fn new(settings: ComposerSettings, goal: Vec<GoalObject>) -> anyhow::Result<Self> {
        settings.validate().context("invalid composer settings")?;
        let seed = settings.hdc.seed;

        let mut lexicon = Lexicon::new(
            settings.hdc.space(),
            settings.vocabulary.clone(),
            settings.canvas.positions.iter().map(|p| p.label.as_str()),
            seed,
        );
        if let Some(cells) = settings.hdc.grid_cells {
            lexicon = lexicon.with_position_grid(cells);
        }
        let encoder = SceneEncoder::new(lexicon, settings.canvas.clone());

        let guidance = GuidanceSystem::new(
            goal,
            settings.guidance.clone(),
            seed.map(|s| s.wrapping_add(1)),
        )
        .context("invalid goal")?;

        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s.wrapping_add(2)),
            None => StdRng::from_entropy(),
        };
        let target_hv = encoder
            .encode_target(guidance.goal(), &mut rng)
            .context("failed to encode goal target")?;

        tracing::info!(
            goal_objects = guidance.goal().len(),
            encoding = ?settings.hdc.encoding,
            dimensionality = settings.hdc.dimensionality,
            "composer ready"
        );

        Ok(Self {
            agent: Agent::new(settings.run.base_visual_size),
            settings,
            encoder,
            guidance,
            canvas: Canvas::new(),
            rng,
            target_hv,
        })
    }

    /// Start from an existing canvas instead of an empty one.
    pub fn with_canvas(mut self, canvas: Canvas) -> Self {
        self.canvas = canvas;
        self
    }

    /// Current canvas.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Encoder holding the run's lexicon.
    pub fn encoder(&self) -> &SceneEncoder {
        &self.encoder
    }

    /// Goal objects, in the order they were given.
    pub fn goal(&self) -> &[GoalObject] {
        self.guidance.goal()
    }

    /// Settings the composer was built with.
    pub fn settings(&self) -> &ComposerSettings {
        &self.settings
    }

    /// Bundled encoding of the whole goal.
    pub fn target_hv(&self) -> &Hypervector {
        &self.target_hv
    }

    /// Similarity between the current scene vector and the target vector.
    pub fn scene_similarity(&mut self) -> anyhow::Result<f64> {
        let scene_hv = self
            .encoder
            .encode_scene(self.canvas.objects_mut(), &mut self.rng)?;
        Ok(similarity(&scene_hv, &self.target_hv)?)
    }

    /// One guidance call. Applies and returns the proposed action, or
    /// `None` when the scene already satisfies the goal.
    pub fn step(&mut self) -> anyhow::Result<Option<Action>> {
        let Some(action) = self
            .guidance
            .propose_action(&self.encoder, &mut self.canvas)?
        else {
            return Ok(None);
        };
        self.agent
            .execute(&mut self.canvas, &action)
            .with_context(|| format!("failed to apply {}", action))?;
        Ok(Some(action))
    }

    /// Iterate until convergence or the iteration bound.
    pub fn run(&mut self) -> anyhow::Result<RunReport> {
        let max_iterations = self.settings.run.max_iterations;
        let mut actions = Vec::new();
        let mut converged = false;
        let mut iterations = 0;

        while iterations < max_iterations {
            iterations += 1;
            match self.step()? {
                Some(action) => {
                    let sim = self.scene_similarity()?;
                    tracing::info!(
                        iteration = iterations,
                        action = action.kind(),
                        similarity = format_args!("{:.4}", sim),
                        "step"
                    );
                    actions.push(action);
                }
                None => {
                    converged = true;
                    break;
                }
            }
        }

        if !converged {
            tracing::warn!(max_iterations, "iteration bound reached before convergence");
        }

        let final_similarity = self.scene_similarity()?;
        let target_reached = final_similarity >= self.settings.run.scene_similarity_target;
        tracing::info!(
            iterations,
            converged,
            actions = actions.len(),
            final_similarity = format_args!("{:.4}", final_similarity),
            target_reached,
            "compose finished"
        );

        Ok(RunReport {
            iterations,
            converged,
            actions,
            final_similarity,
            target_reached,
            objects: self.canvas.objects().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GoalError;
    use crate::hdc::hypervector::Encoding;
    use crate::scene::geometry::Point;
    use crate::scene::goal::RelationKind;

    fn settings(encoding: Encoding) -> ComposerSettings {
        let mut s = ComposerSettings::default();
        s.hdc.encoding = encoding;
        s
    }

    fn red_circle_at_center() -> GoalObject {
        GoalObject::new("obj_0", "circle").with_color("red").at("center")
    }

    #[test]
    fn test_single_object_converges_in_one_action() {
        let mut composer =
            Composer::new(settings(Encoding::Binary), vec![red_circle_at_center()]).unwrap();
        let report = composer.run().unwrap();

        assert!(report.converged);
        assert_eq!(report.iterations, 2);
        assert_eq!(report.actions.len(), 1);
        assert_eq!(report.objects.len(), 1);
        assert_eq!(report.objects[0].position(), Point::new(400.0, 300.0));
        assert!((report.final_similarity - 1.0).abs() < 1e-12);
        assert!(report.target_reached);
    }

    #[test]
    fn test_step_after_convergence_is_none() {
        let mut composer =
            Composer::new(settings(Encoding::Bipolar), vec![red_circle_at_center()]).unwrap();
        assert!(composer.step().unwrap().is_some());
        assert!(composer.step().unwrap().is_none());
        assert!(composer.step().unwrap().is_none());
        assert_eq!(composer.canvas().len(), 1);
    }

    #[test]
    fn test_existing_canvas_is_corrected() {
        let mut canvas = Canvas::new();
        canvas.add("circle", "blue", "medium", Point::new(100.0, 500.0), 30.0);
        let mut composer = Composer::new(settings(Encoding::Binary), vec![red_circle_at_center()])
            .unwrap()
            .with_canvas(canvas);

        let report = composer.run().unwrap();
        assert!(report.converged);
        let kinds: Vec<&str> = report.actions.iter().map(Action::kind).collect();
        assert_eq!(kinds, vec!["MOVE", "CHANGE_COLOR"]);
        assert_eq!(report.objects[0].color(), "red");
    }

    #[test]
    fn test_iteration_bound_respected() {
        let mut s = settings(Encoding::Bipolar);
        s.run.max_iterations = 1;
        let goal = vec![
            red_circle_at_center(),
            GoalObject::new("obj_1", "square").with_color("blue").at("top_left"),
        ];
        let report = Composer::new(s, goal).unwrap().run().unwrap();
        assert!(!report.converged);
        assert_eq!(report.iterations, 1);
        assert_eq!(report.actions.len(), 1);
    }

    #[test]
    fn test_invalid_goal_rejected() {
        let goal = vec![GoalObject::new("a", "circle"), GoalObject::new("a", "square")];
        assert!(Composer::new(ComposerSettings::default(), goal).is_err());
    }

    #[test]
    fn test_self_related_goal_rejected() {
        let goal = vec![GoalObject::new("obj_0", "circle").related(RelationKind::LeftOf, "obj_0")];
        let err = Composer::new(settings(Encoding::Bipolar), goal).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<GoalError>(),
            Some(GoalError::SelfReference { .. })
        ));
    }

    #[test]
    fn test_seeded_runs_reproducible() {
        let goal = || {
            vec![
                GoalObject::new("obj_0", "triangle").with_color("green"),
                GoalObject::new("obj_1", "square").with_color("yellow"),
            ]
        };
        let a = Composer::new(settings(Encoding::Bipolar), goal()).unwrap().run().unwrap();
        let b = Composer::new(settings(Encoding::Bipolar), goal()).unwrap().run().unwrap();
        assert_eq!(a.actions, b.actions);
        assert_eq!(a.final_similarity, b.final_similarity);
    }
}
