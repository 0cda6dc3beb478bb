//! Agent: applies one [`Action`] to the scene store.

use crate::config;
use crate::error::SceneError;
use crate::guidance::action::Action;
use crate::scene::canvas::Canvas;

/// Executor for guidance actions.
#[derive(Clone, Debug)]
pub struct Agent {
    /// Visual size of a `medium` object.
    pub base_visual_size: f64,
}

impl Default for Agent {
    fn default() -> Self {
        Self {
            base_visual_size: config::DEFAULT_SHAPE_SIZE_VISUAL,
        }
    }
}

impl Agent {
    /// Agent drawing `medium` objects at `base_visual_size` pixels.
    pub fn new(base_visual_size: f64) -> Self {
        Self { base_visual_size }
    }

    /// Visual size for a size label: small 0.5×, medium 1×, large 1.5×.
    pub fn visual_size(&self, size_label: &str) -> f64 {
        let factor = match size_label {
            "small" => 0.5,
            "large" => 1.5,
            _ => 1.0,
        };
        self.base_visual_size * factor
    }

    /// Apply `action` to `canvas`. Returns the id of the object acted on.
    pub fn execute(&self, canvas: &mut Canvas, action: &Action) -> Result<String, SceneError> {
        tracing::info!(action = %action, "agent executing");
        match action {
            Action::Add {
                shape,
                color,
                size,
                position,
            } => Ok(canvas.add(shape, color, size, *position, self.visual_size(size))),
            Action::Move {
                object_id,
                new_position,
            } => {
                canvas.move_object(object_id, *new_position)?;
                Ok(object_id.clone())
            }
            Action::Remove { object_id } => {
                canvas.remove(object_id)?;
                Ok(object_id.clone())
            }
            Action::ChangeColor {
                object_id,
                new_color,
            } => {
                canvas.change_color(object_id, new_color)?;
                Ok(object_id.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::geometry::Point;

    #[test]
    fn test_add_uses_size_factor() {
        let agent = Agent::default();
        let mut canvas = Canvas::new();
        let id = agent
            .execute(
                &mut canvas,
                &Action::Add {
                    shape: "triangle".into(),
                    color: "green".into(),
                    size: "large".into(),
                    position: Point::new(200.0, 450.0),
                },
            )
            .unwrap();
        let obj = canvas.get(&id).unwrap();
        assert_eq!(obj.visual_size(), 45.0);
        assert_eq!(obj.size_label(), "large");
        assert_eq!(obj.position(), Point::new(200.0, 450.0));
    }

    #[test]
    fn test_move_recolor_remove() {
        let agent = Agent::default();
        let mut canvas = Canvas::new();
        let id = canvas.add("circle", "red", "small", Point::new(0.0, 0.0), 15.0);

        agent
            .execute(
                &mut canvas,
                &Action::Move {
                    object_id: id.clone(),
                    new_position: Point::new(50.0, 60.0),
                },
            )
            .unwrap();
        agent
            .execute(
                &mut canvas,
                &Action::ChangeColor {
                    object_id: id.clone(),
                    new_color: "purple".into(),
                },
            )
            .unwrap();
        let obj = canvas.get(&id).unwrap();
        assert_eq!(obj.position(), Point::new(50.0, 60.0));
        assert_eq!(obj.color(), "purple");

        agent
            .execute(&mut canvas, &Action::Remove { object_id: id })
            .unwrap();
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_missing_object_reported() {
        let agent = Agent::default();
        let mut canvas = Canvas::new();
        let err = agent
            .execute(
                &mut canvas,
                &Action::Remove {
                    object_id: "ghost".into(),
                },
            )
            .unwrap_err();
        assert_eq!(err, SceneError::UnknownObject("ghost".into()));
    }
}
