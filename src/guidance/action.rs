//! Corrective actions proposed by the guidance system.
//!
//! Wire form: `{"action": "ADD", "params": {...}}` etc. The "no action"
//! sentinel is `None` at the call site, not a variant.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scene::geometry::Point;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "params", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Add {
        shape: String,
        color: String,
        size: String,
        #[serde(rename = "position_xy")]
        position: Point,
    },
    Move {
        object_id: String,
        #[serde(rename = "new_position_xy")]
        new_position: Point,
    },
    /// Never emitted by the guidance system; available to external callers.
    Remove { object_id: String },
    ChangeColor { object_id: String, new_color: String },
}

impl Action {
    /// Wire tag: `ADD`, `MOVE` or `CHANGE_COLOR`.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Add { .. } => "ADD",
            Action::Move { .. } => "MOVE",
            Action::Remove { .. } => "REMOVE",
            Action::ChangeColor { .. } => "CHANGE_COLOR",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Add {
                shape,
                color,
                size,
                position,
            } => write!(f, "ADD {size} {color} {shape} at {position}"),
            Action::Move {
                object_id,
                new_position,
            } => write!(f, "MOVE {object_id} to {new_position}"),
            Action::Remove { object_id } => write!(f, "REMOVE {object_id}"),
            Action::ChangeColor {
                object_id,
                new_color,
            } => write!(f, "CHANGE_COLOR {object_id} to {new_color}"),
        }
    }
}
