//! Structured goal objects, the parser-facing description of the target scene.
//!
//! The wire shape is
//! `{id, shape, color?, size?, position_abs?, relation?: {type, reference_obj_id?}}`.
//! Color and size default to `black` / `medium`. When both `position_abs`
//! and `relation` are supplied the absolute position wins.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::GoalError;
use crate::scene::canvas::ObjectProperties;

/// Spatial relation between two goal objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Above,
    Below,
    LeftOf,
    RightOf,
    Near,
    OverlappingWith,
}

impl RelationKind {
    pub const ALL: [RelationKind; 6] = [
        RelationKind::Above,
        RelationKind::Below,
        RelationKind::LeftOf,
        RelationKind::RightOf,
        RelationKind::Near,
        RelationKind::OverlappingWith,
    ];

    /// Wire name, e.g. `left_of`.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Above => "above",
            RelationKind::Below => "below",
            RelationKind::LeftOf => "left_of",
            RelationKind::RightOf => "right_of",
            RelationKind::Near => "near",
            RelationKind::OverlappingWith => "overlapping_with",
        }
    }

    /// Pixel displacement from the reference object for a given offset.
    /// `near` and `overlapping_with` sit on the reference itself.
    pub fn displacement(&self, offset: f64) -> (f64, f64) {
        match self {
            RelationKind::LeftOf => (-offset, 0.0),
            RelationKind::RightOf => (offset, 0.0),
            RelationKind::Above => (0.0, -offset),
            RelationKind::Below => (0.0, offset),
            RelationKind::Near | RelationKind::OverlappingWith => (0.0, 0.0),
        }
    }
}

impl FromStr for RelationKind {
    type Err = GoalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelationKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| GoalError::UnknownRelation(s.to_string()))
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A relation to another goal object, by id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    #[serde(rename = "type")]
    pub kind: RelationKind,
    #[serde(rename = "reference_obj_id", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Where a goal object should be.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    /// A named absolute position label.
    Absolute(String),
    /// Relative to another goal object.
    Relative(Relation),
    /// Anywhere.
    Free,
}

/// One desired scene element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GoalObjectRecord", into = "GoalObjectRecord")]
pub struct GoalObject {
    pub id: String,
    pub shape: String,
    pub color: String,
    pub size: String,
    pub placement: Placement,
}

impl GoalObject {
    /// A free-floating goal object with default color and size.
    pub fn new(id: &str, shape: &str) -> Self {
        Self {
            id: id.to_string(),
            shape: shape.to_string(),
            color: config::DEFAULT_COLOR.to_string(),
            size: config::DEFAULT_SIZE.to_string(),
            placement: Placement::Free,
        }
    }

    /// Set the color.
    pub fn with_color(mut self, color: &str) -> Self {
        self.color = color.to_string();
        self
    }

    /// Set the size label.
    pub fn with_size(mut self, size: &str) -> Self {
        self.size = size.to_string();
        self
    }

    /// Place at a named position.
    pub fn at(mut self, position_label: &str) -> Self {
        self.placement = Placement::Absolute(position_label.to_string());
        self
    }

    /// Place relative to the goal object `reference`.
    pub fn related(mut self, kind: RelationKind, reference: &str) -> Self {
        self.placement = Placement::Relative(Relation {
            kind,
            reference: Some(reference.to_string()),
        });
        self
    }

    /// Shape, color and size as encoder input.
    pub fn properties(&self) -> ObjectProperties<'_> {
        ObjectProperties {
            shape: Some(&self.shape),
            color: Some(&self.color),
            size: Some(&self.size),
        }
    }

    /// Named position, if placed absolutely.
    pub fn absolute_position(&self) -> Option<&str> {
        match &self.placement {
            Placement::Absolute(label) => Some(label),
            _ => None,
        }
    }

    /// Relation, if placed relatively.
    pub fn relation(&self) -> Option<&Relation> {
        match &self.placement {
            Placement::Relative(relation) => Some(relation),
            _ => None,
        }
    }
}

/// Reject goal lists that break the caller contract: every object has a
/// shape, ids are unique and relation references name another listed id.
pub fn validate_goal(goal: &[GoalObject]) -> Result<(), GoalError> {
    let mut seen = HashSet::new();
    for obj in goal {
        if obj.shape.trim().is_empty() {
            return Err(GoalError::MissingField {
                id: obj.id.clone(),
                field: "shape",
            });
        }
        if !seen.insert(obj.id.as_str()) {
            return Err(GoalError::DuplicateId(obj.id.clone()));
        }
    }
    for obj in goal {
        let Some(reference) = obj.relation().and_then(|r| r.reference.as_deref()) else {
            continue;
        };
        if reference == obj.id {
            return Err(GoalError::SelfReference { id: obj.id.clone() });
        }
        if !seen.contains(reference) {
            return Err(GoalError::UnknownReference {
                id: obj.id.clone(),
                reference: reference.to_string(),
            });
        }
    }
    Ok(())
}

/// Flat wire form of a [`GoalObject`].
#[derive(Clone, Debug, Serialize, Deserialize)]
struct GoalObjectRecord {
    id: String,
    #[serde(default)]
    shape: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position_abs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    relation: Option<Relation>,
}

impl TryFrom<GoalObjectRecord> for GoalObject {
    type Error = GoalError;

    fn try_from(record: GoalObjectRecord) -> Result<Self, Self::Error> {
        if record.shape.trim().is_empty() {
            return Err(GoalError::MissingField {
                id: record.id,
                field: "shape",
            });
        }
        let placement = match (record.position_abs, record.relation) {
            (Some(label), _) => Placement::Absolute(label),
            (None, Some(relation)) => Placement::Relative(relation),
            (None, None) => Placement::Free,
        };
        Ok(Self {
            id: record.id,
            shape: record.shape,
            color: record
                .color
                .unwrap_or_else(|| config::DEFAULT_COLOR.to_string()),
            size: record
                .size
                .unwrap_or_else(|| config::DEFAULT_SIZE.to_string()),
            placement,
        })
    }
}

impl From<GoalObject> for GoalObjectRecord {
    fn from(obj: GoalObject) -> Self {
        let (position_abs, relation) = match obj.placement {
            Placement::Absolute(label) => (Some(label), None),
            Placement::Relative(relation) => (None, Some(relation)),
            Placement::Free => (None, None),
        };
        Self {
            id: obj.id,
            shape: obj.shape,
            color: Some(obj.color),
            size: Some(obj.size),
            position_abs,
            relation,
        }
    }
}
