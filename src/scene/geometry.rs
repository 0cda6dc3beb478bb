//! Canvas coordinates and the named absolute-position table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config;

/// A point on the canvas, in pixels. Serialized as an `[x, y]` pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Point at `(x, y)`.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point shifted by `(dx, dy)`.
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// A named absolute position, in relative canvas coordinates (0..=1).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedPosition {
    pub label: String,
    pub x: f64,
    pub y: f64,
}

impl NamedPosition {
    /// Position `label` at relative `(x, y)`.
    pub fn new(label: &str, x: f64, y: f64) -> Self {
        Self {
            label: label.to_string(),
            x,
            y,
        }
    }
}

/// Canvas extent plus the named-position table used for coordinate conversion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasGeometry {
    pub width: f64,
    pub height: f64,
    /// Table order is significant: nearest-label ties go to the earlier entry.
    pub positions: Vec<NamedPosition>,
}

impl Default for CanvasGeometry {
    fn default() -> Self {
        Self {
            width: config::CANVAS_WIDTH,
            height: config::CANVAS_HEIGHT,
            positions: config::NAMED_POSITIONS
                .iter()
                .map(|&(label, x, y)| NamedPosition::new(label, x, y))
                .collect(),
        }
    }
}

impl CanvasGeometry {
    /// Relative to absolute canvas coordinates.
    pub fn to_canvas(&self, rel_x: f64, rel_y: f64) -> Point {
        Point::new(rel_x * self.width, rel_y * self.height)
    }

    /// Absolute canvas center.
    pub fn center(&self) -> Point {
        self.to_canvas(0.5, 0.5)
    }

    /// Canvas coordinates of a named position, if the label is in the table.
    pub fn resolve(&self, label: &str) -> Option<Point> {
        self.positions
            .iter()
            .find(|p| p.label == label)
            .map(|p| self.to_canvas(p.x, p.y))
    }

    /// Like [`resolve`](Self::resolve) but unknown labels land on the center.
    pub fn resolve_or_center(&self, label: &str) -> Point {
        self.resolve(label).unwrap_or_else(|| {
            tracing::warn!(label, "unknown position label, using canvas center");
            self.center()
        })
    }

    /// The label whose canonical coordinate is nearest to `point`.
    pub fn nearest_label(&self, point: &Point) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for pos in &self.positions {
            let dist = self.to_canvas(pos.x, pos.y).distance(point);
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((pos.label.as_str(), dist));
            }
        }
        best.map(|(label, _)| label)
    }

    /// Grid cell `(x_idx, y_idx)` containing `point` on a `cells_x` x `cells_y`
    /// grid; points outside the canvas clamp to the border cells.
    pub fn grid_cell(&self, point: &Point, cells_x: usize, cells_y: usize) -> (usize, usize) {
        let axis = |v: f64, extent: f64, cells: usize| -> usize {
            if cells == 0 || extent <= 0.0 {
                return 0;
            }
            let idx = (v / extent * cells as f64).floor();
            idx.clamp(0.0, (cells - 1) as f64) as usize
        };
        (
            axis(point.x, self.width, cells_x),
            axis(point.y, self.height, cells_y),
        )
    }
}
