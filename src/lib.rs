//! # scene-composer
//!
//! Goal-directed 2-D scene composition over hyperdimensional vectors.
//!
//! A goal ("a red circle in the center, a blue square to its left") is
//! turned into goal objects. A guidance loop compares the goal against the
//! current canvas and proposes one corrective action at a time, which an
//! agent applies, until nothing is left to fix.
//!
//! ## Components
//!
//! 1. **HDC**: binary/bipolar hypervectors with bind, bundle, permute and
//!    cosine similarity
//! 2. **Lexicon**: seeded, reproducible concept → hypervector table
//! 3. **Scene encoder**: objects, scenes and goals as bound/bundled vectors
//! 4. **Guidance**: greedy similarity matching plus ADD → MOVE →
//!    CHANGE_COLOR decision phases
//! 5. **Runtime**: TOML settings and the compose loop

pub mod error;
pub mod guidance;
pub mod hdc;
pub mod runtime;
pub mod scene;

pub use error::{ComposerError, Result};

/// Default constants. Every value here can be overridden through
/// [`runtime::settings::ComposerSettings`].
pub mod config {
    /// Hypervector dimensionality.
    pub const DIMENSIONALITY: usize = 10_000;

    /// Lexicon seed.
    pub const RANDOM_SEED: u64 = 45;

    /// Minimum properties similarity for a goal/canvas pairing.
    pub const OBJECT_MATCH_THRESHOLD: f64 = 0.20;

    /// Canvas size in pixels.
    pub const CANVAS_WIDTH: f64 = 800.0;
    pub const CANVAS_HEIGHT: f64 = 600.0;

    /// Named positions as `(label, rel_x, rel_y)`, relative to the canvas.
    pub const NAMED_POSITIONS: &[(&str, f64, f64)] = &[
        ("center", 0.5, 0.5),
        ("top_left", 0.25, 0.25),
        ("top_right", 0.75, 0.25),
        ("bottom_left", 0.25, 0.75),
        ("bottom_right", 0.75, 0.75),
        ("top_center", 0.5, 0.25),
        ("bottom_center", 0.5, 0.75),
        ("middle_left", 0.25, 0.5),
        ("middle_right", 0.75, 0.5),
    ];

    /// Fine position grid (columns × rows).
    pub const POSITION_GRID_CELLS_X: usize = 10;
    pub const POSITION_GRID_CELLS_Y: usize = 10;

    /// Objects within this distance (pixels) of their target are not moved.
    pub const MOVE_STEP_THRESHOLD: f64 = 20.0;

    /// Distance (pixels) between a related object and its reference.
    pub const RELATION_OFFSET: f64 = 2.0 * MOVE_STEP_THRESHOLD;

    /// Edge margin (pixels) for randomly placed objects.
    pub const ADD_MARGIN: f64 = 50.0;

    /// Guidance loop bound.
    pub const MAX_ITERATIONS: usize = 50;

    /// Scene/target similarity reported as reaching the goal.
    pub const SIMILARITY_TARGET_THRESHOLD: f64 = 0.85;

    /// Pixel size of a `medium` object.
    pub const DEFAULT_SHAPE_SIZE_VISUAL: f64 = 30.0;

    pub const DEFAULT_COLOR: &str = "black";
    pub const DEFAULT_SIZE: &str = "medium";

    pub const SHAPES: &[&str] = &["circle", "square", "triangle"];
    pub const COLORS: &[&str] = &["red", "blue", "green", "yellow", "black", "purple"];
    pub const SIZES: &[&str] = &["small", "medium", "large"];
}
