//! Composer settings, loadable from TOML.
//!
//! ```toml
//! [hdc]
//! dimensionality = 10000
//! encoding = "bipolar"
//! seed = 45
//!
//! [guidance]
//! object_match_threshold = 0.2
//!
//! [[canvas.positions]]
//! label = "center"
//! x = 0.5
//! y = 0.5
//! ```
//!
//! Every section and key is optional; missing values take the defaults in
//! [`crate::config`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::ConfigError;
use crate::guidance::system::GuidanceSettings;
use crate::hdc::hypervector::{Encoding, VectorSpace};
use crate::hdc::lexicon::{GridCells, Vocabulary};
use crate::scene::geometry::CanvasGeometry;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HdcSettings {
    pub dimensionality: usize,
    pub encoding: Encoding,
    /// `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Fine position grid; `None` disables it.
    pub grid_cells: Option<GridCells>,
}

impl Default for HdcSettings {
    fn default() -> Self {
        Self {
            dimensionality: config::DIMENSIONALITY,
            encoding: Encoding::default(),
            seed: Some(config::RANDOM_SEED),
            grid_cells: Some(GridCells {
                x: config::POSITION_GRID_CELLS_X,
                y: config::POSITION_GRID_CELLS_Y,
            }),
        }
    }
}

impl HdcSettings {
    /// Vector space the lexicon is drawn from.
    pub fn space(&self) -> VectorSpace {
        VectorSpace::new(self.dimensionality, self.encoding)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Upper bound on guidance iterations.
    pub max_iterations: usize,
    /// Scene-to-target similarity reported as "target reached".
    pub scene_similarity_target: f64,
    /// Visual size of a `medium` object, in pixels.
    pub base_visual_size: f64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_iterations: config::MAX_ITERATIONS,
            scene_similarity_target: config::SIMILARITY_TARGET_THRESHOLD,
            base_visual_size: config::DEFAULT_SHAPE_SIZE_VISUAL,
        }
    }
}

/// Everything one composer run is configured with.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerSettings {
    pub hdc: HdcSettings,
    pub canvas: CanvasGeometry,
    pub guidance: GuidanceSettings,
    pub vocabulary: Vocabulary,
    pub run: RunSettings,
}

impl ComposerSettings {
    /// Load settings from a TOML file and validate them.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings: ComposerSettings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the composer cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.hdc.dimensionality == 0 {
            return invalid("hdc.dimensionality must be greater than 0".into());
        }
        if let Some(cells) = self.hdc.grid_cells {
            if cells.x == 0 || cells.y == 0 {
                return invalid("hdc.grid_cells must be at least 1x1".into());
            }
        }

        let margin = self.guidance.placement_margin;
        if !(self.canvas.width > 0.0 && self.canvas.height > 0.0) {
            return invalid("canvas.width and canvas.height must be positive".into());
        }
        if margin < 0.0 || 2.0 * margin >= self.canvas.width.min(self.canvas.height) {
            return invalid(format!(
                "guidance.placement_margin {margin} leaves no room on a {}x{} canvas",
                self.canvas.width, self.canvas.height
            ));
        }
        for pos in &self.canvas.positions {
            if !(0.0..=1.0).contains(&pos.x) || !(0.0..=1.0).contains(&pos.y) {
                return invalid(format!(
                    "canvas position '{}' must have relative coordinates in [0, 1]",
                    pos.label
                ));
            }
        }

        let g = &self.guidance;
        for (name, value) in [
            ("object_match_threshold", g.object_match_threshold),
            ("move_threshold", g.move_threshold),
            ("relation_offset", g.relation_offset),
            ("placement_margin", g.placement_margin),
        ] {
            if !value.is_finite() {
                return invalid(format!("guidance.{name} must be finite"));
            }
        }
        if g.move_threshold < 0.0 {
            return invalid("guidance.move_threshold must not be negative".into());
        }

        let v = &self.vocabulary;
        if v.shapes.is_empty() || v.colors.is_empty() || v.sizes.is_empty() {
            return invalid("vocabulary shapes, colors and sizes must not be empty".into());
        }

        if self.run.max_iterations == 0 {
            return invalid("run.max_iterations must be greater than 0".into());
        }
        Ok(())
    }
}
