//! Lexicon: maps every primitive concept label to one fixed hypervector.
//!
//! The table holds:
//! 1. Shape, color, size and relation names
//! 2. Named absolute-position labels
//! 3. Sentinels: `UNKNOWN_CONCEPT`, `EMPTY_SCENE_ELEMENT`, `NONE`
//! 4. Optionally, one vector per cell of a fine position grid
//!
//! Each label's vector is drawn from its own RNG, seeded from the base seed
//! mixed with the label, so the table does not depend on generation order.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::hdc::hypervector::{Hypervector, VectorSpace};
use crate::scene::goal::RelationKind;

/// Fallback for labels that are not in the table.
pub const UNKNOWN_CONCEPT: &str = "UNKNOWN_CONCEPT";

/// Encoding of a scene with no objects.
pub const EMPTY_SCENE: &str = "EMPTY_SCENE_ELEMENT";

/// Stand-in for an absent property.
pub const NONE_CONCEPT: &str = "NONE";

/// The closed set of concept names the lexicon knows about.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub shapes: Vec<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub relations: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect();
        Self {
            shapes: owned(config::SHAPES),
            colors: owned(config::COLORS),
            sizes: owned(config::SIZES),
            relations: RelationKind::ALL
                .iter()
                .map(|k| k.as_str().to_string())
                .collect(),
        }
    }
}

/// Grid dimensions (columns × rows).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCells {
    pub x: usize,
    pub y: usize,
}

struct PositionGrid {
    cells: GridCells,
    /// Row-major: index = y * cells.x + x.
    vectors: Vec<Hypervector>,
}

/// Immutable-after-construction concept table.
pub struct Lexicon {
    space: VectorSpace,
    seed: u64,
    vocabulary: Vocabulary,
    position_labels: Vec<String>,
    vectors: HashMap<String, Hypervector>,
    grid: Option<PositionGrid>,
}

impl Lexicon {
    /// Generate vectors for every vocabulary label, position label and
    /// sentinel. `seed = None` draws a base seed from OS entropy.
    pub fn new<'a>(
        space: VectorSpace,
        vocabulary: Vocabulary,
        position_labels: impl IntoIterator<Item = &'a str>,
        seed: Option<u64>,
    ) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        let position_labels: Vec<String> =
            position_labels.into_iter().map(str::to_string).collect();

        tracing::info!(
            dimensionality = space.dimensionality,
            encoding = ?space.encoding,
            seed,
            "initializing lexicon"
        );

        let mut lexicon = Self {
            space,
            seed,
            vocabulary,
            position_labels,
            vectors: HashMap::new(),
            grid: None,
        };

        let labels: Vec<String> = lexicon
            .vocabulary
            .shapes
            .iter()
            .chain(&lexicon.vocabulary.colors)
            .chain(&lexicon.vocabulary.sizes)
            .chain(&lexicon.vocabulary.relations)
            .chain(&lexicon.position_labels)
            .cloned()
            .chain([UNKNOWN_CONCEPT, EMPTY_SCENE, NONE_CONCEPT].map(String::from))
            .collect();
        for label in labels {
            lexicon.insert_label(label);
        }

        tracing::info!(concepts = lexicon.vectors.len(), "lexicon initialized");
        lexicon
    }

    /// Add a `cells.x` × `cells.y` grid of position-cell vectors.
    pub fn with_position_grid(mut self, cells: GridCells) -> Self {
        let vectors = (0..cells.y)
            .flat_map(|row| (0..cells.x).map(move |col| (row, col)))
            .map(|(row, col)| {
                let mut rng = label_rng(self.seed, &format!("pos_grid_{row}_{col}"));
                self.space.random(&mut rng)
            })
            .collect::<Vec<_>>();
        tracing::debug!(cells = vectors.len(), "generated position grid");
        self.grid = Some(PositionGrid { cells, vectors });
        self
    }

    fn insert_label(&mut self, label: String) {
        if self.vectors.contains_key(&label) {
            return;
        }
        let mut rng = label_rng(self.seed, &label);
        let hv = self.space.random(&mut rng);
        tracing::trace!(label = %label, "generated concept vector");
        self.vectors.insert(label, hv);
    }

    /// Vector for `label`, or the `UNKNOWN_CONCEPT` vector for unknown labels.
    /// Every unknown label collides on that one vector.
    pub fn get(&self, label: &str) -> &Hypervector {
        match self.vectors.get(label) {
            Some(hv) => hv,
            None => {
                tracing::warn!(label, "unknown concept, using {UNKNOWN_CONCEPT}");
                self.unknown()
            }
        }
    }

    /// Vector for a grid cell; `UNKNOWN_CONCEPT` if there is no grid or the
    /// index is out of range.
    pub fn get_grid_cell(&self, x_idx: usize, y_idx: usize) -> &Hypervector {
        let Some(grid) = &self.grid else {
            tracing::warn!("position grid requested but not generated");
            return self.unknown();
        };
        if x_idx >= grid.cells.x || y_idx >= grid.cells.y {
            tracing::warn!(x_idx, y_idx, "grid cell out of range");
            return self.unknown();
        }
        &grid.vectors[y_idx * grid.cells.x + x_idx]
    }

    /// Whether `label` has its own vector (no unknown fallback).
    pub fn contains(&self, label: &str) -> bool {
        self.vectors.contains_key(label)
    }

    fn unknown(&self) -> &Hypervector {
        &self.vectors[UNKNOWN_CONCEPT]
    }

    /// The vector that stands for "a scene with nothing in it".
    pub fn empty_scene(&self) -> &Hypervector {
        &self.vectors[EMPTY_SCENE]
    }

    /// Dimensionality and encoding of every stored vector.
    pub fn space(&self) -> VectorSpace {
        self.space
    }

    /// Base seed the per-label RNGs were derived from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Vocabulary the lexicon was built with.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Named-position labels, in construction order.
    pub fn position_labels(&self) -> &[String] {
        &self.position_labels
    }

    /// Grid size, when a position grid was built.
    pub fn grid_cells(&self) -> Option<GridCells> {
        self.grid.as_ref().map(|g| g.cells)
    }

    /// Every stored label (grid cells excluded), sorted.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.vectors.keys().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }

    /// Number of stored labels, sentinels included.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Always false once built, since sentinels are stored.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

/// FNV-1a over the label, folded into the base seed with a splitmix64 finalizer.
fn label_rng(seed: u64, label: &str) -> StdRng {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for b in label.bytes() {
        h ^= u64::from(b);
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    let mut z = seed ^ h;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^= z >> 31;
    StdRng::seed_from_u64(z)
}
