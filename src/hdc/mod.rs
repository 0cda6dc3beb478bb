//! Hyperdimensional computing layer.
//!
//! - `hypervector`: vector type and the bind/bundle/permute/similarity algebra
//! - `lexicon`: seeded concept table
//! - `scene_encoder`: objects, scenes and goals to vectors

pub mod hypervector;
pub mod lexicon;
pub mod scene_encoder;
