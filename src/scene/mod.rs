//! Scene model: canvas geometry, placed objects, goals and the agent that
//! edits the canvas.

pub mod agent;
pub mod canvas;
pub mod geometry;
pub mod goal;
pub mod parser;
