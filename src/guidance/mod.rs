//! Guidance: match goal objects to placed objects, then propose one
//! corrective action.

pub mod action;
pub mod matching;
pub mod system;
