//! Runtime: settings and the compose loop that ties encoder, guidance and
//! agent together.

pub mod composer;
pub mod settings;
