//! Error taxonomy.
//!
//! Algebra failures are hard errors; concept lookup misses never reach this
//! module (they degrade to the `UNKNOWN_CONCEPT` vector and are logged).

use thiserror::Error;

use crate::hdc::hypervector::Encoding;

/// Errors raised by the hypervector algebra.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HdcError {
    /// Two vectors (or a vector and the active space) disagree in length.
    #[error("Dimension mismatch: expected {expected}, actual {actual}")]
    DimensionMismatch {
        /// Expected dimensionality
        expected: usize,
        /// Actual dimensionality
        actual: usize,
    },

    /// Two vectors use different alphabets.
    #[error("Encoding mismatch: expected {expected:?}, actual {actual:?}")]
    EncodingMismatch {
        /// Expected encoding
        expected: Encoding,
        /// Actual encoding
        actual: Encoding,
    },

    /// A raw component lies outside the encoding's alphabet.
    #[error("Component {value} at index {index} is not valid for {encoding:?} encoding")]
    InvalidComponent {
        /// Offending value
        value: i8,
        /// Position in the vector
        index: usize,
        /// Encoding being built
        encoding: Encoding,
    },
}

impl HdcError {
    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }
}

/// Caller-contract violations in a structured goal list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GoalError {
    /// A mandatory field is absent or empty.
    #[error("Goal object '{id}' is missing required field '{field}'")]
    MissingField { id: String, field: &'static str },

    /// Two goal objects share one identifier.
    #[error("Duplicate goal object id '{0}'")]
    DuplicateId(String),

    /// A relation names a reference id that is not in the goal list.
    #[error("Goal object '{id}' refers to unknown object '{reference}'")]
    UnknownReference { id: String, reference: String },

    /// A relation names the object it belongs to.
    #[error("Goal object '{id}' is related to itself")]
    SelfReference { id: String },

    /// A relation type outside the known set.
    #[error("Unknown relation type '{0}'")]
    UnknownRelation(String),
}

/// Scene store and executor failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// The referenced placed object is not in the store.
    #[error("No placed object with id '{0}'")]
    UnknownObject(String),

    /// An object with this id is already in the store.
    #[error("Placed object id '{0}' already exists")]
    DuplicateObject(String),
}

/// Settings loading and validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum ComposerError {
    #[error(transparent)]
    Hdc(#[from] HdcError),

    #[error(transparent)]
    Goal(#[from] GoalError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result alias for library operations.
pub type Result<T> = std::result::Result<T, ComposerError>;
