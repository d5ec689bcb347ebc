//! Error types.
//!
//! Invariant-domain and CFL violations are not errors: they are reported
//! through [`crate::solver::StepOutcome`] or logged, depending on the
//! configured strategy. The enums here cover misuse and setup failures.

use thiserror::Error;

/// Errors raised by the time stepper and the time integrator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HyperbolicError {
    /// `step` was called before `prepare`.
    #[error("Module not prepared: call prepare() before step()")]
    NotPrepared,

    /// A state vector does not match the graph.
    #[error("Size mismatch: expected {expected} nodes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// No node constrains the step size and none was prescribed.
    #[error("Unbounded time step: no node constrains tau and none was prescribed")]
    UnboundedTimeStep,

    /// A prescribed step size is negative or not a number.
    #[error("Invalid time step: {0}")]
    InvalidTimeStep(f64),

    /// The retry policy gave up.
    #[error("Restart limit exceeded after {attempts} attempts")]
    RestartLimitExceeded { attempts: usize },
}

impl HyperbolicError {
    /// Create a size mismatch error.
    pub fn size_mismatch(expected: usize, actual: usize) -> Self {
        Self::SizeMismatch { expected, actual }
    }
}

/// Errors raised while assembling graph operators from a mesh.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssemblyError {
    /// The mesh has no cells.
    #[error("Mesh has no cells")]
    EmptyMesh,

    /// A cell has zero (or numerically zero) volume.
    #[error("Degenerate cell {cell}: |det J| = {determinant:e}")]
    DegenerateCell { cell: usize, determinant: f64 },

    /// A cell references a node that does not exist.
    #[error("Cell {cell} references node {node}, mesh has {n_nodes} nodes")]
    NodeOutOfRange {
        cell: usize,
        node: usize,
        n_nodes: usize,
    },
}

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid TOML for the expected schema.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of its admissible range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create an invalid-value error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}
