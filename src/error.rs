use thiserror::Error;

/// Result alias for `graph_discovery`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced at the public boundary of the discovery pipeline.
///
/// Numerical trouble inside the solvers (an iterate with a non-positive
/// degree, a step that overshoots) is recovered locally and reported through
/// [`crate::graph::Convergence`], never through this type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// No entities were provided.
    #[error("empty input provided")]
    EmptyInput,

    /// A vector or matrix does not have the expected length.
    #[error("dimension mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        /// What was being checked.
        what: &'static str,
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// A tunable parameter is out of range.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: String,
    },

    /// Records of one entity are not contiguous in a stream that was
    /// declared to be grouped.
    #[error("records for entity {entity} are fragmented: it reappears at record {position}")]
    FragmentedEntity {
        /// Debug rendering of the entity id.
        entity: String,
        /// Zero-based position of the offending record.
        position: usize,
    },
}

impl Error {
    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidParameter { name, message: message.into() }
    }
}
