//! Error taxonomy shared by every entry point of the crate.
//!
//! All variants are raised before the first assignment step of a run, so a
//! caller either gets a complete [`crate::RunResult`] or one of these.

use thiserror::Error;

/// Errors produced while validating input or initializing a clustering run.
///
/// Hitting the iteration cap is *not* an error, it is reported through
/// [`crate::RunResult::converged`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    /// The requested amount of clusters is outside `1..=n`
    #[error("invalid k: {k} clusters requested for {n} samples (expected 1 <= k <= n)")]
    InvalidK { k: usize, n: usize },

    /// The observation table has no rows or no columns
    #[error("empty input: {samples} samples with {dims} dimensions")]
    EmptyInput { samples: usize, dims: usize },

    /// A buffer or centroid does not match the dimensionality of the points
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A precomputed initialization supplied the wrong amount of centroids
    #[error("centroid count mismatch: expected {expected} centroids, got {actual}")]
    CentroidCountMismatch { expected: usize, actual: usize },

    /// The observation table or a centroid contains NaN or infinity
    #[error("non-finite value at row {row}, column {column}")]
    NonFiniteValue { row: usize, column: usize },

    /// A value is so large that squared distances over the table would overflow,
    /// see [`crate::FeatureMatrix::magnitude_limit`]
    #[error("value out of range at row {row}, column {column}")]
    ValueOutOfRange { row: usize, column: usize },

    /// A label addresses a cluster that does not exist
    #[error("label {label} out of range for {k} clusters")]
    LabelOutOfRange { label: usize, k: usize },

    /// A reference clusterer failed inside its own implementation
    #[error("reference clusterer {name} failed: {message}")]
    Reference { name: String, message: String },
}

pub type Result<T> = std::result::Result<T, ClusterError>;
