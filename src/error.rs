//! This module defines the custom error types for the library.
//!
//! Every precondition violation that the Arnoldi and Lanczos processes can detect is
//! collected into a single enum, [`KrylovErrorKind`], wrapped by the public [`KrylovError`].
//!
//! Note that a happy breakdown is *not* an error: it is reported through the active
//! dimension of the [`crate::KrylovSubspace`], never through this type.
use thiserror::Error;

/// Represents all possible errors that can occur while building a Krylov basis.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct KrylovError(#[from] KrylovErrorKind);

impl KrylovError {
    /// Returns the underlying error kind, for callers that need to match on it.
    pub fn kind(&self) -> &KrylovErrorKind {
        &self.0
    }
}

/// The distinct kinds of errors.
///
/// All of them are raised before any numerical work starts, so the workspace passed to
/// the failing call is left untouched.
#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum KrylovErrorKind {
    /// The operator must be square for its Krylov sequence to be defined.
    #[error("Operator must be square, but it has {nrows} rows and {ncols} columns.")]
    NonSquareOperator { nrows: usize, ncols: usize },

    /// The starting vector does not match the operator dimension.
    #[error(
        "Dimension mismatch: operator has dimension {operator_dim} but vector has {vector_len} rows."
    )]
    DimensionMismatch {
        operator_dim: usize,
        vector_len: usize,
    },

    /// The caller-supplied scratch vector has the wrong length.
    #[error("Scratch vector must have length {expected}, but it has length {actual}.")]
    CacheMismatch { expected: usize, actual: usize },

    /// The workspace was allocated for vectors of a different dimension.
    #[error(
        "Workspace holds vectors of dimension {workspace_rows}, but the operator has dimension {operator_dim}."
    )]
    WorkspaceMismatch {
        workspace_rows: usize,
        operator_dim: usize,
    },

    /// Indicates that an invalid input parameter was provided to a function.
    #[error("Invalid input parameter: {0}")]
    InputError(String),
}

// Manually implement PartialEq for the public error type.
// We compare the inner `KrylovErrorKind`.
impl PartialEq for KrylovError {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_error_message() {
        let error = KrylovError(KrylovErrorKind::DimensionMismatch {
            operator_dim: 100,
            vector_len: 99,
        });
        let expected_message =
            "Dimension mismatch: operator has dimension 100 but vector has 99 rows.";
        assert_eq!(error.to_string(), expected_message);
    }

    #[test]
    fn test_non_square_error_message() {
        let error = KrylovError::from(KrylovErrorKind::NonSquareOperator { nrows: 3, ncols: 4 });
        assert_eq!(
            error.to_string(),
            "Operator must be square, but it has 3 rows and 4 columns."
        );
    }

    #[test]
    fn test_cache_mismatch_error_message() {
        let error = KrylovError::from(KrylovErrorKind::CacheMismatch {
            expected: 10,
            actual: 9,
        });
        assert_eq!(
            error.to_string(),
            "Scratch vector must have length 10, but it has length 9."
        );
    }

    #[test]
    fn test_input_error_message() {
        let error = KrylovError(KrylovErrorKind::InputError(
            "The starting vector `b` must not be a zero vector.".to_string(),
        ));
        let expected_message =
            "Invalid input parameter: The starting vector `b` must not be a zero vector.";
        assert_eq!(error.to_string(), expected_message);
    }

    #[test]
    fn test_kind_accessor_and_equality() {
        let a = KrylovError::from(KrylovErrorKind::WorkspaceMismatch {
            workspace_rows: 5,
            operator_dim: 6,
        });
        let b = KrylovError::from(KrylovErrorKind::WorkspaceMismatch {
            workspace_rows: 5,
            operator_dim: 6,
        });
        assert_eq!(a, b);
        assert!(matches!(
            a.kind(),
            KrylovErrorKind::WorkspaceMismatch {
                workspace_rows: 5,
                operator_dim: 6
            }
        ));
    }
}
