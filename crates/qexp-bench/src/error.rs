//! Error types for the bench crate.

use thiserror::Error;

/// A group-theoretic invariant of the Clifford table does not hold.
///
/// This means the generator definitions are wrong; every RB circuit built
/// from such a table would be silently corrupt, so the global table treats it
/// as fatal.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum CliffordError {
    #[error("Clifford group invariant violated: {0}")]
    InvariantViolation(String),
}

/// Errors produced while building benchmark circuits or scoring results.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BenchError {
    /// Measured counts and the ideal distribution describe different registers.
    #[error("Width mismatch: ideal distribution has {expected} qubits, counts have {got}")]
    WidthMismatch {
        /// Width of the ideal distribution.
        expected: u32,
        /// Width of the measured counts.
        got: u32,
    },

    /// No RB data points survived to fit a decay.
    #[error("Not enough RB data: need at least {needed} sequence lengths, got {got}")]
    InsufficientData {
        /// Minimum number of distinct lengths.
        needed: usize,
        /// Lengths actually provided.
        got: usize,
    },

    /// Circuit builder or simulator returned an error.
    #[error("Circuit IR error: {0}")]
    Ir(#[from] qexp_ir::IrError),
}

/// Result type for benchmark operations.
pub type BenchResult<T> = Result<T, BenchError>;
