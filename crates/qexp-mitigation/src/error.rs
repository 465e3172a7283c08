//! Error and degeneracy types for the mitigation crate.
//!
//! [`MitigationError`] is for inputs the engine refuses to interpret.
//! [`Degeneracy`] is for numerically questionable situations where a result
//! is still produced; it travels with the result and is never thrown.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use qexp_ir::IrError;

/// Errors that can occur while building mitigators or extrapolating.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum MitigationError {
    /// Calibration is missing some of the 2^k prepared basis states.
    #[error("Incomplete calibration for {num_qubits} qubits: missing prepared states {missing:?}")]
    IncompleteCalibration {
        /// Register width of the calibration.
        num_qubits: u32,
        /// Prepared labels with no data.
        missing: Vec<String>,
    },

    /// Two pieces of data disagree on the register width.
    #[error("Inconsistent width in {context}: expected {expected} qubits, got {got}")]
    InconsistentWidth {
        /// What was being compared.
        context: String,
        /// Width established first.
        expected: u32,
        /// Conflicting width.
        got: u32,
    },

    /// A prepared state has zero calibration shots.
    #[error("Calibration column for prepared state '{0}' has no shots")]
    EmptyCalibrationColumn(String),

    /// A per-qubit matrix is not 2×2, or a full matrix is not 2^k×2^k.
    #[error("Invalid confusion matrix shape {rows}x{cols}")]
    InvalidMatrixShape {
        /// Row count.
        rows: usize,
        /// Column count.
        cols: usize,
    },

    /// Readout error rate outside [0, 1].
    #[error("Invalid readout error rate {value} on qubit {qubit}")]
    InvalidErrorRate {
        /// Qubit the rate belongs to.
        qubit: u32,
        /// Offending rate.
        value: f64,
    },

    /// Fold factor is zero or even.
    #[error("Invalid fold factor {0}: fold factors must be positive odd integers")]
    InvalidFoldFactor(u32),

    /// The same fold factor appears twice.
    #[error("Duplicate fold factor {0}")]
    DuplicateFoldFactor(u32),

    /// Fold factors and values have different lengths.
    #[error("Length mismatch: {folds} fold factors but {values} values")]
    LengthMismatch {
        /// Number of fold factors.
        folds: usize,
        /// Number of values.
        values: usize,
    },

    /// Counts were supplied for other fold factors than the configuration names.
    #[error("Runs cover fold factors {got:?} but the configuration expects {expected:?}")]
    FoldMismatch {
        /// Configured fold factors, ascending.
        expected: Vec<u32>,
        /// Fold factors of the supplied runs, ascending.
        got: Vec<u32>,
    },

    /// An extrapolation was requested with no samples at all.
    #[error("No samples to extrapolate")]
    NoSamples,

    /// A fixed-order extrapolation received too few points.
    #[error("{method} extrapolation needs at least {needed} points, got {got}")]
    NotEnoughPoints {
        /// Extrapolation name.
        method: &'static str,
        /// Minimum point count.
        needed: usize,
        /// Points provided.
        got: usize,
    },

    /// Readout mitigation is enabled but no calibration was supplied.
    #[error("Readout mitigation enabled without a calibration")]
    MissingCalibration,

    /// Observable string could not be parsed.
    #[error("Invalid observable '{0}'")]
    InvalidObservable(String),

    /// Underlying IR error (bad bitstring, empty counts, ...).
    #[error(transparent)]
    Ir(#[from] IrError),
}

/// Result type for mitigation operations.
pub type MitigationResult<T> = Result<T, MitigationError>;

/// A numerically questionable condition attached to a result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degeneracy {
    /// Confusion matrix condition number above the configured threshold.
    IllConditioned {
        /// 1-norm condition number.
        condition_number: f64,
        /// Threshold that was exceeded.
        threshold: f64,
    },
    /// Confusion matrix is singular; the raw distribution was returned.
    SingularMatrix,
    /// Fewer samples than the method needs.
    InsufficientSamples {
        /// Samples the method wants.
        needed: usize,
        /// Samples provided.
        available: usize,
    },
}

impl fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degeneracy::IllConditioned {
                condition_number,
                threshold,
            } => write!(
                f,
                "ill-conditioned confusion matrix (condition number {condition_number:.3e} > {threshold:.3e})"
            ),
            Degeneracy::SingularMatrix => {
                write!(f, "singular confusion matrix, raw distribution returned")
            }
            Degeneracy::InsufficientSamples { needed, available } => write!(
                f,
                "insufficient samples ({available} available, {needed} needed)"
            ),
        }
    }
}
