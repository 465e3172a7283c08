//! qexp Noise Mitigation
//!
//! Post-processing for noisy measurement results:
//!
//! - **Readout error mitigation**: confusion matrices from calibration runs
//!   (full or per-qubit tensored), inverted once and applied to observed
//!   distributions with clipping and renormalization
//! - **Zero-noise extrapolation**: linear, quadratic and Richardson
//!   extrapolation over odd fold factors, plus two-qubit gate folding
//! - **Pipeline**: readout correction per fold followed by extrapolation of a
//!   Z-parity observable, with provenance for every number
//!
//! Numerical trouble (singular or ill-conditioned matrices, too few samples)
//! never aborts a correction. It is attached to the result as a
//! [`Degeneracy`] and logged with `tracing::warn!`.
//!
//! # Example
//!
//! ```rust
//! use qexp_ir::{Counts, ProbabilityVector};
//! use qexp_mitigation::{ConfusionMatrix, ReadoutMitigator};
//!
//! let matrix = ConfusionMatrix::from_error_rates(&[(0.1, 0.1)]).unwrap();
//! let mitigator = ReadoutMitigator::new(matrix);
//!
//! let mut counts = Counts::new(1);
//! counts.insert("0", 95).unwrap();
//! counts.insert("1", 5).unwrap();
//!
//! let result = mitigator.correct_counts(&counts).unwrap();
//! assert!(result.distribution.get("0") > 0.95);
//! ```

pub mod config;
pub mod error;
pub mod folding;
pub mod linalg;
pub mod observable;
pub mod pipeline;
pub mod readout;
pub mod zne;

pub use config::MitigationConfig;
pub use error::{Degeneracy, MitigationError, MitigationResult};
pub use folding::fold_two_qubit_gates;
pub use observable::{ZObservable, ZTerm};
pub use pipeline::{FoldEstimate, MitigatedEstimate, MitigationPipeline};
pub use readout::{
    CalibrationData, ConfusionMatrix, DEFAULT_CONDITION_THRESHOLD, Inversion,
    MAX_CALIBRATION_QUBITS, ReadoutMitigator, RemResult,
};
pub use zne::{
    NoiseLevelSample, ZneMethod, ZneResult, extrapolate, linear_extrapolate,
    quadratic_extrapolate, richardson,
};
