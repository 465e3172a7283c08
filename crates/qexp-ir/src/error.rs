//! Error types for the IR crate.
//!
//! Every variant is a configuration error: the caller handed the engine a
//! circuit or a bitstring it cannot interpret. None of them is recoverable
//! by skipping the offending item.

use crate::qubit::QubitId;
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum IrError {
    /// Gate name is not part of the supported vocabulary.
    #[error("Unknown gate '{0}'")]
    UnknownGate(String),

    /// Qubit index is not smaller than the register width.
    #[error("Qubit {qubit} out of range for {num_qubits}-qubit register{}", format_gate_context(.gate_name))]
    QubitOutOfRange {
        /// The offending qubit.
        qubit: QubitId,
        /// Width of the register.
        num_qubits: u32,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Gate requires different number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
    },

    /// Duplicate qubit in operation.
    #[error("Duplicate qubit {qubit} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// Rotation gate given without an angle.
    #[error("Gate '{0}' requires an angle parameter")]
    MissingParameter(String),

    /// Fixed gate given an angle.
    #[error("Gate '{gate_name}' takes no parameter, got {value}")]
    UnexpectedParameter {
        /// Name of the gate.
        gate_name: String,
        /// The angle that was supplied.
        value: f64,
    },

    /// Bitstring contains characters other than '0'/'1' or has the wrong width.
    #[error("Invalid bitstring '{bitstring}' for {num_qubits}-qubit register")]
    InvalidBitstring {
        /// The offending bitstring.
        bitstring: String,
        /// Width it was expected to have.
        num_qubits: u32,
    },

    /// Counts with zero total shots cannot be normalised.
    #[error("Counts contain no shots")]
    EmptyCounts,

    /// Probability entries must be finite and non-negative with a positive total.
    #[error("Invalid probability for '{bitstring}': {value}")]
    InvalidProbability {
        /// Outcome the value was attached to.
        bitstring: String,
        /// The offending value.
        value: f64,
    },

    /// Register too wide for exact statevector treatment.
    #[error("{requested} qubits exceeds the supported maximum of {max}")]
    TooManyQubits {
        /// Requested width.
        requested: u32,
        /// Supported maximum.
        max: u32,
    },
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
