//! qexp Circuit Representation and Measurement Data
//!
//! This crate provides the leaf data structures shared by the whole qexp
//! engine: the gate vocabulary with its canonical unitaries, circuits built
//! from that vocabulary, and the counts / probability types every analysis
//! step consumes.
//!
//! # Core Components
//!
//! - **Gates**: [`StandardGate`], a closed enum over the supported vocabulary,
//!   and [`Unitary2`] for single-qubit matrix algebra
//! - **Instructions**: [`Instruction`] combining a gate with its operands
//! - **Circuit**: [`Circuit`] builder; [`CircuitSpec`] is its serialized form
//! - **Bitstrings**: [`bits`] fixes the one index/bitstring convention
//! - **Measurement data**: [`Counts`] and [`ProbabilityVector`]
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use qexp_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 2);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `I` | 1 | Identity |
//! | `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `H` | 1 | Hadamard gate |
//! | `S`, `Sdg` | 1 | S and S-dagger gates |
//! | `Rx`, `Ry`, `Rz` | 1 | Rotation gates (radians) |
//! | `CX` | 2 | Controlled-NOT (CNOT) |
//! | `CZ` | 2 | Controlled-Z |

pub mod bits;
pub mod circuit;
pub mod distribution;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::{Circuit, CircuitSpec, InstructionSpec};
pub use distribution::{Counts, ProbabilityVector};
pub use error::{IrError, IrResult};
pub use gate::{StandardGate, Unitary2};
pub use instruction::Instruction;
pub use qubit::QubitId;
