//! qexp Exact Statevector Simulator
//!
//! Deterministic ground truth for scoring noisy hardware output. Circuits are
//! simulated exactly on a dense amplitude vector, so the regime is limited to
//! small registers.
//!
//! # Features
//!
//! - **Exact Simulation**: full statevector, no sampling noise in [`simulate`]
//! - **Direct two-qubit kernels**: CNOT and CZ act as permutations / sign flips
//! - **Shot Sampling**: seeded finite-shot counts via [`sample_counts`]
//! - **Fatal misconfiguration**: out-of-range qubits are errors, never skipped
//!
//! Outcomes follow the bitstring convention of [`qexp_ir::bits`]: qubit 0 is
//! the leftmost character.
//!
//! # Performance
//!
//! | Qubits | Memory | Simulation Speed |
//! |--------|--------|------------------|
//! | 10 | ~16 KB | Instant |
//! | 14 | ~256 KB | Fast |
//! | 20 | ~16 MB | Moderate |
//! | 24 | ~256 MB | Slow (hard limit) |
//!
//! # Example
//!
//! ```rust
//! use qexp_ir::Circuit;
//! use qexp_sim::simulate;
//!
//! let probs = simulate(&Circuit::ghz(3).unwrap()).unwrap();
//! assert!((probs.get("000") - 0.5).abs() < 1e-12);
//! assert!((probs.get("111") - 0.5).abs() < 1e-12);
//! ```

mod sampler;
mod statevector;

pub use sampler::{sample_counts, sample_counts_with};
pub use statevector::{MAX_QUBITS, PROBABILITY_CUTOFF, Statevector, evolve, simulate};
