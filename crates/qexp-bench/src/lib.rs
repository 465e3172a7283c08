//! Clifford group and standard benchmarks for qexp.
//!
//! - **Clifford group**: the 24 single-qubit Cliffords, built by closure search
//!   and verified at first use ([`clifford_group`])
//! - **Randomized Benchmarking (RB)**: random Clifford sequences with an exact
//!   recovery element, so the ideal output is always `"0"`
//! - **Quantum Volume (QV)**: random block circuits scored by heavy output
//!   probability against the exact simulated distribution
//!
//! # Example
//!
//! ```rust
//! use qexp_bench::rb::generate_rb_sequence;
//! use qexp_sim::simulate;
//!
//! let seq = generate_rb_sequence(20, 7).unwrap();
//! let probs = simulate(&seq.circuit).unwrap();
//! assert!((probs.get("0") - 1.0).abs() < 1e-9);
//! ```

pub mod clifford;
pub mod error;
pub mod qv;
pub mod rb;

pub use clifford::{CliffordElement, CliffordGenerator, CliffordGroup, clifford_group};
pub use error::{BenchError, BenchResult, CliffordError};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shot-sampling seed derived from a generation seed (one SplitMix64 step).
pub fn sampling_seed(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Result of a benchmark run.
///
/// The headline number lives in `value`; everything needed to judge it
/// (shot counts, sequence counts, fit quality) goes into `metrics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Name of the benchmark.
    pub name: String,
    /// Primary metric value.
    pub value: f64,
    /// Unit of the primary metric.
    pub unit: String,
    /// Total wall-clock time.
    pub duration: Duration,
    /// Additional metrics.
    pub metrics: serde_json::Map<String, serde_json::Value>,
}

impl BenchmarkResult {
    /// Create a new benchmark result.
    pub fn new(name: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: unit.into(),
            duration: Duration::ZERO,
            metrics: serde_json::Map::new(),
        }
    }

    /// Set the duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add a metric.
    pub fn with_metric(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metrics.insert(key.into(), value.into());
        self
    }
}
