//! Quantum Volume (QV) benchmark.
//!
//! Quantum Volume measures the effective computational power of a quantum
//! computer. It generates random two-qubit-block circuits of width w and
//! depth w, then checks whether the measured heavy output probability
//! exceeds 2/3.
//!
//! Heavy outputs are scored against the exact simulated distribution: an
//! outcome is heavy when its ideal probability is strictly above the median
//! over all `2^w` outcomes, zero-probability ones included.
//!
//! QV = 2^(max width whose heavy output probability > 2/3)

use std::collections::BTreeSet;
use std::f64::consts::PI;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use qexp_ir::bits::index_to_bitstring;
use qexp_ir::{Circuit, Counts, IrError, IrResult, ProbabilityVector, QubitId};

use crate::BenchmarkResult;
use crate::error::{BenchError, BenchResult};

/// Heavy output probability a width must beat to pass.
pub const QV_THRESHOLD: f64 = 2.0 / 3.0;

/// Configuration for a Quantum Volume benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QvConfig {
    /// Maximum width (number of qubits) to test.
    pub max_width: u32,
    /// Number of random trials per width.
    pub num_trials: u32,
    /// Number of measurement shots per circuit.
    pub shots: u32,
    /// Base seed; trial `t` of width `w` uses a seed derived from it.
    pub seed: u64,
}

impl Default for QvConfig {
    fn default() -> Self {
        Self {
            max_width: 6,
            num_trials: 20,
            shots: 1024,
            seed: 0,
        }
    }
}

impl QvConfig {
    /// Seed for one trial at one width.
    pub fn trial_seed(&self, width: u32, trial: u32) -> u64 {
        self.seed
            .wrapping_mul(1_000_003)
            .wrapping_add(u64::from(width) << 32)
            .wrapping_add(u64::from(trial))
    }

    /// Shot-sampling seed for one trial, distinct from its circuit seed.
    pub fn sampling_seed(&self, width: u32, trial: u32) -> u64 {
        crate::sampling_seed(self.trial_seed(width, trial))
    }
}

/// Generate a random QV circuit of the given width.
///
/// Each of the `width` layers pairs the qubits at random and applies an
/// Rz·Ry, CX, Ry block to every pair. With an odd width one qubit idles per
/// layer.
pub fn generate_qv_circuit(width: u32, seed: u64) -> IrResult<Circuit> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut circuit = Circuit::with_size(format!("qv_{width}"), width);

    for _layer in 0..width {
        let mut available: Vec<u32> = (0..width).collect();
        while available.len() >= 2 {
            let q1 = QubitId(available.swap_remove(rng.gen_range(0..available.len())));
            let q2 = QubitId(available.swap_remove(rng.gen_range(0..available.len())));

            let angles: [f64; 6] = std::array::from_fn(|_| rng.gen_range(0.0..2.0 * PI));

            circuit
                .rz(angles[0], q1)?
                .ry(angles[1], q1)?
                .rz(angles[2], q2)?
                .ry(angles[3], q2)?
                .cx(q1, q2)?
                .ry(angles[4], q1)?
                .ry(angles[5], q2)?;
        }
    }

    Ok(circuit)
}

/// Heavy outcomes of an ideal distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct HeavyOutputs {
    /// Median ideal probability over all `2^n` outcomes.
    pub median: f64,
    /// Bitstrings with ideal probability strictly above the median.
    pub outcomes: BTreeSet<String>,
    /// Total ideal probability mass on the heavy set.
    pub ideal_probability: f64,
}

/// Compute the heavy set of `ideal`.
pub fn heavy_outputs(ideal: &ProbabilityVector) -> HeavyOutputs {
    let dense = ideal.to_dense();
    let mut sorted = dense.clone();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    let mut outcomes = BTreeSet::new();
    let mut ideal_probability = 0.0;
    for (index, &p) in dense.iter().enumerate() {
        if p > median {
            outcomes.insert(index_to_bitstring(index, ideal.num_qubits()));
            ideal_probability += p;
        }
    }

    HeavyOutputs {
        median,
        outcomes,
        ideal_probability,
    }
}

/// Measured heavy output statistics for one circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeavyOutputResult {
    /// Fraction of shots that landed in the heavy set.
    pub heavy_fraction: f64,
    /// Shots in the heavy set.
    pub heavy_shots: u64,
    /// Total shots.
    pub total_shots: u64,
    /// Median ideal probability used as the threshold.
    pub median: f64,
    /// Size of the heavy set.
    pub num_heavy_outcomes: usize,
    /// Heavy output probability a noiseless device would achieve.
    pub ideal_heavy_probability: f64,
}

impl HeavyOutputResult {
    /// Whether this circuit clears the 2/3 threshold.
    pub fn passes(&self) -> bool {
        self.heavy_fraction > QV_THRESHOLD
    }
}

/// Score measured `counts` against the heavy set of `ideal`.
pub fn heavy_output_fraction(
    counts: &Counts,
    ideal: &ProbabilityVector,
) -> BenchResult<HeavyOutputResult> {
    if counts.num_qubits() != ideal.num_qubits() {
        return Err(BenchError::WidthMismatch {
            expected: ideal.num_qubits(),
            got: counts.num_qubits(),
        });
    }
    let total_shots = counts.total_shots();
    if total_shots == 0 {
        return Err(IrError::EmptyCounts.into());
    }

    let heavy = heavy_outputs(ideal);
    let heavy_shots: u64 = counts
        .iter()
        .filter(|(bitstring, _)| heavy.outcomes.contains(*bitstring))
        .map(|(_, count)| count)
        .sum();

    debug!(
        "Heavy outputs: {}/{} shots, median {:.3e}, {} heavy outcomes",
        heavy_shots,
        total_shots,
        heavy.median,
        heavy.outcomes.len()
    );

    Ok(HeavyOutputResult {
        heavy_fraction: heavy_shots as f64 / total_shots as f64,
        heavy_shots,
        total_shots,
        median: heavy.median,
        num_heavy_outcomes: heavy.outcomes.len(),
        ideal_heavy_probability: heavy.ideal_probability,
    })
}

/// Create a QV benchmark result for a given achieved volume.
pub fn qv_result(
    achieved_width: u32,
    config: &QvConfig,
    mean_heavy_fraction: f64,
) -> BenchmarkResult {
    let qv = 1u64.checked_shl(achieved_width).unwrap_or(u64::MAX);
    BenchmarkResult::new("quantum_volume", qv as f64, "QV")
        .with_metric("achieved_width", u64::from(achieved_width))
        .with_metric("max_width_tested", u64::from(config.max_width))
        .with_metric("trials_per_width", u64::from(config.num_trials))
        .with_metric("shots", u64::from(config.shots))
        .with_metric("mean_heavy_fraction", mean_heavy_fraction)
}
