//! Randomized Benchmarking (RB).
//!
//! Measures gate fidelity by applying random sequences of Clifford gates
//! followed by the inverse Clifford, then fitting the decay of ground-state
//! probability to an exponential curve.
//!
//! Fidelity = (1 + p) / 2, where p is the exponential decay parameter.

use std::collections::BTreeMap;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use qexp_ir::{Circuit, Counts, IrError, IrResult, QubitId};

use crate::BenchmarkResult;
use crate::clifford::{CLIFFORD_GROUP_SIZE, clifford_group};
use crate::error::{BenchError, BenchResult};

/// Baseline survival of a fully depolarized single qubit.
const SINGLE_QUBIT_BASELINE: f64 = 0.5;

/// Configuration for a Randomized Benchmarking experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RbConfig {
    /// Sequence lengths to sample.
    pub sequence_lengths: Vec<u32>,
    /// Number of random sequences per length.
    pub num_sequences: u32,
    /// Number of measurement shots per circuit.
    pub shots: u32,
    /// Seed for sequence generation.
    pub seed: u64,
}

impl Default for RbConfig {
    fn default() -> Self {
        Self {
            sequence_lengths: vec![1, 2, 4, 8, 16, 32, 64, 128],
            num_sequences: 30,
            shots: 1024,
            seed: 0,
        }
    }
}

impl RbConfig {
    /// Set the sequence lengths.
    pub fn with_sequence_lengths(mut self, lengths: Vec<u32>) -> Self {
        self.sequence_lengths = lengths;
        self
    }

    /// Set the number of sequences per length.
    pub fn with_num_sequences(mut self, n: u32) -> Self {
        self.num_sequences = n;
        self
    }

    /// Set the shot count per circuit.
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    /// Set the generation seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Shot-sampling seed for the `index`-th generated sequence.
    pub fn sampling_seed(&self, index: usize) -> u64 {
        crate::sampling_seed(self.seed.wrapping_add(index as u64))
    }
}

/// One random RB sequence and its single-qubit circuit.
#[derive(Debug, Clone)]
pub struct RbSequence {
    /// Indices into the Clifford table, applied left to right.
    pub clifford_indices: Vec<usize>,
    /// Index of the recovery Clifford appended at the end.
    pub inverse_index: usize,
    /// Gates of every Clifford, then of the recovery Clifford.
    pub circuit: Circuit,
}

impl RbSequence {
    /// Draw `length` uniform Cliffords and append their inverse.
    ///
    /// The ideal output of the circuit is always `"0"`.
    pub fn random<R: Rng + ?Sized>(length: u32, rng: &mut R) -> IrResult<Self> {
        let group = clifford_group();
        let clifford_indices: Vec<usize> = (0..length)
            .map(|_| rng.gen_range(0..CLIFFORD_GROUP_SIZE))
            .collect();
        let inverse_index = group.inverse_index(&clifford_indices);

        let mut circuit = Circuit::with_size(format!("rb_1q_{length}"), 1);
        let qubit = QubitId(0);
        for &idx in &clifford_indices {
            group.append_to_circuit(idx, &mut circuit, qubit)?;
        }
        group.append_to_circuit(inverse_index, &mut circuit, qubit)?;

        Ok(Self {
            clifford_indices,
            inverse_index,
            circuit,
        })
    }

    /// Number of random Cliffords, excluding the recovery element.
    pub fn length(&self) -> u32 {
        self.clifford_indices.len() as u32
    }
}

/// Generate a single seeded RB sequence.
pub fn generate_rb_sequence(length: u32, seed: u64) -> IrResult<RbSequence> {
    let mut rng = SmallRng::seed_from_u64(seed);
    RbSequence::random(length, &mut rng)
}

/// Generate `num_sequences` sequences for every configured length.
///
/// All sequences come from one RNG seeded with `config.seed`, so the whole
/// batch is reproducible.
pub fn generate_rb_sequences(config: &RbConfig) -> IrResult<Vec<RbSequence>> {
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let mut sequences =
        Vec::with_capacity(config.sequence_lengths.len() * config.num_sequences as usize);
    for &length in &config.sequence_lengths {
        for _ in 0..config.num_sequences {
            sequences.push(RbSequence::random(length, &mut rng)?);
        }
    }
    debug!(
        "Generated {} RB sequences over lengths {:?}",
        sequences.len(),
        config.sequence_lengths
    );
    Ok(sequences)
}

/// Fraction of shots that returned the all-zero outcome.
pub fn survival_probability(counts: &Counts) -> IrResult<f64> {
    let total = counts.total_shots();
    if total == 0 {
        return Err(IrError::EmptyCounts);
    }
    let zeros = "0".repeat(counts.num_qubits() as usize);
    Ok(counts.get(&zeros) as f64 / total as f64)
}

/// Average survival probability per sequence length.
///
/// Returns `(length, mean survival)` pairs sorted by length.
pub fn average_survival(results: &[(u32, Counts)]) -> IrResult<Vec<(u32, f64)>> {
    let mut by_length: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for (length, counts) in results {
        let p = survival_probability(counts)?;
        let entry = by_length.entry(*length).or_insert((0.0, 0));
        entry.0 += p;
        entry.1 += 1;
    }
    Ok(by_length
        .into_iter()
        .map(|(length, (sum, n))| (length, sum / n as f64))
        .collect())
}

/// Fitted decay `A · p^m + B`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RbFit {
    /// Amplitude `A`.
    pub amplitude: f64,
    /// Decay parameter `p`.
    pub decay: f64,
    /// Asymptote `B`.
    pub baseline: f64,
    /// Data points that entered the regression.
    pub points_used: usize,
}

/// Fit an exponential decay `A · p^m + B` to RB data.
///
/// Log-linear least squares with `B` fixed at the single-qubit depolarized
/// value of 0.5. Points at or below the baseline carry no information about
/// `p` and are skipped.
pub fn fit_rb_decay(data: &[(u32, f64)]) -> BenchResult<RbFit> {
    const MIN_POINTS: usize = 2;
    let baseline = SINGLE_QUBIT_BASELINE;

    let points: Vec<(f64, f64)> = data
        .iter()
        .filter_map(|&(m, prob)| {
            let shifted = prob - baseline;
            (shifted > 1e-3).then(|| (f64::from(m), shifted.ln()))
        })
        .collect();

    let distinct_lengths = {
        let mut xs: Vec<u64> = points.iter().map(|(x, _)| x.to_bits()).collect();
        xs.sort_unstable();
        xs.dedup();
        xs.len()
    };
    if distinct_lengths < MIN_POINTS {
        return Err(BenchError::InsufficientData {
            needed: MIN_POINTS,
            got: distinct_lengths,
        });
    }

    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();
    let sum_xx: f64 = points.iter().map(|(x, _)| x * x).sum();

    // y = ln(A) + m · ln(p)
    let ln_p = (n * sum_xy - sum_x * sum_y) / (n * sum_xx - sum_x * sum_x);
    let ln_a = (sum_y - ln_p * sum_x) / n;

    Ok(RbFit {
        amplitude: ln_a.exp().clamp(0.0, 1.0),
        decay: ln_p.exp().clamp(0.0, 1.0),
        baseline,
        points_used: points.len(),
    })
}

/// Compute error per Clifford (EPC) from the decay parameter.
///
/// EPC = (d - 1)(1 - p) / d where d = 2^num_qubits.
pub fn error_per_clifford(p: f64, num_qubits: u32) -> f64 {
    let d = (1u64 << num_qubits) as f64;
    (d - 1.0) * (1.0 - p) / d
}

/// Create an RB benchmark result.
pub fn rb_result(fit: &RbFit, config: &RbConfig) -> BenchmarkResult {
    let epc = error_per_clifford(fit.decay, 1);
    BenchmarkResult::new("rb_1q", 1.0 - epc, "gate_fidelity")
        .with_metric("error_per_clifford", epc)
        .with_metric("decay_parameter", fit.decay)
        .with_metric("amplitude", fit.amplitude)
        .with_metric("baseline", fit.baseline)
        .with_metric("points_used", fit.points_used as u64)
        .with_metric("sequences_per_length", u64::from(config.num_sequences))
        .with_metric("shots", u64::from(config.shots))
        .with_metric(
            "max_sequence_length",
            u64::from(config.sequence_lengths.iter().copied().max().unwrap_or(0)),
        )
}
