//! Finite-shot sampling from an exact distribution.
//!
//! Emulates what a noiseless device would return for a given number of
//! shots, so analysis code can be exercised against realistic counts.

use rand::{Rng, SeedableRng};
use rand::rngs::SmallRng;
use tracing::debug;

use qexp_ir::{Counts, ProbabilityVector};

/// Draw `shots` outcomes from `dist` with a seeded generator.
pub fn sample_counts(dist: &ProbabilityVector, shots: u64, seed: u64) -> Counts {
    let mut rng = SmallRng::seed_from_u64(seed);
    sample_counts_with(dist, shots, &mut rng)
}

/// Draw `shots` outcomes from `dist` using the caller's generator.
pub fn sample_counts_with<R: Rng + ?Sized>(
    dist: &ProbabilityVector,
    shots: u64,
    rng: &mut R,
) -> Counts {
    let num_qubits = dist.num_qubits();
    let mut counts = Counts::new(num_qubits);

    let dense = dist.to_dense();
    let mut cumulative = Vec::with_capacity(dense.len());
    let mut acc = 0.0;
    for p in &dense {
        acc += p;
        cumulative.push(acc);
    }

    for _ in 0..shots {
        let r: f64 = rng.r#gen::<f64>() * acc;
        // Fallback to the last outcome guards against rounding at the top end.
        let outcome = cumulative
            .partition_point(|&c| c <= r)
            .min(dense.len() - 1);
        counts.insert_index(outcome, 1);
    }

    debug!(shots, outcomes = counts.len(), "sampled counts");
    counts
}
