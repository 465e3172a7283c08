//! Group-theoretic and end-to-end checks for the Clifford table and RB circuits.

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use qexp_bench::clifford::CLIFFORD_GROUP_SIZE;
use qexp_bench::qv::{generate_qv_circuit, heavy_output_fraction, heavy_outputs};
use qexp_bench::rb::RbSequence;
use qexp_bench::{CliffordGroup, clifford_group};
use qexp_sim::{sample_counts, simulate};

// ---------------------------------------------------------------------------
// Group invariants
// ---------------------------------------------------------------------------

#[test]
fn group_verifies() {
    let group = CliffordGroup::build().unwrap();
    group.verify().unwrap();
    assert_eq!(group.len(), CLIFFORD_GROUP_SIZE);
}

#[test]
fn every_element_is_unitary() {
    let group = clifford_group();
    for (i, element) in group.iter().enumerate() {
        assert!(element.matrix().is_unitary(1e-10), "element {i}");
    }
}

#[test]
fn elements_pairwise_distinct_up_to_phase() {
    let group = clifford_group();
    for i in 0..group.len() {
        for j in (i + 1)..group.len() {
            let overlap = group.matrix(i).phase_overlap(group.matrix(j));
            assert!(overlap < 2.0 - 1e-6, "elements {i} and {j} coincide");
        }
    }
}

#[test]
fn closed_under_composition() {
    let group = clifford_group();
    let mut pairs = 0;
    for i in 0..group.len() {
        for j in 0..group.len() {
            assert!(group.find(&group.compose(&[i, j])).is_some());
            pairs += 1;
        }
    }
    assert_eq!(pairs, 576);
}

#[test]
fn multiplication_table_is_latin_square() {
    let group = clifford_group();
    for i in 0..group.len() {
        let mut row: Vec<usize> = (0..group.len()).map(|j| group.multiply_index(i, j)).collect();
        row.sort_unstable();
        assert_eq!(row, (0..group.len()).collect::<Vec<_>>(), "row {i}");
    }
}

#[test]
fn rb_circuits_return_to_ground_state() {
    let mut rng = SmallRng::seed_from_u64(2024);
    for length in [1, 5, 50, 200] {
        let seq = RbSequence::random(length, &mut rng).unwrap();
        let probs = simulate(&seq.circuit).unwrap();
        assert!((probs.get("0") - 1.0).abs() < 1e-9, "length {length}");
    }
}

// ---------------------------------------------------------------------------
// Quantum volume end to end
// ---------------------------------------------------------------------------

#[test]
fn ideal_device_passes_quantum_volume() {
    let circuit = generate_qv_circuit(4, 11).unwrap();
    let ideal = simulate(&circuit).unwrap();
    let counts = sample_counts(&ideal, 4000, 5);
    let result = heavy_output_fraction(&counts, &ideal).unwrap();

    let heavy = heavy_outputs(&ideal);
    assert_eq!(result.num_heavy_outcomes, heavy.outcomes.len());
    assert!(result.heavy_fraction > 0.5);
    assert!((result.ideal_heavy_probability - heavy.ideal_probability).abs() < 1e-12);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Any sequence composed with its computed inverse is the identity.
    #[test]
    fn random_sequence_inverts_to_identity(
        indices in prop::collection::vec(0usize..CLIFFORD_GROUP_SIZE, 1..=20)
    ) {
        let group = clifford_group();
        let inverse = group.inverse_index(&indices);
        let mut full = indices.clone();
        full.push(inverse);
        prop_assert!(group.compose(&full).is_identity_up_to_phase(1e-6));
    }

    /// Simulating an RB circuit always yields the all-zero outcome.
    #[test]
    fn simulated_rb_yields_zero(length in 1u32..=20, seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let seq = RbSequence::random(length, &mut rng).unwrap();
        let probs = simulate(&seq.circuit).unwrap();
        prop_assert!((probs.get("0") - 1.0).abs() < 1e-6);
    }
}
