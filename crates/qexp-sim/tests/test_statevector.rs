//! Tests for exact statevector simulation.

use proptest::prelude::*;
use std::f64::consts::PI;

use qexp_ir::{Circuit, CircuitSpec, IrError, QubitId, StandardGate};
use qexp_sim::{Statevector, evolve, simulate};

// ---------------------------------------------------------------------------
// Reference scenarios
// ---------------------------------------------------------------------------

#[test]
fn bell_state_distribution() {
    let mut circuit = Circuit::with_size("bell", 2);
    circuit.h(QubitId(0)).unwrap();
    circuit.cx(QubitId(0), QubitId(1)).unwrap();

    let probs = simulate(&circuit).unwrap();
    assert!((probs.get("00") - 0.5).abs() < 1e-12);
    assert!((probs.get("11") - 0.5).abs() < 1e-12);
    assert_eq!(probs.get("01"), 0.0);
    assert_eq!(probs.get("10"), 0.0);
}

#[test]
fn ghz_state_distribution() {
    let mut circuit = Circuit::with_size("ghz", 3);
    circuit.h(QubitId(0)).unwrap();
    circuit.cx(QubitId(0), QubitId(1)).unwrap();
    circuit.cx(QubitId(1), QubitId(2)).unwrap();

    let probs = simulate(&circuit).unwrap();
    assert_eq!(probs.len(), 2);
    assert!((probs.get("000") - 0.5).abs() < 1e-12);
    assert!((probs.get("111") - 0.5).abs() < 1e-12);
}

#[test]
fn x_on_last_qubit_sets_rightmost_bit() {
    let mut circuit = Circuit::with_size("x", 3);
    circuit.x(QubitId(2)).unwrap();
    let probs = simulate(&circuit).unwrap();
    assert!((probs.get("001") - 1.0).abs() < 1e-12);
}

#[test]
fn cnot_control_is_first_operand() {
    let mut circuit = Circuit::with_size("cx", 2);
    circuit.x(QubitId(1)).unwrap();
    circuit.cx(QubitId(1), QubitId(0)).unwrap();
    let probs = simulate(&circuit).unwrap();
    assert!((probs.get("11") - 1.0).abs() < 1e-12);
}

#[test]
fn hzh_equals_x() {
    let mut circuit = Circuit::with_size("hzh", 1);
    circuit
        .h(QubitId(0))
        .unwrap()
        .z(QubitId(0))
        .unwrap()
        .h(QubitId(0))
        .unwrap();
    let probs = simulate(&circuit).unwrap();
    assert!((probs.get("1") - 1.0).abs() < 1e-12);
}

#[test]
fn ry_rotation_probability() {
    let theta = PI / 3.0;
    let mut circuit = Circuit::with_size("ry", 1);
    circuit.ry(theta, QubitId(0)).unwrap();
    let probs = simulate(&circuit).unwrap();
    assert!((probs.get("1") - (theta / 2.0).sin().powi(2)).abs() < 1e-12);
}

#[test]
fn circuit_from_json_description() {
    let spec: CircuitSpec = serde_json::from_str(
        r#"{"num_qubits": 2, "instructions": [
            {"gate": "h", "qubits": [0]},
            {"gate": "CNOT", "qubits": [0, 1]},
            {"gate": "s-dagger", "qubits": [1]}
        ]}"#,
    )
    .unwrap();
    let circuit = Circuit::try_from(&spec).unwrap();
    let probs = simulate(&circuit).unwrap();
    assert!((probs.get("11") - 0.5).abs() < 1e-12);
}

#[test]
fn direct_kernel_rejects_out_of_range() {
    let mut sv = Statevector::new(2).unwrap();
    let err = sv.apply_cz(QubitId(0), QubitId(3)).unwrap_err();
    assert!(matches!(err, IrError::QubitOutOfRange { num_qubits: 2, .. }));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn arb_gate(num_qubits: u32) -> impl Strategy<Value = (StandardGate, Vec<u32>)> {
    let angle = -2.0 * PI..2.0 * PI;
    let single = prop_oneof![
        Just(StandardGate::I),
        Just(StandardGate::X),
        Just(StandardGate::Y),
        Just(StandardGate::Z),
        Just(StandardGate::H),
        Just(StandardGate::S),
        Just(StandardGate::Sdg),
        angle.clone().prop_map(StandardGate::Rx),
        angle.clone().prop_map(StandardGate::Ry),
        angle.prop_map(StandardGate::Rz),
    ];
    let single_op = (single, 0..num_qubits).prop_map(|(g, q)| (g, vec![q]));

    if num_qubits < 2 {
        single_op.boxed()
    } else {
        let pair = (0..num_qubits, 0..num_qubits)
            .prop_filter("operands must differ", |(a, b)| a != b);
        prop_oneof![
            3 => single_op,
            1 => (prop_oneof![Just(StandardGate::CX), Just(StandardGate::CZ)], pair)
                .prop_map(|(g, (a, b))| (g, vec![a, b])),
        ]
        .boxed()
    }
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (1u32..=10).prop_flat_map(|n| {
        prop::collection::vec(arb_gate(n), 0..40).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("random", n);
            for (gate, qubits) in ops {
                circuit
                    .gate(gate, qubits.into_iter().map(QubitId))
                    .unwrap();
            }
            circuit
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Output probabilities of any valid circuit sum to 1.
    #[test]
    fn probabilities_sum_to_one(circuit in arb_circuit()) {
        let probs = simulate(&circuit).unwrap();
        prop_assert!((probs.total() - 1.0).abs() < 1e-9, "total {}", probs.total());
        prop_assert!(probs.iter().all(|(_, p)| p >= 0.0));
    }

    /// The state stays normalised through the whole evolution.
    #[test]
    fn evolution_preserves_norm(circuit in arb_circuit()) {
        let sv = evolve(&circuit).unwrap();
        prop_assert!((sv.norm() - 1.0).abs() < 1e-9);
    }

    /// A circuit followed by its inverse returns to |0…0⟩.
    #[test]
    fn circuit_then_inverse_is_identity(circuit in arb_circuit()) {
        let mut full = circuit.clone();
        full.extend(&circuit.inverse()).unwrap();
        let probs = simulate(&full).unwrap();
        let zeros = "0".repeat(circuit.num_qubits() as usize);
        prop_assert!((probs.get(&zeros) - 1.0).abs() < 1e-9);
    }
}
