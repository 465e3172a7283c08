//! Two-qubit gate folding for noise amplification.
//!
//! Every two-qubit gate `G` becomes `G (G† G)^k` with `k = (fold − 1) / 2`.
//! The folded circuit is logically identical to the original but carries
//! `fold` times as many two-qubit gates, so on hardware dominated by
//! two-qubit error it sees roughly `fold` times the noise.

use tracing::debug;

use qexp_ir::Circuit;

use crate::error::MitigationResult;
use crate::zne::validate_folds;

/// Fold every two-qubit gate of `circuit` by the odd factor `fold`.
pub fn fold_two_qubit_gates(circuit: &Circuit, fold: u32) -> MitigationResult<Circuit> {
    validate_folds(&[fold])?;
    let repeats = (fold - 1) / 2;

    let mut folded = Circuit::with_size(
        format!("{}_fold{fold}", circuit.name()),
        circuit.num_qubits(),
    );
    for inst in circuit.instructions() {
        folded.apply(inst.clone())?;
        if inst.is_two_qubit() {
            let inverse = inst.inverse();
            for _ in 0..repeats {
                folded.apply(inverse.clone())?.apply(inst.clone())?;
            }
        }
    }

    debug!(
        "Folded '{}' by {fold}: {} -> {} two-qubit gates",
        circuit.name(),
        circuit.num_two_qubit_ops(),
        folded.num_two_qubit_ops()
    );
    Ok(folded)
}
