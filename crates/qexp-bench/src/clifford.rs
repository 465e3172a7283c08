//! The 24-element single-qubit Clifford group.
//!
//! The group is generated at first use by a breadth-first closure search over
//! the generators H, S and X, then checked against its defining invariants.
//! Elements are identified up to global phase: two unitaries are the same
//! Clifford when `|tr(U·V†)| = 2`.
//!
//! Element 0 is always the identity. Every element records the shortest
//! generator word that produces it, leftmost gate applied first.

use std::collections::VecDeque;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use qexp_ir::{Circuit, IrResult, QubitId, StandardGate, Unitary2};

use crate::error::CliffordError;

/// Number of single-qubit Cliffords modulo global phase.
pub const CLIFFORD_GROUP_SIZE: usize = 24;

/// Tolerance for phase-equality and the inverse search.
const PHASE_TOL: f64 = 1e-6;

/// Tolerance for the unitarity check.
const UNITARY_TOL: f64 = 1e-10;

/// Generators of the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CliffordGenerator {
    /// Hadamard.
    H,
    /// Phase gate, `diag(1, i)`.
    S,
    /// Pauli X.
    X,
}

impl CliffordGenerator {
    /// All generators, in search order.
    pub const ALL: [CliffordGenerator; 3] =
        [CliffordGenerator::H, CliffordGenerator::S, CliffordGenerator::X];

    /// The circuit gate this generator emits.
    pub fn gate(self) -> StandardGate {
        match self {
            CliffordGenerator::H => StandardGate::H,
            CliffordGenerator::S => StandardGate::S,
            CliffordGenerator::X => StandardGate::X,
        }
    }

    /// Unitary matrix of the generator.
    pub fn matrix(self) -> Unitary2 {
        match self.gate().matrix_1q() {
            Some(m) => m,
            // H, S and X are all single-qubit gates.
            None => unreachable!("generator {self:?} has no 2x2 matrix"),
        }
    }
}

/// One group element: its matrix and the generator word that builds it.
#[derive(Debug, Clone)]
pub struct CliffordElement {
    matrix: Unitary2,
    sequence: Vec<CliffordGenerator>,
}

impl CliffordElement {
    fn identity() -> Self {
        Self {
            matrix: Unitary2::identity(),
            sequence: Vec::new(),
        }
    }

    /// The element's unitary.
    pub fn matrix(&self) -> &Unitary2 {
        &self.matrix
    }

    /// Generator word, leftmost applied first.
    pub fn gate_sequence(&self) -> &[CliffordGenerator] {
        &self.sequence
    }
}

/// The verified single-qubit Clifford group.
#[derive(Debug, Clone)]
pub struct CliffordGroup {
    elements: Vec<CliffordElement>,
}

impl CliffordGroup {
    /// Run the closure search and verify the result.
    pub fn build() -> Result<Self, CliffordError> {
        let group = Self::closure(&CliffordGenerator::ALL);
        group.verify()?;
        debug!(
            "Built Clifford group: {} elements, longest word {}",
            group.len(),
            group
                .elements
                .iter()
                .map(|e| e.sequence.len())
                .max()
                .unwrap_or(0)
        );
        Ok(group)
    }

    /// Breadth-first closure from the identity.
    ///
    /// New elements are `element · generator`, so the generator acts first and
    /// is prepended to the element's word. The search stops once
    /// [`CLIFFORD_GROUP_SIZE`] distinct elements are known.
    fn closure(generators: &[CliffordGenerator]) -> Self {
        let mut elements = vec![CliffordElement::identity()];
        let mut frontier = VecDeque::from([0usize]);

        'search: while let Some(idx) = frontier.pop_front() {
            for &generator in generators {
                let candidate = elements[idx].matrix.mul(&generator.matrix());
                if elements
                    .iter()
                    .any(|e| e.matrix.equal_up_to_phase(&candidate, PHASE_TOL))
                {
                    continue;
                }

                let mut sequence = Vec::with_capacity(elements[idx].sequence.len() + 1);
                sequence.push(generator);
                sequence.extend_from_slice(&elements[idx].sequence);
                elements.push(CliffordElement {
                    matrix: candidate,
                    sequence,
                });
                frontier.push_back(elements.len() - 1);

                if elements.len() == CLIFFORD_GROUP_SIZE {
                    break 'search;
                }
            }
        }

        Self { elements }
    }

    /// Check the group invariants.
    ///
    /// Exactly 24 elements, identity first, every element unitary, every word
    /// reproducing its matrix, pairwise distinct up to phase, and closed under
    /// composition.
    pub fn verify(&self) -> Result<(), CliffordError> {
        let violation = |msg: String| Err(CliffordError::InvariantViolation(msg));

        if self.elements.len() != CLIFFORD_GROUP_SIZE {
            return violation(format!(
                "expected {CLIFFORD_GROUP_SIZE} elements, found {}",
                self.elements.len()
            ));
        }

        if !self.elements[0].matrix.is_identity_up_to_phase(PHASE_TOL) {
            return violation("element 0 is not the identity".into());
        }

        for (i, element) in self.elements.iter().enumerate() {
            if !element.matrix.is_unitary(UNITARY_TOL) {
                return violation(format!("element {i} is not unitary"));
            }
            let rebuilt = word_matrix(&element.sequence);
            if !rebuilt.equal_up_to_phase(&element.matrix, PHASE_TOL) {
                return violation(format!(
                    "gate sequence {:?} of element {i} does not reproduce its matrix",
                    element.sequence
                ));
            }
        }

        for i in 0..self.elements.len() {
            for j in (i + 1)..self.elements.len() {
                let overlap = self.elements[i]
                    .matrix
                    .phase_overlap(&self.elements[j].matrix);
                if overlap >= 2.0 - PHASE_TOL {
                    return violation(format!("elements {i} and {j} are equal up to phase"));
                }
            }
        }

        for i in 0..self.elements.len() {
            for j in 0..self.elements.len() {
                let product = self.elements[j].matrix.mul(&self.elements[i].matrix);
                if self.find(&product).is_none() {
                    return violation(format!(
                        "product of elements {i} then {j} is outside the group"
                    ));
                }
            }
        }

        Ok(())
    }

    /// Number of elements (always 24 for a verified group).
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the group has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Element by index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 24`.
    pub fn element(&self, index: usize) -> &CliffordElement {
        &self.elements[index]
    }

    /// Iterate over all elements in index order.
    pub fn iter(&self) -> impl Iterator<Item = &CliffordElement> {
        self.elements.iter()
    }

    /// Unitary of element `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 24`.
    pub fn matrix(&self, index: usize) -> &Unitary2 {
        &self.elements[index].matrix
    }

    /// Generator word of element `index`, leftmost applied first.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 24`.
    pub fn gate_sequence(&self, index: usize) -> &[CliffordGenerator] {
        &self.elements[index].sequence
    }

    /// Unitary of applying `indices` in order: `U_last ⋯ U_first`.
    pub fn compose(&self, indices: &[usize]) -> Unitary2 {
        indices
            .iter()
            .fold(Unitary2::identity(), |acc, &i| self.matrix(i).mul(&acc))
    }

    /// Index of the element equal to `target` up to phase.
    pub fn find(&self, target: &Unitary2) -> Option<usize> {
        self.elements
            .iter()
            .position(|e| e.matrix.equal_up_to_phase(target, PHASE_TOL))
    }

    /// Index of the element that undoes the sequence `indices`.
    ///
    /// # Panics
    ///
    /// The inverse of a product of Cliffords is a Clifford; a failed lookup
    /// means the table is corrupt and aborts rather than falling back.
    pub fn inverse_index(&self, indices: &[usize]) -> usize {
        let target = self.compose(indices).dagger();
        let Some(index) = self.find(&target) else {
            panic!("no Clifford matches the inverse of sequence {indices:?}");
        };
        index
    }

    /// Index of the element equal to applying `first` then `second`.
    ///
    /// # Panics
    ///
    /// Panics if the product is not in the table.
    pub fn multiply_index(&self, first: usize, second: usize) -> usize {
        let product = self.compose(&[first, second]);
        let Some(index) = self.find(&product) else {
            panic!("product of Cliffords {first} and {second} is outside the table");
        };
        index
    }

    /// Append the gates of element `index` to `circuit` on `qubit`.
    pub fn append_to_circuit(
        &self,
        index: usize,
        circuit: &mut Circuit,
        qubit: QubitId,
    ) -> IrResult<()> {
        for generator in self.gate_sequence(index) {
            circuit.gate(generator.gate(), [qubit])?;
        }
        Ok(())
    }
}

/// Matrix of a generator word, leftmost applied first.
fn word_matrix(sequence: &[CliffordGenerator]) -> Unitary2 {
    sequence
        .iter()
        .fold(Unitary2::identity(), |acc, g| g.matrix().mul(&acc))
}

static CLIFFORD_GROUP: LazyLock<CliffordGroup> = LazyLock::new(|| match CliffordGroup::build() {
    Ok(group) => group,
    Err(e) => panic!("single-qubit Clifford table failed verification: {e}"),
});

/// The process-wide Clifford table, built and verified on first use.
///
/// # Panics
///
/// Panics on first access if the table fails verification.
pub fn clifford_group() -> &'static CliffordGroup {
    &CLIFFORD_GROUP
}
