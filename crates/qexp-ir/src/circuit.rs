//! High-level circuit builder API.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::Instruction;
use crate::qubit::QubitId;

/// A quantum circuit over a fixed-width register.
///
/// Every appended instruction is validated against the register width, so a
/// constructed `Circuit` never references a qubit `>= num_qubits`.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Register width.
    num_qubits: u32,
    /// Ordered instruction list.
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create an empty circuit over `num_qubits` qubits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            instructions: vec![],
        }
    }

    /// Append an instruction after validating its operands.
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        instruction.validate(self.num_qubits)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    /// Append a gate on the given qubits.
    pub fn gate(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.apply(Instruction::gate(gate, qubits))
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply identity gate.
    pub fn id(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::I, qubit))
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::H, qubit))
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::X, qubit))
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::Y, qubit))
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::Z, qubit))
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::S, qubit))
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::Sdg, qubit))
    }

    /// Apply Rx rotation gate.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::Rx(theta), qubit))
    }

    /// Apply Ry rotation gate.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::Ry(theta), qubit))
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(StandardGate::Rz(theta), qubit))
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(StandardGate::CX, control, target))
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(StandardGate::CZ, q1, q2))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Instructions in application order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions.
    pub fn num_ops(&self) -> usize {
        self.instructions.len()
    }

    /// Number of two-qubit instructions.
    pub fn num_two_qubit_ops(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_two_qubit()).count()
    }

    /// Circuit depth: length of the longest chain of instructions sharing qubits.
    pub fn depth(&self) -> usize {
        let mut layer = vec![0usize; self.num_qubits as usize];
        for inst in &self.instructions {
            let next = inst
                .qubits
                .iter()
                .map(|q| layer[q.index()])
                .max()
                .unwrap_or(0)
                + 1;
            for q in &inst.qubits {
                layer[q.index()] = next;
            }
        }
        layer.into_iter().max().unwrap_or(0)
    }

    /// Append every instruction of `other`. Widths must match.
    pub fn extend(&mut self, other: &Circuit) -> IrResult<&mut Self> {
        for inst in &other.instructions {
            self.apply(inst.clone())?;
        }
        Ok(self)
    }

    /// The inverse circuit: reversed order, every gate inverted.
    pub fn inverse(&self) -> Circuit {
        Circuit {
            name: format!("{}_dg", self.name),
            num_qubits: self.num_qubits,
            instructions: self.instructions.iter().rev().map(Instruction::inverse).collect(),
        }
    }

    // =========================================================================
    // Pre-built circuits
    // =========================================================================

    /// Create a Bell state circuit.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2);
        circuit.h(QubitId(0))?.cx(QubitId(0), QubitId(1))?;
        Ok(circuit)
    }

    /// Create a GHZ state circuit.
    pub fn ghz(n: u32) -> IrResult<Self> {
        let mut circuit = Self::with_size("ghz", n);
        if n == 0 {
            return Ok(circuit);
        }

        // H on first qubit
        circuit.h(QubitId(0))?;

        // CNOT chain
        for i in 0..n - 1 {
            circuit.cx(QubitId(i), QubitId(i + 1))?;
        }

        Ok(circuit)
    }
}

/// Serialized form of a single instruction, as produced by external circuit
/// generators: `{"gate": "rx", "qubits": [0], "parameter": 1.57}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionSpec {
    /// Gate name from the supported vocabulary.
    pub gate: String,
    /// Operand qubit indices.
    pub qubits: Vec<u32>,
    /// Rotation angle in radians for the R-family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<f64>,
}

/// Serialized form of a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitSpec {
    /// Optional circuit name.
    #[serde(default = "default_circuit_name")]
    pub name: String,
    /// Register width.
    pub num_qubits: u32,
    /// Ordered instructions.
    pub instructions: Vec<InstructionSpec>,
}

fn default_circuit_name() -> String {
    "circuit".into()
}

impl TryFrom<&CircuitSpec> for Circuit {
    type Error = IrError;

    fn try_from(spec: &CircuitSpec) -> IrResult<Self> {
        let mut circuit = Circuit::with_size(spec.name.clone(), spec.num_qubits);
        for inst in &spec.instructions {
            let gate = StandardGate::from_name(&inst.gate, inst.parameter)?;
            circuit.gate(gate, inst.qubits.iter().copied().map(QubitId))?;
        }
        Ok(circuit)
    }
}

impl From<&Circuit> for CircuitSpec {
    fn from(circuit: &Circuit) -> Self {
        CircuitSpec {
            name: circuit.name.clone(),
            num_qubits: circuit.num_qubits,
            instructions: circuit
                .instructions
                .iter()
                .map(|inst| InstructionSpec {
                    gate: inst.gate.name().to_string(),
                    qubits: inst.qubits.iter().map(|q| q.0).collect(),
                    parameter: inst.parameter(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_circuit_with_size() {
        let circuit = Circuit::with_size("test", 3);
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(circuit.num_ops(), 0);
        assert_eq!(circuit.depth(), 0);
    }

    #[test]
    fn test_bell_state() {
        let circuit = Circuit::bell().unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.depth(), 2);
        assert_eq!(circuit.num_two_qubit_ops(), 1);
    }

    #[test]
    fn test_ghz_state() {
        let circuit = Circuit::ghz(5).unwrap();
        assert_eq!(circuit.num_qubits(), 5);
        assert_eq!(circuit.num_ops(), 5);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut circuit = Circuit::with_size("test", 2);
        let err = circuit.cx(QubitId(0), QubitId(2)).unwrap_err();
        assert!(matches!(err, IrError::QubitOutOfRange { .. }));
        assert_eq!(circuit.num_ops(), 0);
    }

    #[test]
    fn test_fluent_api() {
        let mut circuit = Circuit::with_size("test", 2);
        circuit
            .h(QubitId(0))
            .unwrap()
            .rx(PI / 2.0, QubitId(1))
            .unwrap()
            .cz(QubitId(0), QubitId(1))
            .unwrap();
        assert_eq!(circuit.depth(), 2);
    }

    #[test]
    fn test_inverse_reverses_and_inverts() {
        let mut circuit = Circuit::with_size("c", 1);
        circuit.s(QubitId(0)).unwrap().h(QubitId(0)).unwrap();
        let inv = circuit.inverse();
        let gates: Vec<_> = inv.instructions().iter().map(|i| i.gate).collect();
        assert_eq!(gates, vec![StandardGate::H, StandardGate::Sdg]);
    }

    #[test]
    fn test_spec_roundtrip() {
        let json = r#"{
            "num_qubits": 2,
            "instructions": [
                {"gate": "H", "qubits": [0]},
                {"gate": "cnot", "qubits": [0, 1]},
                {"gate": "rz", "qubits": [1], "parameter": 0.25}
            ]
        }"#;
        let spec: CircuitSpec = serde_json::from_str(json).unwrap();
        let circuit = Circuit::try_from(&spec).unwrap();
        assert_eq!(circuit.num_ops(), 3);
        assert_eq!(circuit.instructions()[2].gate, StandardGate::Rz(0.25));

        let back = CircuitSpec::from(&circuit);
        assert_eq!(back.instructions[1].gate, "cx");
        assert_eq!(Circuit::try_from(&back).unwrap(), circuit);
    }

    #[test]
    fn test_spec_unknown_gate_is_fatal() {
        let spec = CircuitSpec {
            name: "bad".into(),
            num_qubits: 1,
            instructions: vec![InstructionSpec {
                gate: "t".into(),
                qubits: vec![0],
                parameter: None,
            }],
        };
        assert!(matches!(
            Circuit::try_from(&spec),
            Err(IrError::UnknownGate(name)) if name == "t"
        ));
    }
}
