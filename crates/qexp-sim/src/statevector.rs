//! Statevector simulation engine.

use num_complex::Complex64;
use tracing::debug;

use qexp_ir::bits::{bitstring_to_index, qubit_mask};
use qexp_ir::{Circuit, Instruction, IrError, IrResult, ProbabilityVector, QubitId, StandardGate, Unitary2};

/// Widest register accepted for exact simulation (2^24 amplitudes, 256 MiB).
pub const MAX_QUBITS: u32 = qexp_ir::bits::MAX_WIDTH;

/// Probabilities below this are dropped from simulator readout.
pub const PROBABILITY_CUTOFF: f64 = 1e-12;

/// A statevector representing a quantum state.
#[derive(Debug, Clone)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers), indexed per [`qexp_ir::bits`].
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: u32,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: u32) -> IrResult<Self> {
        if num_qubits > MAX_QUBITS {
            return Err(IrError::TooManyQubits {
                requested: num_qubits,
                max: MAX_QUBITS,
            });
        }
        let size = 1usize << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Raw amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Amplitude of the basis state named by `bitstring`.
    pub fn amplitude(&self, bitstring: &str) -> IrResult<Complex64> {
        Ok(self.amplitudes[bitstring_to_index(bitstring, self.num_qubits)?])
    }

    /// ‖ψ‖.
    pub fn norm(&self) -> f64 {
        self.amplitudes.iter().map(Complex64::norm_sqr).sum::<f64>().sqrt()
    }

    /// Apply an instruction to the statevector.
    pub fn apply(&mut self, instruction: &Instruction) -> IrResult<()> {
        instruction.validate(self.num_qubits)?;
        let q = &instruction.qubits;
        match instruction.gate {
            StandardGate::CX => self.apply_cnot(q[0], q[1])?,
            StandardGate::CZ => self.apply_cz(q[0], q[1])?,
            StandardGate::I => {}
            single => match single.matrix_1q() {
                Some(u) => self.apply_single(&u, q[0])?,
                None => return Err(IrError::UnknownGate(single.name().to_string())),
            },
        }
        debug_assert!(
            (self.norm() - 1.0).abs() < 1e-9,
            "norm drifted after {}",
            instruction.gate.name()
        );
        Ok(())
    }

    fn check_qubit(&self, qubit: QubitId) -> IrResult<usize> {
        if qubit.0 >= self.num_qubits {
            return Err(IrError::QubitOutOfRange {
                qubit,
                num_qubits: self.num_qubits,
                gate_name: None,
            });
        }
        Ok(qubit_mask(self.num_qubits, qubit.0))
    }

    // =========================================================================
    // Gate kernels
    // =========================================================================

    /// Apply a 2×2 unitary to `qubit`.
    ///
    /// Every amplitude pair differing only in `qubit` is recombined with the
    /// rows of `u`.
    pub fn apply_single(&mut self, u: &Unitary2, qubit: QubitId) -> IrResult<()> {
        let mask = self.check_qubit(qubit)?;
        let [[u00, u01], [u10, u11]] = u.m;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = u00 * a + u01 * b;
                self.amplitudes[j] = u10 * a + u11 * b;
            }
        }
        Ok(())
    }

    /// Apply CNOT as a direct amplitude permutation.
    pub fn apply_cnot(&mut self, control: QubitId, target: QubitId) -> IrResult<()> {
        let ctrl_mask = self.check_qubit(control)?;
        let tgt_mask = self.check_qubit(target)?;
        if ctrl_mask == tgt_mask {
            return Err(IrError::DuplicateQubit {
                qubit: control,
                gate_name: Some("cx".into()),
            });
        }
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                self.amplitudes.swap(i, j);
            }
        }
        Ok(())
    }

    /// Apply CZ as a direct sign flip on |11⟩ components.
    pub fn apply_cz(&mut self, a: QubitId, b: QubitId) -> IrResult<()> {
        let mask_a = self.check_qubit(a)?;
        let mask_b = self.check_qubit(b)?;
        if mask_a == mask_b {
            return Err(IrError::DuplicateQubit {
                qubit: a,
                gate_name: Some("cz".into()),
            });
        }
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if (i & mask_a != 0) && (i & mask_b != 0) {
                *amp = -*amp;
            }
        }
        Ok(())
    }

    /// |amplitude|² per basis state, entries below [`PROBABILITY_CUTOFF`] omitted.
    pub fn probabilities(&self) -> ProbabilityVector {
        let dense: Vec<f64> = self.amplitudes.iter().map(Complex64::norm_sqr).collect();
        ProbabilityVector::from_dense(&dense, self.num_qubits, PROBABILITY_CUTOFF)
    }
}

/// Run `circuit` on a fresh |0…0⟩ state and return the final state.
pub fn evolve(circuit: &Circuit) -> IrResult<Statevector> {
    let mut sv = Statevector::new(circuit.num_qubits())?;
    debug!(
        circuit = circuit.name(),
        num_qubits = circuit.num_qubits(),
        num_ops = circuit.num_ops(),
        "simulating circuit"
    );
    for inst in circuit.instructions() {
        sv.apply(inst)?;
    }
    Ok(sv)
}

/// Exact output distribution of `circuit`.
pub fn simulate(circuit: &Circuit) -> IrResult<ProbabilityVector> {
    Ok(evolve(circuit)?.probabilities())
}
