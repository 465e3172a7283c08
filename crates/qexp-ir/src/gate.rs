//! Gate vocabulary and canonical unitaries.
//!
//! The vocabulary is closed: every consumer matches on [`StandardGate`]
//! exhaustively, so adding a gate is a compile-time change. Names are only
//! interpreted at the parse boundary ([`StandardGate::from_name`]).

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_1_SQRT_2;

use crate::error::{IrError, IrResult};

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// The fixed gate vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,

    // Single-qubit rotation gates (angle in radians)
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate. First operand is the control.
    CX,
    /// Controlled-Z gate.
    CZ,
}

impl StandardGate {
    /// Parse a gate from its wire name and optional angle.
    ///
    /// Names are case-insensitive. Rotation gates require an angle; all
    /// other gates reject one.
    pub fn from_name(name: &str, parameter: Option<f64>) -> IrResult<Self> {
        let lowered = name.trim().to_ascii_lowercase();
        let fixed = match lowered.as_str() {
            "i" | "id" => Some(StandardGate::I),
            "x" => Some(StandardGate::X),
            "y" => Some(StandardGate::Y),
            "z" => Some(StandardGate::Z),
            "h" => Some(StandardGate::H),
            "s" => Some(StandardGate::S),
            "sdg" | "sdag" | "s-dagger" | "s_dagger" => Some(StandardGate::Sdg),
            "cx" | "cnot" => Some(StandardGate::CX),
            "cz" => Some(StandardGate::CZ),
            _ => None,
        };

        if let Some(gate) = fixed {
            return match parameter {
                Some(value) => Err(IrError::UnexpectedParameter {
                    gate_name: gate.name().to_string(),
                    value,
                }),
                None => Ok(gate),
            };
        }

        let rotation: fn(f64) -> StandardGate = match lowered.as_str() {
            "rx" => StandardGate::Rx,
            "ry" => StandardGate::Ry,
            "rz" => StandardGate::Rz,
            _ => return Err(IrError::UnknownGate(name.to_string())),
        };
        parameter
            .map(rotation)
            .ok_or_else(|| IrError::MissingParameter(lowered))
    }

    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::CX => "cx",
            StandardGate::CZ => "cz",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_) => 1,

            StandardGate::CX | StandardGate::CZ => 2,
        }
    }

    /// The rotation angle, for the R-family.
    pub fn parameter(&self) -> Option<f64> {
        match self {
            StandardGate::Rx(t) | StandardGate::Ry(t) | StandardGate::Rz(t) => Some(*t),
            _ => None,
        }
    }

    /// The inverse gate. The vocabulary is closed under inversion.
    pub fn inverse(&self) -> StandardGate {
        match *self {
            StandardGate::S => StandardGate::Sdg,
            StandardGate::Sdg => StandardGate::S,
            StandardGate::Rx(t) => StandardGate::Rx(-t),
            StandardGate::Ry(t) => StandardGate::Ry(-t),
            StandardGate::Rz(t) => StandardGate::Rz(-t),
            other @ (StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::CX
            | StandardGate::CZ) => other,
        }
    }

    /// Canonical 2×2 unitary of a single-qubit gate, `None` for two-qubit gates.
    pub fn matrix_1q(&self) -> Option<Unitary2> {
        let m = match *self {
            StandardGate::I => Unitary2::identity(),
            StandardGate::X => Unitary2::new([[ZERO, ONE], [ONE, ZERO]]),
            StandardGate::Y => Unitary2::new([[ZERO, -I], [I, ZERO]]),
            StandardGate::Z => Unitary2::new([[ONE, ZERO], [ZERO, -ONE]]),
            StandardGate::H => {
                let v = Complex64::new(FRAC_1_SQRT_2, 0.0);
                Unitary2::new([[v, v], [v, -v]])
            }
            StandardGate::S => Unitary2::new([[ONE, ZERO], [ZERO, I]]),
            StandardGate::Sdg => Unitary2::new([[ONE, ZERO], [ZERO, -I]]),
            StandardGate::Rx(theta) => {
                let c = Complex64::new((theta / 2.0).cos(), 0.0);
                let s = Complex64::new(0.0, -(theta / 2.0).sin());
                Unitary2::new([[c, s], [s, c]])
            }
            StandardGate::Ry(theta) => {
                let c = Complex64::new((theta / 2.0).cos(), 0.0);
                let s = Complex64::new((theta / 2.0).sin(), 0.0);
                Unitary2::new([[c, -s], [s, c]])
            }
            StandardGate::Rz(theta) => Unitary2::new([
                [Complex64::from_polar(1.0, -theta / 2.0), ZERO],
                [ZERO, Complex64::from_polar(1.0, theta / 2.0)],
            ]),
            StandardGate::CX | StandardGate::CZ => return None,
        };
        Some(m)
    }

    /// Canonical 4×4 unitary of a two-qubit gate, `None` for single-qubit gates.
    ///
    /// Basis order is |q_a q_b⟩ with the first operand as the more significant
    /// bit, matching [`crate::bits`].
    pub fn matrix_2q(&self) -> Option<[[Complex64; 4]; 4]> {
        match self {
            StandardGate::CX => Some([
                [ONE, ZERO, ZERO, ZERO],
                [ZERO, ONE, ZERO, ZERO],
                [ZERO, ZERO, ZERO, ONE],
                [ZERO, ZERO, ONE, ZERO],
            ]),
            StandardGate::CZ => Some([
                [ONE, ZERO, ZERO, ZERO],
                [ZERO, ONE, ZERO, ZERO],
                [ZERO, ZERO, ONE, ZERO],
                [ZERO, ZERO, ZERO, -ONE],
            ]),
            _ => None,
        }
    }
}

/// A 2×2 complex matrix, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Unitary2 {
    /// Matrix entries, `m[row][col]`.
    pub m: [[Complex64; 2]; 2],
}

impl Unitary2 {
    /// Wrap raw entries.
    pub const fn new(m: [[Complex64; 2]; 2]) -> Self {
        Self { m }
    }

    /// The 2×2 identity.
    pub const fn identity() -> Self {
        Self::new([[ONE, ZERO], [ZERO, ONE]])
    }

    /// Matrix product `self · other`.
    pub fn mul(&self, other: &Unitary2) -> Unitary2 {
        let mut result = [[ZERO; 2]; 2];
        for (i, row) in result.iter_mut().enumerate() {
            for (j, entry) in row.iter_mut().enumerate() {
                *entry = self.m[i][0] * other.m[0][j] + self.m[i][1] * other.m[1][j];
            }
        }
        Unitary2::new(result)
    }

    /// Conjugate transpose.
    pub fn dagger(&self) -> Unitary2 {
        Unitary2::new([
            [self.m[0][0].conj(), self.m[1][0].conj()],
            [self.m[0][1].conj(), self.m[1][1].conj()],
        ])
    }

    /// Matrix trace.
    pub fn trace(&self) -> Complex64 {
        self.m[0][0] + self.m[1][1]
    }

    /// `|tr(self · other†)|`; equals 2 exactly when the two unitaries agree up
    /// to a global phase.
    pub fn phase_overlap(&self, other: &Unitary2) -> f64 {
        self.mul(&other.dagger()).trace().norm()
    }

    /// Equality up to global phase.
    pub fn equal_up_to_phase(&self, other: &Unitary2, tol: f64) -> bool {
        (self.phase_overlap(other) - 2.0).abs() < tol
    }

    /// Proportional to the identity.
    pub fn is_identity_up_to_phase(&self, tol: f64) -> bool {
        self.equal_up_to_phase(&Unitary2::identity(), tol)
    }

    /// `U†U = I` entry-wise within `tol`.
    pub fn is_unitary(&self, tol: f64) -> bool {
        let product = self.dagger().mul(self);
        let identity = Unitary2::identity();
        (0..2).all(|i| (0..2).all(|j| (product.m[i][j] - identity.m[i][j]).norm() < tol))
    }
}
