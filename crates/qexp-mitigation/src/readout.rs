//! Confusion-matrix readout error mitigation (REM).
//!
//! A confusion matrix `M` is column-stochastic: `M[measured][prepared]` is the
//! probability of reading `measured` after preparing basis state `prepared`.
//! Rows and columns are indexed by basis index under the bitstring convention
//! of [`qexp_ir::bits`] (qubit 0 most significant).
//!
//! Correction applies `M⁻¹` to an observed distribution, clips negative
//! entries to zero and renormalizes. A singular or ill-conditioned `M` is
//! reported alongside the result rather than treated as an error.
//!
//! The tensored builders assume readout errors are independent across qubits.
//! Correlated readout crosstalk is not modelled; compare the full and tensored
//! matrices when that matters.

use std::collections::BTreeMap;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use qexp_ir::bits::{bit_of, bitstring_to_index, bitstring_width, index_to_bitstring};
use qexp_ir::{Counts, IrError, ProbabilityVector};

use crate::error::{Degeneracy, MitigationError, MitigationResult};
use crate::linalg;

/// Condition number above which a correction is flagged as ill-conditioned.
pub const DEFAULT_CONDITION_THRESHOLD: f64 = 1e3;

/// Widest register a dense confusion matrix is built for (4096×4096).
pub const MAX_CALIBRATION_QUBITS: u32 = 12;

fn check_calibration_width(num_qubits: u32) -> MitigationResult<()> {
    if num_qubits > MAX_CALIBRATION_QUBITS {
        return Err(IrError::TooManyQubits {
            requested: num_qubits,
            max: MAX_CALIBRATION_QUBITS,
        }
        .into());
    }
    Ok(())
}

/// Measured counts for every prepared computational basis state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Counts>", into = "BTreeMap<String, Counts>")]
pub struct CalibrationData {
    num_qubits: u32,
    columns: BTreeMap<String, Counts>,
}

impl CalibrationData {
    /// Empty calibration for a `num_qubits`-wide register.
    pub fn new(num_qubits: u32) -> Self {
        Self {
            num_qubits,
            columns: BTreeMap::new(),
        }
    }

    /// Build from a prepared-label map and validate it.
    pub fn from_map(map: BTreeMap<String, Counts>) -> MitigationResult<Self> {
        let Some(first) = map.keys().next() else {
            return Err(MitigationError::IncompleteCalibration {
                num_qubits: 0,
                missing: Vec::new(),
            });
        };
        let num_qubits = bitstring_width(first)?;
        check_calibration_width(num_qubits)?;
        let mut data = Self::new(num_qubits);
        for (prepared, counts) in map {
            data.insert(&prepared, counts)?;
        }
        data.validate()?;
        Ok(data)
    }

    /// Record the measured counts for one prepared state.
    pub fn insert(&mut self, prepared: &str, counts: Counts) -> MitigationResult<()> {
        bitstring_to_index(prepared, self.num_qubits)?;
        if counts.num_qubits() != self.num_qubits {
            return Err(MitigationError::InconsistentWidth {
                context: format!("calibration counts for '{prepared}'"),
                expected: self.num_qubits,
                got: counts.num_qubits(),
            });
        }
        self.columns.insert(prepared.to_string(), counts);
        Ok(())
    }

    /// Register width.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Counts for one prepared state.
    pub fn get(&self, prepared: &str) -> Option<&Counts> {
        self.columns.get(prepared)
    }

    /// Check that all 2^k prepared states are present with non-zero shots.
    pub fn validate(&self) -> MitigationResult<()> {
        check_calibration_width(self.num_qubits)?;
        let dim = 1usize << self.num_qubits;
        let missing: Vec<String> = (0..dim)
            .map(|i| index_to_bitstring(i, self.num_qubits))
            .filter(|label| !self.columns.contains_key(label))
            .collect();
        if !missing.is_empty() {
            return Err(MitigationError::IncompleteCalibration {
                num_qubits: self.num_qubits,
                missing,
            });
        }
        for (prepared, counts) in &self.columns {
            if counts.num_qubits() != self.num_qubits {
                return Err(MitigationError::InconsistentWidth {
                    context: format!("calibration counts for '{prepared}'"),
                    expected: self.num_qubits,
                    got: counts.num_qubits(),
                });
            }
            if counts.total_shots() == 0 {
                return Err(MitigationError::EmptyCalibrationColumn(prepared.clone()));
            }
        }
        Ok(())
    }

    /// Marginal 2×2 confusion matrix of every qubit.
    ///
    /// For qubit `q`, column `p` pools all prepared states whose bit `q` is
    /// `p`, and row `m` counts shots whose measured bit `q` is `m`.
    pub fn per_qubit_matrices(&self) -> MitigationResult<Vec<Array2<f64>>> {
        self.validate()?;
        let n = self.num_qubits;

        (0..n)
            .map(|q| -> MitigationResult<Array2<f64>> {
                let mut tallies = Array2::<f64>::zeros((2, 2));
                for (prepared, counts) in &self.columns {
                    let p = bit_of(bitstring_to_index(prepared, n)?, n, q) as usize;
                    for (measured, count) in counts.iter() {
                        let m = bit_of(bitstring_to_index(measured, n)?, n, q) as usize;
                        tallies[[m, p]] += count as f64;
                    }
                }
                for p in 0..2 {
                    let total = tallies[[0, p]] + tallies[[1, p]];
                    tallies[[0, p]] /= total;
                    tallies[[1, p]] /= total;
                }
                Ok(tallies)
            })
            .collect()
    }
}

impl TryFrom<BTreeMap<String, Counts>> for CalibrationData {
    type Error = MitigationError;

    fn try_from(map: BTreeMap<String, Counts>) -> Result<Self, Self::Error> {
        Self::from_map(map)
    }
}

impl From<CalibrationData> for BTreeMap<String, Counts> {
    fn from(data: CalibrationData) -> Self {
        data.columns
    }
}

/// Column-stochastic readout confusion matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    num_qubits: u32,
    matrix: Array2<f64>,
}

impl ConfusionMatrix {
    /// Full 2^k×2^k matrix from calibration data.
    ///
    /// Column `j` is the empirical distribution measured after preparing
    /// basis state `j`.
    pub fn from_calibration(data: &CalibrationData) -> MitigationResult<Self> {
        data.validate()?;
        let n = data.num_qubits();
        let dim = 1usize << n;
        let mut matrix = Array2::<f64>::zeros((dim, dim));

        for (prepared, counts) in &data.columns {
            let col = bitstring_to_index(prepared, n)?;
            let total = counts.total_shots() as f64;
            for (measured, count) in counts.iter() {
                let row = bitstring_to_index(measured, n)?;
                matrix[[row, col]] = count as f64 / total;
            }
        }

        debug!("Built {dim}x{dim} confusion matrix from calibration");
        Ok(Self {
            num_qubits: n,
            matrix,
        })
    }

    /// Kronecker product of per-qubit 2×2 matrices, qubit 0 first.
    pub fn tensored(per_qubit: &[Array2<f64>]) -> MitigationResult<Self> {
        let Some((first, rest)) = per_qubit.split_first() else {
            return Err(MitigationError::InvalidMatrixShape { rows: 0, cols: 0 });
        };
        check_calibration_width(u32::try_from(per_qubit.len()).unwrap_or(u32::MAX))?;
        for m in per_qubit {
            if m.dim() != (2, 2) {
                let (rows, cols) = m.dim();
                return Err(MitigationError::InvalidMatrixShape { rows, cols });
            }
        }
        let matrix = rest
            .iter()
            .fold(first.clone(), |acc, m| linalg::kron(&acc, m));
        Ok(Self {
            num_qubits: per_qubit.len() as u32,
            matrix,
        })
    }

    /// Per-qubit marginals of `data`, recombined as a Kronecker product.
    ///
    /// Assumes uncorrelated readout errors.
    pub fn from_calibration_tensored(data: &CalibrationData) -> MitigationResult<Self> {
        Self::tensored(&data.per_qubit_matrices()?)
    }

    /// Independent per-qubit model from `(p01, p10)` pairs.
    ///
    /// `p01` is the chance of reading 1 after preparing 0, `p10` the chance
    /// of reading 0 after preparing 1.
    pub fn from_error_rates(rates: &[(f64, f64)]) -> MitigationResult<Self> {
        let per_qubit = rates
            .iter()
            .enumerate()
            .map(|(q, &(p01, p10))| {
                for value in [p01, p10] {
                    if !(0.0..=1.0).contains(&value) {
                        return Err(MitigationError::InvalidErrorRate {
                            qubit: q as u32,
                            value,
                        });
                    }
                }
                Ok(ndarray::array![[1.0 - p01, p10], [p01, 1.0 - p10]])
            })
            .collect::<MitigationResult<Vec<_>>>()?;
        Self::tensored(&per_qubit)
    }

    /// Perfect readout on `num_qubits` qubits.
    pub fn identity(num_qubits: u32) -> MitigationResult<Self> {
        check_calibration_width(num_qubits)?;
        Ok(Self {
            num_qubits,
            matrix: Array2::eye(1usize << num_qubits),
        })
    }

    /// Wrap an explicit 2^k×2^k matrix.
    pub fn from_array(matrix: Array2<f64>) -> MitigationResult<Self> {
        let (rows, cols) = matrix.dim();
        if rows != cols || !rows.is_power_of_two() || rows < 2 {
            return Err(MitigationError::InvalidMatrixShape { rows, cols });
        }
        check_calibration_width(rows.trailing_zeros())?;
        Ok(Self {
            num_qubits: rows.trailing_zeros(),
            matrix,
        })
    }

    /// Register width.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Underlying matrix, `[measured, prepared]`.
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Probability of reading `measured` after preparing `prepared`.
    pub fn get(&self, measured: usize, prepared: usize) -> f64 {
        self.matrix[[measured, prepared]]
    }

    /// Invert and report the 1-norm condition number.
    pub fn invert(&self) -> Inversion {
        let inverse = linalg::invert(&self.matrix);
        let condition_number = linalg::condition_number_1(&self.matrix, inverse.as_ref());
        Inversion {
            inverse,
            condition_number,
        }
    }

    /// Push an ideal distribution through the readout channel, `M·p`.
    pub fn apply(&self, ideal: &ProbabilityVector) -> MitigationResult<ProbabilityVector> {
        if ideal.num_qubits() != self.num_qubits {
            return Err(MitigationError::InconsistentWidth {
                context: "ideal distribution".into(),
                expected: self.num_qubits,
                got: ideal.num_qubits(),
            });
        }
        let noisy = self.matrix.dot(&ndarray::Array1::from(ideal.to_dense()));
        Ok(ProbabilityVector::from_dense(
            &noisy.to_vec(),
            self.num_qubits,
            0.0,
        ))
    }

    /// Probability of reading basis state `state` correctly.
    pub fn readout_fidelity(&self, state: usize) -> f64 {
        self.matrix[[state, state]]
    }

    /// Mean of the diagonal.
    pub fn average_fidelity(&self) -> f64 {
        self.matrix.diag().mean().unwrap_or(0.0)
    }
}

/// Inverse of a confusion matrix with its conditioning.
#[derive(Debug, Clone, PartialEq)]
pub struct Inversion {
    /// `None` when the matrix is singular.
    pub inverse: Option<Array2<f64>>,
    /// `‖M‖₁·‖M⁻¹‖₁`, infinite when singular.
    pub condition_number: f64,
}

impl Inversion {
    /// Whether the matrix had no usable inverse.
    pub fn is_singular(&self) -> bool {
        self.inverse.is_none()
    }
}

/// Corrected distribution and what happened on the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemResult {
    /// Non-negative distribution summing to 1.
    pub distribution: ProbabilityVector,
    /// Condition number of the confusion matrix.
    pub condition_number: f64,
    /// Probability mass removed by clipping negative entries.
    pub clipped_mass: f64,
    /// Shot total of the input, when it came from counts.
    pub shots: Option<u64>,
    /// Numerical caveats.
    pub degeneracies: Vec<Degeneracy>,
}

/// Applies a cached confusion-matrix inverse to observed distributions.
#[derive(Debug, Clone)]
pub struct ReadoutMitigator {
    matrix: ConfusionMatrix,
    inversion: Inversion,
    condition_threshold: f64,
}

impl ReadoutMitigator {
    /// Invert `matrix` once and keep the result.
    pub fn new(matrix: ConfusionMatrix) -> Self {
        let inversion = matrix.invert();
        debug!(
            "Readout mitigator for {} qubits, condition number {:.3e}",
            matrix.num_qubits(),
            inversion.condition_number
        );
        if inversion.is_singular() {
            warn!("Confusion matrix is singular; corrections will return raw distributions");
        }
        Self {
            matrix,
            inversion,
            condition_threshold: DEFAULT_CONDITION_THRESHOLD,
        }
    }

    /// Flag corrections whose condition number exceeds `threshold`.
    pub fn with_condition_threshold(mut self, threshold: f64) -> Self {
        self.condition_threshold = threshold;
        self
    }

    /// The confusion matrix.
    pub fn confusion_matrix(&self) -> &ConfusionMatrix {
        &self.matrix
    }

    /// Cached condition number.
    pub fn condition_number(&self) -> f64 {
        self.inversion.condition_number
    }

    /// Correct an observed distribution.
    pub fn correct(&self, observed: &ProbabilityVector) -> MitigationResult<RemResult> {
        let n = self.matrix.num_qubits();
        if observed.num_qubits() != n {
            return Err(MitigationError::InconsistentWidth {
                context: "observed distribution".into(),
                expected: n,
                got: observed.num_qubits(),
            });
        }
        let mass = observed.total();
        if !(mass.is_finite() && mass > 0.0) {
            return Err(IrError::InvalidProbability {
                bitstring: String::new(),
                value: mass,
            }
            .into());
        }

        let condition_number = self.inversion.condition_number;
        let mut degeneracies = Vec::new();

        let Some(inverse) = &self.inversion.inverse else {
            warn!("{}", Degeneracy::SingularMatrix);
            return Ok(RemResult {
                distribution: renormalized(observed.to_dense(), n),
                condition_number,
                clipped_mass: 0.0,
                shots: None,
                degeneracies: vec![Degeneracy::SingularMatrix],
            });
        };

        if condition_number > self.condition_threshold {
            let degeneracy = Degeneracy::IllConditioned {
                condition_number,
                threshold: self.condition_threshold,
            };
            warn!("{degeneracy}");
            degeneracies.push(degeneracy);
        }

        let raw = ndarray::Array1::from(observed.to_dense());
        let mut corrected = inverse.dot(&raw);

        let mut clipped_mass = 0.0;
        corrected.mapv_inplace(|v| {
            if v < 0.0 || !v.is_finite() {
                clipped_mass -= v.min(0.0);
                0.0
            } else {
                v
            }
        });

        let total: f64 = corrected.sum();
        if total <= 0.0 {
            // Every entry clipped; nothing meaningful survives the inverse.
            warn!("{}", Degeneracy::SingularMatrix);
            return Ok(RemResult {
                distribution: renormalized(observed.to_dense(), n),
                condition_number,
                clipped_mass,
                shots: None,
                degeneracies: vec![Degeneracy::SingularMatrix],
            });
        }

        Ok(RemResult {
            distribution: renormalized(corrected.to_vec(), n),
            condition_number,
            clipped_mass,
            shots: None,
            degeneracies,
        })
    }

    /// Correct raw counts, recording the shot total.
    pub fn correct_counts(&self, counts: &Counts) -> MitigationResult<RemResult> {
        let observed = counts.to_probabilities()?;
        let mut result = self.correct(&observed)?;
        result.shots = Some(counts.total_shots());
        Ok(result)
    }

    /// Probability of reading basis state `state` correctly.
    pub fn readout_fidelity(&self, state: usize) -> f64 {
        self.matrix.readout_fidelity(state)
    }

    /// Mean readout fidelity over all basis states.
    pub fn average_fidelity(&self) -> f64 {
        self.matrix.average_fidelity()
    }
}

/// Divide by the total; the input must have a positive sum.
fn renormalized(mut dense: Vec<f64>, num_qubits: u32) -> ProbabilityVector {
    let total: f64 = dense.iter().sum();
    if total > 0.0 {
        for v in &mut dense {
            *v /= total;
        }
    }
    ProbabilityVector::from_dense(&dense, num_qubits, 0.0)
}
