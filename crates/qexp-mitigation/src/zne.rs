//! Zero-noise extrapolation (ZNE).
//!
//! The same circuit is run at several odd fold factors (1, 3, 5, ...), each
//! multiplying the effective two-qubit noise. The measured expectation values
//! are then extrapolated back to fold 0.
//!
//! Closed forms are used where they exist:
//!
//! | Method | Points | Estimate at 0 |
//! |--------|--------|---------------|
//! | linear | (1, 3) | (3·E₁ − E₃) / 2 |
//! | linear | two folds f₁, f₂ | (f₂·E₁ − f₁·E₂) / (f₂ − f₁) |
//! | quadratic | (1, 3, 5) | (15·E₁ − 10·E₃ + 3·E₅) / 8 |
//! | richardson | any | interpolating polynomial at 0 |
//!
//! Linear and quadratic fall back to least squares when given more points
//! than parameters. Every entry point returns a [`ZneResult`]; a single
//! sample passes through unchanged with `mitigation_applied = false`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Degeneracy, MitigationError, MitigationResult};
use crate::linalg;

/// One expectation value measured at one fold factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseLevelSample {
    /// Odd fold factor, 1 for the unfolded circuit.
    pub fold: u32,
    /// Measured expectation value.
    pub value: f64,
}

impl NoiseLevelSample {
    /// Pair a fold factor with its value.
    pub fn new(fold: u32, value: f64) -> Self {
        Self { fold, value }
    }
}

impl From<(u32, f64)> for NoiseLevelSample {
    fn from((fold, value): (u32, f64)) -> Self {
        Self { fold, value }
    }
}

/// Extrapolation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZneMethod {
    /// Straight line through the points.
    #[default]
    Linear,
    /// Second-order polynomial.
    Quadratic,
    /// Full-order interpolating polynomial.
    Richardson,
}

impl ZneMethod {
    /// Points needed for a genuine extrapolation.
    pub fn min_points(self) -> usize {
        match self {
            ZneMethod::Linear | ZneMethod::Richardson => 2,
            ZneMethod::Quadratic => 3,
        }
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            ZneMethod::Linear => "linear",
            ZneMethod::Quadratic => "quadratic",
            ZneMethod::Richardson => "richardson",
        }
    }
}

impl fmt::Display for ZneMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZneMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(ZneMethod::Linear),
            "quadratic" => Ok(ZneMethod::Quadratic),
            "richardson" => Ok(ZneMethod::Richardson),
            other => Err(format!(
                "unknown ZNE method '{other}' (expected linear, quadratic or richardson)"
            )),
        }
    }
}

/// Outcome of an extrapolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZneResult {
    /// Zero-noise estimate.
    pub value: f64,
    /// Value at the lowest fold factor, before extrapolation.
    pub raw_value: f64,
    /// Model actually applied.
    pub method: ZneMethod,
    /// Fold factors that entered the estimate, ascending.
    pub folds_used: Vec<u32>,
    /// False when the input was passed through unchanged.
    pub mitigation_applied: bool,
    /// R² of a least-squares fit; `None` for exact interpolation.
    pub fit_quality: Option<f64>,
    /// Numerical caveat, if any.
    pub degeneracy: Option<Degeneracy>,
}

/// Check that fold factors are positive, odd and distinct.
pub fn validate_folds(folds: &[u32]) -> MitigationResult<()> {
    let mut seen = BTreeSet::new();
    for &fold in folds {
        if fold == 0 || fold % 2 == 0 {
            return Err(MitigationError::InvalidFoldFactor(fold));
        }
        if !seen.insert(fold) {
            return Err(MitigationError::DuplicateFoldFactor(fold));
        }
    }
    Ok(())
}

fn split(points: &[(u32, f64)]) -> (Vec<f64>, Vec<f64>) {
    points.iter().map(|&(f, v)| (f64::from(f), v)).unzip()
}

/// All values bitwise equal: the extrapolation of a constant is that constant.
fn constant_value(points: &[(u32, f64)]) -> Option<f64> {
    let (_, first) = *points.first()?;
    points
        .iter()
        .all(|&(_, v)| v.to_bits() == first.to_bits())
        .then_some(first)
}

/// Least-squares fit of `degree`, returning the intercept and R².
fn least_squares(points: &[(u32, f64)], degree: usize) -> MitigationResult<(f64, f64)> {
    let (xs, ys) = split(points);
    let coeffs = linalg::polyfit(&xs, &ys, degree).ok_or(MitigationError::NotEnoughPoints {
        method: "least-squares",
        needed: degree + 1,
        got: points.len(),
    })?;
    Ok((coeffs[0], linalg::r_squared(&xs, &ys, &coeffs)))
}

// The estimators below take at least their parameter count of points,
// sorted by fold and validated.

fn linear_estimate(points: &[(u32, f64)]) -> MitigationResult<f64> {
    match points {
        &[(1, e1), (3, e3)] => Ok((3.0 * e1 - e3) / 2.0),
        &[(f1, e1), (f2, e2)] => {
            let (f1, f2) = (f64::from(f1), f64::from(f2));
            Ok((f2 * e1 - f1 * e2) / (f2 - f1))
        }
        _ => least_squares(points, 1).map(|(intercept, _)| intercept),
    }
}

fn quadratic_estimate(points: &[(u32, f64)]) -> MitigationResult<f64> {
    match points {
        &[(1, e1), (3, e3), (5, e5)] => Ok((15.0 * e1 - 10.0 * e3 + 3.0 * e5) / 8.0),
        &[_, _, _] => {
            let (xs, ys) = split(points);
            Ok(linalg::lagrange_at_zero(&xs, &ys))
        }
        _ => least_squares(points, 2).map(|(intercept, _)| intercept),
    }
}

fn richardson_estimate(points: &[(u32, f64)]) -> f64 {
    let (xs, ys) = split(points);
    linalg::lagrange_at_zero(&xs, &ys)
}

fn to_samples(points: &[(u32, f64)]) -> Vec<NoiseLevelSample> {
    points.iter().copied().map(NoiseLevelSample::from).collect()
}

/// Linear extrapolation to fold 0.
///
/// Two points use the closed form; more points fit a least-squares line.
pub fn linear_extrapolate(points: &[(u32, f64)]) -> MitigationResult<ZneResult> {
    extrapolate(&to_samples(points), ZneMethod::Linear)
}

/// Quadratic extrapolation to fold 0.
///
/// Three points are interpolated exactly; more points fit a least-squares
/// parabola. Two points degrade to linear.
pub fn quadratic_extrapolate(points: &[(u32, f64)]) -> MitigationResult<ZneResult> {
    extrapolate(&to_samples(points), ZneMethod::Quadratic)
}

/// Richardson extrapolation: the degree `n − 1` polynomial through all `n`
/// points, evaluated at 0.
pub fn richardson(fold_factors: &[u32], values: &[f64]) -> MitigationResult<ZneResult> {
    if fold_factors.len() != values.len() {
        return Err(MitigationError::LengthMismatch {
            folds: fold_factors.len(),
            values: values.len(),
        });
    }
    let samples: Vec<NoiseLevelSample> = fold_factors
        .iter()
        .zip(values)
        .map(|(&fold, &value)| NoiseLevelSample::new(fold, value))
        .collect();
    extrapolate(&samples, ZneMethod::Richardson)
}

/// Extrapolate `samples` to zero noise with `method`.
///
/// Samples may come in any order. With a single sample the value passes
/// through unchanged and the result is flagged; a quadratic request with
/// only two samples degrades to linear and is flagged the same way.
pub fn extrapolate(
    samples: &[NoiseLevelSample],
    method: ZneMethod,
) -> MitigationResult<ZneResult> {
    if samples.is_empty() {
        return Err(MitigationError::NoSamples);
    }
    let mut points: Vec<(u32, f64)> = samples.iter().map(|s| (s.fold, s.value)).collect();
    points.sort_by_key(|&(fold, _)| fold);
    let folds: Vec<u32> = points.iter().map(|&(f, _)| f).collect();
    validate_folds(&folds)?;

    let raw_value = points[0].1;

    if points.len() < 2 {
        let degeneracy = Degeneracy::InsufficientSamples {
            needed: method.min_points(),
            available: points.len(),
        };
        warn!("ZNE skipped: {degeneracy}");
        return Ok(ZneResult {
            value: raw_value,
            raw_value,
            method,
            folds_used: folds,
            mitigation_applied: false,
            fit_quality: None,
            degeneracy: Some(degeneracy),
        });
    }

    let (applied, degeneracy) = if method == ZneMethod::Quadratic && points.len() < 3 {
        let degeneracy = Degeneracy::InsufficientSamples {
            needed: 3,
            available: points.len(),
        };
        warn!("Quadratic ZNE degraded to linear: {degeneracy}");
        (ZneMethod::Linear, Some(degeneracy))
    } else {
        (method, None)
    };

    let value = match (constant_value(&points), applied) {
        (Some(v), _) => v,
        (None, ZneMethod::Linear) => linear_estimate(&points)?,
        (None, ZneMethod::Quadratic) => quadratic_estimate(&points)?,
        (None, ZneMethod::Richardson) => richardson_estimate(&points),
    };

    let parameters = match applied {
        ZneMethod::Linear => 2,
        ZneMethod::Quadratic => 3,
        ZneMethod::Richardson => points.len(),
    };
    let fit_quality = if points.len() > parameters && constant_value(&points).is_none() {
        Some(least_squares(&points, parameters - 1)?.1)
    } else {
        None
    };

    debug!(
        "ZNE {applied} over folds {:?}: raw {raw_value:.6} -> {value:.6}",
        folds
    );

    Ok(ZneResult {
        value,
        raw_value,
        method: applied,
        folds_used: folds,
        mitigation_applied: true,
        fit_quality,
        degeneracy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(pairs: &[(u32, f64)]) -> Vec<NoiseLevelSample> {
        pairs.iter().copied().map(NoiseLevelSample::from).collect()
    }

    #[test]
    fn test_linear_closed_form() {
        assert!((linear_extrapolate(&[(1, 0.8), (3, 0.6)]).unwrap().value - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_linear_general_two_point() {
        // E(f) = 1 - 0.05 f
        let v = linear_extrapolate(&[(3, 0.85), (7, 0.65)]).unwrap().value;
        assert!((v - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_least_squares() {
        let v = linear_extrapolate(&[(1, 0.95), (3, 0.85), (5, 0.75)]).unwrap().value;
        assert!((v - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_quadratic_closed_form() {
        // E(f) = 1 - 0.1 f + 0.01 f²
        let e = |f: f64| 1.0 - 0.1 * f + 0.01 * f * f;
        let v = quadratic_extrapolate(&[(1, e(1.0)), (3, e(3.0)), (5, e(5.0))])
            .unwrap()
            .value;
        assert!((v - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_quadratic_lagrange_other_folds() {
        let e = |f: f64| 0.5 + 0.02 * f - 0.003 * f * f;
        let v = quadratic_extrapolate(&[(1, e(1.0)), (5, e(5.0)), (9, e(9.0))])
            .unwrap()
            .value;
        assert!((v - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_quadratic_with_two_points_is_linear() {
        let result = quadratic_extrapolate(&[(1, 0.8), (3, 0.6)]).unwrap();
        assert_eq!(result.method, ZneMethod::Linear);
        assert!((result.value - 0.9).abs() < 1e-12);
        assert!(matches!(
            result.degeneracy,
            Some(Degeneracy::InsufficientSamples { needed: 3, available: 2 })
        ));
    }

    #[test]
    fn test_named_methods_pass_single_sample_through() {
        let results = [
            linear_extrapolate(&[(1, 0.7)]).unwrap(),
            quadratic_extrapolate(&[(1, 0.7)]).unwrap(),
            richardson(&[1], &[0.7]).unwrap(),
        ];
        for result in results {
            assert_eq!(result.value, 0.7);
            assert_eq!(result.raw_value, 0.7);
            assert!(!result.mitigation_applied);
            assert!(matches!(
                result.degeneracy,
                Some(Degeneracy::InsufficientSamples { available: 1, .. })
            ));
        }
        assert_eq!(
            linear_extrapolate(&[]).unwrap_err(),
            MitigationError::NoSamples
        );
        assert_eq!(richardson(&[], &[]).unwrap_err(), MitigationError::NoSamples);
    }

    #[test]
    fn test_richardson_cubic() {
        let e = |f: f64| 0.7 - 0.1 * f + 0.01 * f * f - 0.001 * f * f * f;
        let folds = [1, 3, 5, 7];
        let values: Vec<f64> = folds.iter().map(|&f| e(f64::from(f))).collect();
        let result = richardson(&folds, &values).unwrap();
        assert!((result.value - 0.7).abs() < 1e-10);
        assert_eq!(result.method, ZneMethod::Richardson);
    }

    #[test]
    fn test_richardson_length_mismatch() {
        assert!(matches!(
            richardson(&[1, 3], &[0.5]),
            Err(MitigationError::LengthMismatch { folds: 2, values: 1 })
        ));
    }

    #[test]
    fn test_constant_input_is_idempotent() {
        let c = 0.123_456_789_f64;
        for method in [ZneMethod::Linear, ZneMethod::Quadratic, ZneMethod::Richardson] {
            let result = extrapolate(&samples(&[(1, c), (3, c), (5, c)]), method).unwrap();
            assert_eq!(result.value.to_bits(), c.to_bits(), "{method}");
        }
    }

    #[test]
    fn test_invalid_folds() {
        assert!(matches!(
            extrapolate(&samples(&[(1, 0.9), (2, 0.8)]), ZneMethod::Linear),
            Err(MitigationError::InvalidFoldFactor(2))
        ));
        assert!(matches!(
            extrapolate(&samples(&[(0, 0.9), (3, 0.8)]), ZneMethod::Linear),
            Err(MitigationError::InvalidFoldFactor(0))
        ));
        assert!(matches!(
            extrapolate(&samples(&[(3, 0.9), (3, 0.8)]), ZneMethod::Linear),
            Err(MitigationError::DuplicateFoldFactor(3))
        ));
    }

    #[test]
    fn test_no_samples_is_error() {
        assert_eq!(
            extrapolate(&[], ZneMethod::Linear).unwrap_err(),
            MitigationError::NoSamples
        );
    }

    #[test]
    fn test_single_sample_passes_through() {
        let result = extrapolate(&samples(&[(1, 0.42)]), ZneMethod::Richardson).unwrap();
        assert_eq!(result.value, 0.42);
        assert!(!result.mitigation_applied);
        assert!(matches!(
            result.degeneracy,
            Some(Degeneracy::InsufficientSamples { available: 1, .. })
        ));
    }

    #[test]
    fn test_quadratic_degrades_to_linear() {
        let result = extrapolate(&samples(&[(3, 0.6), (1, 0.8)]), ZneMethod::Quadratic).unwrap();
        assert_eq!(result.method, ZneMethod::Linear);
        assert_eq!(result.folds_used, vec![1, 3]);
        assert!((result.value - 0.9).abs() < 1e-12);
        assert!(result.degeneracy.is_some());
    }

    #[test]
    fn test_fit_quality_reported_for_overdetermined_fit() {
        let result = extrapolate(
            &samples(&[(1, 0.95), (3, 0.86), (5, 0.75), (7, 0.66)]),
            ZneMethod::Linear,
        )
        .unwrap();
        let r2 = result.fit_quality.unwrap();
        assert!(r2 > 0.99 && r2 <= 1.0);
        assert_eq!(result.raw_value, 0.95);
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("Richardson".parse::<ZneMethod>().unwrap(), ZneMethod::Richardson);
        assert!("cubic".parse::<ZneMethod>().is_err());
    }
}
