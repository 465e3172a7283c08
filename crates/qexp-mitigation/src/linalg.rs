//! Small dense linear algebra on `ndarray` matrices.
//!
//! Confusion matrices are at most 2^k×2^k for small k and extrapolation fits
//! have a handful of points, so plain Gauss-Jordan is adequate.

use ndarray::{Array1, Array2, s};

/// Pivots smaller than this (relative to the matrix 1-norm) count as zero.
pub const PIVOT_TOL: f64 = 1e-12;

/// Gauss-Jordan inverse with partial pivoting.
///
/// Returns `None` for non-square or numerically singular matrices.
pub fn invert(matrix: &Array2<f64>) -> Option<Array2<f64>> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return None;
    }
    let scale = norm_1(matrix);
    if scale == 0.0 || !scale.is_finite() {
        return None;
    }

    let mut a = matrix.clone();
    let mut inv = Array2::<f64>::eye(n);

    for col in 0..n {
        let pivot_row = (col..n).max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))?;
        if a[[pivot_row, col]].abs() <= PIVOT_TOL * scale {
            return None;
        }
        if pivot_row != col {
            for k in 0..n {
                a.swap([col, k], [pivot_row, k]);
                inv.swap([col, k], [pivot_row, k]);
            }
        }

        let pivot = a[[col, col]];
        a.row_mut(col).mapv_inplace(|v| v / pivot);
        inv.row_mut(col).mapv_inplace(|v| v / pivot);

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[[row, col]];
            if factor == 0.0 {
                continue;
            }
            for k in 0..n {
                let da = factor * a[[col, k]];
                let di = factor * inv[[col, k]];
                a[[row, k]] -= da;
                inv[[row, k]] -= di;
            }
        }
    }

    Some(inv)
}

/// Maximum absolute column sum.
pub fn norm_1(matrix: &Array2<f64>) -> f64 {
    matrix
        .columns()
        .into_iter()
        .map(|col| col.iter().map(|v| v.abs()).sum::<f64>())
        .fold(0.0, f64::max)
}

/// `‖M‖₁ · ‖M⁻¹‖₁`, or infinity when there is no inverse.
pub fn condition_number_1(matrix: &Array2<f64>, inverse: Option<&Array2<f64>>) -> f64 {
    match inverse {
        Some(inv) => norm_1(matrix) * norm_1(inv),
        None => f64::INFINITY,
    }
}

/// Kronecker product `a ⊗ b`; `a` indexes the most significant block.
pub fn kron(a: &Array2<f64>, b: &Array2<f64>) -> Array2<f64> {
    let (ar, ac) = a.dim();
    let (br, bc) = b.dim();
    let mut out = Array2::<f64>::zeros((ar * br, ac * bc));
    for i in 0..ar {
        for j in 0..ac {
            out.slice_mut(s![i * br..(i + 1) * br, j * bc..(j + 1) * bc])
                .assign(&(b * a[[i, j]]));
        }
    }
    out
}

/// Least-squares polynomial fit of `degree`; coefficients lowest order first.
///
/// Solves the normal equations. Returns `None` when the system is singular
/// (fewer distinct abscissae than coefficients).
pub fn polyfit(xs: &[f64], ys: &[f64], degree: usize) -> Option<Vec<f64>> {
    if xs.len() != ys.len() || xs.len() <= degree {
        return None;
    }
    let vandermonde = Array2::from_shape_fn((xs.len(), degree + 1), |(i, j)| xs[i].powi(j as i32));
    let y = Array1::from(ys.to_vec());

    let normal = vandermonde.t().dot(&vandermonde);
    let rhs = vandermonde.t().dot(&y);
    let coeffs = invert(&normal)?.dot(&rhs);
    Some(coeffs.to_vec())
}

/// Evaluate a polynomial with coefficients lowest order first.
pub fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Coefficient of determination of a polynomial fit.
///
/// Data with no spread is fitted perfectly by definition.
pub fn r_squared(xs: &[f64], ys: &[f64], coeffs: &[f64]) -> f64 {
    let mean = ys.iter().sum::<f64>() / ys.len() as f64;
    let ss_tot: f64 = ys.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| (y - polyval(coeffs, x)).powi(2))
        .sum();
    if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 }
}

/// Interpolating polynomial through all points, evaluated at 0.
///
/// Abscissae must be distinct.
pub fn lagrange_at_zero(xs: &[f64], ys: &[f64]) -> f64 {
    xs.iter()
        .zip(ys)
        .enumerate()
        .map(|(i, (&xi, &yi))| {
            let weight: f64 = xs
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, &xj)| xj / (xj - xi))
                .product();
            yi * weight
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn close(a: &Array2<f64>, b: &Array2<f64>, tol: f64) -> bool {
        a.dim() == b.dim() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < tol)
    }

    #[test]
    fn test_invert_2x2() {
        let m = array![[0.9, 0.1], [0.1, 0.9]];
        let inv = invert(&m).unwrap();
        let expected = array![[1.125, -0.125], [-0.125, 1.125]];
        assert!(close(&inv, &expected, 1e-12));
        assert!(close(&m.dot(&inv), &Array2::eye(2), 1e-12));
    }

    #[test]
    fn test_invert_needs_pivoting() {
        let m = array![[0.0, 1.0], [1.0, 0.0]];
        let inv = invert(&m).unwrap();
        assert!(close(&inv, &m, 1e-15));
    }

    #[test]
    fn test_invert_singular() {
        let m = array![[0.5, 0.5], [0.5, 0.5]];
        assert!(invert(&m).is_none());
        assert_eq!(condition_number_1(&m, None), f64::INFINITY);
    }

    #[test]
    fn test_condition_number_identity() {
        let m = Array2::<f64>::eye(4);
        let inv = invert(&m).unwrap();
        assert!((condition_number_1(&m, Some(&inv)) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_kron_ordering() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = Array2::<f64>::eye(2);
        let k = kron(&a, &b);
        assert_eq!(k.dim(), (4, 4));
        assert_eq!(k[[0, 2]], 2.0);
        assert_eq!(k[[1, 3]], 2.0);
        assert_eq!(k[[0, 1]], 0.0);
        assert_eq!(k[[2, 0]], 3.0);
    }

    #[test]
    fn test_polyfit_line() {
        let xs = [1.0, 2.0, 3.0];
        let ys = [1.0, 0.9, 0.8];
        let c = polyfit(&xs, &ys, 1).unwrap();
        assert!((c[0] - 1.1).abs() < 1e-12);
        assert!((c[1] + 0.1).abs() < 1e-12);
        assert!((r_squared(&xs, &ys, &c) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_polyfit_underdetermined() {
        assert!(polyfit(&[1.0, 1.0, 1.0], &[0.1, 0.2, 0.3], 1).is_none());
        assert!(polyfit(&[1.0, 3.0], &[0.1, 0.2], 2).is_none());
    }

    #[test]
    fn test_lagrange_quadratic() {
        // y = 2 - x + 0.5x²
        let xs = [1.0, 3.0, 5.0];
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 - x + 0.5 * x * x).collect();
        assert!((lagrange_at_zero(&xs, &ys) - 2.0).abs() < 1e-12);
    }
}
