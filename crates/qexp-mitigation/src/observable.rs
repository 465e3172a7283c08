//! Diagonal observables: weighted sums of Z-parity products.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use qexp_ir::ProbabilityVector;

use crate::error::{MitigationError, MitigationResult};

/// `coefficient · Z_{q1} ⋯ Z_{qm}`; an empty qubit list is the identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZTerm {
    /// Real weight of the term.
    pub coefficient: f64,
    /// Qubits whose Z operators are multiplied; may be empty.
    pub qubits: Vec<u32>,
}

/// Sum of [`ZTerm`]s, diagonal in the computational basis.
///
/// Parses from strings such as `"Z0Z1"`, `"0.5*Z0 + -0.25*Z1Z2 + 1.0*I"`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ZObservable {
    terms: Vec<ZTerm>,
}

impl ZObservable {
    /// Observable with no terms (identically zero).
    pub fn new() -> Self {
        Self::default()
    }

    /// The parity `Z_{q1} ⋯ Z_{qm}` with unit weight.
    pub fn parity(qubits: impl IntoIterator<Item = u32>) -> Self {
        Self::new().with_term(1.0, qubits)
    }

    /// Add a weighted term.
    pub fn with_term(mut self, coefficient: f64, qubits: impl IntoIterator<Item = u32>) -> Self {
        self.terms.push(ZTerm {
            coefficient,
            qubits: qubits.into_iter().collect(),
        });
        self
    }

    /// The terms.
    pub fn terms(&self) -> &[ZTerm] {
        &self.terms
    }

    /// Highest qubit index referenced.
    pub fn max_qubit(&self) -> Option<u32> {
        self.terms.iter().flat_map(|t| t.qubits.iter().copied()).max()
    }

    /// Expectation value under `dist`.
    pub fn expectation(&self, dist: &ProbabilityVector) -> MitigationResult<f64> {
        self.terms.iter().try_fold(0.0, |acc, term| -> MitigationResult<f64> {
            Ok(acc + term.coefficient * dist.parity_expectation(&term.qubits)?)
        })
    }
}

fn parse_term(raw: &str) -> Option<ZTerm> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let (coefficient, body) = match compact.split_once('*') {
        Some((c, body)) => (c.parse::<f64>().ok()?, body.to_string()),
        None => match compact.strip_prefix('-') {
            Some(body) => (-1.0, body.to_string()),
            None => (1.0, compact),
        },
    };

    if body.eq_ignore_ascii_case("i") {
        return Some(ZTerm {
            coefficient,
            qubits: Vec::new(),
        });
    }

    let mut pieces = body.split(['Z', 'z']);
    if pieces.next() != Some("") {
        return None;
    }
    let qubits = pieces
        .map(|p| p.parse::<u32>().ok())
        .collect::<Option<Vec<u32>>>()?;
    (!qubits.is_empty()).then_some(ZTerm {
        coefficient,
        qubits,
    })
}

impl FromStr for ZObservable {
    type Err = MitigationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let terms = s
            .split('+')
            .map(parse_term)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| MitigationError::InvalidObservable(s.to_string()))?;
        Ok(Self { terms })
    }
}

impl fmt::Display for ZObservable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{}*", term.coefficient)?;
            if term.qubits.is_empty() {
                f.write_str("I")?;
            }
            for q in &term.qubits {
                write!(f, "Z{q}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn dist(pairs: &[(&str, f64)]) -> ProbabilityVector {
        let map: BTreeMap<String, f64> = pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        ProbabilityVector::from_map(map).unwrap()
    }

    #[test]
    fn test_bell_parities() {
        let bell = dist(&[("00", 0.5), ("11", 0.5)]);
        assert!((ZObservable::parity([0, 1]).expectation(&bell).unwrap() - 1.0).abs() < 1e-12);
        assert!(ZObservable::parity([0]).expectation(&bell).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_weighted_sum() {
        let d = dist(&[("01", 1.0)]);
        // Z0 = +1, Z1 = -1
        let obs = ZObservable::new()
            .with_term(0.5, [0])
            .with_term(2.0, [1])
            .with_term(0.25, []);
        assert!((obs.expectation(&d).unwrap() - (0.5 - 2.0 + 0.25)).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_qubit() {
        let d = dist(&[("0", 1.0)]);
        assert!(ZObservable::parity([3]).expectation(&d).is_err());
    }

    #[test]
    fn test_parse() {
        let obs: ZObservable = "0.5*Z0 + -0.25 * Z1Z2 + I".parse().unwrap();
        assert_eq!(obs.terms().len(), 3);
        assert_eq!(obs.terms()[1].coefficient, -0.25);
        assert_eq!(obs.terms()[1].qubits, vec![1, 2]);
        assert!(obs.terms()[2].qubits.is_empty());
        assert_eq!(obs.max_qubit(), Some(2));

        let neg: ZObservable = "-Z3".parse().unwrap();
        assert_eq!(neg.terms()[0].coefficient, -1.0);

        assert!("X0".parse::<ZObservable>().is_err());
        assert!("Z".parse::<ZObservable>().is_err());
        assert!("".parse::<ZObservable>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        let obs = ZObservable::new().with_term(0.5, [0, 1]).with_term(1.0, []);
        let again: ZObservable = obs.to_string().parse().unwrap();
        assert_eq!(again, obs);
    }
}
