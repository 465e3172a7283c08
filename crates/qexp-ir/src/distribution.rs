//! Measurement counts and probability distributions over bitstrings.
//!
//! Both types are keyed by bitstrings following [`crate::bits`] and carry
//! their register width, so dense and sparse forms convert without guessing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::bits::{
    MAX_WIDTH, bitstring_to_index, bitstring_width, index_to_bitstring, marginal_bitstring,
    parity_sign,
};
use crate::error::{IrError, IrResult};

/// Raw shot counts, bitstring → count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, u64>", into = "BTreeMap<String, u64>")]
pub struct Counts {
    num_qubits: u32,
    counts: BTreeMap<String, u64>,
}

impl Counts {
    /// Empty counts for a register of `num_qubits`.
    pub fn new(num_qubits: u32) -> Self {
        Self {
            num_qubits,
            counts: BTreeMap::new(),
        }
    }

    /// Build from a bitstring map; every key must have the same width.
    pub fn from_map(map: BTreeMap<String, u64>) -> IrResult<Self> {
        let num_qubits = common_width(map.keys())?;
        Ok(Self {
            num_qubits,
            counts: map,
        })
    }

    /// Add `count` shots to `bitstring`.
    pub fn insert(&mut self, bitstring: &str, count: u64) -> IrResult<()> {
        bitstring_to_index(bitstring, self.num_qubits)?;
        *self.counts.entry(bitstring.to_string()).or_insert(0) += count;
        Ok(())
    }

    /// Add `count` shots to the outcome with basis index `index`.
    pub fn insert_index(&mut self, index: usize, count: u64) {
        let key = index_to_bitstring(index, self.num_qubits);
        *self.counts.entry(key).or_insert(0) += count;
    }

    /// Shots recorded for `bitstring` (0 if never seen).
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Total number of shots.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Register width.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Number of distinct outcomes seen.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// No outcomes recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate over (bitstring, count) in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Outcomes sorted by descending count.
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// Counts restricted to `qubits`, in the order listed.
    pub fn marginal(&self, qubits: &[u32]) -> IrResult<Counts> {
        let mut out = Counts::new(marginal_width(qubits)?);
        for (bitstring, count) in self.iter() {
            let key = marginal_bitstring(bitstring, qubits)?;
            *out.counts.entry(key).or_insert(0) += count;
        }
        Ok(out)
    }

    /// Normalise into a probability distribution.
    pub fn to_probabilities(&self) -> IrResult<ProbabilityVector> {
        ProbabilityVector::from_counts(self)
    }
}

impl TryFrom<BTreeMap<String, u64>> for Counts {
    type Error = IrError;

    fn try_from(map: BTreeMap<String, u64>) -> IrResult<Self> {
        Counts::from_map(map)
    }
}

impl From<Counts> for BTreeMap<String, u64> {
    fn from(counts: Counts) -> Self {
        counts.counts
    }
}

/// A probability distribution over bitstrings.
///
/// Entries are non-negative and sum to 1. Outcomes absent from the map have
/// probability 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct ProbabilityVector {
    num_qubits: u32,
    probs: BTreeMap<String, f64>,
}

impl ProbabilityVector {
    /// Build from a dense vector of length 2^n indexed by basis state.
    ///
    /// Entries below `cutoff` (and exact zeros) are omitted. The values are
    /// taken as given; callers are responsible for normalisation.
    pub fn from_dense(values: &[f64], num_qubits: u32, cutoff: f64) -> Self {
        debug_assert_eq!(values.len(), 1usize << num_qubits);
        let probs = values
            .iter()
            .enumerate()
            .filter(|&(_, &p)| p > 0.0 && p >= cutoff)
            .map(|(i, &p)| (index_to_bitstring(i, num_qubits), p))
            .collect();
        Self { num_qubits, probs }
    }

    /// Normalise raw counts.
    pub fn from_counts(counts: &Counts) -> IrResult<Self> {
        let total = counts.total_shots();
        if total == 0 {
            return Err(IrError::EmptyCounts);
        }
        let probs = counts
            .iter()
            .filter(|&(_, c)| c > 0)
            .map(|(k, c)| (k.to_string(), c as f64 / total as f64))
            .collect();
        Ok(Self {
            num_qubits: counts.num_qubits(),
            probs,
        })
    }

    /// Build from a bitstring map, validating entries and normalising the total to 1.
    pub fn from_map(map: BTreeMap<String, f64>) -> IrResult<Self> {
        let num_qubits = common_width(map.keys())?;
        for (bitstring, &value) in &map {
            if !value.is_finite() || value < 0.0 {
                return Err(IrError::InvalidProbability {
                    bitstring: bitstring.clone(),
                    value,
                });
            }
        }
        let total: f64 = map.values().sum();
        if total <= 0.0 {
            return Err(IrError::InvalidProbability {
                bitstring: String::new(),
                value: total,
            });
        }
        let probs = map
            .into_iter()
            .filter(|&(_, p)| p > 0.0)
            .map(|(k, p)| (k, p / total))
            .collect();
        Ok(Self { num_qubits, probs })
    }

    /// Dense vector of length 2^n indexed by basis state.
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; 1usize << self.num_qubits];
        for (bitstring, &p) in &self.probs {
            // Keys are validated on construction.
            if let Ok(i) = bitstring_to_index(bitstring, self.num_qubits) {
                dense[i] = p;
            }
        }
        dense
    }

    /// Probability of `bitstring` (0 if absent).
    pub fn get(&self, bitstring: &str) -> f64 {
        self.probs.get(bitstring).copied().unwrap_or(0.0)
    }

    /// Register width.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Number of outcomes with non-zero probability.
    pub fn len(&self) -> usize {
        self.probs.len()
    }

    /// No outcome stored.
    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    /// Sum of all stored probabilities.
    pub fn total(&self) -> f64 {
        self.probs.values().sum()
    }

    /// Iterate over (bitstring, probability) in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.probs.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// The most probable outcome.
    pub fn most_likely(&self) -> Option<(&str, f64)> {
        self.iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// ⟨Z_{q1} ⋯ Z_{qm}⟩: expectation of the parity of the listed qubits.
    pub fn parity_expectation(&self, qubits: &[u32]) -> IrResult<f64> {
        if let Some(&q) = qubits.iter().find(|&&q| q >= self.num_qubits) {
            return Err(IrError::QubitOutOfRange {
                qubit: q.into(),
                num_qubits: self.num_qubits,
                gate_name: None,
            });
        }
        let mut acc = 0.0;
        for (bitstring, p) in self.iter() {
            let index = bitstring_to_index(bitstring, self.num_qubits)?;
            acc += p * parity_sign(index, self.num_qubits, qubits);
        }
        Ok(acc)
    }

    /// Distribution restricted to `qubits`, in the order listed.
    pub fn marginal(&self, qubits: &[u32]) -> IrResult<ProbabilityVector> {
        let num_qubits = marginal_width(qubits)?;
        let mut probs = BTreeMap::new();
        for (bitstring, p) in self.iter() {
            *probs.entry(marginal_bitstring(bitstring, qubits)?).or_insert(0.0) += p;
        }
        Ok(Self { num_qubits, probs })
    }

    /// Total variation distance ½ Σ |p_i − q_i|.
    pub fn total_variation_distance(&self, other: &ProbabilityVector) -> f64 {
        let keys: std::collections::BTreeSet<&str> = self
            .probs
            .keys()
            .chain(other.probs.keys())
            .map(String::as_str)
            .collect();
        0.5 * keys
            .into_iter()
            .map(|k| (self.get(k) - other.get(k)).abs())
            .sum::<f64>()
    }
}

impl TryFrom<BTreeMap<String, f64>> for ProbabilityVector {
    type Error = IrError;

    fn try_from(map: BTreeMap<String, f64>) -> IrResult<Self> {
        ProbabilityVector::from_map(map)
    }
}

impl From<ProbabilityVector> for BTreeMap<String, f64> {
    fn from(dist: ProbabilityVector) -> Self {
        dist.probs
    }
}

fn marginal_width(qubits: &[u32]) -> IrResult<u32> {
    match u32::try_from(qubits.len()) {
        Ok(width) if width <= MAX_WIDTH => Ok(width),
        _ => Err(IrError::TooManyQubits {
            requested: u32::try_from(qubits.len()).unwrap_or(u32::MAX),
            max: MAX_WIDTH,
        }),
    }
}

fn common_width<'a>(mut keys: impl Iterator<Item = &'a String>) -> IrResult<u32> {
    let first = keys.next().ok_or(IrError::EmptyCounts)?;
    let width = bitstring_width(first)?;
    for key in keys {
        if bitstring_width(key)? != width {
            return Err(IrError::InvalidBitstring {
                bitstring: key.clone(),
                num_qubits: width,
            });
        }
    }
    Ok(width)
}
