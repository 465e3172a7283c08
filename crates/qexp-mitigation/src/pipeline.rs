//! End-to-end estimation: readout correction per fold, then extrapolation.

use serde::{Deserialize, Serialize};
use tracing::info;

use qexp_ir::Counts;

use crate::config::MitigationConfig;
use crate::error::{Degeneracy, MitigationError, MitigationResult};
use crate::observable::ZObservable;
use crate::readout::{CalibrationData, ConfusionMatrix, ReadoutMitigator};
use crate::zne::{NoiseLevelSample, ZneResult, extrapolate, validate_folds};

/// Expectation values at one fold factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldEstimate {
    /// Fold factor.
    pub fold: u32,
    /// Shots behind this fold.
    pub shots: u64,
    /// Expectation of the raw counts.
    pub raw_value: f64,
    /// Expectation after readout correction (equal to `raw_value` when
    /// readout correction is off).
    pub corrected_value: f64,
}

/// Final estimate together with everything needed to judge it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigatedEstimate {
    /// Mitigated expectation value.
    pub value: f64,
    /// Unmitigated expectation at the lowest fold factor.
    pub raw_value: f64,
    /// Per-fold breakdown, ascending by fold.
    pub per_fold: Vec<FoldEstimate>,
    /// Whether readout correction ran.
    pub readout_applied: bool,
    /// Largest confusion-matrix condition number seen.
    pub worst_condition_number: Option<f64>,
    /// Extrapolation details, when ZNE ran.
    pub zne: Option<ZneResult>,
    /// Every numerical caveat raised along the way.
    pub degeneracies: Vec<Degeneracy>,
}

impl MitigatedEstimate {
    /// Fold factors that contributed, ascending.
    pub fn folds_used(&self) -> Vec<u32> {
        self.per_fold.iter().map(|f| f.fold).collect()
    }

    /// Shots summed over all folds.
    pub fn total_shots(&self) -> u64 {
        self.per_fold.iter().map(|f| f.shots).sum()
    }
}

/// Readout correction and ZNE wired together per [`MitigationConfig`].
#[derive(Debug, Clone)]
pub struct MitigationPipeline {
    config: MitigationConfig,
    readout: Option<ReadoutMitigator>,
}

impl MitigationPipeline {
    /// Pipeline with no calibration attached yet.
    pub fn new(config: MitigationConfig) -> MitigationResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            readout: None,
        })
    }

    /// Attach a prepared mitigator.
    pub fn with_readout(mut self, mitigator: ReadoutMitigator) -> Self {
        self.readout = Some(mitigator.with_condition_threshold(self.config.condition_threshold));
        self
    }

    /// Build the mitigator from calibration data, full or tensored as
    /// configured.
    pub fn with_calibration(self, data: &CalibrationData) -> MitigationResult<Self> {
        let matrix = if self.config.tensored_readout {
            ConfusionMatrix::from_calibration_tensored(data)?
        } else {
            ConfusionMatrix::from_calibration(data)?
        };
        Ok(self.with_readout(ReadoutMitigator::new(matrix)))
    }

    /// The configuration.
    pub fn config(&self) -> &MitigationConfig {
        &self.config
    }

    /// The attached mitigator, if any.
    pub fn readout(&self) -> Option<&ReadoutMitigator> {
        self.readout.as_ref()
    }

    /// Estimate `observable` from counts taken at several fold factors.
    ///
    /// With ZNE enabled the runs must cover exactly the configured fold
    /// factors.
    pub fn estimate(
        &self,
        runs: &[(u32, Counts)],
        observable: &ZObservable,
    ) -> MitigationResult<MitigatedEstimate> {
        if runs.is_empty() {
            return Err(MitigationError::NoSamples);
        }
        let mut runs: Vec<&(u32, Counts)> = runs.iter().collect();
        runs.sort_by_key(|(fold, _)| *fold);
        let folds: Vec<u32> = runs.iter().map(|(fold, _)| *fold).collect();
        validate_folds(&folds)?;
        if self.config.zne_enabled {
            let mut expected = self.config.fold_factors.clone();
            expected.sort_unstable();
            if expected != folds {
                return Err(MitigationError::FoldMismatch {
                    expected,
                    got: folds,
                });
            }
        }

        let readout = if self.config.readout_enabled {
            Some(self.readout.as_ref().ok_or(MitigationError::MissingCalibration)?)
        } else {
            None
        };

        let mut per_fold = Vec::with_capacity(runs.len());
        let mut degeneracies: Vec<Degeneracy> = Vec::new();
        let mut worst_condition_number: Option<f64> = None;

        for (fold, counts) in runs {
            let raw_value = observable.expectation(&counts.to_probabilities()?)?;
            let corrected_value = match readout {
                Some(mitigator) => {
                    let rem = mitigator.correct_counts(counts)?;
                    let kappa = rem.condition_number;
                    worst_condition_number =
                        Some(worst_condition_number.map_or(kappa, |w| w.max(kappa)));
                    for d in rem.degeneracies {
                        if !degeneracies.contains(&d) {
                            degeneracies.push(d);
                        }
                    }
                    observable.expectation(&rem.distribution)?
                }
                None => raw_value,
            };
            per_fold.push(FoldEstimate {
                fold: *fold,
                shots: counts.total_shots(),
                raw_value,
                corrected_value,
            });
        }

        let zne = if self.config.zne_enabled {
            let samples: Vec<NoiseLevelSample> = per_fold
                .iter()
                .map(|f| NoiseLevelSample::new(f.fold, f.corrected_value))
                .collect();
            let result = extrapolate(&samples, self.config.zne_method)?;
            if let Some(d) = result.degeneracy {
                degeneracies.push(d);
            }
            Some(result)
        } else {
            None
        };

        let value = zne
            .as_ref()
            .map_or(per_fold[0].corrected_value, |z| z.value);
        let raw_value = per_fold[0].raw_value;

        info!(
            "Mitigated estimate {value:.6} (raw {raw_value:.6}) over folds {folds:?}, readout {}, zne {}",
            if readout.is_some() { "on" } else { "off" },
            zne.as_ref()
                .map_or("off".to_string(), |z| z.method.to_string()),
        );

        Ok(MitigatedEstimate {
            value,
            raw_value,
            per_fold,
            readout_applied: readout.is_some(),
            worst_condition_number,
            zne,
            degeneracies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zne::ZneMethod;
    use std::collections::BTreeMap;

    fn counts(pairs: &[(&str, u64)]) -> Counts {
        let map: BTreeMap<String, u64> = pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        Counts::from_map(map).unwrap()
    }

    #[test]
    fn test_passthrough_without_mitigation() {
        let pipeline = MitigationPipeline::new(MitigationConfig::default()).unwrap();
        let est = pipeline
            .estimate(
                &[(1, counts(&[("0", 750), ("1", 250)]))],
                &ZObservable::parity([0]),
            )
            .unwrap();
        assert!((est.value - 0.5).abs() < 1e-12);
        assert_eq!(est.value, est.raw_value);
        assert!(!est.readout_applied);
        assert!(est.zne.is_none());
    }

    #[test]
    fn test_readout_without_calibration_is_error() {
        let config = MitigationConfig::default().with_readout_mitigation();
        let pipeline = MitigationPipeline::new(config).unwrap();
        let err = pipeline
            .estimate(&[(1, counts(&[("0", 1)]))], &ZObservable::parity([0]))
            .unwrap_err();
        assert_eq!(err, MitigationError::MissingCalibration);
    }

    #[test]
    fn test_zne_over_folds() {
        let config = MitigationConfig::default().with_zne(ZneMethod::Linear, vec![1, 3]);
        let pipeline = MitigationPipeline::new(config).unwrap();
        // <Z> = 0.8 at fold 1, 0.6 at fold 3
        let runs = [
            (3, counts(&[("0", 800), ("1", 200)])),
            (1, counts(&[("0", 900), ("1", 100)])),
        ];
        let est = pipeline.estimate(&runs, &ZObservable::parity([0])).unwrap();
        assert!((est.value - 0.9).abs() < 1e-12);
        assert!((est.raw_value - 0.8).abs() < 1e-12);
        assert_eq!(est.folds_used(), vec![1, 3]);
        assert_eq!(est.total_shots(), 2000);
    }

    #[test]
    fn test_readout_and_zne_combined() {
        let config = MitigationConfig::full_mitigation();
        let matrix = ConfusionMatrix::from_error_rates(&[(0.05, 0.05)]).unwrap();
        let pipeline = MitigationPipeline::new(config)
            .unwrap()
            .with_readout(ReadoutMitigator::new(matrix));
        let runs = [
            (1, counts(&[("0", 900), ("1", 100)])),
            (3, counts(&[("0", 850), ("1", 150)])),
            (5, counts(&[("0", 800), ("1", 200)])),
        ];
        let est = pipeline.estimate(&runs, &ZObservable::parity([0])).unwrap();
        assert!(est.readout_applied);
        assert!(est.worst_condition_number.unwrap() > 1.0);
        for f in &est.per_fold {
            assert!(f.corrected_value > f.raw_value);
        }
        assert!(est.value > est.per_fold[0].corrected_value);
    }

    #[test]
    fn test_runs_must_match_configured_folds() {
        let config = MitigationConfig::default().with_zne(ZneMethod::Quadratic, vec![1, 3, 5]);
        let pipeline = MitigationPipeline::new(config).unwrap();
        let runs = [
            (1, counts(&[("0", 900), ("1", 100)])),
            (3, counts(&[("0", 800), ("1", 200)])),
        ];
        assert_eq!(
            pipeline
                .estimate(&runs, &ZObservable::parity([0]))
                .unwrap_err(),
            MitigationError::FoldMismatch {
                expected: vec![1, 3, 5],
                got: vec![1, 3],
            }
        );
    }

    #[test]
    fn test_configured_folds_ignored_without_zne() {
        let pipeline = MitigationPipeline::new(MitigationConfig::default()).unwrap();
        let est = pipeline
            .estimate(
                &[(3, counts(&[("0", 800), ("1", 200)]))],
                &ZObservable::parity([0]),
            )
            .unwrap();
        assert!((est.value - 0.6).abs() < 1e-12);
    }
}
