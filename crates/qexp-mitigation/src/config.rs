//! Mitigation pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::error::MitigationResult;
use crate::readout::DEFAULT_CONDITION_THRESHOLD;
use crate::zne::{ZneMethod, validate_folds};

/// Error mitigation configuration.
///
/// Loadable from YAML or JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MitigationConfig {
    /// Apply confusion-matrix readout correction.
    pub readout_enabled: bool,
    /// Build the confusion matrix from per-qubit marginals instead of the
    /// full calibration.
    pub tensored_readout: bool,
    /// Condition number above which readout correction is flagged.
    pub condition_threshold: f64,
    /// Enable Zero Noise Extrapolation.
    pub zne_enabled: bool,
    /// Extrapolation model.
    pub zne_method: ZneMethod,
    /// Fold factors to run the circuit at.
    pub fold_factors: Vec<u32>,
}

impl Default for MitigationConfig {
    fn default() -> Self {
        Self {
            readout_enabled: false,
            tensored_readout: false,
            condition_threshold: DEFAULT_CONDITION_THRESHOLD,
            zne_enabled: false,
            zne_method: ZneMethod::Linear,
            fold_factors: vec![1, 3],
        }
    }
}

impl MitigationConfig {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable Zero Noise Extrapolation with custom fold factors.
    pub fn with_zne(mut self, method: ZneMethod, fold_factors: Vec<u32>) -> Self {
        self.zne_enabled = true;
        self.zne_method = method;
        self.fold_factors = fold_factors;
        self
    }

    /// Enable readout error mitigation.
    pub fn with_readout_mitigation(mut self) -> Self {
        self.readout_enabled = true;
        self
    }

    /// Use the per-qubit (tensored) confusion model.
    pub fn with_tensored_readout(mut self) -> Self {
        self.readout_enabled = true;
        self.tensored_readout = true;
        self
    }

    /// Set the ill-conditioning threshold.
    pub fn with_condition_threshold(mut self, threshold: f64) -> Self {
        self.condition_threshold = threshold;
        self
    }

    /// Readout correction plus quadratic ZNE over folds 1, 3, 5.
    pub fn full_mitigation() -> Self {
        Self::default()
            .with_readout_mitigation()
            .with_zne(ZneMethod::Quadratic, vec![1, 3, 5])
    }

    /// Check the fold factors.
    pub fn validate(&self) -> MitigationResult<()> {
        validate_folds(&self.fold_factors)
    }
}
