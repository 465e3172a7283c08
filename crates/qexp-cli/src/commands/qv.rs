//! QV command implementation.
//!
//! Runs the quantum volume protocol on the exact simulator: for each width,
//! random model circuits are sampled and scored against their own heavy
//! output sets. A width passes when the mean heavy fraction exceeds 2/3.

use std::time::Instant;

use anyhow::{Context, Result};
use console::style;
use tracing::info;

use qexp_bench::qv::{
    QV_THRESHOLD, QvConfig, generate_qv_circuit, heavy_output_fraction, qv_result,
};
use qexp_sim::{sample_counts, simulate};

use super::common::{load_document, print_json};

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    /// `--max-width`
    pub max_width: Option<u32>,
    /// `--trials`
    pub trials: Option<u32>,
    /// `--shots`
    pub shots: Option<u32>,
    /// `--seed`
    pub seed: Option<u64>,
}

impl Overrides {
    fn apply(self, mut config: QvConfig) -> QvConfig {
        config.max_width = self.max_width.unwrap_or(config.max_width);
        config.num_trials = self.trials.unwrap_or(config.num_trials);
        config.shots = self.shots.unwrap_or(config.shots);
        config.seed = self.seed.unwrap_or(config.seed);
        config
    }
}

/// Execute the qv command.
pub fn execute(config_path: Option<&str>, overrides: Overrides, format: &str) -> Result<()> {
    let base = match config_path {
        Some(path) => load_document(path)?,
        None => QvConfig::default(),
    };
    let config = overrides.apply(base);
    if config.num_trials == 0 {
        anyhow::bail!("QV needs at least one trial per width");
    }
    let start = Instant::now();

    let mut per_width = Vec::new();
    for width in 2..=config.max_width {
        let mut total = 0.0;
        for trial in 0..config.num_trials {
            let circuit = generate_qv_circuit(width, config.trial_seed(width, trial))
                .with_context(|| format!("Failed to build QV circuit of width {width}"))?;
            let ideal = simulate(&circuit)?;
            let shots = u64::from(config.shots);
            let counts = sample_counts(&ideal, shots, config.sampling_seed(width, trial));
            total += heavy_output_fraction(&counts, &ideal)?.heavy_fraction;
        }
        let mean = total / f64::from(config.num_trials);
        info!("QV width {width}: mean heavy fraction {mean:.4}");
        per_width.push((width, mean));
    }

    // Largest width such that it and every smaller width pass.
    let achieved = per_width
        .iter()
        .take_while(|(_, mean)| *mean > QV_THRESHOLD)
        .map(|(width, _)| *width)
        .last()
        .unwrap_or(0);
    let mean_at_achieved = per_width
        .iter()
        .find(|(width, _)| *width == achieved)
        .map_or(0.0, |(_, mean)| *mean);
    let result = qv_result(achieved, &config, mean_at_achieved).with_duration(start.elapsed());

    match format {
        "json" => print_json(&result)?,
        _ => {
            println!(
                "{} Quantum volume: widths 2..={}, {} trials each",
                style("→").cyan().bold(),
                config.max_width,
                config.num_trials
            );
            println!("  {:>5}  heavy fraction", "width");
            for (width, mean) in &per_width {
                let mark = if *mean > QV_THRESHOLD {
                    style("pass").green()
                } else {
                    style("fail").red()
                };
                println!("  {width:>5}  {mean:.4}  {mark}");
            }
            println!(
                "\n{} Quantum volume {}",
                style("✓").green().bold(),
                style(result.value).yellow()
            );
        }
    }

    Ok(())
}
