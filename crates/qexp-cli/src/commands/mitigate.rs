//! Mitigate command implementation.
//!
//! Without `--config`, readout correction is switched on by `--calibration`
//! and linear ZNE by supplying more than one fold factor. With a config file
//! the file decides.

use anyhow::{Context, Result};
use console::style;
use tracing::debug;

use qexp_mitigation::{
    MitigatedEstimate, MitigationConfig, MitigationPipeline, ZObservable, ZneMethod,
};

use super::common::{load_calibration, load_counts, load_document, parse_fold_path, print_json};

/// Execute the mitigate command.
pub fn execute(
    counts_args: &[String],
    observable: &str,
    calibration: Option<&str>,
    config_path: Option<&str>,
    format: &str,
) -> Result<()> {
    let observable: ZObservable = observable
        .parse()
        .with_context(|| format!("Invalid observable '{observable}'"))?;

    let runs = counts_args
        .iter()
        .map(|arg| {
            let (fold, path) = parse_fold_path(arg)?;
            Ok((fold, load_counts(&path)?))
        })
        .collect::<Result<Vec<_>>>()?;

    let config = match config_path {
        Some(path) => load_document(path)?,
        None => {
            let mut config = MitigationConfig::default();
            if calibration.is_some() {
                config = config.with_readout_mitigation();
            }
            if runs.len() > 1 {
                let folds = runs.iter().map(|(fold, _)| *fold).collect();
                config = config.with_zne(ZneMethod::Linear, folds);
            }
            config
        }
    };

    debug!("Mitigation config: {config:?}");
    let mut pipeline = MitigationPipeline::new(config).context("Invalid mitigation config")?;
    if let Some(path) = calibration {
        let data = load_calibration(path)?;
        pipeline = pipeline
            .with_calibration(&data)
            .with_context(|| format!("Unusable calibration in {path}"))?;
    }

    let estimate = pipeline.estimate(&runs, &observable)?;

    match format {
        "json" => print_json(&estimate)?,
        _ => print_estimate(&observable, &estimate),
    }

    Ok(())
}

fn print_estimate(observable: &ZObservable, est: &MitigatedEstimate) {
    println!(
        "{} Estimating {} over {} shots",
        style("→").cyan().bold(),
        style(observable).green(),
        est.total_shots()
    );
    println!("  {:>4}  {:>7}  {:>10}  {:>10}", "fold", "shots", "raw", "corrected");
    for f in &est.per_fold {
        println!(
            "  {:>4}  {:>7}  {:>10.6}  {:>10.6}",
            f.fold, f.shots, f.raw_value, f.corrected_value
        );
    }

    if let Some(kappa) = est.worst_condition_number {
        println!("  Readout condition number: {kappa:.3}");
    }
    if let Some(zne) = &est.zne {
        let fit = zne
            .fit_quality
            .map_or(String::new(), |r2| format!(", R² {r2:.4}"));
        println!("  ZNE: {} over folds {:?}{fit}", zne.method, zne.folds_used);
    }
    for d in &est.degeneracies {
        println!("  {} {d}", style("warning:").yellow().bold());
    }

    println!(
        "\n{} Mitigated value {} (raw {:.6})",
        style("✓").green().bold(),
        style(format!("{:.6}", est.value)).yellow(),
        est.raw_value
    );
}
