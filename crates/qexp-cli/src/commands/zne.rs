//! ZNE command implementation.

use anyhow::{Context, Result};
use console::style;

use qexp_mitigation::{NoiseLevelSample, ZneMethod, extrapolate};

use super::common::{parse_fold_value, print_json};

/// Execute the zne command.
pub fn execute(samples: &[String], method: &str, format: &str) -> Result<()> {
    let method: ZneMethod = method
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("Invalid ZNE method")?;
    let samples = samples
        .iter()
        .map(|arg| parse_fold_value(arg).map(NoiseLevelSample::from))
        .collect::<Result<Vec<_>>>()?;

    let result = extrapolate(&samples, method)?;

    match format {
        "json" => print_json(&result)?,
        _ => {
            println!(
                "{} {} extrapolation over folds {:?}",
                style("→").cyan().bold(),
                style(result.method).green(),
                result.folds_used
            );
            if let Some(d) = &result.degeneracy {
                println!("  {} {d}", style("warning:").yellow().bold());
            }
            println!(
                "\n{} Zero-noise value {} (raw {:.6})",
                style("✓").green().bold(),
                style(format!("{:.6}", result.value)).yellow(),
                result.raw_value
            );
        }
    }

    Ok(())
}
