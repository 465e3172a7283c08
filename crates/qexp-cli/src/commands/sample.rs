//! Sample command implementation.
//!
//! Emulates finite-shot hardware output from the exact distribution, with
//! optional gate folding and symmetric readout noise.

use std::fs;

use anyhow::{Context, Result};
use console::style;

use qexp_mitigation::fold_two_qubit_gates;
use qexp_sim::{sample_counts, simulate};

use super::common::{load_circuit, print_counts, readout_channel};

/// Execute the sample command.
pub fn execute(
    input: &str,
    shots: u64,
    seed: u64,
    fold: Option<u32>,
    readout_error: Option<f64>,
    output: Option<&str>,
) -> Result<()> {
    let mut circuit = load_circuit(input)?;
    if let Some(fold) = fold {
        circuit = fold_two_qubit_gates(&circuit, fold)
            .with_context(|| format!("Cannot fold by {fold}"))?;
    }

    let mut dist = simulate(&circuit).context("Simulation failed")?;
    if let Some(p) = readout_error {
        dist = readout_channel(circuit.num_qubits(), p)?
            .apply(&dist)
            .context("Readout emulation failed")?;
    }
    let counts = sample_counts(&dist, shots, seed);

    match output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&counts).context("JSON serialization failed")?;
            fs::write(path, json).with_context(|| format!("Failed to write {path}"))?;
            println!(
                "{} Wrote {} shots of {} to {}",
                style("✓").green().bold(),
                shots,
                style(circuit.name()).green(),
                style(path).yellow()
            );
        }
        None => print_counts(&counts),
    }

    Ok(())
}
