//! Simulate command implementation.

use anyhow::{Context, Result};
use console::style;

use qexp_sim::simulate;

use super::common::{load_circuit, print_distribution, print_json};

/// Execute the simulate command.
pub fn execute(input: &str, format: &str) -> Result<()> {
    let circuit = load_circuit(input)?;
    let dist = simulate(&circuit).context("Simulation failed")?;

    match format {
        "json" => print_json(&dist)?,
        _ => {
            println!(
                "{} Simulated {} ({} qubits, depth {}, {} ops)",
                style("→").cyan().bold(),
                style(input).green(),
                circuit.num_qubits(),
                circuit.depth(),
                circuit.num_ops()
            );
            print_distribution(&dist);
        }
    }

    Ok(())
}
