//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;
use serde::de::DeserializeOwned;

use qexp_ir::{Circuit, CircuitSpec, Counts, ProbabilityVector};
use qexp_mitigation::{CalibrationData, ConfusionMatrix};

/// Rows shown before a table is truncated.
const MAX_ROWS: usize = 16;

/// Read a file, failing early with a readable message if it is missing.
pub fn read_source(path: &str) -> Result<String> {
    if !Path::new(path).exists() {
        anyhow::bail!("File not found: {path}");
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))
}

/// Load a YAML or JSON document; the extension decides, JSON otherwise.
pub fn load_document<T: DeserializeOwned>(path: &str) -> Result<T> {
    let source = read_source(path)?;
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match ext.to_lowercase().as_str() {
        "yaml" | "yml" => {
            serde_yaml_ng::from_str(&source).with_context(|| format!("Invalid YAML in {path}"))
        }
        _ => serde_json::from_str(&source).with_context(|| format!("Invalid JSON in {path}")),
    }
}

/// Load a circuit from its JSON description.
pub fn load_circuit(path: &str) -> Result<Circuit> {
    let spec: CircuitSpec = load_document(path)?;
    Circuit::try_from(&spec).with_context(|| format!("Invalid circuit in {path}"))
}

/// Load a counts map such as `{"00": 512, "11": 488}`.
pub fn load_counts(path: &str) -> Result<Counts> {
    load_document(path)
}

/// Load readout calibration: prepared label → counts.
pub fn load_calibration(path: &str) -> Result<CalibrationData> {
    load_document(path)
}

/// Split `FOLD:PATH`; a bare path is taken at fold 1.
pub fn parse_fold_path(arg: &str) -> Result<(u32, String)> {
    match arg.split_once(':') {
        Some((fold, path)) if !fold.is_empty() && fold.bytes().all(|b| b.is_ascii_digit()) => {
            let fold = fold
                .parse()
                .with_context(|| format!("Invalid fold factor in '{arg}'"))?;
            Ok((fold, path.to_string()))
        }
        _ => Ok((1, arg.to_string())),
    }
}

/// Parse `FOLD:VALUE`.
pub fn parse_fold_value(arg: &str) -> Result<(u32, f64)> {
    let (fold, value) = arg
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("Expected FOLD:VALUE, got '{arg}'"))?;
    let fold = fold
        .trim()
        .parse()
        .with_context(|| format!("Invalid fold factor in '{arg}'"))?;
    let value = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value in '{arg}'"))?;
    Ok((fold, value))
}

/// Symmetric per-qubit readout channel with flip probability `p`.
pub fn readout_channel(num_qubits: u32, p: f64) -> Result<ConfusionMatrix> {
    let rates = vec![(p, p); num_qubits as usize];
    ConfusionMatrix::from_error_rates(&rates).context("Invalid readout error")
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{json}");
    Ok(())
}

/// Print counts as a histogram table, most frequent first.
pub fn print_counts(counts: &Counts) {
    let total = counts.total_shots();
    println!(
        "\n{} Counts ({} shots):",
        style("✓").green().bold(),
        total
    );

    let sorted = counts.sorted();
    for (bitstring, count) in sorted.iter().take(MAX_ROWS) {
        let prob = *count as f64 / total.max(1) as f64 * 100.0;
        print_row(bitstring, &format!("{count:>6}"), prob);
    }

    if sorted.len() > MAX_ROWS {
        println!("  ... and {} more outcomes", sorted.len() - MAX_ROWS);
    }
}

/// Print a probability distribution, most likely first.
pub fn print_distribution(dist: &ProbabilityVector) {
    println!(
        "\n{} Distribution ({} qubits, {} outcomes):",
        style("✓").green().bold(),
        dist.num_qubits(),
        dist.len()
    );

    let mut rows: Vec<(&str, f64)> = dist.iter().collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    for (bitstring, p) in rows.iter().take(MAX_ROWS) {
        print_row(bitstring, &format!("{p:.6}"), p * 100.0);
    }

    if rows.len() > MAX_ROWS {
        println!("  ... and {} more outcomes", rows.len() - MAX_ROWS);
    }
}

fn print_row(bitstring: &str, value: &str, percent: f64) {
    let bar_len = (percent / 2.0).round() as usize;
    println!(
        "  {}: {} ({:>6.2}%) {}",
        style(bitstring).cyan(),
        value,
        percent,
        style("█".repeat(bar_len)).green()
    );
}
