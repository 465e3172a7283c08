//! RB command implementation.
//!
//! Runs single-qubit randomized benchmarking against the exact simulator.
//! Gates are noiseless, so the decay only reflects any emulated readout
//! error; the point is an end-to-end check of sequence construction,
//! survival scoring and the decay fit.

use std::time::Instant;

use anyhow::{Context, Result};
use console::style;

use qexp_bench::rb::{RbConfig, average_survival, fit_rb_decay, generate_rb_sequences, rb_result};
use qexp_sim::{sample_counts, simulate};

use super::common::{load_document, print_json, readout_channel};

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    /// `--lengths`
    pub lengths: Option<Vec<u32>>,
    /// `--sequences`
    pub sequences: Option<u32>,
    /// `--shots`
    pub shots: Option<u32>,
    /// `--seed`
    pub seed: Option<u64>,
}

impl Overrides {
    fn apply(self, mut config: RbConfig) -> RbConfig {
        if let Some(lengths) = self.lengths {
            config = config.with_sequence_lengths(lengths);
        }
        if let Some(n) = self.sequences {
            config = config.with_num_sequences(n);
        }
        if let Some(shots) = self.shots {
            config = config.with_shots(shots);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

/// Execute the rb command.
pub fn execute(
    config_path: Option<&str>,
    overrides: Overrides,
    readout_error: Option<f64>,
    format: &str,
) -> Result<()> {
    let base = match config_path {
        Some(path) => load_document(path)?,
        None => RbConfig::default(),
    };
    let config = overrides.apply(base);
    let start = Instant::now();

    let channel = readout_error.map(|p| readout_channel(1, p)).transpose()?;
    let sequences = generate_rb_sequences(&config).context("Failed to build RB sequences")?;

    let mut results = Vec::with_capacity(sequences.len());
    for (i, seq) in sequences.iter().enumerate() {
        let mut dist = simulate(&seq.circuit)?;
        if let Some(channel) = &channel {
            dist = channel.apply(&dist)?;
        }
        let seed = config.sampling_seed(i);
        results.push((seq.length(), sample_counts(&dist, u64::from(config.shots), seed)));
    }

    let survival = average_survival(&results)?;
    let fit = fit_rb_decay(&survival).context("RB decay fit failed")?;
    let result = rb_result(&fit, &config).with_duration(start.elapsed());

    match format {
        "json" => print_json(&result)?,
        _ => {
            println!(
                "{} Randomized benchmarking: {} sequences over {} lengths",
                style("→").cyan().bold(),
                sequences.len(),
                config.sequence_lengths.len()
            );
            println!("  {:>6}  survival", "length");
            for (length, p) in &survival {
                println!("  {length:>6}  {p:.4}");
            }
            println!(
                "\n{} Gate fidelity {} (decay {:.6}, EPC {:.3e})",
                style("✓").green().bold(),
                style(format!("{:.6}", result.value)).yellow(),
                fit.decay,
                1.0 - result.value
            );
        }
    }

    Ok(())
}
