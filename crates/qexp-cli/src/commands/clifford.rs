//! Clifford command implementation.

use anyhow::Result;
use console::style;

use qexp_bench::clifford_group;

/// Execute the clifford command.
pub fn execute() -> Result<()> {
    let group = clifford_group();

    println!(
        "{} Single-qubit Clifford group ({} elements)",
        style("→").cyan().bold(),
        group.len()
    );
    println!("  {:>3}  {:>7}  sequence", "idx", "inverse");
    for i in 0..group.len() {
        let word: Vec<&str> = group
            .gate_sequence(i)
            .iter()
            .map(|g| g.gate().name())
            .collect();
        let word = if word.is_empty() {
            "I".to_string()
        } else {
            word.join(" ")
        };
        println!(
            "  {:>3}  {:>7}  {}",
            style(i).cyan(),
            group.inverse_index(&[i]),
            word
        );
    }

    Ok(())
}
