//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - quantum measurement analysis and noise mitigation",
        style("qexp").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qexp-ir          Gates, circuits, counts and distributions");
    println!("  qexp-sim         Exact statevector simulation and sampling");
    println!("  qexp-bench       Clifford group, randomized benchmarking, quantum volume");
    println!("  qexp-mitigation  Readout error mitigation and zero-noise extrapolation");
    println!("  qexp-cli         Command-line interface");
    println!();
    println!(
        "Repository: {}",
        style(env!("CARGO_PKG_REPOSITORY")).underlined()
    );
    println!("License:    {}", style("Apache-2.0").dim());
}
