//! qexp Command-Line Interface
//!
//! Thin driver over the qexp engine: exact simulation, shot sampling,
//! Clifford tables, randomized benchmarking, quantum volume, and readout /
//! zero-noise mitigation of measured counts.
//!
//! Inputs are JSON (circuits, counts, calibration) or YAML (configuration).

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{clifford, mitigate, qv, rb, sample, simulate, version, zne};

/// qexp - quantum measurement analysis and noise mitigation
#[derive(Parser)]
#[command(name = "qexp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the exact output distribution of a circuit
    Simulate {
        /// Circuit file (JSON)
        #[arg(short, long)]
        input: String,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Sample measurement counts from a circuit's exact distribution
    Sample {
        /// Circuit file (JSON)
        #[arg(short, long)]
        input: String,

        /// Number of shots
        #[arg(short, long, default_value = "1024")]
        shots: u64,

        /// Sampling seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Fold every two-qubit gate by this odd factor first
        #[arg(long)]
        fold: Option<u32>,

        /// Symmetric per-qubit readout flip probability to emulate
        #[arg(long)]
        readout_error: Option<f64>,

        /// Write counts JSON here instead of printing a table
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print the single-qubit Clifford group
    Clifford,

    /// Run single-qubit randomized benchmarking on the simulator
    Rb {
        /// RB configuration file (YAML or JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Comma-separated sequence lengths
        #[arg(long, value_delimiter = ',')]
        lengths: Option<Vec<u32>>,

        /// Random sequences per length
        #[arg(long)]
        sequences: Option<u32>,

        /// Shots per sequence
        #[arg(short, long)]
        shots: Option<u32>,

        /// Generation and sampling seed
        #[arg(long)]
        seed: Option<u64>,

        /// Symmetric readout flip probability to emulate
        #[arg(long)]
        readout_error: Option<f64>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Run the quantum volume protocol on the simulator
    Qv {
        /// QV configuration file (YAML or JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Largest width to test
        #[arg(long)]
        max_width: Option<u32>,

        /// Random circuits per width
        #[arg(long)]
        trials: Option<u32>,

        /// Shots per circuit
        #[arg(short, long)]
        shots: Option<u32>,

        /// Base seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Mitigate measured counts and estimate a Z observable
    Mitigate {
        /// Counts file per fold factor, as FOLD:PATH (bare PATH means fold 1)
        #[arg(short = 'C', long = "counts", required = true)]
        counts: Vec<String>,

        /// Observable, e.g. "Z0Z1" or "0.5*Z0 + 0.5*Z1"
        #[arg(short, long, default_value = "Z0")]
        observable: String,

        /// Readout calibration file (JSON)
        #[arg(long)]
        calibration: Option<String>,

        /// Mitigation configuration file (YAML or JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Extrapolate expectation values to zero noise
    Zne {
        /// Samples as FOLD:VALUE
        #[arg(required = true)]
        samples: Vec<String>,

        /// Extrapolation method (linear, quadratic, richardson)
        #[arg(short, long, default_value = "linear")]
        method: String,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Simulate { input, format } => simulate::execute(&input, &format),

        Commands::Sample {
            input,
            shots,
            seed,
            fold,
            readout_error,
            output,
        } => sample::execute(&input, shots, seed, fold, readout_error, output.as_deref()),

        Commands::Clifford => clifford::execute(),

        Commands::Rb {
            config,
            lengths,
            sequences,
            shots,
            seed,
            readout_error,
            format,
        } => rb::execute(
            config.as_deref(),
            rb::Overrides {
                lengths,
                sequences,
                shots,
                seed,
            },
            readout_error,
            &format,
        ),

        Commands::Qv {
            config,
            max_width,
            trials,
            shots,
            seed,
            format,
        } => qv::execute(
            config.as_deref(),
            qv::Overrides {
                max_width,
                trials,
                shots,
                seed,
            },
            &format,
        ),

        Commands::Mitigate {
            counts,
            observable,
            calibration,
            config,
            format,
        } => mitigate::execute(
            &counts,
            &observable,
            calibration.as_deref(),
            config.as_deref(),
            &format,
        ),

        Commands::Zne {
            samples,
            method,
            format,
        } => zne::execute(&samples, &method, &format),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
