//! CLI argument parsing and end-to-end command tests.
//!
//! Argument parsing is checked on a mirror of the clap definitions (the CLI
//! is a binary crate). Commands are exercised by running the built `qexp`
//! binary against files in a temporary directory.

// ============================================================================
// Clap argument parsing
// ============================================================================

mod clap_parsing {
    use clap::{Parser, Subcommand};

    // Mirror the CLI struct for testing (since main.rs is a binary)
    #[derive(Parser)]
    #[command(name = "qexp")]
    struct TestCli {
        #[arg(short, long, action = clap::ArgAction::Count, global = true)]
        verbose: u8,

        #[command(subcommand)]
        command: TestCommands,
    }

    #[derive(Subcommand)]
    enum TestCommands {
        Sample {
            #[arg(short, long)]
            input: String,
            #[arg(short, long, default_value = "1024")]
            shots: u64,
            #[arg(long, default_value = "0")]
            seed: u64,
            #[arg(long)]
            fold: Option<u32>,
            #[arg(long)]
            readout_error: Option<f64>,
            #[arg(short, long)]
            output: Option<String>,
        },
        Rb {
            #[arg(short, long)]
            config: Option<String>,
            #[arg(long, value_delimiter = ',')]
            lengths: Option<Vec<u32>>,
            #[arg(long)]
            sequences: Option<u32>,
            #[arg(short, long)]
            shots: Option<u32>,
            #[arg(long)]
            seed: Option<u64>,
            #[arg(long)]
            readout_error: Option<f64>,
            #[arg(short, long, default_value = "table")]
            format: String,
        },
        Mitigate {
            #[arg(short = 'C', long = "counts", required = true)]
            counts: Vec<String>,
            #[arg(short, long, default_value = "Z0")]
            observable: String,
            #[arg(long)]
            calibration: Option<String>,
            #[arg(short, long)]
            config: Option<String>,
            #[arg(short, long, default_value = "table")]
            format: String,
        },
        Zne {
            #[arg(required = true)]
            samples: Vec<String>,
            #[arg(short, long, default_value = "linear")]
            method: String,
            #[arg(short, long, default_value = "table")]
            format: String,
        },
        Version,
    }

    #[test]
    fn test_parse_sample_defaults() {
        let cli = TestCli::try_parse_from(["qexp", "sample", "-i", "bell.json"]).unwrap();
        match cli.command {
            TestCommands::Sample {
                input,
                shots,
                seed,
                fold,
                readout_error,
                output,
            } => {
                assert_eq!(input, "bell.json");
                assert_eq!(shots, 1024);
                assert_eq!(seed, 0);
                assert!(fold.is_none());
                assert!(readout_error.is_none());
                assert!(output.is_none());
            }
            _ => panic!("Expected Sample command"),
        }
    }

    #[test]
    fn test_parse_rb_lengths_list() {
        let cli =
            TestCli::try_parse_from(["qexp", "rb", "--lengths", "1,2,8", "-s", "100"]).unwrap();
        match cli.command {
            TestCommands::Rb { lengths, shots, .. } => {
                assert_eq!(lengths.unwrap(), vec![1, 2, 8]);
                assert_eq!(shots, Some(100));
            }
            _ => panic!("Expected Rb command"),
        }
    }

    #[test]
    fn test_parse_mitigate_multiple_counts() {
        let cli = TestCli::try_parse_from([
            "qexp",
            "mitigate",
            "-C",
            "1:f1.json",
            "--counts",
            "3:f3.json",
            "-o",
            "Z0Z1",
        ])
        .unwrap();
        match cli.command {
            TestCommands::Mitigate {
                counts, observable, ..
            } => {
                assert_eq!(counts, vec!["1:f1.json", "3:f3.json"]);
                assert_eq!(observable, "Z0Z1");
            }
            _ => panic!("Expected Mitigate command"),
        }
    }

    #[test]
    fn test_parse_mitigate_requires_counts() {
        assert!(TestCli::try_parse_from(["qexp", "mitigate"]).is_err());
    }

    #[test]
    fn test_parse_zne_negative_values() {
        let cli = TestCli::try_parse_from([
            "qexp",
            "zne",
            "1:-0.4",
            "3:-0.2",
            "-m",
            "richardson",
        ])
        .unwrap();
        match cli.command {
            TestCommands::Zne {
                samples, method, ..
            } => {
                assert_eq!(samples, vec!["1:-0.4", "3:-0.2"]);
                assert_eq!(method, "richardson");
            }
            _ => panic!("Expected Zne command"),
        }
    }

    #[test]
    fn test_parse_verbose_count() {
        let cli = TestCli::try_parse_from(["qexp", "-vv", "version"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, TestCommands::Version));
    }

    #[test]
    fn test_parse_unknown_command() {
        assert!(TestCli::try_parse_from(["qexp", "teleport"]).is_err());
    }
}

// ============================================================================
// End-to-end commands
// ============================================================================

mod commands {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::process::{Command, Output};

    use serde_json::Value;

    const BELL: &str = r#"{
        "name": "bell",
        "num_qubits": 2,
        "instructions": [
            {"gate": "h", "qubits": [0]},
            {"gate": "cx", "qubits": [0, 1]}
        ]
    }"#;

    fn qexp(args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_qexp"))
            .args(args)
            .output()
            .unwrap()
    }

    fn json_stdout(output: &Output) -> Value {
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_simulate_bell_json() {
        let dir = tempfile::tempdir().unwrap();
        let circuit = write(dir.path(), "bell.json", BELL);

        let out = qexp(&["simulate", "-i", circuit.to_str().unwrap(), "-f", "json"]);
        let dist = json_stdout(&out);
        let obj = dist.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert!((obj["00"].as_f64().unwrap() - 0.5).abs() < 1e-12);
        assert!((obj["11"].as_f64().unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sample_writes_counts() {
        let dir = tempfile::tempdir().unwrap();
        let circuit = write(dir.path(), "bell.json", BELL);
        let counts_path = dir.path().join("counts.json");

        let out = qexp(&[
            "sample",
            "-i",
            circuit.to_str().unwrap(),
            "-s",
            "500",
            "--seed",
            "7",
            "--fold",
            "3",
            "-o",
            counts_path.to_str().unwrap(),
        ]);
        assert!(out.status.success());

        let counts: Value =
            serde_json::from_str(&fs::read_to_string(&counts_path).unwrap()).unwrap();
        let obj = counts.as_object().unwrap();
        let total: u64 = obj.values().map(|v| v.as_u64().unwrap()).sum();
        assert_eq!(total, 500);
        assert!(obj.keys().all(|k| k == "00" || k == "11"));
    }

    #[test]
    fn test_mitigate_with_calibration() {
        let dir = tempfile::tempdir().unwrap();
        let cal = write(
            dir.path(),
            "cal.json",
            r#"{"0": {"0": 950, "1": 50}, "1": {"0": 50, "1": 950}}"#,
        );
        let counts = write(dir.path(), "f1.json", r#"{"0": 900, "1": 100}"#);

        let out = qexp(&[
            "mitigate",
            "-C",
            counts.to_str().unwrap(),
            "--calibration",
            cal.to_str().unwrap(),
            "-f",
            "json",
        ]);
        let est = json_stdout(&out);
        assert_eq!(est["readout_applied"], Value::Bool(true));
        assert!((est["raw_value"].as_f64().unwrap() - 0.8).abs() < 1e-12);
        // Solving M·p = (0.9, 0.1) gives p0 = 17/18.
        assert!((est["value"].as_f64().unwrap() - 8.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_mitigate_extrapolates_multiple_folds() {
        let dir = tempfile::tempdir().unwrap();
        let f1 = write(dir.path(), "f1.json", r#"{"0": 900, "1": 100}"#);
        let f3 = write(dir.path(), "f3.json", r#"{"0": 800, "1": 200}"#);

        let out = qexp(&[
            "mitigate",
            "-C",
            &format!("1:{}", f1.display()),
            "-C",
            &format!("3:{}", f3.display()),
            "-f",
            "json",
        ]);
        let est = json_stdout(&out);
        assert!((est["value"].as_f64().unwrap() - 0.9).abs() < 1e-12);
        assert_eq!(est["zne"]["method"], Value::String("linear".into()));
    }

    #[test]
    fn test_mitigate_yaml_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = write(
            dir.path(),
            "mitigation.yaml",
            "zne_enabled: true\nzne_method: quadratic\nfold_factors: [1, 3, 5]\n",
        );
        let mut args = vec!["mitigate".to_string()];
        for (fold, zeros) in [(1, 900), (3, 800), (5, 700)] {
            let path = write(
                dir.path(),
                &format!("f{fold}.json"),
                &format!(r#"{{"0": {zeros}, "1": {}}}"#, 1000 - zeros),
            );
            args.push("-C".into());
            args.push(format!("{fold}:{}", path.display()));
        }
        args.extend(["-c".into(), config.display().to_string()]);
        args.extend(["-f".into(), "json".into()]);

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let est = json_stdout(&qexp(&args));
        assert_eq!(est["zne"]["method"], Value::String("quadratic".into()));
        assert!((est["value"].as_f64().unwrap() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_mitigate_rejects_folds_missing_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = write(
            dir.path(),
            "mitigation.yaml",
            "zne_enabled: true\nfold_factors: [1, 3, 5]\n",
        );
        let f1 = write(dir.path(), "f1.json", r#"{"0": 900, "1": 100}"#);
        let f3 = write(dir.path(), "f3.json", r#"{"0": 800, "1": 200}"#);

        let out = qexp(&[
            "mitigate",
            "-C",
            &format!("1:{}", f1.display()),
            "-C",
            &format!("3:{}", f3.display()),
            "-c",
            config.to_str().unwrap(),
        ]);
        assert_eq!(out.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&out.stderr).contains("fold factors"));
    }

    #[test]
    fn test_qv_reports_tested_widths() {
        let out = qexp(&[
            "qv",
            "--max-width",
            "3",
            "--trials",
            "2",
            "-s",
            "200",
            "-f",
            "json",
        ]);
        let result = json_stdout(&out);
        assert_eq!(result["name"], Value::String("quantum_volume".into()));
        assert_eq!(result["metrics"]["max_width_tested"], Value::from(3));
        assert!(result["metrics"]["achieved_width"].as_u64().unwrap() <= 3);
    }

    #[test]
    fn test_zne_linear() {
        let est = json_stdout(&qexp(&["zne", "1:0.8", "3:0.6", "-f", "json"]));
        assert!((est["value"].as_f64().unwrap() - 0.9).abs() < 1e-12);
        assert_eq!(est["mitigation_applied"], Value::Bool(true));
    }

    #[test]
    fn test_zne_rejects_even_fold() {
        let out = qexp(&["zne", "1:0.8", "2:0.6"]);
        assert_eq!(out.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&out.stderr).contains("Error:"));
    }

    #[test]
    fn test_rb_ideal_device() {
        let out = qexp(&[
            "rb",
            "--lengths",
            "1,4,16",
            "--sequences",
            "3",
            "-s",
            "200",
            "-f",
            "json",
        ]);
        let result = json_stdout(&out);
        assert_eq!(result["name"], Value::String("rb_1q".into()));
        assert!((result["value"].as_f64().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_clifford_table() {
        let out = qexp(&["clifford"]);
        assert!(out.status.success());
        let stdout = String::from_utf8_lossy(&out.stdout);
        assert!(stdout.contains("24 elements"));
    }

    #[test]
    fn test_missing_input_fails() {
        let out = qexp(&["simulate", "-i", "/nonexistent/qexp_circuit.json"]);
        assert_eq!(out.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&out.stderr).contains("File not found"));
    }

    #[test]
    fn test_version() {
        let out = qexp(&["version"]);
        assert!(out.status.success());
        assert!(String::from_utf8_lossy(&out.stdout).contains(env!("CARGO_PKG_VERSION")));
    }
}
