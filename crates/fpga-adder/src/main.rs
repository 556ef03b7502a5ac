//! fpga-adder: run the `adder` kernel on an accelerator and check the result.
//!
//! With no flags this reproduces the reference run: 4096 sequential inputs,
//! increment 10, first accelerator on the Xilinx platform, binary found by
//! searching the usual build directories.

use anyhow::{Context, Result};
use clap::Parser;
use fpga_adder_core::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};

mod exit;

/// Run the FPGA adder kernel and compare its output with a CPU reference
#[derive(Parser, Debug)]
#[command(name = "fpga-adder")]
#[command(version)]
#[command(about = "Run the FPGA adder kernel and verify it against the CPU")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Kernel binary to load instead of searching for one
    #[arg(long, value_name = "PATH")]
    xclbin: Option<PathBuf>,

    /// Backend to run on (auto, opencl, cuda, emulated)
    #[arg(short, long, value_name = "BACKEND")]
    backend: Option<BackendPreference>,

    /// Index of the device to use
    #[arg(short, long, value_name = "N")]
    device: Option<usize>,

    /// Only consider devices whose name contains this string
    #[arg(long, value_name = "SUBSTR")]
    device_name: Option<String>,

    /// OpenCL platform name
    #[arg(long, value_name = "NAME")]
    platform: Option<String>,

    /// Kernel name inside the binary
    #[arg(long, value_name = "NAME")]
    kernel: Option<String>,

    /// Number of elements
    #[arg(long, value_name = "N")]
    size: Option<usize>,

    /// Value added to each element
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    increment: Option<i32>,

    /// Fill the input with seeded random values instead of 0..size
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Write a JSON run report to this file
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

/// Build the run configuration from the optional file and flag overrides
fn build_config(cli: &Cli) -> Result<AdderConfig> {
    let base = match &cli.config {
        Some(path) => AdderConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => AdderConfig::default(),
    };

    let mut builder = AdderConfigBuilder::from_config(base);
    if let Some(path) = &cli.xclbin {
        builder = builder.binary_path(path);
    }
    if let Some(backend) = cli.backend {
        builder = builder.backend(backend);
    }
    if let Some(index) = cli.device {
        builder = builder.device_index(index);
    }
    if let Some(name) = &cli.device_name {
        builder = builder.device_name(name.clone());
    }
    if let Some(platform) = &cli.platform {
        builder = builder.platform_name(platform.clone());
    }
    if let Some(kernel) = &cli.kernel {
        builder = builder.kernel_name(kernel.clone());
    }
    if let Some(size) = cli.size {
        builder = builder.data_size(size);
    }
    if let Some(increment) = cli.increment {
        builder = builder.increment(increment);
    }
    if let Some(seed) = cli.seed {
        builder = builder.input_pattern(InputPattern::Random { seed });
    }

    builder.build().context("Invalid configuration")
}

/// Setup logging; `RUST_LOG` takes precedence over `--log-level`
fn setup_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(cli: &Cli) -> Result<RunReport> {
    let config = build_config(cli)?;
    debug!("configuration: {:?}", config);

    let mut backend = open_backend(&config).context("Failed to open accelerator")?;
    println!("INFO: Device found - {}", backend.device_info().name);

    let host = AdderHost::new(config)?;
    let report = host.run(&mut backend).context("Adder run failed")?;

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }
    Ok(report)
}

/// Console lines and process exit code for a run outcome
fn outcome(result: &Result<RunReport>) -> (Vec<String>, u8) {
    match result {
        Ok(report) => match report.verification.mismatch() {
            Some(mismatch) => (
                vec![
                    "Error: Result mismatch".to_string(),
                    mismatch.to_string(),
                    "TEST FAILED.".to_string(),
                ],
                exit::EXIT_MISMATCH,
            ),
            None => (vec!["TEST PASSED.".to_string()], exit::EXIT_PASSED),
        },
        Err(_) => (Vec::new(), exit::EXIT_RUNTIME_FAIL),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    let result = run(&cli);
    if let Err(e) = &result {
        error!("{:#}", e);
    }

    let (lines, code) = outcome(&result);
    for line in lines {
        println!("{line}");
    }
    ExitCode::from(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("fpga-adder").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_flags_is_the_reference_run() {
        let config = build_config(&parse(&[])).unwrap();
        assert_eq!(config, AdderConfig::default());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = parse(&[
            "--backend",
            "emulated",
            "--size",
            "64",
            "--increment",
            "-5",
            "--seed",
            "3",
            "--device",
            "1",
            "--xclbin",
            "build/adder.xclbin",
        ]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.backend, BackendPreference::Emulated);
        assert_eq!(config.data_size, 64);
        assert_eq!(config.increment, -5);
        assert_eq!(config.input_pattern, InputPattern::Random { seed: 3 });
        assert_eq!(config.device_index, 1);
        assert_eq!(config.binary_path, Some(PathBuf::from("build/adder.xclbin")));
    }

    #[test]
    fn rejects_unknown_backend_and_zero_size() {
        assert!(Cli::try_parse_from(["fpga-adder", "--backend", "tpu"]).is_err());
        assert!(build_config(&parse(&["--size", "0"])).is_err());
    }

    fn report_with(verification: Verification) -> RunReport {
        RunReport {
            backend: BackendKind::OpenCl,
            device: "xilinx_u200_xdma_201830_2".to_string(),
            target: Some("hw".to_string()),
            binary: Some(PathBuf::from("xclbin/adder.hw.xilinx_u200_xdma_201830_2.xclbin")),
            data_size: 4096,
            increment: 10,
            verification,
            kernel_nanos: None,
            wall_nanos: 1,
        }
    }

    #[test]
    fn passed_run_exits_zero() {
        let (lines, code) = outcome(&Ok(report_with(Verification::Passed)));
        assert_eq!(lines, vec!["TEST PASSED.".to_string()]);
        assert_eq!(code, exit::EXIT_PASSED);
    }

    #[test]
    fn mismatch_prints_first_difference_and_exits_one() {
        let report = report_with(Verification::Failed(Mismatch {
            index: 100,
            cpu: 110,
            device: 111,
        }));
        let (lines, code) = outcome(&Ok(report));
        assert_eq!(
            lines,
            vec![
                "Error: Result mismatch".to_string(),
                "i = 100 CPU result = 110 Device result = 111".to_string(),
                "TEST FAILED.".to_string(),
            ]
        );
        assert_eq!(code, 1);
    }

    #[test]
    fn runtime_error_exits_two() {
        let result: Result<RunReport> =
            Err(anyhow::Error::new(HostError::no_device("no accelerator found")));
        let (lines, code) = outcome(&result);
        assert!(lines.is_empty());
        assert_eq!(code, 2);
    }

    #[cfg(not(any(feature = "opencl", feature = "cuda")))]
    #[test]
    fn no_flags_without_accelerator_is_runtime_error() {
        let result = run(&parse(&[]));
        let err = result.as_ref().err().unwrap();
        assert!(
            matches!(err.downcast_ref::<HostError>(), Some(HostError::NoDevice { .. })),
            "unexpected error: {err:#}"
        );
        assert_eq!(outcome(&result).1, exit::EXIT_RUNTIME_FAIL);
    }

    #[test]
    fn emulated_run_passes() {
        let report = run(&parse(&["--backend", "emulated", "--size", "256"])).unwrap();
        assert!(report.passed());
        assert_eq!(report.data_size, 256);
    }
}
