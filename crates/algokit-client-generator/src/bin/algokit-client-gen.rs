//! Client generation CLI for Algorand applications.
//!
//! Generates typed Python clients from ARC-32 and ARC-56 application specs.
//!
//! # Usage
//!
//! ```bash
//! # Generate next to the spec as hello_world_client.py
//! algokit-client-gen -a HelloWorld.arc56.json
//!
//! # Choose the output file
//! algokit-client-gen -a application.json -o clients/counter.py
//!
//! # Every spec under a directory, collected into one output directory
//! algokit-client-gen -a artifacts/ -o clients/{contract_name}_client.py
//!
//! # Client only, keeping the contract's original method spelling
//! algokit-client-gen -a HelloWorld.arc56.json -m minimal -p
//! ```

use algokit_client_generator::build_helper::{self, BuildConfig, CONTRACT_NAME_PLACEHOLDER};
use algokit_client_generator::{GenerationMode, GeneratorConfig};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_OUTPUT: &str = "{contract_name}_client.py";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Client, factory and composer
    Full,
    /// Client only
    Minimal,
}

impl From<Mode> for GenerationMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Full => GenerationMode::Full,
            Mode::Minimal => GenerationMode::Minimal,
        }
    }
}

/// Generate typed Python clients from Algorand application specs.
#[derive(Parser, Debug)]
#[command(name = "algokit-client-gen")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to an application spec, or a directory searched recursively for
    /// application.json, *.arc32.json and *.arc56.json files
    #[arg(short, long)]
    app_spec: PathBuf,

    /// Output file; `{contract_name}` is replaced by the contract's snake_case name.
    /// The default pattern and directory runs place clients next to each spec
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Which parts of the client to generate
    #[arg(short, long, value_enum, default_value = "full")]
    mode: Mode,

    /// Keep method and field names as written in the spec
    #[arg(short, long)]
    preserve_names: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn build_config(&self) -> anyhow::Result<BuildConfig> {
        let file_name = self
            .output
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid output path: {}", self.output.display()))?;

        let generator_config = GeneratorConfig::new()
            .with_mode(self.mode.into())
            .with_preserved_names(self.preserve_names);
        let mut config = BuildConfig::new()
            .with_generator_config(generator_config)
            .with_file_name(file_name);
        match self.output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            Some(dir) => config = config.with_output_dir(dir),
            None if self.output.as_os_str() != DEFAULT_OUTPUT && !self.app_spec.is_dir() => {
                config = config.with_output_dir(".");
            }
            None => {}
        }
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn generate_directory(dir: &Path, config: &BuildConfig) -> anyhow::Result<()> {
    if !config.file_name.contains(CONTRACT_NAME_PLACEHOLDER) {
        anyhow::bail!(
            "Output must contain {CONTRACT_NAME_PLACEHOLDER} when generating from a directory"
        );
    }

    let report = build_helper::generate_from_directory(dir, config)?;
    info!(
        generated = report.generated.len(),
        failed = report.failures.len(),
        "Finished"
    );
    if !report.is_success() {
        anyhow::bail!(
            "{} of {} application specs failed to generate",
            report.failures.len(),
            report.failures.len() + report.generated.len()
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = args.build_config()?;
    if args.app_spec.is_dir() {
        generate_directory(&args.app_spec, &config)
    } else {
        let output = build_helper::generate_from_path(&args.app_spec, &config)?;
        println!("Generated: {}", output.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SPEC: &str = "../specs/HelloWorld.arc56.json";

    fn output_for(args: &[&str], spec: &Path, contract_name: &str) -> PathBuf {
        let args = std::iter::once("algokit-client-gen").chain(args.iter().copied());
        Args::parse_from(args)
            .build_config()
            .unwrap()
            .output_path(spec, contract_name)
    }

    #[test]
    fn test_named_output_goes_to_working_directory() {
        let spec = Path::new(SPEC);
        assert_eq!(
            output_for(&["-a", SPEC, "-o", "client.py"], spec, "HelloWorld"),
            Path::new(".").join("client.py")
        );
        assert_eq!(
            output_for(&["-a", SPEC, "-o", "out/client.py"], spec, "HelloWorld"),
            Path::new("out/client.py")
        );
    }

    #[test]
    fn test_default_output_sits_next_to_spec() {
        assert_eq!(
            output_for(&["-a", SPEC], Path::new(SPEC), "HelloWorld"),
            Path::new("../specs/hello_world_client.py")
        );
    }

    #[test]
    fn test_directory_pattern_sits_next_to_each_spec() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_str().unwrap();
        let spec = dir.path().join("nested/Counter.arc32.json");
        assert_eq!(
            output_for(&["-a", root, "-o", "{contract_name}.py"], &spec, "Counter"),
            dir.path().join("nested/counter.py")
        );
    }
}
