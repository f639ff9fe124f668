//! Batch generation over many application specs.
//!
//! Use this from tooling that regenerates every client in a project:
//!
//! ```rust,ignore
//! use algokit_client_generator::build_helper::{self, BuildConfig};
//!
//! let report = build_helper::generate_from_directory("contracts/artifacts", &BuildConfig::default())?;
//! for (spec, err) in &report.failures {
//!     eprintln!("{}: {err}", spec.display());
//! }
//! ```
//!
//! Each spec is generated independently. A failing spec is logged and recorded
//! in the [`BatchReport`] while the rest of the batch continues, unless
//! [`BuildConfig::fail_fast`] is set.

use crate::config::GeneratorConfig;
use crate::driver::{write_atomically, ClientGenerator};
use crate::error::{GeneratorError, GeneratorResult};
use crate::naming::{Sanitizer, SanitizingNames};
use algokit_app_spec::AppSpec;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Placeholder replaced by the contract's snake_case name in output file names.
pub const CONTRACT_NAME_PLACEHOLDER: &str = "{contract_name}";

const ARC32_FILE_NAME: &str = "application.json";
const SPEC_SUFFIXES: &[&str] = &[".arc32.json", ".arc56.json"];

/// Configuration for batch generation.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Configuration passed to every generation.
    pub generator_config: GeneratorConfig,
    /// Output file name; [`CONTRACT_NAME_PLACEHOLDER`] is substituted.
    pub file_name: String,
    /// Directory receiving every output. When unset, each client is written
    /// next to its spec.
    pub output_dir: Option<PathBuf>,
    /// Abort on the first failing spec.
    pub fail_fast: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            generator_config: GeneratorConfig::default(),
            file_name: format!("{CONTRACT_NAME_PLACEHOLDER}_client.py"),
            output_dir: None,
            fail_fast: false,
        }
    }
}

impl BuildConfig {
    /// Creates a new build configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the generator configuration.
    #[must_use]
    pub fn with_generator_config(mut self, config: GeneratorConfig) -> Self {
        self.generator_config = config;
        self
    }

    /// Sets the output file name pattern.
    #[must_use]
    pub fn with_file_name(mut self, pattern: impl Into<String>) -> Self {
        self.file_name = pattern.into();
        self
    }

    /// Writes every client into `dir`.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Sets whether the first failure aborts the batch.
    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Output path for the client of `contract_name` read from `spec_path`.
    pub fn output_path(&self, spec_path: &Path, contract_name: &str) -> PathBuf {
        let file_name = self.file_name.replace(
            CONTRACT_NAME_PLACEHOLDER,
            &SanitizingNames.variable_name(contract_name),
        );
        match &self.output_dir {
            Some(dir) => dir.join(file_name),
            None => spec_path
                .parent()
                .map_or_else(|| PathBuf::from(&file_name), |dir| dir.join(&file_name)),
        }
    }
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Clients written, in input order.
    pub generated: Vec<PathBuf>,
    /// Specs that failed, with the cause.
    pub failures: Vec<(PathBuf, GeneratorError)>,
}

impl BatchReport {
    /// Returns true if no spec failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Returns true if `path` names an application spec file.
pub fn is_spec_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| {
            name == ARC32_FILE_NAME || SPEC_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
        })
}

/// Recursively collects spec files under `dir`, sorted by path. Symlinked
/// directories are not descended into.
///
/// # Errors
///
/// Returns an error if a directory cannot be read.
pub fn find_spec_files(dir: impl AsRef<Path>) -> GeneratorResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.as_ref().to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|e| GeneratorError::io(&dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| GeneratorError::io(&dir, e))?;
            let file_type = entry.file_type().map_err(|e| GeneratorError::io(&dir, e))?;
            let path = entry.path();
            if file_type.is_dir() {
                pending.push(path);
            } else if is_spec_file(&path) {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}

/// Generates one client, returning where it was written.
///
/// # Errors
///
/// Returns an error if the spec cannot be read or generated, or the output
/// cannot be written.
pub fn generate_from_path(
    spec_path: impl AsRef<Path>,
    config: &BuildConfig,
) -> GeneratorResult<PathBuf> {
    let spec_path = spec_path.as_ref();
    let spec_json = fs::read_to_string(spec_path).map_err(|e| GeneratorError::io(spec_path, e))?;
    let spec: Value = serde_json::from_str(&spec_json)?;
    let contract_name = AppSpec::from_value(spec.clone())?.contract_name().to_string();

    let output = ClientGenerator::new(config.generator_config.clone()).generate_from_value(&spec)?;
    let output_path = config.output_path(spec_path, &contract_name);
    write_atomically(&output_path, &output)?;

    info!(
        spec = %spec_path.display(),
        output = %output_path.display(),
        contract = %contract_name,
        "Generated client"
    );
    Ok(output_path)
}

/// Generates a client for each of `spec_paths`.
///
/// # Errors
///
/// Per-spec failures are collected in the report. An error is returned only
/// when [`BuildConfig::fail_fast`] is set and a spec fails.
pub fn generate_from_paths(
    spec_paths: &[impl AsRef<Path>],
    config: &BuildConfig,
) -> GeneratorResult<BatchReport> {
    let mut report = BatchReport::default();
    for spec_path in spec_paths {
        let spec_path = spec_path.as_ref();
        match generate_from_path(spec_path, config) {
            Ok(output) => report.generated.push(output),
            Err(err) if config.fail_fast => {
                error!(spec = %spec_path.display(), error = %err, "Generation failed, aborting");
                return Err(err);
            }
            Err(err) => {
                error!(spec = %spec_path.display(), error = %err, "Generation failed");
                report.failures.push((spec_path.to_path_buf(), err));
            }
        }
    }

    debug!(
        generated = report.generated.len(),
        failed = report.failures.len(),
        "Batch finished"
    );
    Ok(report)
}

/// Scans `spec_dir` for spec files and generates a client for each.
///
/// # Errors
///
/// Returns an error if the directory cannot be scanned, or as described by
/// [`generate_from_paths`].
pub fn generate_from_directory(
    spec_dir: impl AsRef<Path>,
    config: &BuildConfig,
) -> GeneratorResult<BatchReport> {
    let spec_dir = spec_dir.as_ref();
    let spec_paths = find_spec_files(spec_dir)?;
    if spec_paths.is_empty() {
        warn!(dir = %spec_dir.display(), "No application specs found");
    }
    generate_from_paths(&spec_paths, config)
}
