//! Top-level generation entry points.

use crate::config::GeneratorConfig;
use crate::context::GeneratorContext;
use crate::document::Document;
use crate::error::{GeneratorError, GeneratorResult};
use crate::generators::SECTIONS;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Generates typed Python clients from application specs.
///
/// # Example
///
/// ```rust,ignore
/// use algokit_client_generator::{ClientGenerator, GeneratorConfig};
///
/// let generator = ClientGenerator::new(GeneratorConfig::default());
/// let python = generator.generate(&std::fs::read_to_string("HelloWorld.arc56.json")?)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientGenerator {
    config: GeneratorConfig,
}

impl ClientGenerator {
    /// Creates a generator with the given configuration.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates a client from ARC-32 or ARC-56 JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, the spec is inconsistent,
    /// or a section fails to render.
    pub fn generate(&self, spec_json: &str) -> GeneratorResult<String> {
        let value: Value = serde_json::from_str(spec_json)?;
        self.generate_from_value(&value)
    }

    /// Generates a client from an already parsed spec document.
    ///
    /// # Errors
    ///
    /// See [`ClientGenerator::generate`].
    pub fn generate_from_value(&self, spec: &Value) -> GeneratorResult<String> {
        let ctx = GeneratorContext::new(spec, self.config.clone())?;

        let mut module = Document::new();
        for (name, section) in SECTIONS {
            let doc = section(&ctx)?;
            if doc.is_empty() {
                debug!(section = name, "Skipping empty section");
                continue;
            }
            module.gap(2).append(doc);
        }
        let output = module.render(&self.config.indent)?;

        info!(
            contract = %ctx.contract().name,
            client = %ctx.names().client,
            mode = %self.config.mode,
            bytes = output.len(),
            "Generated client"
        );
        Ok(output)
    }

    /// Reads `spec_path`, generates a client and writes it to `output_path`.
    ///
    /// The output is written to a temporary sibling first and renamed into
    /// place, so a failure never leaves a partial file behind.
    ///
    /// # Errors
    ///
    /// Returns an error if reading, generating or writing fails.
    pub fn generate_to_file(
        &self,
        spec_path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
    ) -> GeneratorResult<()> {
        let spec_path = spec_path.as_ref();
        let output_path = output_path.as_ref();

        let spec_json =
            fs::read_to_string(spec_path).map_err(|e| GeneratorError::io(spec_path, e))?;
        let output = self.generate(&spec_json)?;
        write_atomically(output_path, &output)?;

        info!(
            spec = %spec_path.display(),
            output = %output_path.display(),
            "Wrote client"
        );
        Ok(())
    }
}

/// Writes `contents` to a temporary file next to `path` and renames it over `path`.
pub(crate) fn write_atomically(path: &Path, contents: &str) -> GeneratorResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| GeneratorError::io(parent, e))?;
    }
    let file_name = path
        .file_name()
        .ok_or_else(|| GeneratorError::Internal(format!("{} is not a file path", path.display())))?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let result = fs::File::create(&tmp_path)
        .and_then(|mut file| {
            file.write_all(contents.as_bytes())?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp_path, path));
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(GeneratorError::io(path, e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationMode;

    const HELLO: &str = r#"{
        "name": "HelloWorld",
        "methods": [{
            "name": "hello",
            "args": [{"type": "string", "name": "name"}],
            "returns": {"type": "string"},
            "actions": {"create": ["NoOp"], "call": ["NoOp"]}
        }]
    }"#;

    #[test]
    fn test_sections_in_order() {
        let output = ClientGenerator::default().generate(HELLO).unwrap();
        let positions: Vec<usize> = [
            "# flake8: noqa",
            "import dataclasses",
            "_APP_SPEC_JSON = ",
            "def _parse_abi_args(",
            "class HelloArgs:",
            "class HelloWorldParams:",
            "class HelloWorldCreateTransactionParams:",
            "class HelloWorldSend:",
            "class HelloWorldState:",
            "class HelloWorldClient:",
            "class HelloWorldFactory:",
            "class HelloWorldComposer:",
        ]
        .iter()
        .map(|needle| output.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(output.ends_with('\n') && !output.ends_with("\n\n"));
    }

    #[test]
    fn test_sections_separated_by_two_blank_lines() {
        let output = ClientGenerator::default().generate(HELLO).unwrap();
        assert!(output.contains("# requires: algokit-utils@^3.0.0\n\n\n# common\n"));
        assert!(!output.contains("\n\n\n\n"));
    }

    #[test]
    fn test_invalid_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let spec_path = dir.path().join("broken.arc56.json");
        fs::write(&spec_path, r#"{"name": "Broken", "methods": [{"name": "f", "args": [{"type": "uint7"}], "returns": {"type": "void"}, "actions": {"create": [], "call": ["NoOp"]}}]}"#).unwrap();
        let output_path = dir.path().join("out").join("broken_client.py");

        let err = ClientGenerator::default()
            .generate_to_file(&spec_path, &output_path)
            .unwrap_err();
        assert!(err.is_input_error());
        assert!(!output_path.exists());
    }

    #[test]
    fn test_generate_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let spec_path = dir.path().join("hello.arc56.json");
        fs::write(&spec_path, HELLO).unwrap();
        let output_path = dir.path().join("nested").join("hello_client.py");

        let generator =
            ClientGenerator::new(GeneratorConfig::default().with_mode(GenerationMode::Minimal));
        generator.generate_to_file(&spec_path, &output_path).unwrap();

        let written = fs::read_to_string(&output_path).unwrap();
        assert_eq!(written, generator.generate(HELLO).unwrap());
        let leftovers: Vec<_> = fs::read_dir(output_path.parent().unwrap())
            .unwrap()
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_missing_spec_is_io_error() {
        let err = ClientGenerator::default()
            .generate_to_file("/nonexistent/app.json", "/tmp/never.py")
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Io { .. }));
    }
}
