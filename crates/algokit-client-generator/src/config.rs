//! Generator configuration.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Which parts of the client are emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Client, factory, deploy parameters and composer.
    #[default]
    Full,
    /// Client only, with compiled program metadata stripped from the embedded spec.
    Minimal,
}

impl GenerationMode {
    /// Returns true for [`GenerationMode::Full`].
    pub const fn is_full(self) -> bool {
        matches!(self, Self::Full)
    }
}

impl Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Minimal => write!(f, "minimal"),
        }
    }
}

/// How names from the spec are turned into Python identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingPolicy {
    /// Case-convert to PascalCase types and snake_case members.
    #[default]
    Sanitize,
    /// Keep the original spelling, escaping only what Python cannot parse.
    Preserve,
}

/// Configuration for client generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Output variant.
    pub mode: GenerationMode,
    /// Identifier policy.
    pub naming: NamingPolicy,
    /// One level of indentation in the generated module.
    pub indent: String,
    /// Name recorded in the generated file header.
    pub generator_name: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            mode: GenerationMode::Full,
            naming: NamingPolicy::Sanitize,
            indent: "    ".to_string(),
            generator_name: format!("algokit-client-generator {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl GeneratorConfig {
    /// Creates a new configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the generation mode.
    #[must_use]
    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the naming policy.
    #[must_use]
    pub fn with_naming(mut self, naming: NamingPolicy) -> Self {
        self.naming = naming;
        self
    }

    /// Keeps original spelling of spec names.
    #[must_use]
    pub fn with_preserved_names(self, preserve: bool) -> Self {
        self.with_naming(if preserve {
            NamingPolicy::Preserve
        } else {
            NamingPolicy::Sanitize
        })
    }

    /// Sets the indentation unit.
    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Sets the provenance name written to the header.
    #[must_use]
    pub fn with_generator_name(mut self, name: impl Into<String>) -> Self {
        self.generator_name = name.into();
        self
    }
}
