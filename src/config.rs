//! Configuration file handling for specgen.
//!
//! This module defines the `.specgen.toml` configuration schema and provides
//! functions for locating, loading, validating, and saving it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::emitter::ExpectedSource;

/// The default configuration filename.
pub const CONFIG_FILENAME: &str = ".specgen.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SpecgenConfig {
    /// Where the spec document is read from.
    #[serde(default)]
    pub input: InputSection,
    /// Where generated tests are written.
    #[serde(default)]
    pub output: OutputSection,
    /// The function generated tests call.
    #[serde(default)]
    pub harness: HarnessSection,
    /// What goes into generated tests.
    #[serde(default)]
    pub generate: GenerateSection,
    /// Which sections are processed.
    #[serde(default)]
    pub sections: SectionsSection,
}

/// Input settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputSection {
    /// File name looked up when the input argument is a directory.
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputSection {
    /// Directory generated test modules are written to.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Remove previously generated files, keeping the harness module.
    #[serde(default)]
    pub clean: bool,
}

/// Test harness settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HarnessSection {
    /// Sibling module holding the harness, declared in the generated `mod.rs`.
    /// When empty, `function` must be a full path.
    #[serde(default = "default_harness_module")]
    pub module: String,
    /// Function every generated test calls with `(input, expected)`.
    #[serde(default = "default_harness_function")]
    pub function: String,
}

/// Generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateSection {
    /// Source of the expected HTML written into tests.
    #[serde(default)]
    pub expected: ExpectedSource,
    /// Copy each example's preamble into its test as comments.
    #[serde(default = "default_true")]
    pub preamble: bool,
}

/// Section filters, as glob patterns over section names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SectionsSection {
    /// Only sections matching one of these are kept (all when empty).
    #[serde(default)]
    pub include: Vec<String>,
    /// Sections matching any of these are dropped.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_file_name() -> String {
    "spec.md".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("tests/spec")
}

fn default_harness_module() -> String {
    "harness".to_string()
}

fn default_harness_function() -> String {
    "run_spec_test".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            clean: false,
        }
    }
}

impl Default for HarnessSection {
    fn default() -> Self {
        Self {
            module: default_harness_module(),
            function: default_harness_function(),
        }
    }
}

impl Default for GenerateSection {
    fn default() -> Self {
        Self {
            expected: ExpectedSource::default(),
            preamble: true,
        }
    }
}

impl SpecgenConfig {
    /// Load configuration from a file path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: SpecgenConfig =
            toml::from_str(content).context("failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).context("failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.input.file_name.trim().is_empty() {
            anyhow::bail!("input.file_name cannot be empty");
        }

        if self.output.dir.as_os_str().is_empty() {
            anyhow::bail!("output.dir cannot be empty");
        }

        if !is_rust_path(&self.harness.function) {
            anyhow::bail!(
                "harness.function must be a Rust path, got '{}'",
                self.harness.function
            );
        }

        if !self.harness.module.is_empty() && !is_rust_identifier(&self.harness.module) {
            anyhow::bail!(
                "harness.module must be a Rust identifier, got '{}'",
                self.harness.module
            );
        }

        for pattern in self.sections.include.iter().chain(&self.sections.exclude) {
            glob::Pattern::new(pattern)
                .with_context(|| format!("invalid section pattern '{}'", pattern))?;
        }

        Ok(())
    }
}

/// Find the config file by walking up from `start`.
pub fn find_config_path_from(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load the configuration in effect.
///
/// An explicit path must exist. Otherwise the nearest `.specgen.toml` in the
/// current directory or its parents is used, falling back to defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<(SpecgenConfig, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let config = SpecgenConfig::load(path)?;
        return Ok((config, Some(path.to_path_buf())));
    }

    let cwd = std::env::current_dir().context("failed to get current directory")?;
    match find_config_path_from(&cwd) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let config = SpecgenConfig::load(&path)?;
            Ok((config, Some(path)))
        }
        None => {
            tracing::debug!("no config file found, using defaults");
            Ok((SpecgenConfig::default(), None))
        }
    }
}

fn is_rust_identifier(s: &str) -> bool {
    let s = s.strip_prefix("r#").unwrap_or(s);
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    s != "_" && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_rust_path(s: &str) -> bool {
    !s.is_empty() && s.split("::").all(is_rust_identifier)
}
