//! Locating, reading, and filtering spec documents.

use glob::Pattern;
use std::path::{Path, PathBuf};

use crate::config::SpecgenConfig;
use crate::error::GenerateError;
use crate::parser::{self, SpecExample};

/// A parsed spec document.
#[derive(Debug)]
pub struct LoadedSpec {
    /// Path the document was read from.
    pub path: PathBuf,
    /// Examples kept after section filtering.
    pub examples: Vec<SpecExample>,
    /// Number of examples before filtering.
    pub total: usize,
}

impl LoadedSpec {
    /// File name of the source document, for display in generated code.
    pub fn source_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Include/exclude glob patterns over section names.
#[derive(Debug, Default)]
pub struct SectionFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl SectionFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, GenerateError> {
        Ok(Self {
            include: compile_patterns(include)?,
            exclude: compile_patterns(exclude)?,
        })
    }

    /// Build the filter from config, with `sections` replacing the configured
    /// include patterns when non-empty.
    pub fn from_config(config: &SpecgenConfig, sections: &[String]) -> Result<Self, GenerateError> {
        let include = if sections.is_empty() {
            config.sections.include.as_slice()
        } else {
            sections
        };
        Self::new(include, &config.sections.exclude)
    }

    pub fn matches(&self, section: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|p| p.matches(section));
        included && !self.exclude.iter().any(|p| p.matches(section))
    }

    /// Keep the examples whose section matches.
    pub fn apply(&self, examples: Vec<SpecExample>) -> Vec<SpecExample> {
        examples
            .into_iter()
            .filter(|e| self.matches(&e.section))
            .collect()
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>, GenerateError> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|source| GenerateError::InvalidPattern {
                pattern: p.clone(),
                source,
            })
        })
        .collect()
}

/// Resolve the input argument to a spec file.
///
/// A directory resolves to `file_name` inside it; anything else is taken as
/// the spec file itself.
pub fn resolve_spec_path(input: &Path, file_name: &str) -> Result<PathBuf, GenerateError> {
    let path = if input.is_dir() {
        input.join(file_name)
    } else {
        input.to_path_buf()
    };

    if !path.is_file() {
        return Err(GenerateError::SpecNotFound(path));
    }
    Ok(path)
}

/// Read a spec document, normalizing CRLF line endings.
pub fn read_spec(path: &Path) -> Result<String, GenerateError> {
    let content = std::fs::read_to_string(path).map_err(|source| GenerateError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    if content.contains("\r\n") {
        Ok(content.replace("\r\n", "\n"))
    } else {
        Ok(content)
    }
}

/// Resolve, read, parse, and filter a spec document.
pub fn load_spec(
    input: &Path,
    config: &SpecgenConfig,
    sections: &[String],
) -> Result<LoadedSpec, GenerateError> {
    let filter = SectionFilter::from_config(config, sections)?;
    let path = resolve_spec_path(input, &config.input.file_name)?;
    let content = read_spec(&path)?;

    let all = parser::parse(&content);
    let total = all.len();
    let examples = filter.apply(all);

    tracing::debug!(
        path = %path.display(),
        total,
        kept = examples.len(),
        "loaded spec"
    );
    if examples.is_empty() {
        tracing::warn!(path = %path.display(), "no examples selected");
    }

    Ok(LoadedSpec {
        path,
        examples,
        total,
    })
}
