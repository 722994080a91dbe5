//! Implementation of the `specgen extract` command.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::config::SpecgenConfig;
use crate::input;

/// Arguments for the `specgen extract` command.
pub struct ExtractArgs {
    pub input: PathBuf,
    pub sections: Vec<String>,
    /// Destination file; stdout when absent.
    pub output: Option<PathBuf>,
}

/// Execute the `specgen extract` command.
pub fn execute(args: ExtractArgs, config: &SpecgenConfig) -> Result<()> {
    let spec = input::load_spec(&args.input, config, &args.sections)
        .with_context(|| format!("failed to load spec from {}", args.input.display()))?;

    let mut json =
        serde_json::to_string_pretty(&spec.examples).context("failed to serialize examples")?;
    json.push('\n');

    match args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "Extracted {} examples to {}",
                spec.examples.len(),
                path.display()
            );
        }
        None => print!("{}", json),
    }

    Ok(())
}
