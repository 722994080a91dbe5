//! Implementation of the `specgen generate` command.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::SpecgenConfig;
use crate::emitter::{self, EmitOptions, EmitSummary, ExpectedSource};
use crate::input;

/// Arguments for the `specgen generate` command.
pub struct GenerateArgs {
    /// Spec file or directory containing it.
    pub input: PathBuf,
    /// Output directory, overriding config.
    pub output: Option<PathBuf>,
    /// Section globs, overriding the configured include list.
    pub sections: Vec<String>,
    /// Expected-output source, overriding config.
    pub expected: Option<ExpectedSource>,
    /// Leave preambles out of generated tests.
    pub no_preamble: bool,
    /// Remove the output directory first.
    pub clean: bool,
}

/// Execute the `specgen generate` command.
pub fn execute(args: GenerateArgs, config: &SpecgenConfig) -> Result<EmitSummary> {
    let spec = input::load_spec(&args.input, config, &args.sections)
        .with_context(|| format!("failed to load spec from {}", args.input.display()))?;

    let output_dir = args.output.unwrap_or_else(|| config.output.dir.clone());

    let mut options = EmitOptions::from_config(config, spec.source_name());
    if let Some(expected) = args.expected {
        options.expected = expected;
    }
    if args.no_preamble {
        options.preamble = false;
    }
    if args.clean {
        options.clean = true;
    }

    let summary = emitter::emit(&spec.examples, &output_dir, &options)
        .with_context(|| format!("failed to generate tests in {}", output_dir.display()))?;

    println!(
        "Generated {} tests in {} sections at: {}",
        summary.tests,
        summary.sections,
        summary.output_dir.display()
    );
    if spec.examples.len() < spec.total {
        println!(
            "  - {} of {} examples selected by section filters",
            spec.examples.len(),
            spec.total
        );
    }

    Ok(summary)
}
