//! Implementation of the `specgen list` command.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::OutputFormat;
use crate::config::SpecgenConfig;
use crate::emitter::group_by_section;
use crate::input;
use crate::parser::SpecExample;

/// Arguments for the `specgen list` command.
pub struct ListArgs {
    pub input: PathBuf,
    pub sections: Vec<String>,
    pub format: OutputFormat,
}

/// One section of a spec document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSummary {
    pub section: String,
    pub module: String,
    pub examples: usize,
    pub first_example: u32,
    pub last_example: u32,
    pub start_line: usize,
    pub end_line: usize,
}

/// Summarize examples per section, in first-appearance order.
pub fn summarize(examples: &[SpecExample]) -> Vec<SectionSummary> {
    group_by_section(examples, &[])
        .into_iter()
        .filter_map(|group| {
            let first = group.examples.first()?;
            let last = group.examples.last()?;
            Some(SectionSummary {
                section: group.name.to_string(),
                module: group.module.clone(),
                examples: group.examples.len(),
                first_example: first.example,
                last_example: last.example,
                start_line: first.start_line,
                end_line: last.end_line,
            })
        })
        .collect()
}

/// Execute the `specgen list` command.
pub fn execute(args: ListArgs, config: &SpecgenConfig) -> Result<()> {
    let spec = input::load_spec(&args.input, config, &args.sections)
        .with_context(|| format!("failed to load spec from {}", args.input.display()))?;
    let summaries = summarize(&spec.examples);

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summaries)
                .context("failed to serialize section list")?;
            println!("{}", json);
        }
        OutputFormat::Text => print!("{}", format_text(&summaries, spec.examples.len())),
    }

    Ok(())
}

fn format_text(summaries: &[SectionSummary], total: usize) -> String {
    let width = summaries
        .iter()
        .map(|s| display_name(&s.section).len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for summary in summaries {
        out.push_str(&format!(
            "{:<width$}  {:>4} examples  #{}-#{}  lines {}-{}\n",
            display_name(&summary.section),
            summary.examples,
            summary.first_example,
            summary.last_example,
            summary.start_line,
            summary.end_line,
            width = width,
        ));
    }
    out.push_str(&format!(
        "\n{} examples in {} sections\n",
        total,
        summaries.len()
    ));
    out
}

fn display_name(section: &str) -> &str {
    if section.is_empty() {
        "(no section)"
    } else {
        section
    }
}
