//! Implementation of the `specgen check` command.
//!
//! Every selected example is rendered with the reference renderer and the
//! normalized result is compared with the spec's expected HTML.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::OutputFormat;
use crate::config::SpecgenConfig;
use crate::emitter::group_by_section;
use crate::input;
use crate::parser::SpecExample;
use crate::render::{self, Comparison};

/// Arguments for the `specgen check` command.
pub struct CheckArgs {
    pub input: PathBuf,
    pub sections: Vec<String>,
    pub format: OutputFormat,
    /// Fail when any example disagrees.
    pub strict: bool,
}

/// Per-section outcome.
#[derive(Debug, Serialize)]
pub struct SectionResult {
    pub section: String,
    pub passed: usize,
    pub failed: usize,
    /// Example numbers that disagree.
    pub failing: Vec<u32>,
}

/// Outcome of checking a whole document.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub sections: Vec<SectionResult>,
    /// Details of each disagreement.
    pub failures: Vec<Comparison>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Compare every example with the reference renderer.
pub fn build_report(examples: &[SpecExample]) -> CheckReport {
    let mut sections = Vec::new();
    let mut failures = Vec::new();

    for group in group_by_section(examples, &[]) {
        let mut result = SectionResult {
            section: group.name.to_string(),
            passed: 0,
            failed: 0,
            failing: Vec::new(),
        };
        for example in group.examples {
            let comparison = render::compare(example);
            if comparison.matches {
                result.passed += 1;
            } else {
                result.failed += 1;
                result.failing.push(example.example);
                failures.push(comparison);
            }
        }
        sections.push(result);
    }

    let failed = failures.len();
    CheckReport {
        total: examples.len(),
        passed: examples.len() - failed,
        failed,
        sections,
        failures,
    }
}

/// Execute the `specgen check` command.
pub fn execute(args: CheckArgs, config: &SpecgenConfig) -> Result<CheckReport> {
    let spec = input::load_spec(&args.input, config, &args.sections)
        .with_context(|| format!("failed to load spec from {}", args.input.display()))?;
    let report = build_report(&spec.examples);

    match args.format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&report).context("failed to serialize report")?;
            println!("{}", json);
        }
        OutputFormat::Text => print!("{}", format_text(&report)),
    }

    if args.strict && !report.is_clean() {
        anyhow::bail!(
            "{} of {} examples disagree with the reference renderer",
            report.failed,
            report.total
        );
    }

    Ok(report)
}

fn format_text(report: &CheckReport) -> String {
    let mut out = String::new();

    for section in &report.sections {
        let name = if section.section.is_empty() {
            "(no section)"
        } else {
            section.section.as_str()
        };
        let status = if section.failed == 0 { "ok" } else { "FAIL" };
        out.push_str(&format!(
            "{:<4} {} ({}/{})\n",
            status,
            name,
            section.passed,
            section.passed + section.failed
        ));
        if !section.failing.is_empty() {
            let numbers: Vec<String> = section.failing.iter().map(|n| format!("#{}", n)).collect();
            out.push_str(&format!("       failing: {}\n", numbers.join(", ")));
        }
    }

    for failure in &report.failures {
        out.push_str(&format!(
            "\n=== Example {} ({}) ===\nexpected:\n{}actual:\n{}",
            failure.example, failure.section, failure.expected, failure.actual
        ));
    }

    out.push_str(&format!(
        "\n{}/{} examples agree with the reference renderer\n",
        report.passed, report.total
    ));
    out
}
