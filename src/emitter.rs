//! Test module generation.
//!
//! Parsed examples are grouped by section and written out as one Rust test
//! module per section, a `mod.rs` declaring those modules, and a
//! `manifest.json` listing every generated test.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SpecgenConfig;
use crate::error::GenerateError;
use crate::parser::SpecExample;
use crate::render::{normalize_html, render_markdown};

/// Name of the generated module index.
pub const MOD_FILENAME: &str = "mod.rs";

/// Name of the generated test manifest.
pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Module name for examples that appear before any heading.
const UNTITLED_MODULE: &str = "untitled";

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof",
    "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Where the expected HTML of a generated test comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedSource {
    /// The HTML written in the spec.
    #[default]
    Spec,
    /// The reference renderer's output for the example's markdown.
    Reference,
}

/// Options controlling generated test code.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Spec file name shown in generated headers and span comments.
    pub source_name: String,
    /// Harness module declared in `mod.rs`, if any.
    pub harness_module: Option<String>,
    /// Harness function called by every test.
    pub harness_function: String,
    pub expected: ExpectedSource,
    /// Copy preambles into tests as comments.
    pub preamble: bool,
    /// Remove the output directory before writing.
    pub clean: bool,
}

impl EmitOptions {
    /// Build options from configuration.
    pub fn from_config(config: &SpecgenConfig, source_name: impl Into<String>) -> Self {
        let module = config.harness.module.trim();
        Self {
            source_name: source_name.into(),
            harness_module: (!module.is_empty()).then(|| module.to_string()),
            harness_function: config.harness.function.clone(),
            expected: config.generate.expected,
            preamble: config.generate.preamble,
            clean: config.output.clean,
        }
    }

    /// The path generated tests use to call the harness.
    pub fn harness_call(&self) -> String {
        match &self.harness_module {
            Some(module) => format!("super::{}::{}", module, self.harness_function),
            None => self.harness_function.clone(),
        }
    }
}

/// Examples sharing one section, in document order.
#[derive(Debug)]
pub struct SectionGroup<'a> {
    /// Section heading text.
    pub name: &'a str,
    /// Rust module name for the section.
    pub module: String,
    pub examples: Vec<&'a SpecExample>,
}

/// Index of everything written by [`emit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub source: String,
    pub generated_at: String,
    pub sections: Vec<ManifestSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestSection {
    pub name: String,
    pub module: String,
    pub file: String,
    pub tests: Vec<ManifestTest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestTest {
    pub name: String,
    pub example: u32,
    pub start_line: usize,
    pub end_line: usize,
}

/// Outcome of an [`emit`] run.
#[derive(Debug)]
pub struct EmitSummary {
    pub output_dir: PathBuf,
    pub files: Vec<PathBuf>,
    pub sections: usize,
    pub tests: usize,
}

/// Group examples by section.
///
/// Groups are ordered by the first appearance of their section. A section
/// that reappears later in the document is merged into its first group.
/// `reserved` names are never handed out as module names.
pub fn group_by_section<'a>(
    examples: &'a [SpecExample],
    reserved: &[&str],
) -> Vec<SectionGroup<'a>> {
    let mut groups: Vec<SectionGroup<'a>> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut taken: HashSet<String> = reserved.iter().map(|s| s.to_string()).collect();

    for example in examples {
        let name = example.section.as_str();
        match index.get(name).copied() {
            Some(i) => groups[i].examples.push(example),
            None => {
                let module = unique_name(module_name(name), &mut taken);
                index.insert(name, groups.len());
                groups.push(SectionGroup {
                    name,
                    module,
                    examples: vec![example],
                });
            }
        }
    }

    groups
}

/// Convert section text to a snake_case Rust module name.
pub fn module_name(section: &str) -> String {
    let mut name = String::with_capacity(section.len());
    for c in section.chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_lowercase());
        } else if !name.is_empty() && !name.ends_with('_') {
            name.push('_');
        }
    }
    let name = name.trim_end_matches('_');

    if name.is_empty() {
        UNTITLED_MODULE.to_string()
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("section_{}", name)
    } else if RUST_KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

fn unique_name(base: String, taken: &mut HashSet<String>) -> String {
    let mut candidate = base.clone();
    let mut suffix = 2;
    while taken.contains(&candidate) {
        candidate = format!("{}_{}", base, suffix);
        suffix += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

/// Name of the test function for an example.
pub fn test_name(example: &SpecExample) -> String {
    format!("example_{}", example.example)
}

fn generated_header(options: &EmitOptions) -> String {
    format!(
        "// @generated by specgen from {}. Do not edit by hand.\n",
        options.source_name
    )
}

/// Render the Rust source of one section's test module.
pub fn render_section(group: &SectionGroup<'_>, options: &EmitOptions) -> String {
    let mut out = generated_header(options);
    let _ = writeln!(out, "// Section: {}", group.name);

    let harness = options.harness_call();
    for example in &group.examples {
        out.push('\n');
        out.push_str("#[test]\n");
        let _ = writeln!(out, "fn {}() {{", test_name(example));

        if options.preamble {
            for line in example.preamble.lines() {
                let line = line.trim_end();
                if !line.is_empty() {
                    let _ = writeln!(out, "    // {}", line);
                }
            }
        }
        let _ = writeln!(
            out,
            "    // {}:{}-{}",
            options.source_name, example.start_line, example.end_line
        );

        let expected = match options.expected {
            ExpectedSource::Spec => example.html.clone(),
            ExpectedSource::Reference => normalize_html(&render_markdown(&example.markdown)),
        };
        let _ = writeln!(out, "    let input = {:?};", example.markdown);
        let _ = writeln!(out, "    let expected = {:?};", expected);
        out.push('\n');
        let _ = writeln!(out, "    {}(input, expected);", harness);
        out.push_str("}\n");
    }

    out
}

/// Render the `mod.rs` declaring the harness and every section module.
pub fn render_mod_file(groups: &[SectionGroup<'_>], options: &EmitOptions) -> String {
    let mut out = generated_header(options);
    out.push('\n');
    if let Some(module) = &options.harness_module {
        let _ = writeln!(out, "mod {};", module);
    }
    for group in groups {
        let _ = writeln!(out, "mod {};", group.module);
    }
    out
}

/// Build the manifest describing the generated modules.
pub fn build_manifest(
    groups: &[SectionGroup<'_>],
    options: &EmitOptions,
    generated_at: String,
) -> Manifest {
    let sections = groups
        .iter()
        .map(|group| ManifestSection {
            name: group.name.to_string(),
            module: group.module.clone(),
            file: format!("{}.rs", group.module),
            tests: group
                .examples
                .iter()
                .map(|example| ManifestTest {
                    name: test_name(example),
                    example: example.example,
                    start_line: example.start_line,
                    end_line: example.end_line,
                })
                .collect(),
        })
        .collect();

    Manifest {
        source: options.source_name.clone(),
        generated_at,
        sections,
    }
}

/// Write test modules, `mod.rs`, and `manifest.json` into `output_dir`.
pub fn emit(
    examples: &[SpecExample],
    output_dir: &Path,
    options: &EmitOptions,
) -> Result<EmitSummary, GenerateError> {
    if options.clean && output_dir.exists() {
        clean_output_dir(output_dir, options)?;
    }
    fs::create_dir_all(output_dir).map_err(|e| GenerateError::write_failed(output_dir, e))?;

    let reserved: Vec<&str> = options.harness_module.as_deref().into_iter().collect();
    let groups = group_by_section(examples, &reserved);
    let mut files = Vec::with_capacity(groups.len() + 2);

    for group in &groups {
        let path = output_dir.join(format!("{}.rs", group.module));
        write_file(&path, &render_section(group, options))?;
        tracing::debug!(
            file = %path.display(),
            section = group.name,
            tests = group.examples.len(),
            "wrote section module"
        );
        files.push(path);
    }

    let mod_path = output_dir.join(MOD_FILENAME);
    write_file(&mod_path, &render_mod_file(&groups, options))?;
    files.push(mod_path);

    let manifest = build_manifest(&groups, options, chrono::Utc::now().to_rfc3339());
    let manifest_path = output_dir.join(MANIFEST_FILENAME);
    let mut json = serde_json::to_string_pretty(&manifest)?;
    json.push('\n');
    write_file(&manifest_path, &json)?;
    files.push(manifest_path);

    tracing::info!(
        dir = %output_dir.display(),
        sections = groups.len(),
        tests = examples.len(),
        "generated test modules"
    );

    Ok(EmitSummary {
        output_dir: output_dir.to_path_buf(),
        files,
        sections: groups.len(),
        tests: examples.len(),
    })
}

/// Remove generated files from `output_dir`.
///
/// Every `.rs` file and the manifest are removed, except the harness module,
/// which is written by hand and still declared by the new `mod.rs`.
/// Subdirectories are not touched.
fn clean_output_dir(output_dir: &Path, options: &EmitOptions) -> Result<(), GenerateError> {
    tracing::debug!(dir = %output_dir.display(), "cleaning output directory");
    let harness_file = options
        .harness_module
        .as_ref()
        .map(|module| format!("{module}.rs"));

    let entries =
        fs::read_dir(output_dir).map_err(|e| GenerateError::write_failed(output_dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| GenerateError::write_failed(output_dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();
        if harness_file.as_deref() == Some(file_name.as_ref()) {
            continue;
        }
        let generated = file_name == MANIFEST_FILENAME
            || path.extension().is_some_and(|ext| ext == "rs");
        if generated {
            tracing::trace!(file = %path.display(), "removing stale file");
            fs::remove_file(&path).map_err(|e| GenerateError::write_failed(&path, e))?;
        }
    }
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<(), GenerateError> {
    fs::write(path, content).map_err(|e| GenerateError::write_failed(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn example(n: u32, section: &str, markdown: &str, html: &str) -> SpecExample {
        SpecExample {
            markdown: markdown.to_string(),
            html: html.to_string(),
            example: n,
            start_line: n as usize * 10,
            end_line: n as usize * 10 + 4,
            section: section.to_string(),
            preamble: "\nSome context.\n\n".to_string(),
        }
    }

    fn options() -> EmitOptions {
        EmitOptions::from_config(&SpecgenConfig::default(), "spec.md")
    }

    #[test]
    fn test_module_names_are_snake_case() {
        assert_eq!(module_name("Tabs"), "tabs");
        assert_eq!(
            module_name("Link reference definitions"),
            "link_reference_definitions"
        );
        assert_eq!(
            module_name("Emphasis and strong emphasis"),
            "emphasis_and_strong_emphasis"
        );
        assert_eq!(module_name("  Raw HTML (inline)  "), "raw_html_inline");
        assert_eq!(module_name("Entity & numeric refs"), "entity_numeric_refs");
    }

    #[test]
    fn test_module_names_handle_awkward_sections() {
        assert_eq!(module_name(""), "untitled");
        assert_eq!(module_name("???"), "untitled");
        assert_eq!(module_name("2.1 Characters"), "section_2_1_characters");
        assert_eq!(module_name("Type"), "type_");
        assert_eq!(module_name("Über"), "ber");
    }

    #[test]
    fn test_grouping_keeps_first_appearance_order() {
        let examples = vec![
            example(1, "Tabs", "a\n", "<p>a</p>\n"),
            example(2, "Lists", "b\n", "<p>b</p>\n"),
            example(3, "Tabs", "c\n", "<p>c</p>\n"),
        ];

        let groups = group_by_section(&examples, &[]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Tabs");
        let numbers: Vec<u32> = groups[0].examples.iter().map(|e| e.example).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(groups[1].name, "Lists");
    }

    #[test]
    fn test_grouping_disambiguates_colliding_modules() {
        let examples = vec![
            example(1, "Tabs", "a\n", "<p>a</p>\n"),
            example(2, "tabs", "b\n", "<p>b</p>\n"),
            example(3, "Harness", "c\n", "<p>c</p>\n"),
        ];

        let groups = group_by_section(&examples, &["harness"]);

        let modules: Vec<&str> = groups.iter().map(|g| g.module.as_str()).collect();
        assert_eq!(modules, vec!["tabs", "tabs_2", "harness_2"]);
    }

    #[test]
    fn test_harness_call_paths() {
        let mut opts = options();
        assert_eq!(opts.harness_call(), "super::harness::run_spec_test");

        opts.harness_module = None;
        opts.harness_function = "crate::support::check".to_string();
        assert_eq!(opts.harness_call(), "crate::support::check");
    }

    #[test]
    fn test_render_section_writes_one_test_per_example() {
        let examples = vec![
            example(1, "Tabs", "\tfoo\n", "<pre><code>foo\n</code></pre>\n"),
            example(2, "Tabs", "say \"hi\"\n", "<p>say &quot;hi&quot;</p>\n"),
        ];
        let groups = group_by_section(&examples, &[]);

        let source = render_section(&groups[0], &options());

        assert!(source.starts_with("// @generated by specgen from spec.md."));
        assert!(source.contains("// Section: Tabs\n"));
        assert!(source.contains("#[test]\nfn example_1() {\n"));
        assert!(source.contains("#[test]\nfn example_2() {\n"));
        assert!(source.contains("    // Some context.\n"));
        assert!(source.contains("    // spec.md:10-14\n"));
        assert!(source.contains("    let input = \"\\tfoo\\n\";\n"));
        assert!(source.contains("    let input = \"say \\\"hi\\\"\\n\";\n"));
        assert!(source.contains("    super::harness::run_spec_test(input, expected);\n"));
    }

    #[test]
    fn test_render_section_without_preamble() {
        let examples = vec![example(1, "Tabs", "a\n", "<p>a</p>\n")];
        let groups = group_by_section(&examples, &[]);
        let mut opts = options();
        opts.preamble = false;

        let source = render_section(&groups[0], &opts);

        assert!(!source.contains("Some context."));
        assert!(source.contains("    // spec.md:10-14\n"));
    }

    #[test]
    fn test_render_section_with_reference_expectation() {
        let examples = vec![example(1, "Emphasis", "*a*\n", "<p>wrong</p>\n")];
        let groups = group_by_section(&examples, &[]);
        let mut opts = options();
        opts.expected = ExpectedSource::Reference;

        let source = render_section(&groups[0], &opts);

        assert!(source.contains("    let expected = \"<p><em>a</em></p>\\n\";\n"));
        assert!(!source.contains("wrong"));
    }

    #[test]
    fn test_mod_file_declares_harness_and_sections() {
        let examples = vec![
            example(1, "Tabs", "a\n", "<p>a</p>\n"),
            example(2, "Block quotes", "> b\n", "<blockquote>\n<p>b</p>\n</blockquote>\n"),
        ];
        let groups = group_by_section(&examples, &["harness"]);

        let source = render_mod_file(&groups, &options());

        assert!(source.ends_with("\nmod harness;\nmod tabs;\nmod block_quotes;\n"));
    }

    #[test]
    fn test_manifest_lists_every_test() {
        let examples = vec![
            example(1, "Tabs", "a\n", "<p>a</p>\n"),
            example(2, "Lists", "b\n", "<p>b</p>\n"),
        ];
        let groups = group_by_section(&examples, &[]);

        let manifest = build_manifest(&groups, &options(), "2026-01-01T00:00:00Z".to_string());

        assert_eq!(manifest.source, "spec.md");
        assert_eq!(manifest.sections.len(), 2);
        assert_eq!(manifest.sections[1].file, "lists.rs");
        assert_eq!(
            manifest.sections[1].tests,
            vec![ManifestTest {
                name: "example_2".to_string(),
                example: 2,
                start_line: 20,
                end_line: 24,
            }]
        );
    }

    #[test]
    fn test_emit_writes_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("spec");
        let examples = vec![
            example(1, "Tabs", "a\n", "<p>a</p>\n"),
            example(2, "Lists", "b\n", "<p>b</p>\n"),
        ];

        let summary = emit(&examples, &out, &options()).unwrap();

        assert_eq!(summary.sections, 2);
        assert_eq!(summary.tests, 2);
        assert_eq!(summary.files.len(), 4);
        assert!(out.join("tabs.rs").exists());
        assert!(out.join("lists.rs").exists());
        assert!(out.join(MOD_FILENAME).exists());

        let json = fs::read_to_string(out.join(MANIFEST_FILENAME)).unwrap();
        let manifest: Manifest = serde_json::from_str(&json).unwrap();
        assert_eq!(manifest.sections[0].module, "tabs");
        assert!(!manifest.generated_at.is_empty());
    }

    #[test]
    fn test_emit_with_no_examples_writes_empty_index() {
        let dir = TempDir::new().unwrap();

        let summary = emit(&[], dir.path(), &options()).unwrap();

        assert_eq!(summary.sections, 0);
        let mod_rs = fs::read_to_string(dir.path().join(MOD_FILENAME)).unwrap();
        assert!(mod_rs.ends_with("\nmod harness;\n"));
    }

    #[test]
    fn test_emit_clean_removes_stale_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("spec");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("stale.rs"), "// old").unwrap();
        let mut opts = options();
        opts.clean = true;

        emit(&[example(1, "Tabs", "a\n", "<p>a</p>\n")], &out, &opts).unwrap();

        assert!(!out.join("stale.rs").exists());
        assert!(out.join("tabs.rs").exists());
    }

    #[test]
    fn test_emit_clean_keeps_harness_module() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("spec");
        let examples = vec![example(1, "Tabs", "a\n", "<p>a</p>\n")];
        emit(&examples, &out, &options()).unwrap();
        fs::write(out.join("harness.rs"), "// handwritten").unwrap();
        fs::write(out.join("stale.rs"), "// old").unwrap();
        fs::create_dir_all(out.join("fixtures")).unwrap();
        let mut opts = options();
        opts.clean = true;

        emit(&examples, &out, &opts).unwrap();

        let harness = fs::read_to_string(out.join("harness.rs")).unwrap();
        assert_eq!(harness, "// handwritten");
        assert!(!out.join("stale.rs").exists());
        assert!(out.join("fixtures").is_dir());
        assert!(out.join("tabs.rs").exists());
        let mod_rs = fs::read_to_string(out.join(MOD_FILENAME)).unwrap();
        assert!(mod_rs.contains("\nmod harness;\n"));
    }

    #[test]
    fn test_emit_keeps_stale_files_without_clean() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("harness.rs"), "// handwritten").unwrap();

        emit(&[example(1, "Tabs", "a\n", "<p>a</p>\n")], dir.path(), &options()).unwrap();

        let harness = fs::read_to_string(dir.path().join("harness.rs")).unwrap();
        assert_eq!(harness, "// handwritten");
    }
}
