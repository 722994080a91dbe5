use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::emitter::ExpectedSource;

/// Generate Rust test suites from CommonMark specification documents
#[derive(Parser)]
#[command(name = "specgen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of searching for .specgen.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate one test module per spec section
    Generate {
        /// Spec file, or a directory containing one
        input: PathBuf,

        /// Output directory [default: output.dir from config]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only include sections matching this glob (repeatable)
        #[arg(long = "section", value_name = "GLOB")]
        sections: Vec<String>,

        /// Where expected HTML comes from [default: generate.expected from config]
        #[arg(long, value_enum)]
        expected: Option<Expected>,

        /// Do not copy example preambles into tests
        #[arg(long)]
        no_preamble: bool,

        /// Remove previously generated files (all but the harness) before writing
        #[arg(long)]
        clean: bool,
    },

    /// List sections and their examples
    List {
        /// Spec file, or a directory containing one
        input: PathBuf,

        /// Only include sections matching this glob (repeatable)
        #[arg(long = "section", value_name = "GLOB")]
        sections: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Dump parsed examples as JSON
    Extract {
        /// Spec file, or a directory containing one
        input: PathBuf,

        /// Only include sections matching this glob (repeatable)
        #[arg(long = "section", value_name = "GLOB")]
        sections: Vec<String>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare the spec's expected HTML against the reference renderer
    Check {
        /// Spec file, or a directory containing one
        input: PathBuf,

        /// Only include sections matching this glob (repeatable)
        #[arg(long = "section", value_name = "GLOB")]
        sections: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Fail if any example disagrees
        #[arg(long)]
        strict: bool,
    },

    /// Manage specgen configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Write a default .specgen.toml in the current directory
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Print path to the config file in effect
    Path,

    /// Print the effective configuration
    Show,
}

/// Output format for reporting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON for programmatic use
    Json,
}

/// Expected-output source for the `specgen generate` command.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Expected {
    /// HTML written in the spec
    Spec,
    /// Output of the reference renderer
    Reference,
}

impl From<Expected> for ExpectedSource {
    fn from(expected: Expected) -> Self {
        match expected {
            Expected::Spec => ExpectedSource::Spec,
            Expected::Reference => ExpectedSource::Reference,
        }
    }
}
