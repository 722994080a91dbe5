use anyhow::{Context, Result};
use clap::Parser;
use specgen::cli::{Cli, Command, ConfigCommand};
use specgen::commands::check::{self, CheckArgs};
use specgen::commands::config;
use specgen::commands::extract::{self, ExtractArgs};
use specgen::commands::generate::{self, GenerateArgs};
use specgen::commands::list::{self, ListArgs};
use specgen::config::{CONFIG_FILENAME, SpecgenConfig, load_config};
use specgen::logging;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Generate {
            input,
            output,
            sections,
            expected,
            no_preamble,
            clean,
        } => {
            generate::execute(
                GenerateArgs {
                    input,
                    output,
                    sections,
                    expected: expected.map(Into::into),
                    no_preamble,
                    clean,
                },
                &effective_config(config_path)?,
            )?;
        }
        Command::List {
            input,
            sections,
            format,
        } => {
            list::execute(
                ListArgs {
                    input,
                    sections,
                    format,
                },
                &effective_config(config_path)?,
            )?;
        }
        Command::Extract {
            input,
            sections,
            output,
        } => {
            extract::execute(
                ExtractArgs {
                    input,
                    sections,
                    output,
                },
                &effective_config(config_path)?,
            )?;
        }
        Command::Check {
            input,
            sections,
            format,
            strict,
        } => {
            check::execute(
                CheckArgs {
                    input,
                    sections,
                    format,
                    strict,
                },
                &effective_config(config_path)?,
            )?;
        }
        Command::Config(cmd) => match cmd {
            ConfigCommand::Init { force } => {
                let path = match config_path {
                    Some(path) => path.to_path_buf(),
                    None => std::env::current_dir()
                        .context("Failed to get current directory")?
                        .join(CONFIG_FILENAME),
                };
                config::init(&path, force)?;
            }
            ConfigCommand::Path => {
                config::path(config_path)?;
            }
            ConfigCommand::Show => {
                config::show(&effective_config(config_path)?)?;
            }
        },
    }

    Ok(())
}

fn effective_config(explicit: Option<&Path>) -> Result<SpecgenConfig> {
    let (config, path) = load_config(explicit)?;
    if let Some(path) = path {
        tracing::info!(path = %path.display(), "using config");
    }
    Ok(config)
}
