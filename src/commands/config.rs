use anyhow::{Context, Result, anyhow};
use std::path::Path;

use crate::config::{CONFIG_FILENAME, SpecgenConfig, find_config_path_from};

/// Write a default config file to `path`.
pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(anyhow!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
    }

    SpecgenConfig::default().save(path)?;
    println!("Created {}", path.display());
    Ok(())
}

/// Print the path of the config file in effect.
pub fn path(explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let cwd = std::env::current_dir().context("Failed to get current directory")?;
            find_config_path_from(&cwd).ok_or_else(|| {
                anyhow!(
                    "No {} found in current directory or any parent directory",
                    CONFIG_FILENAME
                )
            })?
        }
    };
    println!("{}", path.display());
    Ok(())
}

/// Print the effective configuration as TOML.
pub fn show(config: &SpecgenConfig) -> Result<()> {
    print!("{}", render(config)?);
    Ok(())
}

fn render(config: &SpecgenConfig) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize config")
}
