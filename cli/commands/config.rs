use crate::cli_args::ConfigArgs;
use crate::output::{confirm_overwrite, write_to_file, write_to_stdout};
use anyhow::{Context, Result};
use colored::*;
use log;
use projdoc_core::Config;
use std::path::Path;

pub fn handle_config_command(args: &ConfigArgs, project_root: &Path, quiet: bool) -> Result<()> {
    let default_toml = Config::default()
        .to_toml()
        .context("Failed to serialize default configuration")?;

    if !args.save {
        return write_to_stdout(&default_toml);
    }

    let save_path = Config::default_config_path(project_root);
    log::debug!("Saving default configuration to {}", save_path.display());
    if !confirm_overwrite(&save_path, quiet)? {
        println!("Save cancelled.");
        return Ok(());
    }
    write_to_file(&save_path, &default_toml)?;
    if !quiet {
        println!(
            "{} Default configuration saved to: {}",
            "✅".green(),
            save_path.display().to_string().blue()
        );
    }
    Ok(())
}
