mod cli_args;
mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use log;
use std::path::Path;
use std::process;

use cli_args::{Cli, Commands, FilterGroup, ProjectConfigOpts, SectionTogglesGroup};
use projdoc_core::config::split_list;
use projdoc_core::{AppError, Config, Mode};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;
    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = exit_code_for(&e);
            if !quiet || exit_code == 1 || exit_code == 5 {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Application failed: {:#}", e);
            }
            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn exit_code_for(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<AppError>() {
        Some(AppError::Config(_)) => 1,
        Some(AppError::TomlParse(_)) => 1,
        Some(AppError::TomlSerialize(_)) => 1,
        Some(AppError::Io(_)) => 2,
        Some(AppError::FileRead { .. }) => 2,
        Some(AppError::FileWrite { .. }) => 2,
        Some(AppError::InvalidRoot(_)) => 2,
        Some(AppError::Glob(_)) => 2,
        Some(AppError::InvalidArgument(_)) => 5,
        Some(_) => 1,
        None => 1,
    }
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool) -> Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Generate(args) => {
            log::debug!("Executing 'generate' command...");
            commands::generate::handle_generate_command(args, quiet)?;
        }
        Commands::Show(args) => {
            log::debug!("Executing 'show' command...");
            commands::show::handle_show_command(args)?;
        }
        Commands::Config(args) => {
            log::debug!("Executing 'config' command...");
            let project_root = Config::determine_project_root(args.project_root.as_ref())
                .context("Failed to determine project root for config command")?;
            commands::config::handle_config_command(&args, &project_root, quiet)?;
        }
        Commands::Completion(args) => {
            log::debug!("Executing 'completion' command...");
            commands::completion::handle_completion_command(&args, quiet)?;
        }
    }
    Ok(())
}

fn merge_config_with_cli_overrides(
    mut config: Config,
    filters: &FilterGroup,
    section_toggles: Option<&SectionTogglesGroup>,
    output_file: Option<&Path>,
) -> Result<Config> {
    log::trace!("Applying CLI overrides to config...");

    if let Some(extensions) = &filters.extensions {
        config.filters.extensions = split_list(extensions);
    }
    for value in &filters.exclude {
        config.filters.exclude.extend(split_list(value));
    }
    if filters.disable_builtin_excludes {
        config.filters.builtin_excludes = false;
    }
    if let Some(mode) = &filters.mode {
        config.general.mode = mode.parse::<Mode>()?;
    }
    if let Some(max_lines) = filters.max_snippet_lines {
        config.output.max_snippet_lines = Some(max_lines);
    }

    if let Some(toggles) = section_toggles {
        if toggles.no_tree {
            config.output.with_tree = false;
        }
        if toggles.with_tree {
            config.output.with_tree = true;
        }
        if toggles.no_deps {
            config.output.with_deps = false;
        }
        if toggles.with_deps {
            config.output.with_deps = true;
        }
    }

    if let Some(path) = output_file {
        config.general.output_file = path.to_path_buf();
    }

    log::trace!("Config after CLI overrides: {:?}", config);
    Ok(config)
}

/// Loads the config file the options point at (or defaults) and layers the
/// command-line overrides on top.
pub fn load_config_for_command(
    project_root: &Path,
    project_opts: &ProjectConfigOpts,
    filters: &FilterGroup,
    section_toggles: Option<&SectionTogglesGroup>,
    output_file: Option<&Path>,
) -> Result<Config> {
    let config_path = Config::resolve_config_path(
        project_root,
        project_opts.context_file.as_ref(),
        project_opts.disable_context_file,
    )
    .context("Failed to resolve configuration path")?;

    let config = match &config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    merge_config_with_cli_overrides(config, filters, section_toggles, output_file)
}
