use crate::cli_args::{FormatOutputOpts, ShowArgs, ShowItem};
use crate::load_config_for_command;
use crate::output::{metadata_table_text, print_data_or_text};
use anyhow::{Context, Result};
use log;
use projdoc_core::{self as core, Config, ExclusionSet};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ShowOutputWrapper<T: Serialize> {
    value: T,
}

pub fn handle_show_command(args: ShowArgs) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = load_config_for_command(
        &project_root,
        &args.project_config,
        &args.filters,
        None,
        None,
    )
    .context("Failed to load configuration for show command")?;

    match &args.item {
        ShowItem::Meta => handle_show_meta(&project_root, &args.format_output),
        ShowItem::Tree => handle_show_tree(&project_root, &config, &args.format_output),
        ShowItem::Files => handle_show_files(&project_root, &config, &args.format_output),
    }
}

fn handle_show_meta(project_root: &Path, format_opts: &FormatOutputOpts) -> Result<()> {
    let metadata = core::extract_metadata(project_root);
    log::debug!("Extracted metadata: {:?}", metadata);
    let plain_text = metadata_table_text(&metadata);
    print_data_or_text(&metadata, plain_text, format_opts, "text")
}

fn handle_show_tree(
    project_root: &Path,
    config: &Config,
    format_opts: &FormatOutputOpts,
) -> Result<()> {
    let exclusion_set = exclusion_set_for(config)?;
    let tree = core::render_tree(project_root, &exclusion_set);
    print_data_or_text(
        &ShowOutputWrapper {
            value: tree.clone(),
        },
        tree,
        format_opts,
        "text",
    )
}

fn handle_show_files(
    project_root: &Path,
    config: &Config,
    format_opts: &FormatOutputOpts,
) -> Result<()> {
    let exclusion_set = exclusion_set_for(config)?;
    let extensions = config.normalized_extensions();
    let files = core::select_files(
        project_root,
        config.general.mode,
        Some(extensions.as_slice()),
        &exclusion_set,
    );
    let plain_text = files.join("\n");
    print_data_or_text(&files, plain_text, format_opts, "text")
}

fn exclusion_set_for(config: &Config) -> Result<ExclusionSet> {
    config
        .exclusion_set()
        .context("Failed to compile exclude patterns")
}
