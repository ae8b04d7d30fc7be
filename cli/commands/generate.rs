use crate::cli_args::GenerateArgs;
use crate::load_config_for_command;
use crate::output;
use anyhow::{Context, Result};
use colored::Colorize;
use log;
use projdoc_core::config::prefixed_output_path;
use projdoc_core::{self as core, Config, Document, ExclusionSet, FileSnippet};
use std::path::Path;

pub fn handle_generate_command(args: GenerateArgs, quiet: bool) -> Result<()> {
    let project_root = Config::determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = load_config_for_command(
        &project_root,
        &args.project_config,
        &args.filters,
        Some(&args.section_toggles),
        args.output_file.as_deref(),
    )
    .context("Failed to load configuration")?;

    let markdown = build_markdown(&project_root, &config)?;

    if args.stdout {
        log::debug!("Writing document to stdout.");
        return output::write_to_stdout(&markdown);
    }

    let output_path = prefixed_output_path(&config.general.output_file);
    log::info!("Writing document to: {}", output_path.display());
    output::write_to_file(&output_path, &markdown)?;
    if !quiet {
        println!(
            "{} Markdown generated: {}",
            "✅".green(),
            output_path.display().to_string().blue()
        );
    }
    Ok(())
}

/// Assembles the whole document for `project_root` under `config`.
pub fn build_markdown(project_root: &Path, config: &Config) -> Result<String> {
    let exclusion_set: ExclusionSet = config
        .exclusion_set()
        .context("Failed to compile exclude patterns")?;

    log::debug!("Extracting project metadata...");
    let metadata = core::extract_metadata(project_root);
    log::debug!("Metadata: {:?}", metadata);

    let tree = if config.output.with_tree {
        log::debug!("Rendering project tree...");
        Some(core::render_tree(project_root, &exclusion_set))
    } else {
        log::debug!("Tree section disabled.");
        None
    };

    let extensions = config.normalized_extensions();
    let files = core::select_files(
        project_root,
        config.general.mode,
        Some(extensions.as_slice()),
        &exclusion_set,
    );
    log::info!("Documenting {} files ({} mode).", files.len(), config.general.mode);

    let snippets: Vec<FileSnippet> = files
        .iter()
        .map(|relative| {
            FileSnippet::load(project_root, relative, config.output.max_snippet_lines)
        })
        .collect();

    let date_generated = chrono::Local::now().format("%Y-%m-%d").to_string();
    let document = Document {
        metadata: &metadata,
        date_generated: &date_generated,
        tree: tree.as_deref(),
        show_dependencies: config.show_dependencies(),
        files: &snippets,
    };
    Ok(core::render_document(&document))
}
