use anyhow::{Context, Result};
use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use projdoc_core::{AppError, ProjectMetadata};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::cli_args::FormatOutputOpts;

/// Prints `plain_text` for the text format, otherwise `data` serialized as
/// JSON (pretty) or YAML.
pub fn print_data_or_text<T: Serialize>(
    data: &T,
    plain_text: String,
    format_opts: &FormatOutputOpts,
    default_format: &str,
) -> Result<()> {
    let format = format_opts
        .format
        .as_deref()
        .unwrap_or(default_format)
        .to_lowercase();

    match format.as_str() {
        "text" => write_to_stdout(&plain_text),
        other => {
            let content = serialize_output(data, other)?;
            write_to_stdout(&content)
        }
    }
}

fn serialize_output<T: Serialize>(data: &T, format: &str) -> Result<String> {
    match format {
        "yaml" | "yml" => serde_yml::to_string(data).context("Failed to serialize output as YAML"),
        _ => serde_json::to_string_pretty(data).context("Failed to serialize output as JSON"),
    }
}

pub fn write_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| AppError::FileWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    fs::write(path, content).map_err(|source| AppError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

pub fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

/// Asks before replacing `path`. In quiet mode nothing is asked and the
/// overwrite is refused.
pub fn confirm_overwrite(path: &Path, quiet: bool) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    if quiet {
        anyhow::bail!(
            "Target file '{}' exists. Overwrite prevented in quiet mode.",
            path.display()
        );
    }
    print!(
        "{} File already exists at '{}'. Overwrite? [{}/{}] ",
        "⚠️".yellow(),
        path.display().to_string().cyan(),
        "y".green(),
        "N".red()
    );
    io::stdout().flush().context("Failed to flush stdout")?;
    let mut response = String::new();
    io::stdin()
        .read_line(&mut response)
        .context("Failed to read user input")?;
    Ok(response.trim().eq_ignore_ascii_case("y"))
}

pub fn metadata_table_text(metadata: &ProjectMetadata) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Field").fg(Color::Green),
        Cell::new("Value").fg(Color::Green),
    ]);
    let dependencies = if metadata.dependencies.is_empty() {
        "(none)".to_string()
    } else {
        metadata.dependencies.join("\n")
    };
    for (field, value) in [
        ("Name", metadata.name.as_str()),
        ("Version", metadata.version.as_str()),
        ("Author", metadata.author.as_str()),
        ("Dependencies", dependencies.as_str()),
    ] {
        table.add_row(vec![Cell::new(field).fg(Color::Cyan), Cell::new(value)]);
    }
    table.to_string()
}
