use crate::filter;
use crate::metadata::ProjectMetadata;
use log;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub const TREE_SECTION: &str = "Project Tree";
pub const DEPENDENCIES_SECTION: &str = "Dependencies";
pub const FILES_SECTION: &str = "Files";
const RULE: &str = "---";

static FENCE_LANGUAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (".py", "python"),
        (".md", "markdown"),
        (".json", "json"),
        (".yaml", "yaml"),
        (".yml", "yaml"),
        (".toml", "toml"),
        (".rs", "rust"),
        (".sh", "bash"),
        (".js", "javascript"),
        (".ts", "typescript"),
    ])
});

/// Highlighting language for a file extension (dot included, any case).
pub fn fence_language(extension: &str) -> &'static str {
    FENCE_LANGUAGES
        .get(extension.to_lowercase().as_str())
        .copied()
        .unwrap_or("")
}

/// GitHub-style heading anchor: lowercase, spaces to `-`, only ASCII
/// alphanumerics and `-` kept.
pub fn make_anchor(text: &str) -> String {
    text.to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

/// One file's body as it will appear inside its fence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSnippet {
    pub path: String,
    pub lines: Vec<String>,
}

impl FileSnippet {
    /// Reads `root/relative` lossily. An unreadable file gives an empty
    /// snippet. With `max_lines`, longer files are cut and end with a
    /// `... (truncated N lines)` marker.
    pub fn load(root: &Path, relative: &str, max_lines: Option<usize>) -> Self {
        let full_path = root.join(relative);
        let lines = match fs::read(&full_path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes)
                .lines()
                .map(str::to_string)
                .collect(),
            Err(e) => {
                log::warn!("Could not read {}: {}", full_path.display(), e);
                Vec::new()
            }
        };
        Self::from_lines(relative, lines, max_lines)
    }

    pub fn from_lines(relative: &str, mut lines: Vec<String>, max_lines: Option<usize>) -> Self {
        if let Some(max) = max_lines {
            let total = lines.len();
            if total > max {
                lines.truncate(max);
                lines.push(format!("... (truncated {} lines)", total - max));
            }
        }
        Self {
            path: relative.to_string(),
            lines,
        }
    }

    fn extension(&self) -> String {
        let name = self.path.rsplit('/').next().unwrap_or(&self.path);
        filter::extension_of(name).to_lowercase()
    }
}

#[derive(Debug, Clone)]
pub struct Document<'a> {
    pub metadata: &'a ProjectMetadata,
    pub date_generated: &'a str,
    pub tree: Option<&'a str>,
    pub show_dependencies: bool,
    pub files: &'a [FileSnippet],
}

impl Document<'_> {
    fn sections(&self) -> Vec<&'static str> {
        let mut sections = Vec::new();
        if self.tree.is_some() {
            sections.push(TREE_SECTION);
        }
        if self.show_dependencies {
            sections.push(DEPENDENCIES_SECTION);
        }
        sections.push(FILES_SECTION);
        sections
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

pub fn render_document(doc: &Document) -> String {
    let meta = doc.metadata;
    let mut out = String::new();

    // writeln! into a String cannot fail
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "project_name: {}", quote(&meta.name));
    let _ = writeln!(out, "version: {}", quote(&meta.version));
    let _ = writeln!(out, "author: {}", quote(&meta.author));
    let _ = writeln!(out, "date_generated: {}", quote(doc.date_generated));
    let _ = writeln!(out, "{}\n", RULE);

    let _ = writeln!(out, "# {}\n", meta.name);
    let _ = writeln!(out, "> **Version**: {}  ", meta.version);
    let _ = writeln!(out, "> **Author**: {}\n", meta.author);
    let _ = writeln!(out, "{}\n", RULE);

    let _ = writeln!(out, "## Table of Contents\n");
    for (idx, section) in doc.sections().iter().enumerate() {
        let _ = writeln!(out, "{}. [{}](#{})", idx + 1, section, make_anchor(section));
    }
    let _ = writeln!(out, "\n{}\n", RULE);

    if let Some(tree) = doc.tree {
        let _ = writeln!(out, "## {}\n", TREE_SECTION);
        let _ = writeln!(out, "```text\n{}\n```\n", tree);
        if doc.show_dependencies {
            let _ = writeln!(out, "{}\n", RULE);
        }
    }

    if doc.show_dependencies {
        let _ = writeln!(out, "## {}\n", DEPENDENCIES_SECTION);
        let _ = writeln!(out, "```text");
        if meta.dependencies.is_empty() {
            let _ = writeln!(out, "- No dependencies");
        } else {
            for dep in &meta.dependencies {
                let _ = writeln!(out, "- {}", dep);
            }
        }
        let _ = writeln!(out, "```\n");
        let _ = writeln!(out, "{}\n", RULE);
    }

    let _ = writeln!(out, "## {}\n", FILES_SECTION);
    for (idx, snippet) in doc.files.iter().enumerate() {
        let extension = snippet.extension();
        let fence = if extension == ".md" { "`````" } else { "```" };
        let _ = writeln!(out, "### `{}`\n", snippet.path);
        let _ = writeln!(out, "{}{}", fence, fence_language(&extension));
        let _ = writeln!(out, "{}", snippet.lines.join("\n"));
        let _ = writeln!(out, "{}", fence);
        if idx + 1 != doc.files.len() {
            let _ = writeln!(out, "\n{}\n", RULE);
        }
    }
    out
}
