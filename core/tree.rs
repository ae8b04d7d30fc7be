use crate::filter::{self, ExclusionSet};
use log;
use std::fs;
use std::path::{Path, PathBuf};

const BRANCH: &str = "├── ";
const CORNER: &str = "└── ";
const PIPE_INDENT: &str = "│   ";
const SPACE_INDENT: &str = "    ";

#[derive(Debug)]
struct VisibleEntry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

/// Renders `root` as a `tree`-style listing whose first line is `.`.
///
/// Entries filtered by [`filter::should_skip`] are left out, and filtered
/// directories are never opened. Files and directories share one sorted list
/// per level.
pub fn render(root: &Path, exclusion_set: &ExclusionSet) -> String {
    log::debug!("Rendering directory tree for: {}", root.display());
    let mut lines = vec![".".to_string()];
    lines.extend(render_level(root, root, "", exclusion_set));
    log::debug!("Tree rendered with {} entries.", lines.len() - 1);
    lines.join("\n")
}

fn render_level(root: &Path, dir: &Path, prefix: &str, exclusion_set: &ExclusionSet) -> Vec<String> {
    let entries = visible_entries(root, dir, exclusion_set);
    let total = entries.len();

    entries
        .into_iter()
        .enumerate()
        .flat_map(|(idx, entry)| {
            let is_last = idx + 1 == total;
            let connector = if is_last { CORNER } else { BRANCH };
            let mut lines = vec![format!("{}{}{}", prefix, connector, entry.name)];
            if entry.is_dir {
                let indent = if is_last { SPACE_INDENT } else { PIPE_INDENT };
                let child_prefix = format!("{}{}", prefix, indent);
                lines.extend(render_level(root, &entry.path, &child_prefix, exclusion_set));
            }
            lines
        })
        .collect()
}

fn visible_entries(root: &Path, dir: &Path, exclusion_set: &ExclusionSet) -> Vec<VisibleEntry> {
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) => {
            log::debug!("Treating unreadable directory as empty: {} ({})", dir.display(), e);
            return Vec::new();
        }
    };

    let mut entries: Vec<VisibleEntry> = read_dir
        .filter_map(|entry_result| match entry_result {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::debug!("Skipping unreadable entry in {}: {}", dir.display(), e);
                None
            }
        })
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();
            let relative = filter::relative_slash_path(root, &path)?;
            if filter::should_skip(&name, &relative, exclusion_set) {
                return None;
            }
            let is_dir = path.is_dir();
            Some(VisibleEntry { name, path, is_dir })
        })
        .collect();

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}
