use crate::config::{Mode, README_FILE};
use crate::filter::{self, ExclusionSet};
use log;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Walks `root` and returns the forward-slash relative paths of every file
/// that survives the skip rules and, when `extensions` is non-empty, whose
/// extension is listed there.
///
/// The walk is pre-order: a directory's files come out sorted, before any of
/// its subdirectories, which are themselves visited in sorted order. Skipped
/// directories are pruned, never read. Unreadable directories count as empty.
pub fn collect(
    root: &Path,
    extensions: Option<&[String]>,
    exclusion_set: &ExclusionSet,
) -> Vec<String> {
    log::debug!("Collecting files under: {}", root.display());
    let allowlist = extensions.filter(|exts| !exts.is_empty());
    if let Some(exts) = allowlist {
        log::trace!("Extension allow-list: {:?}", exts);
    }

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by(|a, b| {
            a.file_type()
                .is_dir()
                .cmp(&b.file_type().is_dir())
                .then_with(|| a.file_name().cmp(b.file_name()))
        })
        .into_iter()
        .filter_entry(|entry| keep_directory(root, entry, exclusion_set));

    let mut matches = Vec::new();
    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Skipping unreadable path during walk: {}", e);
                continue;
            }
        };
        if entry.depth() == 0 || !is_regular_file(&entry) {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        let Some(relative) = filter::relative_slash_path(root, entry.path()) else {
            log::warn!("Could not get relative path for: {}", entry.path().display());
            continue;
        };
        if filter::should_skip(&name, &relative, exclusion_set) {
            continue;
        }
        if let Some(exts) = allowlist {
            let extension = filter::extension_of(&name);
            if !exts.iter().any(|allowed| allowed == extension) {
                log::trace!("Extension not allowed: {}", relative);
                continue;
            }
        }

        log::trace!("Collected file: {}", relative);
        matches.push(relative);
    }

    log::debug!("Collected {} files.", matches.len());
    matches
}

/// Files to document for `mode`: everything [`collect`] finds in full mode,
/// only a root `README.md` in light mode.
pub fn select_files(
    root: &Path,
    mode: Mode,
    extensions: Option<&[String]>,
    exclusion_set: &ExclusionSet,
) -> Vec<String> {
    match mode {
        Mode::Full => collect(root, extensions, exclusion_set),
        Mode::Light => {
            if root.join(README_FILE).is_file() {
                vec![README_FILE.to_string()]
            } else {
                log::debug!("Light mode: no {} at the project root.", README_FILE);
                Vec::new()
            }
        }
    }
}

fn keep_directory(root: &Path, entry: &DirEntry, exclusion_set: &ExclusionSet) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    match filter::relative_slash_path(root, entry.path()) {
        Some(relative) => !filter::should_skip(&name, &relative, exclusion_set),
        None => false,
    }
}

// Symlinked directories are not descended into; symlinked files still count.
fn is_regular_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use similar_asserts::assert_eq;
    use std::fs;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "x").unwrap();
    }

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn python_filter_skips_hidden_generated_and_cache_entries() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "a.py");
        touch(tmp.path(), "generated_b.py");
        touch(tmp.path(), ".hidden.py");
        touch(tmp.path(), "sub/c.py");
        touch(tmp.path(), "sub/__pycache__/x.pyc");

        let allow = exts(&[".py"]);
        let files = collect(tmp.path(), Some(allow.as_slice()), &ExclusionSet::default());
        assert_eq!(files, vec!["a.py".to_string(), "sub/c.py".to_string()]);
    }

    #[test]
    fn files_come_before_subdirectories_at_each_level() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "a/inner.md");
        touch(tmp.path(), "b.md");
        touch(tmp.path(), "a/z/deep.md");
        touch(tmp.path(), "a/y.md");
        touch(tmp.path(), "c/last.md");

        let files = collect(tmp.path(), None, &ExclusionSet::default());
        assert_eq!(
            files,
            vec!["b.md", "a/inner.md", "a/y.md", "a/z/deep.md", "c/last.md"]
        );
    }

    #[test]
    fn excluded_directory_is_pruned_even_for_unmatched_descendants() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "keep.py");
        touch(tmp.path(), "third_party/lib/mod.py");
        touch(tmp.path(), "pkg.egg-info/top_level.txt");

        let set = ExclusionSet::with_builtin(["third_party"]).unwrap();
        let files = collect(tmp.path(), None, &set);
        assert_eq!(files, vec!["keep.py"]);
    }

    #[test]
    fn excluded_files_do_not_affect_siblings() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "src/a.py");
        touch(tmp.path(), "src/b_test.py");
        touch(tmp.path(), "src/c.py");

        let set = ExclusionSet::new(["*_test.py"]).unwrap();
        let files = collect(tmp.path(), None, &set);
        assert_eq!(files, vec!["src/a.py", "src/c.py"]);
    }

    #[test]
    fn empty_allowlist_means_no_extension_filter() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "a.py");
        touch(tmp.path(), "b.txt");
        touch(tmp.path(), "Makefile");

        let empty: Vec<String> = Vec::new();
        let files = collect(tmp.path(), Some(empty.as_slice()), &ExclusionSet::default());
        assert_eq!(files, vec!["Makefile", "a.py", "b.txt"]);
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "lower.py");
        touch(tmp.path(), "UPPER.PY");

        let allow = exts(&[".py"]);
        let files = collect(tmp.path(), Some(allow.as_slice()), &ExclusionSet::default());
        assert_eq!(files, vec!["lower.py"]);
    }

    #[test]
    fn fully_excluded_tree_yields_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "a.lock");
        touch(tmp.path(), ".git/config");

        let set = ExclusionSet::with_builtin(Vec::<String>::new()).unwrap();
        assert!(collect(tmp.path(), None, &set).is_empty());
    }

    #[test]
    fn repeated_collection_is_identical() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["m.py", "a.py", "x/y.py", "x/b.py", "d/e/f.py"] {
            touch(tmp.path(), name);
        }
        let set = ExclusionSet::default();
        let first = collect(tmp.path(), None, &set);
        let second = collect(tmp.path(), None, &set);
        assert_eq!(first, second);
    }

    #[test]
    fn light_mode_selects_only_the_readme() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "a.py");
        let set = ExclusionSet::default();
        assert!(select_files(tmp.path(), Mode::Light, None, &set).is_empty());

        touch(tmp.path(), "README.md");
        assert_eq!(
            select_files(tmp.path(), Mode::Light, None, &set),
            vec!["README.md"]
        );
        assert_eq!(
            select_files(tmp.path(), Mode::Full, None, &set),
            vec!["README.md", "a.py"]
        );
    }

    #[test]
    fn missing_root_collects_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let set = ExclusionSet::with_builtin(Vec::<String>::new()).unwrap();
        assert!(collect(&tmp.path().join("absent"), None, &set).is_empty());
    }

    #[rstest]
    #[case(".hidden_root")]
    #[case("generated_x")]
    #[case("pkg.egg-info")]
    fn root_name_is_never_filtered(#[case] root_name: &str) {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join(root_name);
        touch(&root, "a.py");
        touch(&root, "sub/b.py");

        let set = ExclusionSet::with_builtin(Vec::<String>::new()).unwrap();
        assert_eq!(collect(&root, None, &set), vec!["a.py", "sub/b.py"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_not_followed() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "real/a.py");
        std::os::unix::fs::symlink(tmp.path().join("real"), tmp.path().join("link")).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("real/a.py"), tmp.path().join("alias.py"))
            .unwrap();

        let files = collect(tmp.path(), None, &ExclusionSet::default());
        assert_eq!(files, vec!["alias.py", "real/a.py"]);
    }
}
