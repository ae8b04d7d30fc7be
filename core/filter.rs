use crate::error::{AppError, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use log;
use std::path::{Component, Path};

/// Patterns excluded on every scan, before any user-supplied pattern.
pub const BUILTIN_EXCLUDES: [&str; 3] = ["*.lock", "*__pycache__*", "*.egg-info*"];

const CACHE_DIR_NAME: &str = "__pycache__";
const GENERATED_PREFIX: &str = "generated_";

/// Glob patterns matched against forward-slash paths relative to the scan root.
///
/// Any single match excludes; pattern order only matters for display. `*`
/// crosses `/`, so `*.lock` also hits `sub/poetry.lock`.
#[derive(Debug, Clone)]
pub struct ExclusionSet {
    patterns: Vec<String>,
    set: GlobSet,
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }
}

impl ExclusionSet {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let set = build_glob_set(&patterns)?;
        Ok(Self { patterns, set })
    }

    /// Built-in excludes followed by `user_patterns`.
    pub fn with_builtin<I, S>(user_patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = BUILTIN_EXCLUDES
            .iter()
            .map(|p| p.to_string())
            .chain(user_patterns.into_iter().map(Into::into));
        Self::new(patterns)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn is_match(&self, relative_path: &str) -> bool {
        !self.patterns.is_empty() && self.set.is_match(relative_path)
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern_str in patterns {
        // `\` is an ordinary character, never an escape.
        match GlobBuilder::new(pattern_str).backslash_escape(false).build() {
            Ok(glob) => {
                log::trace!("Adding exclude pattern: {}", pattern_str);
                builder.add(glob);
            }
            Err(e) => {
                log::error!("Invalid glob pattern \"{}\": {}", pattern_str, e);
                return Err(AppError::Glob(format!(
                    "Invalid glob pattern \"{}\": {}",
                    pattern_str, e
                )));
            }
        }
    }
    builder.build().map_err(|e| {
        log::error!("Error building glob set: {}", e);
        AppError::from(e)
    })
}

/// Hidden, generated, lock, egg-info and bytecode-cache entries.
pub fn is_default_skipped(name: &str) -> bool {
    name.starts_with('.')
        || name.starts_with(GENERATED_PREFIX)
        || name.ends_with(".lock")
        || name.ends_with(".egg-info")
        || name == CACHE_DIR_NAME
}

pub fn is_excluded(relative_path: &str, exclusion_set: &ExclusionSet) -> bool {
    exclusion_set.is_match(relative_path)
}

/// Combined rule used by both traversals. For directories a `true` means prune.
pub fn should_skip(name: &str, relative_path: &str, exclusion_set: &ExclusionSet) -> bool {
    if is_default_skipped(name) {
        log::trace!("Default-skipped: {}", relative_path);
        return true;
    }
    if is_excluded(relative_path, exclusion_set) {
        log::trace!("Excluded by pattern: {}", relative_path);
        return true;
    }
    false
}

/// `path` relative to `root`, joined with `/` whatever the host separator.
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative = pathdiff::diff_paths(path, root)?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

/// Suffix from the last `.` of `name`, dot included. Leading dots do not
/// start an extension, so `.bashrc` has none.
pub fn extension_of(name: &str) -> &str {
    let stem_start = name.len() - name.trim_start_matches('.').len();
    match name[stem_start..].rfind('.') {
        Some(idx) => &name[stem_start + idx..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::hidden(".git", true)]
    #[case::hidden_file(".hidden.py", true)]
    #[case::generated("generated_doc.md", true)]
    #[case::lock("poetry.lock", true)]
    #[case::egg_info("proj.egg-info", true)]
    #[case::pycache("__pycache__", true)]
    #[case::plain("main.py", false)]
    #[case::inner_generated("not_generated_.py", false)]
    fn default_skip_rules(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_default_skipped(name), expected);
    }

    #[rstest]
    #[case::nested_lock("sub/poetry.lock", true)]
    #[case::pycache_file("pkg/__pycache__/mod.pyc", true)]
    #[case::egg_info_child("proj.egg-info/PKG-INFO", true)]
    #[case::source("pkg/mod.py", false)]
    fn builtin_patterns_match_nested_paths(#[case] path: &str, #[case] expected: bool) {
        let set = ExclusionSet::with_builtin(Vec::<String>::new()).unwrap();
        assert_eq!(is_excluded(path, &set), expected);
    }

    #[test]
    fn user_patterns_extend_builtin_ones() {
        let set = ExclusionSet::with_builtin(["docs", "*.tmp"]).unwrap();
        assert_eq!(set.patterns().len(), BUILTIN_EXCLUDES.len() + 2);
        assert!(set.is_match("docs"));
        assert!(set.is_match("a/b/c.tmp"));
        assert!(!set.is_match("docs2"));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let set = ExclusionSet::new(["*.PY"]).unwrap();
        assert!(set.is_match("a.PY"));
        assert!(!set.is_match("a.py"));
    }

    #[test]
    fn character_classes_and_single_wildcards() {
        let set = ExclusionSet::new(["test_?.py", "[ab]*.txt"]).unwrap();
        assert!(set.is_match("test_1.py"));
        assert!(!set.is_match("test_10.py"));
        assert!(set.is_match("alpha.txt"));
        assert!(!set.is_match("gamma.txt"));
    }

    #[test]
    fn empty_set_matches_nothing() {
        let set = ExclusionSet::default();
        assert!(set.is_empty());
        assert!(!is_excluded("anything", &set));
    }

    #[test]
    fn backslash_is_matched_literally() {
        let set = ExclusionSet::new([r"notes\draft*"]).unwrap();
        assert!(set.is_match(r"notes\draft.txt"));
        assert!(!set.is_match("notesdraft.txt"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = ExclusionSet::new(["[unclosed"]).unwrap_err();
        assert!(matches!(err, AppError::Glob(_)));
    }

    #[rstest]
    #[case("a.py", ".py")]
    #[case("archive.tar.gz", ".gz")]
    #[case("Makefile", "")]
    #[case(".bashrc", "")]
    #[case("trailing.", ".")]
    #[case("UPPER.PY", ".PY")]
    fn extension_includes_the_dot(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(extension_of(name), expected);
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let root = Path::new("/tmp/project");
        let nested = root.join("sub").join("inner").join("c.py");
        assert_eq!(
            relative_slash_path(root, &nested).as_deref(),
            Some("sub/inner/c.py")
        );
    }
}
