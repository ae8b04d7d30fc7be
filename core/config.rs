use crate::error::{AppError, Result};
use crate::filter::ExclusionSet;
use log;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_CONFIG_DIR: &str = ".projdoc";
pub const DEFAULT_CONFIG_FILENAME: &str = "projdoc.toml";
pub const DEFAULT_OUTPUT_FILE: &str = "project.md";
pub const DEFAULT_EXTENSIONS: [&str; 4] = [".py", ".md", ".yaml", ".json"];
/// Prepended to the output file name so later scans skip the generated file.
pub const OUTPUT_PREFIX: &str = "generated_";
pub const README_FILE: &str = "README.md";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
    #[serde(default)]
    pub mode: Mode,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FiltersConfig {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default = "default_true")]
    pub builtin_excludes: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_true")]
    pub with_tree: bool,
    #[serde(default = "default_true")]
    pub with_deps: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_snippet_lines: Option<usize>,
}

/// `Full` documents every matching file; `Light` only the root README.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Light,
    #[default]
    Full,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Light => write!(f, "light"),
            Mode::Full => write!(f, "full"),
        }
    }
}

impl FromStr for Mode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Mode::Light),
            "full" => Ok(Mode::Full),
            other => Err(AppError::InvalidArgument(format!(
                "Unknown mode '{}', expected 'light' or 'full'",
                other
            ))),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_output_file() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}
fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_file: default_output_file(),
            mode: Mode::default(),
        }
    }
}
impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude: Vec::new(),
            builtin_excludes: default_true(),
        }
    }
}
impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            with_tree: default_true(),
            with_deps: default_true(),
            max_snippet_lines: None,
        }
    }
}

/// Splits a comma-separated option value, dropping blanks.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Adds the leading dot when an extension was given as `py`.
pub fn normalize_extension(extension: &str) -> String {
    if extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{}", extension)
    }
}

/// `dir/name.md` becomes `dir/generated_name.md`.
pub fn prefixed_output_path(output_file: &Path) -> PathBuf {
    let base_name = output_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string());
    let prefixed = format!("{}{}", OUTPUT_PREFIX, base_name);
    match output_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(prefixed),
        _ => PathBuf::from(prefixed),
    }
}

impl Config {
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.filters
            .extensions
            .iter()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .map(normalize_extension)
            .collect()
    }

    /// Built-in excludes (unless disabled) followed by the configured patterns.
    pub fn exclusion_set(&self) -> Result<ExclusionSet> {
        let user_patterns = self.filters.exclude.iter().cloned();
        if self.filters.builtin_excludes {
            ExclusionSet::with_builtin(user_patterns)
        } else {
            ExclusionSet::new(user_patterns)
        }
    }

    pub fn show_dependencies(&self) -> bool {
        self.output.with_deps && self.general.mode == Mode::Full
    }

    /// Resolves the project root from the CLI value, `PROJECT_ROOT`, or the
    /// current directory. The result is absolute and must be a directory.
    pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
        let path_str_opt = cli_project_root
            .map(|p| p.to_string_lossy().to_string())
            .or_else(|| env::var("PROJECT_ROOT").ok().filter(|s| !s.is_empty()));

        let path_to_resolve = match path_str_opt {
            Some(p_str) => PathBuf::from(shellexpand::tilde(&p_str).as_ref()),
            None => env::current_dir().map_err(AppError::Io)?,
        };

        let absolute = std::path::absolute(&path_to_resolve).map_err(|e| {
            AppError::InvalidRoot(format!(
                "Failed to resolve project root '{}': {}",
                path_to_resolve.display(),
                e
            ))
        })?;
        // Symlinks are kept as given; only `..` components are resolved.
        let has_parent_component = absolute
            .components()
            .any(|c| matches!(c, Component::ParentDir));
        let resolved = if has_parent_component {
            absolute.canonicalize().map_err(|e| {
                AppError::InvalidRoot(format!(
                    "Failed to resolve project root '{}': {}",
                    absolute.display(),
                    e
                ))
            })?
        } else {
            absolute
        };
        if !resolved.is_dir() {
            return Err(AppError::InvalidRoot(format!(
                "Project root '{}' is not a directory",
                resolved.display()
            )));
        }
        Ok(resolved)
    }

    pub fn resolve_config_path(
        project_root: &Path,
        cli_config_file: Option<&String>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        match cli_config_file {
            Some(p_str) => {
                let mut path = PathBuf::from(shellexpand::tilde(p_str).as_ref());
                if !path.is_absolute() && !path.exists() {
                    path = project_root.join(&path);
                }
                if !path.exists() && path.extension().is_none() {
                    path.set_extension("toml");
                }
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Specified config file not found at path: {}",
                        path.display()
                    )));
                }
                log::debug!("Using specified config file path: {}", path.display());
                Ok(Some(path))
            }
            None => {
                let default_path = Self::default_config_path(project_root);
                if default_path.exists() {
                    log::debug!("Using default config file path: {}", default_path.display());
                    Ok(Some(default_path))
                } else {
                    log::debug!(
                        "No config file specified and default not found at: {}",
                        default_path.display()
                    );
                    Ok(None)
                }
            }
        }
    }

    pub fn default_config_path(project_root: &Path) -> PathBuf {
        project_root
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILENAME)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&toml_content).map_err(|e| match e {
            AppError::TomlParse(msg) => AppError::TomlParse(format!(
                "Error parsing config file '{}': {}",
                config_path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Config>(content).map_err(|e| {
            AppError::TomlParse(format!("{}. Check TOML syntax and structure.", e))
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use similar_asserts::assert_eq;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.general.mode, Mode::Full);
        assert_eq!(config.normalized_extensions(), vec![".py", ".md", ".yaml", ".json"]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            "[general]\nmode = \"light\"\n\n[filters]\nextensions = [\"rs\", \".toml\"]\nexclude = [\"target\"]\n\n[output]\nmax_snippet_lines = 40\n",
        )
        .unwrap();
        assert_eq!(config.general.mode, Mode::Light);
        assert_eq!(config.general.output_file, PathBuf::from(DEFAULT_OUTPUT_FILE));
        assert_eq!(config.normalized_extensions(), vec![".rs", ".toml"]);
        assert_eq!(config.filters.exclude, vec!["target"]);
        assert!(config.filters.builtin_excludes);
        assert_eq!(config.output.max_snippet_lines, Some(40));
        assert!(config.output.with_tree);
        assert!(!config.show_dependencies());
    }

    #[test]
    fn exclusion_set_honours_builtin_toggle() {
        let mut config = Config::default();
        config.filters.exclude = vec!["dist".to_string()];
        let with_builtin = config.exclusion_set().unwrap();
        assert!(with_builtin.is_match("poetry.lock"));
        assert!(with_builtin.is_match("dist"));

        config.filters.builtin_excludes = false;
        let without_builtin = config.exclusion_set().unwrap();
        assert!(!without_builtin.is_match("poetry.lock"));
        assert!(without_builtin.is_match("dist"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Config::from_toml("[output]\ncolour = true\n").unwrap_err();
        assert!(matches!(err, AppError::TomlParse(_)));
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let rendered = Config::default().to_toml().unwrap();
        assert_eq!(Config::from_toml(&rendered).unwrap(), Config::default());
    }

    #[rstest]
    #[case("project.md", "generated_project.md")]
    #[case("docs/out.md", "docs/generated_out.md")]
    fn output_file_gets_prefixed(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(prefixed_output_path(Path::new(input)), PathBuf::from(expected));
    }

    #[test]
    fn comma_lists_drop_blanks() {
        assert_eq!(split_list(".py, md,,"), vec![".py", "md"]);
        assert!(split_list("").is_empty());
    }

    #[rstest]
    #[case("light", Mode::Light)]
    #[case("FULL", Mode::Full)]
    fn modes_parse(#[case] input: &str, #[case] expected: Mode) {
        assert_eq!(input.parse::<Mode>().unwrap(), expected);
    }

    #[test]
    fn project_root_must_be_a_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        let err = Config::determine_project_root(Some(&file)).unwrap_err();
        assert!(matches!(err, AppError::InvalidRoot(_)));
        let err = Config::determine_project_root(Some(&tmp.path().join("absent"))).unwrap_err();
        assert!(matches!(err, AppError::InvalidRoot(_)));
        assert_eq!(
            Config::determine_project_root(Some(&tmp.path().to_path_buf())).unwrap(),
            std::path::absolute(tmp.path()).unwrap()
        );
        let dotted = tmp.path().join("sub").join("..");
        fs::create_dir(tmp.path().join("sub")).unwrap();
        assert_eq!(
            Config::determine_project_root(Some(&dotted)).unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_project_root_is_not_resolved() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("real")).unwrap();
        let link = tmp.path().join("link");
        std::os::unix::fs::symlink(tmp.path().join("real"), &link).unwrap();

        let root = Config::determine_project_root(Some(&link)).unwrap();
        assert_eq!(root.file_name().unwrap(), "link");
        assert!(root.is_dir());
    }

    #[test]
    fn config_path_resolution() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(Config::resolve_config_path(tmp.path(), None, false).unwrap(), None);

        let default_path = Config::default_config_path(tmp.path());
        fs::create_dir_all(default_path.parent().unwrap()).unwrap();
        fs::write(&default_path, "").unwrap();
        assert_eq!(
            Config::resolve_config_path(tmp.path(), None, false).unwrap(),
            Some(default_path.clone())
        );
        assert_eq!(Config::resolve_config_path(tmp.path(), None, true).unwrap(), None);

        fs::write(tmp.path().join("custom.toml"), "").unwrap();
        let named = "custom".to_string();
        assert_eq!(
            Config::resolve_config_path(tmp.path(), Some(&named), false).unwrap(),
            Some(tmp.path().join("custom.toml"))
        );
        let missing = "nope.toml".to_string();
        assert!(Config::resolve_config_path(tmp.path(), Some(&missing), false).is_err());
    }
}
