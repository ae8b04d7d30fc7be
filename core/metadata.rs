use log;
use once_cell::unsync::OnceCell;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use toml::{Table, Value};

pub const MANIFEST_FILE: &str = "pyproject.toml";
pub const DEFAULT_VCS_PROGRAM: &str = "git";
const UNKNOWN_PROJECT_NAME: &str = "UnknownProject";
const RUNTIME_SELF_DEPENDENCY: &str = "python";
const VERSION_SPECIFIER_CHARS: [char; 5] = ['<', '>', '=', '!', '~'];

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProjectMetadata {
    pub name: String,
    pub version: String,
    pub author: String,
    pub dependencies: Vec<String>,
}

/// What a single [`MetadataSource`] could find. Empty strings never appear
/// in `name` or `version`; sources store `None` instead.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartialMetadata {
    pub name: Option<String>,
    pub version: Option<String>,
    pub authors: Vec<String>,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Version,
    Authors,
    Dependencies,
}

impl PartialMetadata {
    fn has(&self, field: Field) -> bool {
        match field {
            Field::Name => self.name.is_some(),
            Field::Version => self.version.is_some(),
            Field::Authors => !self.authors.is_empty(),
            Field::Dependencies => !self.dependencies.is_empty(),
        }
    }

    /// Fills each field still missing in `self` from `other`.
    fn merge_missing(&mut self, other: PartialMetadata) {
        if self.name.is_none() {
            self.name = other.name;
        }
        if self.version.is_none() {
            self.version = other.version;
        }
        if self.authors.is_empty() {
            self.authors = other.authors;
        }
        if self.dependencies.is_empty() {
            self.dependencies = other.dependencies;
        }
    }
}

/// The project root plus its `pyproject.toml`, read and parsed on first use
/// and then shared by every source of one extraction.
pub struct ProjectScan<'a> {
    root: &'a Path,
    manifest: OnceCell<Option<Table>>,
}

impl<'a> ProjectScan<'a> {
    pub fn new(root: &'a Path) -> Self {
        Self {
            root,
            manifest: OnceCell::new(),
        }
    }

    pub fn root(&self) -> &Path {
        self.root
    }

    /// `None` when the manifest is absent, unreadable or not valid TOML.
    pub fn manifest(&self) -> Option<&Table> {
        self.manifest
            .get_or_init(|| load_manifest(self.root))
            .as_ref()
    }
}

/// One step of the metadata fallback chain. Implementations are best-effort:
/// any failure yields an empty [`PartialMetadata`].
pub trait MetadataSource {
    fn label(&self) -> &'static str;
    /// Fields this source can fill. The source is not consulted once they are all known.
    fn fields(&self) -> &'static [Field];
    fn extract(&self, scan: &ProjectScan) -> PartialMetadata;
}

/// The `[project]` table of `pyproject.toml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectTableSource;

/// The legacy `[tool.poetry]` table, used only when there is no `[project]` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoetryTableSource;

/// Base name of the absolute project root.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryNameSource;

/// `user.name` from the version-control configuration seen from the root.
#[derive(Debug, Clone)]
pub struct VcsIdentitySource {
    program: String,
}

impl Default for VcsIdentitySource {
    fn default() -> Self {
        Self::with_program(DEFAULT_VCS_PROGRAM)
    }
}

impl VcsIdentitySource {
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl MetadataSource for ProjectTableSource {
    fn label(&self) -> &'static str {
        "pyproject [project]"
    }

    fn fields(&self) -> &'static [Field] {
        &[Field::Name, Field::Version, Field::Authors, Field::Dependencies]
    }

    fn extract(&self, scan: &ProjectScan) -> PartialMetadata {
        let Some(manifest) = scan.manifest() else {
            return PartialMetadata::default();
        };
        match project_table(manifest) {
            Some(project) => parse_project_table(project),
            None => PartialMetadata::default(),
        }
    }
}

impl MetadataSource for PoetryTableSource {
    fn label(&self) -> &'static str {
        "pyproject [tool.poetry]"
    }

    fn fields(&self) -> &'static [Field] {
        &[Field::Name, Field::Version, Field::Authors, Field::Dependencies]
    }

    fn extract(&self, scan: &ProjectScan) -> PartialMetadata {
        let Some(manifest) = scan.manifest() else {
            return PartialMetadata::default();
        };
        if project_table(manifest).is_some() {
            log::trace!("[project] table present, ignoring [tool.poetry].");
            return PartialMetadata::default();
        }
        match poetry_table(manifest) {
            Some(poetry) => parse_poetry_table(poetry),
            None => PartialMetadata::default(),
        }
    }
}

impl MetadataSource for DirectoryNameSource {
    fn label(&self) -> &'static str {
        "directory name"
    }

    fn fields(&self) -> &'static [Field] {
        &[Field::Name]
    }

    fn extract(&self, scan: &ProjectScan) -> PartialMetadata {
        PartialMetadata {
            name: directory_name(scan.root()),
            ..PartialMetadata::default()
        }
    }
}

impl MetadataSource for VcsIdentitySource {
    fn label(&self) -> &'static str {
        "version-control identity"
    }

    fn fields(&self) -> &'static [Field] {
        &[Field::Authors]
    }

    fn extract(&self, scan: &ProjectScan) -> PartialMetadata {
        PartialMetadata {
            authors: vcs_user_name(&self.program, scan.root()).into_iter().collect(),
            ..PartialMetadata::default()
        }
    }
}

/// Runs the fallback chain and merges the results field by field, the first
/// non-empty value winning.
pub struct MetadataExtractor {
    sources: Vec<Box<dyn MetadataSource>>,
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::with_sources(vec![
            Box::new(ProjectTableSource),
            Box::new(PoetryTableSource),
            Box::new(DirectoryNameSource),
            Box::new(VcsIdentitySource::default()),
        ])
    }
}

impl MetadataExtractor {
    pub fn with_sources(sources: Vec<Box<dyn MetadataSource>>) -> Self {
        Self { sources }
    }

    pub fn extract(&self, root: &Path) -> ProjectMetadata {
        log::debug!("Extracting project metadata from: {}", root.display());
        let scan = ProjectScan::new(root);
        let mut merged = PartialMetadata::default();

        for source in &self.sources {
            if source.fields().iter().all(|field| merged.has(*field)) {
                log::trace!("Metadata source '{}' not needed.", source.label());
                continue;
            }
            let found = source.extract(&scan);
            log::trace!("Metadata source '{}' found: {:?}", source.label(), found);
            merged.merge_missing(found);
        }

        let metadata = ProjectMetadata {
            name: merged
                .name
                .unwrap_or_else(|| UNKNOWN_PROJECT_NAME.to_string()),
            version: merged.version.unwrap_or_default(),
            author: merged.authors.join(", "),
            dependencies: merged.dependencies,
        };
        log::debug!("Project metadata: {:?}", metadata);
        metadata
    }
}

/// [`MetadataExtractor::extract`] with the default chain.
pub fn extract(root: &Path) -> ProjectMetadata {
    MetadataExtractor::default().extract(root)
}

fn load_manifest(root: &Path) -> Option<Table> {
    let manifest_path = root.join(MANIFEST_FILE);
    if !manifest_path.is_file() {
        log::trace!("No manifest at {}", manifest_path.display());
        return None;
    }
    let content = match fs::read_to_string(&manifest_path) {
        Ok(content) => content,
        Err(e) => {
            log::debug!("Ignoring unreadable manifest {}: {}", manifest_path.display(), e);
            return None;
        }
    };
    match toml::from_str::<Table>(&content) {
        Ok(table) => Some(table),
        Err(e) => {
            log::debug!("Ignoring unparseable manifest {}: {}", manifest_path.display(), e);
            None
        }
    }
}

fn project_table(manifest: &Table) -> Option<&Table> {
    manifest
        .get("project")
        .and_then(Value::as_table)
        .filter(|table| !table.is_empty())
}

fn poetry_table(manifest: &Table) -> Option<&Table> {
    manifest
        .get("tool")
        .and_then(Value::as_table)
        .and_then(|tool| tool.get("poetry"))
        .and_then(Value::as_table)
        .filter(|table| !table.is_empty())
}

fn non_empty_str(table: &Table, key: &str) -> Option<String> {
    table
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_project_table(project: &Table) -> PartialMetadata {
    let dependencies = project
        .get("dependencies")
        .and_then(Value::as_array)
        .map(|deps| {
            deps.iter()
                .filter_map(Value::as_str)
                .filter_map(bare_dependency_name)
                .collect()
        })
        .unwrap_or_default();

    let authors = project
        .get("authors")
        .and_then(Value::as_array)
        .map(|authors| {
            authors
                .iter()
                .filter_map(|author| match author {
                    Value::Table(record) => non_empty_str(record, "name"),
                    Value::String(text) => Some(author_name(text)),
                    _ => None,
                })
                .filter(|name| !name.is_empty())
                .collect()
        })
        .unwrap_or_default();

    PartialMetadata {
        name: non_empty_str(project, "name"),
        version: non_empty_str(project, "version"),
        authors,
        dependencies,
    }
}

fn parse_poetry_table(poetry: &Table) -> PartialMetadata {
    let dependencies = poetry
        .get("dependencies")
        .and_then(Value::as_table)
        .map(|deps| {
            deps.keys()
                .filter(|pkg| !pkg.eq_ignore_ascii_case(RUNTIME_SELF_DEPENDENCY))
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    let authors = poetry
        .get("authors")
        .and_then(Value::as_array)
        .map(|authors| {
            authors
                .iter()
                .filter_map(Value::as_str)
                .map(author_name)
                .filter(|name| !name.is_empty())
                .collect()
        })
        .unwrap_or_default();

    PartialMetadata {
        name: non_empty_str(poetry, "name"),
        version: non_empty_str(poetry, "version"),
        authors,
        dependencies,
    }
}

/// `"requests >= 2.0"` and `"requests>=2.0"` both give `requests`.
pub fn bare_dependency_name(requirement: &str) -> Option<String> {
    let first_token = requirement.split_whitespace().next()?;
    let bare = match first_token.find(VERSION_SPECIFIER_CHARS) {
        Some(idx) => &first_token[..idx],
        None => first_token,
    };
    if bare.is_empty() {
        None
    } else {
        Some(bare.to_string())
    }
}

/// `"Name <email>"` gives `Name`.
pub fn author_name(author: &str) -> String {
    author.split('<').next().unwrap_or_default().trim().to_string()
}

// A symlinked root keeps the link's own name; only a path ending in `..`
// needs resolving to find one.
fn directory_name(root: &Path) -> Option<String> {
    let absolute: PathBuf = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
    let name = match absolute.file_name() {
        Some(name) => Some(name.to_os_string()),
        None => absolute
            .canonicalize()
            .ok()
            .and_then(|resolved| resolved.file_name().map(|n| n.to_os_string())),
    };
    name.map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
}

fn vcs_user_name(program: &str, root: &Path) -> Option<String> {
    let output = match Command::new(program)
        .args(["config", "--get", "user.name"])
        .current_dir(root)
        .stdin(Stdio::null())
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            log::debug!("Could not run '{}' for author lookup: {}", program, e);
            return None;
        }
    };
    if !output.status.success() {
        log::debug!(
            "'{} config --get user.name' exited with {}",
            program,
            output.status
        );
        return None;
    }
    let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if name.is_empty() { None } else { Some(name) }
}
