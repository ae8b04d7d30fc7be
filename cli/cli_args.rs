use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectConfigOpts {
    #[arg(
        short = 'i',
        long,
        visible_alias = "input-dir",
        help = "Specify the project directory to document (default: current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long,
        help = "Specify path/filename of the TOML config file (default: .projdoc/projdoc.toml).",
        value_name = "CONTEXT_FILE",
        conflicts_with = "disable_context_file",
        help_heading = "Project Setup"
    )]
    pub context_file: Option<String>,

    #[arg(
        long,
        help = "Disable loading any TOML config file.",
        conflicts_with = "context_file",
        help_heading = "Project Setup"
    )]
    pub disable_context_file: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FormatOutputOpts {
    #[arg(short = 'f', long, help = "Set the output format.", value_name = "FORMAT", value_parser = ["text", "json", "yaml"], help_heading = "Output Formatting")]
    pub format: Option<String>,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Document a project as a single Markdown file.",
    long_about = "projdoc scans a project directory and writes one Markdown document with \nproject metadata, a directory tree, the dependency list and the contents of \nselected source files.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  projdoc generate -i ./myproj -o docs.md\n  projdoc generate -e .rs,.toml -x 'target*' --max-snippet-lines 200\n  projdoc show -f json meta\n  projdoc show tree",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "g",
        visible_alias = "gen",
        about = "Generate the Markdown document for a project."
    )]
    Generate(GenerateArgs),

    #[command(
        visible_alias = "s",
        about = "Show the extracted metadata, tree or file list."
    )]
    Show(ShowArgs),

    #[command(about = "Show or save the default configuration file structure.")]
    Config(ConfigArgs),

    #[command(about = "Generate or save shell completion scripts.")]
    Completion(CompletionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Markdown file to write; its name gets a 'generated_' prefix [default: project.md].",
        help_heading = "Output Control",
        conflicts_with = "stdout"
    )]
    pub output_file: Option<PathBuf>,

    #[arg(
        long,
        help = "Print the document to standard output instead of writing a file.",
        help_heading = "Output Control"
    )]
    pub stdout: bool,

    #[clap(flatten)]
    pub section_toggles: SectionTogglesGroup,
    #[clap(flatten)]
    pub filters: FilterGroup,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub format_output: FormatOutputOpts,
    #[clap(flatten)]
    pub filters: FilterGroup,
    #[command(subcommand)]
    pub item: ShowItem,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ShowItem {
    #[command(about = "Show the project metadata (name, version, author, dependencies).")]
    Meta,
    #[command(about = "Show the directory tree.")]
    Tree,
    #[command(about = "Show the files that would be documented.")]
    Files,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    #[arg(
        long,
        value_name = "SHELL",
        help = "Shell to generate completions for (fish, bash, zsh) [default: fish]"
    )]
    pub shell: Option<String>,
    #[arg(
        long,
        help = "Save completion script to default location (prompts overwrite)."
    )]
    pub save: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        short = 'i',
        long,
        visible_alias = "input-dir",
        value_name = "PATH",
        help = "Project directory to save the config into (default: current dir)."
    )]
    pub project_root: Option<PathBuf>,
    #[arg(
        long,
        help = "Save default config structure to default path (prompts overwrite)."
    )]
    pub save: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SectionTogglesGroup {
    #[arg(
        long,
        help = "Include the directory tree [default: enabled].",
        overrides_with = "no_tree",
        help_heading = "Section Toggles"
    )]
    pub with_tree: bool,
    #[arg(
        long,
        help = "Leave out the directory tree.",
        overrides_with = "with_tree",
        help_heading = "Section Toggles"
    )]
    pub no_tree: bool,

    #[arg(
        long,
        help = "Include the dependency list in full mode [default: enabled].",
        overrides_with = "no_deps",
        help_heading = "Section Toggles"
    )]
    pub with_deps: bool,
    #[arg(
        long,
        help = "Leave out the dependency list.",
        overrides_with = "with_deps",
        help_heading = "Section Toggles"
    )]
    pub no_deps: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterGroup {
    #[arg(
        short = 'e',
        long,
        value_name = "LIST",
        help = "Comma-separated extensions to include [default: .py,.md,.yaml,.json]. An empty value includes every file.",
        help_heading = "Content Filtering"
    )]
    pub extensions: Option<String>,

    #[arg(
        short = 'x',
        long,
        value_name = "PATTERNS",
        action = clap::ArgAction::Append,
        help = "Comma-separated glob patterns of files or directories to skip (repeatable).",
        help_heading = "Content Filtering"
    )]
    pub exclude: Vec<String>,

    #[arg(
        long,
        help = "Do not add the built-in excludes (*.lock, *__pycache__*, *.egg-info*).",
        help_heading = "Content Filtering"
    )]
    pub disable_builtin_excludes: bool,

    #[arg(
        long,
        value_name = "MODE",
        value_parser = ["light", "full"],
        help = "Extraction mode: 'full' documents every matching file, 'light' only README.md [default: full].",
        help_heading = "Content Filtering"
    )]
    pub mode: Option<String>,

    #[arg(
        long,
        value_name = "N",
        help = "Keep at most N lines of each file.",
        help_heading = "Content Filtering"
    )]
    pub max_snippet_lines: Option<usize>,
}
