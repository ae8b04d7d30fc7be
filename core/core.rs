pub mod collect;
pub mod config;
pub mod error;
pub mod filter;
pub mod markdown;
pub mod metadata;
pub mod tree;

pub use collect::{collect, select_files};
pub use config::{Config, FiltersConfig, GeneralConfig, Mode, OutputConfig};
pub use error::{AppError, Result};
pub use filter::{BUILTIN_EXCLUDES, ExclusionSet, is_default_skipped, is_excluded};
pub use markdown::{Document, FileSnippet, render_document};
pub use metadata::{
    MetadataExtractor, MetadataSource, PartialMetadata, ProjectMetadata, ProjectScan,
    extract as extract_metadata,
};
pub use tree::render as render_tree;
