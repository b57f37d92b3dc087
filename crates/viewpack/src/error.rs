//! Error types for view compilation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a compilation run.
///
/// Every variant is fatal: the first error raised anywhere in the import
/// graph propagates to the caller and no registry or artifact is produced.
#[derive(Debug, Error)]
pub enum ViewError {
    /// A view file or import reference could not be resolved to a file.
    #[error("View template file not found: {reference} (searched from {})", base_dir.display())]
    FileNotFound {
        /// The reference exactly as written by the caller or in the `src` attribute.
        reference: String,
        /// Directory the reference was resolved against.
        base_dir: PathBuf,
    },

    /// No compiler is registered for an extension, or a configured compiler is unknown.
    #[error("{0}")]
    Configuration(String),

    /// A top-level tag that is not a view declaration.
    #[error("Expected tag ending in colon (:) instead of {tag} in {}", file.display())]
    MalformedTag { tag: String, file: PathBuf },

    /// A view tag is missing an attribute it cannot work without.
    #[error("Missing `{attribute}` attribute on {tag} in {}", file.display())]
    MissingAttribute {
        tag: String,
        attribute: &'static str,
        file: PathBuf,
    },

    /// A file imports itself, directly or through other files.
    #[error("Import cycle detected: {cycle}")]
    ImportCycle { cycle: String },

    /// Reading a resolved file failed.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A view's source could not be compiled into a template.
    #[error("Failed to compile view `{view}`: {message}")]
    Template { view: String, message: String },

    /// The bundler rejected the serialized registry.
    #[error("Bundling failed: {0}")]
    Bundle(String),
}

impl ViewError {
    pub(crate) fn missing_compiler(extension: &str) -> Self {
        Self::Configuration(format!("Unable to find compiler for: {extension}"))
    }
}

/// Result type for view compilation.
pub type Result<T> = std::result::Result<T, ViewError>;
