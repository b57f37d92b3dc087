//! Recursive view loading
//!
//! Walks the import graph depth first, left to right. Each file contributes
//! the views of everything it imports, in import order, followed by its own
//! views; the same order applies to the visited file list. Imported files
//! are not deduplicated; a file importing itself, directly or through other
//! files, is an error.

use std::path::{Path, PathBuf};

use log::{debug, trace};

use crate::{
    app::AppConfig,
    compilers::extension_of,
    deps::sha256_hex,
    error::{Result, ViewError},
    fs::FileSystem,
    parser::parse_views,
    resolver::PathResolver,
    types::LoadResult,
};

/// Loads view files and their imports.
#[derive(Debug, Clone, Copy)]
pub struct ViewLoader<'a> {
    app: &'a AppConfig,
    fs: &'a dyn FileSystem,
}

impl<'a> ViewLoader<'a> {
    pub fn new(app: &'a AppConfig, fs: &'a dyn FileSystem) -> Self {
        Self { app, fs }
    }

    fn resolver(&self) -> PathResolver<'a> {
        PathResolver::new(
            self.fs,
            self.app.extensions(),
            self.app.module_directories(),
        )
    }

    /// Load every entry file in order, with no namespace, and concatenate the
    /// results. Entries are paths relative to `base_dir`.
    pub fn load_entries<P: AsRef<Path>>(&self, filenames: &[P], base_dir: &Path) -> Result<LoadResult> {
        let resolver = self.resolver();
        let mut result = LoadResult::default();
        for filename in filenames {
            let resolved = resolver.resolve_entry(filename.as_ref(), base_dir)?;
            result.extend(self.load_file(resolved, None)?);
        }
        debug!(
            "Loaded {} views from {} files",
            result.views.len(),
            result.files.len()
        );
        Ok(result)
    }

    /// Load the file `reference` resolves to from `base_dir`, under `namespace`.
    pub fn load(&self, reference: &str, base_dir: &Path, namespace: Option<&str>) -> Result<LoadResult> {
        let resolved = self.resolver().resolve(reference, base_dir)?;
        self.load_file(resolved, namespace)
    }

    /// Load an already resolved file and, recursively, everything it imports.
    pub fn load_file(&self, resolved: PathBuf, namespace: Option<&str>) -> Result<LoadResult> {
        self.load_nested(resolved, namespace, &mut Vec::new())
    }

    /// `chain` holds the files currently being loaded, outermost first.
    fn load_nested(
        &self,
        resolved: PathBuf,
        namespace: Option<&str>,
        chain: &mut Vec<PathBuf>,
    ) -> Result<LoadResult> {
        if let Some(start) = chain.iter().position(|file| *file == resolved) {
            let cycle = chain[start..]
                .iter()
                .chain(std::iter::once(&resolved))
                .map(|file| file.display().to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(ViewError::ImportCycle { cycle });
        }

        debug!(
            "Loading views from {} (namespace: {})",
            resolved.display(),
            namespace.unwrap_or("<root>")
        );
        let text = self
            .fs
            .read_to_string(&resolved)
            .map_err(|source| ViewError::Io {
                path: resolved.clone(),
                source,
            })?;
        let digest = sha256_hex(&text);
        let markup = self
            .app
            .compilers()
            .compile(&extension_of(&resolved), &text, &resolved)?;

        let resolver = self.resolver();
        let parsed = parse_views(namespace, &markup, &resolved, &resolver)?;

        let mut result = LoadResult::default();
        chain.push(resolved.clone());
        for import in parsed.imports {
            result.extend(self.load_nested(import.filename, import.namespace.as_deref(), chain)?);
        }
        chain.pop();
        for view in &parsed.views {
            trace!("Found view {} in {}", view.name, resolved.display());
        }
        result.views.extend(parsed.views);
        result.files.push(resolved);
        result.digests.push(digest);
        Ok(result)
    }
}
