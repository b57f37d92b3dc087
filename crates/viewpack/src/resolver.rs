use std::{
    ffi::OsString,
    path::{Component, Path, PathBuf},
};

use log::{debug, trace};

use crate::{
    error::{Result, ViewError},
    fs::FileSystem,
    types::FxIndexSet,
};

/// Directory searched for bare references when nothing else is configured
pub const DEFAULT_MODULE_DIRECTORY: &str = "node_modules";

/// How a reference is interpreted before any candidate is tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReferenceKind {
    /// `./a`, `../a`, `/a`: a path relative to the base directory, file first
    Path,
    /// `./a/`, `.`, `..`: a path that can only name a directory
    Directory,
    /// `pkg/a`: searched for in enclosing module directories
    Bare,
}

impl ReferenceKind {
    fn of(reference: &str) -> Self {
        let names_directory = reference == "." || reference == ".." || reference.ends_with('/');
        if names_directory && (reference.starts_with('.') || reference.starts_with('/')) {
            return Self::Directory;
        }
        if reference.starts_with("./")
            || reference.starts_with("../")
            || Path::new(reference).is_absolute()
        {
            Self::Path
        } else {
            Self::Bare
        }
    }
}

/// Resolves view references to files.
///
/// Resolution follows the Node module algorithm with two differences that
/// matter for template directories: a package manifest's `main` entry is
/// never consulted (it names a code entry point, not a view file), and the
/// recognized extensions are the configured view extensions.
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    fs: &'a dyn FileSystem,
    extensions: &'a FxIndexSet<String>,
    module_directories: &'a [String],
}

impl<'a> PathResolver<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        extensions: &'a FxIndexSet<String>,
        module_directories: &'a [String],
    ) -> Self {
        Self {
            fs,
            extensions,
            module_directories,
        }
    }

    /// Resolve `reference` against `base_dir`.
    ///
    /// Tries the reference verbatim, then with each extension appended in
    /// order, then as a directory containing an `index` file.
    pub fn resolve(&self, reference: &str, base_dir: &Path) -> Result<PathBuf> {
        let resolved = match ReferenceKind::of(reference) {
            ReferenceKind::Path => {
                let candidate = normalize_path(&base_dir.join(reference));
                self.load_as_file(&candidate)
                    .or_else(|| self.load_as_directory(&candidate))
            }
            ReferenceKind::Directory => {
                self.load_as_directory(&normalize_path(&base_dir.join(reference)))
            }
            ReferenceKind::Bare => self.load_from_module_directories(reference, base_dir),
        };

        match resolved {
            Some(path) => {
                debug!("Resolved '{reference}' to {}", path.display());
                Ok(path)
            }
            None => Err(ViewError::FileNotFound {
                reference: reference.to_owned(),
                base_dir: base_dir.to_path_buf(),
            }),
        }
    }

    /// Resolve an entry file given as a filesystem path rather than a module
    /// reference: `views/app` is `<base_dir>/views/app`, never a module lookup.
    pub fn resolve_entry(&self, filename: &Path, base_dir: &Path) -> Result<PathBuf> {
        let candidate = normalize_path(&base_dir.join(filename));
        self.load_as_file(&candidate)
            .or_else(|| self.load_as_directory(&candidate))
            .ok_or_else(|| ViewError::FileNotFound {
                reference: filename.display().to_string(),
                base_dir: base_dir.to_path_buf(),
            })
    }

    fn load_as_file(&self, candidate: &Path) -> Option<PathBuf> {
        if self.fs.is_file(candidate) {
            return Some(candidate.to_path_buf());
        }
        self.extensions
            .iter()
            .map(|extension| with_suffix(candidate, extension))
            .find(|path| self.fs.is_file(path))
    }

    fn load_as_directory(&self, dir: &Path) -> Option<PathBuf> {
        if !self.fs.is_dir(dir) {
            return None;
        }
        // Package manifests are not consulted; only `index` files count.
        trace!("Looking for an index view in {}", dir.display());
        self.load_as_file(&dir.join("index"))
    }

    fn load_from_module_directories(&self, reference: &str, base_dir: &Path) -> Option<PathBuf> {
        self.module_search_paths(base_dir)
            .into_iter()
            .find_map(|dir| {
                let candidate = normalize_path(&dir.join(reference));
                self.load_as_file(&candidate)
                    .or_else(|| self.load_as_directory(&candidate))
            })
    }

    /// Module directories to search for a bare reference, nearest first.
    pub fn module_search_paths(&self, base_dir: &Path) -> Vec<PathBuf> {
        let base_dir = normalize_path(base_dir);
        let mut paths = Vec::new();
        for ancestor in base_dir.ancestors() {
            let is_module_dir = ancestor.file_name().is_some_and(|name| {
                self.module_directories
                    .iter()
                    .any(|dir| name == dir.as_str())
            });
            if is_module_dir {
                continue;
            }
            for dir in self.module_directories {
                paths.push(ancestor.join(dir));
            }
        }
        paths
    }
}

/// Append `suffix` to the final path component (`a/b` + `.html` -> `a/b.html`).
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut joined = OsString::from(path.as_os_str());
    joined.push(suffix);
    PathBuf::from(joined)
}

/// Lexically normalize a path, removing `.` and folding `..` into its parent.
///
/// Symlinks are not resolved, so resolved view paths keep the shape the
/// caller used.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                normalized.push(component.as_os_str());
            }
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
        }
    }
    normalized
}
