//! Per-extension transforms from file contents to view markup
//!
//! A compiler turns the text of a resolved file into the tag markup the view
//! parser reads, so views can be authored in other syntaxes as long as they
//! compile down to `<name:>` tags.

use std::{fmt, path::Path, sync::Arc};

use crate::{
    error::{Result, ViewError},
    types::FxIndexMap,
};

/// Extension that is always recognized and compiled with [`html_compiler`]
pub const DEFAULT_EXTENSION: &str = ".html";

/// Names accepted by [`builtin`]
pub const BUILTIN_COMPILERS: &[&str] = &["html", "view"];

/// Transform from file text to view markup. Receives the resolved path for
/// error reporting.
pub type CompilerFn = Arc<dyn Fn(&str, &Path) -> Result<String> + Send + Sync>;

/// Identity transform: the file is already view markup.
pub fn html_compiler(text: &str, _path: &Path) -> Result<String> {
    Ok(text.to_owned())
}

/// Treat the whole file as the body of a single view named `index`.
///
/// Useful for plain template files: imported as `./card`, the file becomes
/// the view `card:index`.
pub fn view_compiler(text: &str, _path: &Path) -> Result<String> {
    Ok(format!("<index:>{text}"))
}

/// Look up a built-in compiler by name.
pub fn builtin(name: &str) -> Option<CompilerFn> {
    match name {
        "html" => Some(Arc::new(html_compiler) as CompilerFn),
        "view" => Some(Arc::new(view_compiler) as CompilerFn),
        _ => None,
    }
}

/// Normalize an extension to the dotted form used for lookups (`jade` -> `.jade`).
pub fn normalize_extension(extension: &str) -> String {
    if extension.starts_with('.') {
        extension.to_owned()
    } else {
        format!(".{extension}")
    }
}

/// Extension of a resolved path in lookup form, or `""` if it has none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Mapping from extension to compiler, in registration order.
#[derive(Clone)]
pub struct CompilerRegistry {
    compilers: FxIndexMap<String, CompilerFn>,
}

impl fmt::Debug for CompilerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilerRegistry")
            .field("extensions", &self.compilers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for CompilerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilerRegistry {
    /// A registry holding only the identity compiler for [`DEFAULT_EXTENSION`].
    pub fn new() -> Self {
        let mut compilers = FxIndexMap::default();
        compilers.insert(
            DEFAULT_EXTENSION.to_owned(),
            Arc::new(html_compiler) as CompilerFn,
        );
        Self { compilers }
    }

    /// Register `compiler` for `extension`, replacing any previous one.
    ///
    /// A replaced extension keeps its original position.
    pub fn register(&mut self, extension: &str, compiler: CompilerFn) {
        self.compilers
            .insert(normalize_extension(extension), compiler);
    }

    pub fn get(&self, extension: &str) -> Option<&CompilerFn> {
        self.compilers.get(extension)
    }

    pub fn contains(&self, extension: &str) -> bool {
        self.compilers.contains_key(extension)
    }

    /// Run the compiler registered for `extension`.
    pub fn compile(&self, extension: &str, text: &str, path: &Path) -> Result<String> {
        let compiler = self
            .get(extension)
            .ok_or_else(|| ViewError::missing_compiler(extension))?;
        compiler(text, path)
    }

    /// Registered extensions in registration order.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.compilers.keys().map(String::as_str)
    }
}
