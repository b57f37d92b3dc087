//! Settings shared by every stage of one compilation run

use log::debug;

use crate::{
    compilers::{CompilerFn, CompilerRegistry, DEFAULT_EXTENSION, normalize_extension},
    resolver::DEFAULT_MODULE_DIRECTORY,
    types::FxIndexSet,
};

/// Recognized extensions, their compilers and the module directories searched
/// for bare imports. Built once per run and read-only afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
    extensions: FxIndexSet<String>,
    compilers: CompilerRegistry,
    module_directories: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    /// `.html` compiled verbatim, bare imports searched in `node_modules`.
    pub fn new() -> Self {
        let mut extensions = FxIndexSet::default();
        extensions.insert(DEFAULT_EXTENSION.to_owned());
        Self {
            extensions,
            compilers: CompilerRegistry::new(),
            module_directories: vec![DEFAULT_MODULE_DIRECTORY.to_owned()],
        }
    }

    /// Register a compiler, appending its extension to the recognized set if novel.
    #[must_use]
    pub fn with_compiler(mut self, extension: &str, compiler: CompilerFn) -> Self {
        self.add_compiler(extension, compiler);
        self
    }

    pub fn add_compiler(&mut self, extension: &str, compiler: CompilerFn) {
        let extension = normalize_extension(extension);
        if self.extensions.insert(extension.clone()) {
            debug!("Recognizing view extension {extension}");
        }
        self.compilers.register(&extension, compiler);
    }

    /// Replace the directory names searched for bare references.
    #[must_use]
    pub fn with_module_directories(mut self, directories: Vec<String>) -> Self {
        self.module_directories = directories;
        self
    }

    pub fn extensions(&self) -> &FxIndexSet<String> {
        &self.extensions
    }

    pub fn compilers(&self) -> &CompilerRegistry {
        &self.compilers
    }

    pub fn module_directories(&self) -> &[String] {
        &self.module_directories
    }
}
