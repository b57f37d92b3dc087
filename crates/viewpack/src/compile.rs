//! End-to-end compilation: load, register, serialize, bundle
//!
//! A [`Pipeline`] owns no state of its own; it borrows the run's
//! [`AppConfig`] and the collaborators that touch the outside world (file
//! system, template engine, bundler) so each stage can be swapped in tests.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::{
    app::AppConfig,
    bundle::{BundleOptions, Bundler, UmdBundler},
    error::Result,
    fs::{FileSystem, OsFileSystem},
    loader::ViewLoader,
    registry::ViewRegistry,
    serializer::{DEFAULT_RUNTIME_MODULE, SerializeOptions, serialize_registry},
    template::{PathTemplates, TemplateEngine},
    types::LoadResult,
};

/// Name the bundled registry module is exposed under by default
pub const DEFAULT_MODULE_NAME: &str = "views";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub module_name: String,
    pub minify: bool,
    pub runtime_module: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            module_name: DEFAULT_MODULE_NAME.to_owned(),
            minify: false,
            runtime_module: DEFAULT_RUNTIME_MODULE.to_owned(),
        }
    }
}

/// Output of one compilation run
#[derive(Debug, Clone)]
pub struct Compilation {
    /// Serialized registry module, before bundling
    pub source: String,
    /// Bundled artifact exposing the module under the configured name
    pub artifact: String,
    /// Every file read, in load order; a file imported twice appears twice
    pub files: Vec<PathBuf>,
    /// SHA-256 of each entry of `files`, taken from the text that was compiled
    pub digests: Vec<String>,
    /// Number of distinct view names registered
    pub view_count: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'a> {
    app: &'a AppConfig,
    fs: &'a dyn FileSystem,
    engine: &'a dyn TemplateEngine,
    bundler: &'a dyn Bundler,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        app: &'a AppConfig,
        fs: &'a dyn FileSystem,
        engine: &'a dyn TemplateEngine,
        bundler: &'a dyn Bundler,
    ) -> Self {
        Self {
            app,
            fs,
            engine,
            bundler,
        }
    }

    /// Load `filenames` and everything they import into a fresh registry.
    /// Returns the registry and the visited files with their digests.
    pub fn load_registry<P: AsRef<Path>>(
        &self,
        filenames: &[P],
        base_dir: &Path,
    ) -> Result<(ViewRegistry, LoadResult)> {
        let mut loaded = ViewLoader::new(self.app, self.fs).load_entries(filenames, base_dir)?;
        let registry = ViewRegistry::from_views(std::mem::take(&mut loaded.views));
        Ok((registry, loaded))
    }

    pub fn compile<P: AsRef<Path>>(
        &self,
        filenames: &[P],
        base_dir: &Path,
        options: &CompileOptions,
    ) -> Result<Compilation> {
        let (registry, loaded) = self.load_registry(filenames, base_dir)?;
        debug!("Registered {} views", registry.len());

        let source = serialize_registry(
            &registry,
            self.engine,
            &SerializeOptions {
                minify: options.minify,
                runtime_module: options.runtime_module.clone(),
            },
        )?;
        let artifact = self.bundler.bundle(
            &source,
            &BundleOptions {
                exposed_name: options.module_name.clone(),
                minify: options.minify,
            },
        )?;

        info!(
            "Compiled {} views from {} files into '{}'",
            registry.len(),
            loaded.files.len(),
            options.module_name
        );
        Ok(Compilation {
            source,
            artifact,
            files: loaded.files,
            digests: loaded.digests,
            view_count: registry.len(),
        })
    }
}

/// Compile view files from disk with the built-in template engine and the
/// UMD bundler.
pub fn compile<P: AsRef<Path>>(
    filenames: &[P],
    base_dir: &Path,
    app: &AppConfig,
    options: &CompileOptions,
) -> Result<Compilation> {
    Pipeline::new(app, &OsFileSystem, &PathTemplates, &UmdBundler).compile(
        filenames,
        base_dir,
        options,
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use std::{cell::Cell, io};

    use super::*;
    use crate::{
        deps::{dependency_manifest, sha256_hex},
        error::ViewError,
        fs::MemoryFileSystem,
    };

    /// A single file whose contents change after the first read.
    #[derive(Debug, Default)]
    struct ChangingFileSystem {
        reads: Cell<usize>,
    }

    impl FileSystem for ChangingFileSystem {
        fn is_file(&self, path: &Path) -> bool {
            path == Path::new("/app/a.html")
        }

        fn is_dir(&self, _path: &Path) -> bool {
            false
        }

        fn read_to_string(&self, _path: &Path) -> io::Result<String> {
            let reads = self.reads.get();
            self.reads.set(reads + 1);
            Ok(if reads == 0 { "<a:>old" } else { "<a:>new" }.to_owned())
        }
    }

    fn fixture() -> MemoryFileSystem {
        MemoryFileSystem::new()
            .with_file(
                "/app/views/index.html",
                "<import: src=\"./nav\">\n<Body:>\n  <view is=\"nav:bar\"></view>\n",
            )
            .with_file("/app/views/nav.html", "<bar:>\n  <nav>{{title}}</nav>\n")
    }

    fn run(fs: &MemoryFileSystem, options: &CompileOptions) -> Result<Compilation> {
        let app = AppConfig::new();
        Pipeline::new(&app, fs, &PathTemplates, &UmdBundler).compile(
            &["views/index.html"],
            Path::new("/app"),
            options,
        )
    }

    #[test]
    fn test_compile_collects_files_and_views() -> Result<()> {
        let compilation = run(&fixture(), &CompileOptions::default())?;

        assert_eq!(compilation.view_count, 2);
        assert_eq!(
            compilation.files,
            [
                PathBuf::from("/app/views/nav.html"),
                PathBuf::from("/app/views/index.html"),
            ]
        );
        let bar = compilation
            .source
            .find(r#"views.register("nav:bar""#)
            .expect("nav:bar registered");
        let body = compilation
            .source
            .find(r#"views.register("Body""#)
            .expect("Body registered");
        assert!(bar < body);
        assert!(compilation.artifact.contains(r#"root["views"]"#));
        Ok(())
    }

    #[test]
    fn test_options_reach_serializer_and_bundler() -> Result<()> {
        let options = CompileOptions {
            module_name: "appViews".to_owned(),
            minify: true,
            runtime_module: "custom-runtime".to_owned(),
        };
        let compilation = run(&fixture(), &options)?;

        assert!(compilation.source.contains(r#"require("custom-runtime")"#));
        assert!(compilation.source.contains(r#"views.register("Body", null)"#));
        assert!(compilation.artifact.contains(r#"root["appViews"]"#));
        assert!(!compilation.artifact.contains("\n  "));
        Ok(())
    }

    #[test]
    fn test_template_errors_abort_compilation() {
        let fs = MemoryFileSystem::new().with_file("/app/views/index.html", "<Body:>{{oops");
        let err = run(&fs, &CompileOptions::default()).expect_err("unclosed tag");
        assert!(matches!(err, ViewError::Template { .. }), "{err}");
    }

    #[test]
    fn test_missing_entry_aborts_compilation() {
        let err = run(&MemoryFileSystem::new(), &CompileOptions::default())
            .expect_err("entry does not exist");
        assert!(matches!(err, ViewError::FileNotFound { .. }), "{err}");
    }

    #[test]
    fn test_digests_match_compiled_contents() -> Result<()> {
        let fs = ChangingFileSystem::default();
        let app = AppConfig::new();
        let compilation = Pipeline::new(&app, &fs, &PathTemplates, &UmdBundler).compile(
            &["a.html"],
            Path::new("/app"),
            &CompileOptions::default(),
        )?;

        assert!(compilation.source.contains("old"));
        assert_eq!(fs.reads.get(), 1);
        assert_eq!(compilation.digests, [sha256_hex("<a:>old")]);

        let manifest = dependency_manifest(&compilation.files, &compilation.digests);
        assert_eq!(manifest, format!("{}  /app/a.html\n", sha256_hex("<a:>old")));
        assert_eq!(fs.reads.get(), 1);
        Ok(())
    }
}
