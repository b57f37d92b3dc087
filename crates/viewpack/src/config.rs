//! Configuration file support
//!
//! Settings come from a `viewpack.toml` in the project directory, falling
//! back to the user's configuration directory, with command-line flags
//! layered on top:
//!
//! ```toml
//! module_name = "views"
//! minify = false
//! runtime_module = "derby-templates"
//! module_directories = ["node_modules"]
//!
//! [compilers]
//! ".tpl" = "view"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use etcetera::{BaseStrategy, choose_base_strategy};
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;

use crate::{
    app::AppConfig,
    compile::CompileOptions,
    compilers::{self, BUILTIN_COMPILERS},
    error::ViewError,
};

/// File name looked up in the project and user configuration directories
pub const CONFIG_FILE_NAME: &str = "viewpack.toml";

/// Settings read from a configuration file or the command line. Unset fields
/// fall back to the defaults of [`CompileOptions`] and [`AppConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub module_name: Option<String>,
    pub minify: Option<bool>,
    pub runtime_module: Option<String>,
    pub module_directories: Option<Vec<String>>,
    /// Extension -> built-in compiler name
    pub compilers: IndexMap<String, String>,
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load `viewpack.toml` from `base_dir`, else from the user config
    /// directory. Returns the file used, if any.
    pub fn discover(base_dir: &Path) -> Result<Option<(PathBuf, Self)>> {
        let candidates = std::iter::once(base_dir.join(CONFIG_FILE_NAME)).chain(user_config_path());
        for candidate in candidates {
            if candidate.is_file() {
                debug!("Using config file {}", candidate.display());
                let config = Self::load(&candidate)?;
                return Ok(Some((candidate, config)));
            }
        }
        Ok(None)
    }

    /// Layer `overrides` on top of `self`. Compilers from both are kept, with
    /// `overrides` winning per extension.
    #[must_use]
    pub fn merge(mut self, overrides: Self) -> Self {
        let mut compilers = std::mem::take(&mut self.compilers);
        compilers.extend(overrides.compilers);
        Self {
            module_name: overrides.module_name.or(self.module_name),
            minify: overrides.minify.or(self.minify),
            runtime_module: overrides.runtime_module.or(self.runtime_module),
            module_directories: overrides.module_directories.or(self.module_directories),
            compilers,
        }
    }

    /// Build the run's [`AppConfig`], failing on unknown compiler names.
    pub fn app_config(&self) -> std::result::Result<AppConfig, ViewError> {
        let mut app = AppConfig::new();
        for (extension, name) in &self.compilers {
            let compiler = compilers::builtin(name).ok_or_else(|| {
                ViewError::Configuration(format!(
                    "Unknown compiler `{name}` for {extension} (expected one of: {})",
                    BUILTIN_COMPILERS.join(", ")
                ))
            })?;
            app.add_compiler(extension, compiler);
        }
        if let Some(directories) = &self.module_directories {
            app = app.with_module_directories(directories.clone());
        }
        Ok(app)
    }

    pub fn compile_options(&self) -> CompileOptions {
        let defaults = CompileOptions::default();
        CompileOptions {
            module_name: self.module_name.clone().unwrap_or(defaults.module_name),
            minify: self.minify.unwrap_or(defaults.minify),
            runtime_module: self
                .runtime_module
                .clone()
                .unwrap_or(defaults.runtime_module),
        }
    }
}

/// `<config dir>/viewpack/viewpack.toml` for the current user, if a home
/// directory can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    let strategy = choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("viewpack").join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_parse_full_config() -> Result<()> {
        let config = Config::from_toml_str(
            r#"
            module_name = "templates"
            minify = true
            runtime_module = "my-runtime"
            module_directories = ["node_modules", "bower_components"]

            [compilers]
            ".tpl" = "view"
            htm = "html"
            "#,
        )?;

        assert_eq!(config.module_name.as_deref(), Some("templates"));
        assert_eq!(config.minify, Some(true));
        assert_eq!(config.compilers.len(), 2);

        let app = config.app_config()?;
        assert_eq!(
            app.extensions().iter().map(String::as_str).collect::<Vec<_>>(),
            [".html", ".tpl", ".htm"]
        );
        assert_eq!(app.module_directories(), ["node_modules", "bower_components"]);

        let options = config.compile_options();
        assert_eq!(options.module_name, "templates");
        assert!(options.minify);
        assert_eq!(options.runtime_module, "my-runtime");
        Ok(())
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(Config::from_toml_str("modul_name = \"x\"").is_err());
    }

    #[test]
    fn test_unknown_compiler_is_configuration_error() -> Result<()> {
        let config = Config::from_toml_str("[compilers]\n\".jade\" = \"jade\"\n")?;
        let err = config.app_config().expect_err("jade is not built in");
        assert!(matches!(err, ViewError::Configuration(_)));
        assert!(err.to_string().contains("jade"), "{err}");
        Ok(())
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let base = Config {
            module_name: Some("base".to_owned()),
            minify: Some(true),
            compilers: IndexMap::from([(".tpl".to_owned(), "html".to_owned())]),
            ..Config::default()
        };
        let overrides = Config {
            module_name: Some("cli".to_owned()),
            compilers: IndexMap::from([
                (".tpl".to_owned(), "view".to_owned()),
                (".md".to_owned(), "view".to_owned()),
            ]),
            ..Config::default()
        };

        let merged = base.merge(overrides);
        assert_eq!(merged.module_name.as_deref(), Some("cli"));
        assert_eq!(merged.minify, Some(true));
        assert_eq!(
            merged.compilers.into_iter().collect::<Vec<_>>(),
            vec![
                (".tpl".to_owned(), "view".to_owned()),
                (".md".to_owned(), "view".to_owned()),
            ]
        );
    }

    #[test]
    fn test_defaults() {
        let options = Config::default().compile_options();
        assert_eq!(options.module_name, "views");
        assert!(!options.minify);
        assert_eq!(options.runtime_module, "derby-templates");
    }

    #[test]
    fn test_discover_prefers_project_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "module_name = \"project\"\n")?;

        let (found, config) = Config::discover(temp_dir.path())?.expect("project config exists");
        assert_eq!(found, path);
        assert_eq!(config.module_name.as_deref(), Some("project"));
        Ok(())
    }

    #[test]
    fn test_load_reports_path_on_parse_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "minify = \"yes\"\n")?;

        let err = Config::load(&path).expect_err("minify must be a bool");
        assert!(format!("{err:#}").contains(CONFIG_FILE_NAME), "{err:#}");
        Ok(())
    }
}
