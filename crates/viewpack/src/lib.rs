//! Compiles namespaced, importable view templates into a single pre-parsed
//! registry module.
//!
//! View files declare named views with colon-terminated tags and pull in
//! other files with `<import: src="...">`, which namespaces the imported
//! views. [`compile`] resolves the import graph, registers every view, and
//! serializes the registry with each view's compiled template attached.

pub mod app;
pub mod bundle;
pub mod compile;
pub mod compilers;
pub mod config;
pub mod deps;
pub mod error;
pub mod fs;
pub mod js;
pub mod loader;
pub mod parser;
pub mod registry;
pub mod resolver;
pub mod scanner;
pub mod serializer;
pub mod template;
pub mod types;

pub use app::AppConfig;
pub use compile::{Compilation, CompileOptions, Pipeline, compile};
pub use config::Config;
pub use error::{Result, ViewError};
pub use registry::ViewRegistry;
pub use types::{LoadResult, ViewDefinition};
