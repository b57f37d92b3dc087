use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Parser};
use indexmap::IndexMap;
use log::{LevelFilter, debug, error, info};
use viewpack::{Config, Pipeline, bundle::UmdBundler, deps, fs::OsFileSystem, template::PathTemplates};

/// Compile view template files into a single registry module
#[derive(Parser, Debug)]
#[command(name = "viewpack", version, about)]
struct Cli {
    /// Entry view files, relative to the current directory
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Write the artifact here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Name the registry module is exposed under
    #[arg(long)]
    module_name: Option<String>,

    /// Drop view sources and strip whitespace from the artifact
    #[arg(long)]
    minify: bool,

    /// Compile files with extension EXT using built-in compiler NAME
    #[arg(long = "compiler", value_name = "EXT=NAME", value_parser = parse_compiler)]
    compilers: Vec<(String, String)>,

    /// Module the generated code requires the template runtime from
    #[arg(long)]
    runtime_module: Option<String>,

    /// Configuration file (defaults to viewpack.toml discovery)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a sha256 manifest of every file read
    #[arg(long, value_name = "PATH")]
    emit_deps: Option<PathBuf>,

    /// Emit the registry module without the bundle wrapper
    #[arg(long)]
    source_only: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> Config {
        Config {
            module_name: self.module_name.clone(),
            minify: self.minify.then_some(true),
            runtime_module: self.runtime_module.clone(),
            module_directories: None,
            compilers: self.compilers.iter().cloned().collect::<IndexMap<_, _>>(),
        }
    }

    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn parse_compiler(value: &str) -> Result<(String, String)> {
    let (extension, name) = value
        .split_once('=')
        .ok_or_else(|| anyhow!("expected EXT=NAME, got `{value}`"))?;
    if extension.is_empty() || name.is_empty() {
        return Err(anyhow!("expected EXT=NAME, got `{value}`"));
    }
    Ok((extension.to_owned(), name.to_owned()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let base_dir = std::env::current_dir().context("Failed to determine current directory")?;

    let file_config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::discover(&base_dir)?
            .map(|(_, config)| config)
            .unwrap_or_default(),
    };
    let config = file_config.merge(cli.overrides());
    debug!("Effective configuration: {config:?}");

    let app = config.app_config()?;
    let options = config.compile_options();
    let fs = OsFileSystem;
    let compilation = Pipeline::new(&app, &fs, &PathTemplates, &UmdBundler)
        .compile(&cli.files, &base_dir, &options)?;

    let output = if cli.source_only {
        &compilation.source
    } else {
        &compilation.artifact
    };
    // Manifest before artifact: a failed manifest write leaves no new artifact.
    if let Some(path) = &cli.emit_deps {
        let manifest = deps::dependency_manifest(&compilation.files, &compilation.digests);
        write_file(path, &manifest)?;
        info!("Wrote dependency manifest to {}", path.display());
    }

    match &cli.output {
        Some(path) => {
            write_file(path, output)?;
            info!("Wrote {} views to {}", compilation.view_count, path.display());
        }
        None => io::stdout()
            .lock()
            .write_all(output.as_bytes())
            .context("Failed to write to stdout")?,
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
