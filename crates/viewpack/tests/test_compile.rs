use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Result;
use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use viewpack::{
    AppConfig, CompileOptions, Config, ViewError, ViewRegistry, compile,
    compilers::html_compiler,
    fs::OsFileSystem,
    loader::ViewLoader,
};

fn write(root: &Path, relative: &str, contents: &str) -> Result<PathBuf> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, contents)?;
    Ok(path)
}

fn view_names(root: &Path, entries: &[&str]) -> Result<Vec<String>> {
    let app = AppConfig::new();
    let loaded = ViewLoader::new(&app, &OsFileSystem).load_entries(entries, root)?;
    Ok(loaded.views.into_iter().map(|view| view.name).collect())
}

#[test]
fn test_imports_from_module_directories() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write(
        root,
        "app/views/index.html",
        "<import: src=\"widgets/button\">\n<import: src=\"widgets\" ns=\"kit\">\n<Body:>\n",
    )?;
    write(root, "node_modules/widgets/button.html", "<primary:>\n<b>ok</b>\n")?;
    write(
        root,
        "node_modules/widgets/package.json",
        r#"{ "main": "lib/index.js" }"#,
    )?;
    write(root, "node_modules/widgets/index.html", "<panel:>\n<div></div>\n")?;

    assert_eq!(
        view_names(root, &["app/views/index.html"])?,
        ["button:primary", "kit:panel", "Body"]
    );
    Ok(())
}

#[test]
fn test_nearest_module_directory_wins() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write(root, "app/views/index.html", "<import: src=\"theme\" ns=\"t\">")?;
    write(root, "app/node_modules/theme/index.html", "<near:>")?;
    write(root, "node_modules/theme/index.html", "<far:>")?;

    assert_eq!(view_names(root, &["app/views/index.html"])?, ["t:near"]);
    Ok(())
}

#[test]
fn test_duplicate_views_across_entries() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write(root, "a.html", "<header:>\nfirst\n<footer:>\nf\n")?;
    write(root, "b.html", "<header:>\nsecond\n")?;

    let app = AppConfig::new();
    let loaded = ViewLoader::new(&app, &OsFileSystem).load_entries(&["a", "b.html"], root)?;
    assert_eq!(loaded.files, [root.join("a.html"), root.join("b.html")]);

    let registry = ViewRegistry::from_views(loaded.views);
    assert_eq!(registry.names().collect::<Vec<_>>(), ["footer", "header"]);
    assert_eq!(
        registry.get("header").map(|entry| entry.source.as_str()),
        Some("\nsecond\n\n")
    );
    Ok(())
}

#[test]
fn test_compile_source_snapshot() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write(
        root,
        "views/index.html",
        "<import: src=\"./nav\">\n<Body: tag=\"main\">\n  <h1>{{title}}</h1>\n",
    )?;
    write(root, "views/nav.html", "<link:>\n  <a>{{{label}}}</a>\n")?;

    let compilation = compile(
        &["views/index.html"],
        root,
        &AppConfig::new(),
        &CompileOptions::default(),
    )?;

    assert_eq!(compilation.view_count, 2);
    assert_snapshot!(compilation.source, @r#"
    module.exports = function(views) {
      var runtime = require("derby-templates");
      var expressions = runtime.expressions;
      var templates = runtime.templates;

      views.register("nav:link", "\n  <a>{{{label}}}<\/a>\n\n").template = new templates.Template([new templates.Text("\n  <a>"), new templates.DynamicHtml(new expressions.PathExpression(["label"])), new templates.Text("<\/a>\n\n")]);
      views.register("Body", "\n  <h1>{{title}}<\/h1>\n\n", {"tag": "main"}).template = new templates.Template([new templates.Text("\n  <h1>"), new templates.DynamicText(new expressions.PathExpression(["title"])), new templates.Text("<\/h1>\n\n")]);
    }
    "#);
    Ok(())
}

#[test]
fn test_custom_extension_compiler() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write(root, "views/index.html", "<import: src=\"./card\">")?;
    write(root, "views/card.tpl", "<card:>\n{{name}}\n")?;

    let app = AppConfig::new().with_compiler(".tpl", std::sync::Arc::new(html_compiler));
    let compilation = compile(&["views/index.html"], root, &app, &CompileOptions::default())?;

    assert_eq!(compilation.files[0], root.join("views/card.tpl"));
    assert!(compilation.source.contains(r#"views.register("card:card""#));
    Ok(())
}

#[test]
fn test_configured_compilers_apply() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write(root, "views/page.md", "\n  <p>{{body}}</p>\n")?;

    let config = Config::from_toml_str("[compilers]\n\".md\" = \"view\"\n")?;
    let compilation = compile(
        &["views/page.md"],
        root,
        &config.app_config()?,
        &config.compile_options(),
    )?;

    assert!(compilation.source.contains(r#"views.register("index""#));
    Ok(())
}

#[test]
fn test_unregistered_extension_is_configuration_error() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write(root, "views/notes.txt", "<Body:>")?;

    let err = compile(
        &["views/notes.txt"],
        root,
        &AppConfig::new(),
        &CompileOptions::default(),
    )
    .expect_err("no compiler for .txt");
    assert!(matches!(err, ViewError::Configuration(_)));
    assert_eq!(err.to_string(), "Unable to find compiler for: .txt");
    Ok(())
}

#[test]
fn test_missing_import_reports_reference() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path();
    write(root, "views/index.html", "<import: src=\"./missing\"><Body:>")?;

    let err = compile(
        &["views/index.html"],
        root,
        &AppConfig::new(),
        &CompileOptions::default(),
    )
    .expect_err("import does not exist");
    match err {
        ViewError::FileNotFound {
            reference,
            base_dir,
        } => {
            assert_eq!(reference, "./missing");
            assert_eq!(base_dir, root.join("views"));
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}
