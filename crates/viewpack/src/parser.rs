//! View file parser
//!
//! Every top-level construct of a view file is a view tag: `<name:>` opens a
//! view whose body runs to the next view tag, and `<import:>` pulls in the
//! views of another file. Any other top-level tag is an error.
//!
//! Namespaces compose with `:`. A file loaded under namespace `app` names its
//! view `<nav:>` as `app:nav`; an import inside it with `ns="menu"` (or a
//! `src` whose base name is `menu`) loads that file under `app:menu`. An
//! import with an explicitly empty `ns` loads the file under `app` itself.

use std::{mem, path::Path};

use log::trace;

use crate::{
    compilers::extension_of,
    error::{Result, ViewError},
    resolver::PathResolver,
    scanner::{self, TagHandler},
    types::{Attributes, ImportDirective, ViewDefinition},
};

/// Name of the view tag that imports another file
pub const IMPORT_TAG: &str = "import";

/// Imports and views declared by one file, each in encounter order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedFile {
    pub imports: Vec<ImportDirective>,
    pub views: Vec<ViewDefinition>,
}

#[derive(Debug)]
enum ParseState {
    AwaitingTag,
    InViewBody { name: String, attributes: Attributes },
}

/// Collects views and imports from scanner events.
#[derive(Debug)]
struct ViewFileParser<'a> {
    namespace: Option<&'a str>,
    /// `namespace:` or empty, prepended to every view and import namespace
    prefix: String,
    filename: &'a Path,
    resolver: &'a PathResolver<'a>,
    state: ParseState,
    parsed: ParsedFile,
}

impl<'a> ViewFileParser<'a> {
    fn new(namespace: Option<&'a str>, filename: &'a Path, resolver: &'a PathResolver<'a>) -> Self {
        let namespace = namespace.filter(|ns| !ns.is_empty());
        Self {
            namespace,
            prefix: namespace.map(|ns| format!("{ns}:")).unwrap_or_default(),
            filename,
            resolver,
            state: ParseState::AwaitingTag,
            parsed: ParsedFile::default(),
        }
    }

    /// Resolve an import tag and record where its views will be namespaced.
    fn push_import(&mut self, tag: &str, attributes: &Attributes) -> Result<()> {
        let src = attributes
            .get("src")
            .ok_or_else(|| ViewError::MissingAttribute {
                tag: tag.to_owned(),
                attribute: "src",
                file: self.filename.to_path_buf(),
            })?;

        let dir = self.filename.parent().unwrap_or_else(|| Path::new(""));
        let resolved = self.resolver.resolve(src, dir)?;

        let import_namespace = match attributes.get("ns") {
            Some(ns) => ns.clone(),
            None => reference_base_name(src, &extension_of(&resolved)),
        };
        let namespace = if import_namespace.is_empty() {
            self.namespace.map(str::to_owned)
        } else {
            Some(format!("{}{import_namespace}", self.prefix))
        };

        trace!(
            "{} imports {} as {}",
            self.filename.display(),
            resolved.display(),
            namespace.as_deref().unwrap_or("<root>")
        );
        self.parsed.imports.push(ImportDirective {
            filename: resolved,
            namespace,
        });
        Ok(())
    }
}

impl TagHandler for ViewFileParser<'_> {
    fn start(&mut self, tag: &str, name: &str, attributes: Attributes) -> Result<()> {
        let view_name = match name.strip_suffix(':') {
            Some(view_name) if !view_name.is_empty() => view_name,
            _ => {
                return Err(ViewError::MalformedTag {
                    tag: tag.to_owned(),
                    file: self.filename.to_path_buf(),
                });
            }
        };

        if view_name == IMPORT_TAG {
            self.push_import(tag, &attributes)?;
        }
        self.state = ParseState::InViewBody {
            name: view_name.to_owned(),
            attributes,
        };
        Ok(())
    }

    fn text(&mut self, text: &str, is_raw: bool) -> Result<()> {
        if !is_raw {
            return Ok(());
        }
        if let ParseState::InViewBody { name, attributes } =
            mem::replace(&mut self.state, ParseState::AwaitingTag)
        {
            if name != IMPORT_TAG {
                self.parsed.views.push(ViewDefinition {
                    name: format!("{}{name}", self.prefix),
                    source: text.to_owned(),
                    options: attributes,
                    filename: self.filename.to_path_buf(),
                });
            }
        }
        Ok(())
    }
}

/// Parse the views and imports of one file.
///
/// `namespace` is the namespace the file is loaded under (`None` for entry
/// files). Imports are resolved relative to `filename` as they are
/// encountered, so a missing import fails before any views are returned.
///
/// The markup is scanned with a newline appended, so a view whose body runs
/// to the end of the file ends in one extra `\n`.
pub fn parse_views(
    namespace: Option<&str>,
    markup: &str,
    filename: &Path,
    resolver: &PathResolver<'_>,
) -> Result<ParsedFile> {
    let mut parser = ViewFileParser::new(namespace, filename, resolver);
    let markup = format!("{markup}\n");
    scanner::scan(&markup, scanner::is_raw_view_tag, &mut parser)?;
    Ok(parser.parsed)
}

/// Base name of an import reference without the resolved file's extension
/// (`./nav/menu` or `./nav/menu.html` -> `menu`).
///
/// The last `/`-separated segment, taken literally: `.` and `..` are names
/// too (`./` -> `.`), and only a reference made of slashes has no base name.
fn reference_base_name(reference: &str, extension: &str) -> String {
    let base = reference
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    match base.strip_suffix(extension) {
        Some(stem) if !stem.is_empty() && !extension.is_empty() => stem.to_owned(),
        _ => base.to_owned(),
    }
}
