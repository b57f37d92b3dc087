//! Packaging of the serialized registry
//!
//! The serializer produces a CommonJS module body. A [`Bundler`] turns that
//! body into the artifact handed to consumers, exposed under a module name.
//! The template runtime module is never inlined: the generated code
//! `require`s it when the artifact is evaluated.

use std::fmt;

use log::debug;

use crate::{
    error::{Result, ViewError},
    js,
};

#[derive(Debug, Clone)]
pub struct BundleOptions {
    /// Name the registry module is exposed under
    pub exposed_name: String,
    pub minify: bool,
}

/// Packages a module body into a deployable artifact.
pub trait Bundler: fmt::Debug {
    fn bundle(&self, source: &str, options: &BundleOptions) -> Result<String>;
}

/// Wraps the module body so it loads as a CommonJS module when `module` is
/// available and registers itself on the global object under the exposed
/// name otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct UmdBundler;

impl Bundler for UmdBundler {
    fn bundle(&self, source: &str, options: &BundleOptions) -> Result<String> {
        if options.exposed_name.is_empty() {
            return Err(ViewError::Bundle("exposed module name is empty".to_owned()));
        }

        let body: String = source
            .lines()
            .map(|line| {
                if line.is_empty() {
                    "\n".to_owned()
                } else {
                    format!("  {line}\n")
                }
            })
            .collect();
        let wrapped = format!(
            r#"(function(root, factory) {{
  if (typeof module === "object" && module.exports) {{
    module.exports = factory(require);
  }} else {{
    root[{name}] = factory(root.require);
  }}
}})(this, function(require) {{
  var module = {{ exports: {{}} }};
{body}  return module.exports;
}});
"#,
            name = js::string_literal(&options.exposed_name),
        );

        let artifact = if options.minify {
            minify(&wrapped)
        } else {
            wrapped
        };
        debug!(
            "Bundled registry as '{}' ({} bytes)",
            options.exposed_name,
            artifact.len()
        );
        Ok(artifact)
    }
}

/// Strip indentation and blank lines. Generated string literals never span
/// lines, so this cannot change their contents.
fn minify(code: &str) -> String {
    let mut out: String = code
        .lines()
        .map(str::trim_start)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    out.push('\n');
    out
}
