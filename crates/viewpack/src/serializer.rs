//! Registry serialization
//!
//! Renders a [`ViewRegistry`] as a CommonJS module exporting a function that
//! re-registers every view, in registry order, on the views object it is
//! given and attaches each view's compiled template:
//!
//! ```text
//! module.exports = function(views) {
//!   var runtime = require("derby-templates");
//!   var expressions = runtime.expressions;
//!   var templates = runtime.templates;
//!
//!   views.register("Body", "<p>{{name}}</p>").template = new templates.Template([...]);
//! }
//! ```

use log::debug;

use crate::{
    error::Result,
    js,
    registry::ViewRegistry,
    template::TemplateEngine,
};

/// Module the generated code loads the template runtime from by default
pub const DEFAULT_RUNTIME_MODULE: &str = "derby-templates";

#[derive(Debug, Clone)]
pub struct SerializeOptions {
    /// Replace each view's source with `null`; the compiled template carries
    /// everything needed at load time.
    pub minify: bool,
    /// Module required for the `templates` and `expressions` namespaces
    pub runtime_module: String,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            minify: false,
            runtime_module: DEFAULT_RUNTIME_MODULE.to_owned(),
        }
    }
}

/// Serialize every entry of `registry`, compiling templates that have not
/// been compiled yet.
pub fn serialize_registry(
    registry: &ViewRegistry,
    engine: &dyn TemplateEngine,
    options: &SerializeOptions,
) -> Result<String> {
    let mut out = String::from("module.exports = function(views) {\n");
    out.push_str(&format!(
        "  var runtime = require({});\n",
        js::string_literal(&options.runtime_module)
    ));
    out.push_str("  var expressions = runtime.expressions;\n");
    out.push_str("  var templates = runtime.templates;\n\n");

    for entry in registry.iter() {
        let template = entry.ensure_template(engine)?;

        let mut args = vec![js::string_literal(&entry.name)];
        args.push(if options.minify {
            "null".to_owned()
        } else {
            js::string_literal(&entry.source)
        });
        if !entry.options.is_empty() {
            args.push(js::object_literal(&entry.options));
        }

        out.push_str(&format!(
            "  views.register({}).template = {};\n",
            args.join(", "),
            template.serialize()
        ));
    }
    out.push_str("}\n");

    debug!(
        "Serialized {} views ({} bytes{})",
        registry.len(),
        out.len(),
        if options.minify { ", minified" } else { "" }
    );
    Ok(out)
}
