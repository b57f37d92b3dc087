//! Template compilation for view sources
//!
//! The registry only needs two capabilities from a template implementation:
//! parse a view's source once, and write the result out as an expression the
//! runtime module can evaluate. [`PathTemplates`] is the built-in engine: text
//! with `{{ path.to.value }}` (escaped) and `{{{ path }}}` (unescaped)
//! interpolations and `{{! comments }}`.

use std::fmt;

use crate::{
    error::{Result, ViewError},
    js,
};

/// A parsed template that can be written out as a runtime expression.
pub trait CompiledTemplate: fmt::Debug {
    /// Expression reconstructing this template, evaluated where `templates`
    /// and `expressions` name the runtime module's namespaces.
    fn serialize(&self) -> String;
}

/// Turns view source into compiled templates.
pub trait TemplateEngine: fmt::Debug {
    /// Parse the source of the view named `view`.
    fn parse(&self, view: &str, source: &str) -> Result<Box<dyn CompiledTemplate>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    /// Value at a dotted path; an empty path is the current context.
    Path { path: Vec<String>, unescaped: bool },
}

/// A template made of literal text and path interpolations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(view: &str, source: &str) -> Result<Self> {
        let error = |message: String| ViewError::Template {
            view: view.to_owned(),
            message,
        };

        let mut template = Self::default();
        let mut rest = source;
        let mut offset = 0;
        while let Some(open) = rest.find("{{") {
            template.push_text(&rest[..open]);
            let tag = &rest[open..];

            let (close, unescaped) = if tag.starts_with("{{{") {
                (tag.find("}}}").map(|end| (end, end + 3)), true)
            } else {
                (tag.find("}}").map(|end| (end, end + 2)), false)
            };
            let Some((inner_end, tag_end)) = close else {
                return Err(error(format!("unclosed `{{{{` at byte {}", offset + open)));
            };
            let inner = &tag[if unescaped { 3 } else { 2 }..inner_end];

            if !inner.trim_start().starts_with('!') {
                let path = parse_path(inner).ok_or_else(|| {
                    error(format!("invalid path expression `{}`", inner.trim()))
                })?;
                template.segments.push(Segment::Path { path, unescaped });
            }

            offset += open + tag_end;
            rest = &tag[tag_end..];
        }
        template.push_text(rest);
        Ok(template)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Text(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(Segment::Text(text.to_owned()));
        }
    }
}

impl CompiledTemplate for Template {
    fn serialize(&self) -> String {
        let segments: Vec<String> = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => format!("new templates.Text({})", js::string_literal(text)),
                Segment::Path { path, unescaped } => {
                    let expression =
                        format!("new expressions.PathExpression({})", js::array_literal(path));
                    if *unescaped {
                        format!("new templates.DynamicHtml({expression})")
                    } else {
                        format!("new templates.DynamicText({expression})")
                    }
                }
            })
            .collect();
        format!("new templates.Template([{}])", segments.join(", "))
    }
}

/// Split a dotted path into identifier segments; `this` is the empty path.
fn parse_path(expression: &str) -> Option<Vec<String>> {
    let expression = expression.trim();
    if expression == "this" {
        return Some(Vec::new());
    }
    expression
        .split('.')
        .map(|segment| is_identifier(segment).then(|| segment.to_owned()))
        .collect()
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// The built-in [`TemplateEngine`], producing [`Template`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathTemplates;

impl TemplateEngine for PathTemplates {
    fn parse(&self, view: &str, source: &str) -> Result<Box<dyn CompiledTemplate>> {
        Ok(Box::new(Template::parse(view, source)?))
    }
}
