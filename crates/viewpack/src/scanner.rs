//! Tag scanner for view markup
//!
//! Splits markup into start-tag, text and end-tag events delivered to a
//! [`TagHandler`]. Tags selected by the raw-tag predicate have their body
//! delivered as a single opaque text event instead of being scanned further.
//!
//! View tags (names ending in `:`) end at the next view tag, opening or
//! closing, so `</name:>` is optional. Other raw tags (`style`, `script`)
//! end at their own closing tag.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{error::Result, types::Attributes};

static START_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^<([^\s=/!>]+)((?:\s+[^\s=/>]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^>\s]+))?)*)\s*/?\s*>"#,
    )
    .expect("start tag pattern is valid")
});

static END_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^</([^\s=/!>]+)[^>]*>").expect("end tag pattern is valid"));

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s=/>]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^>\s]+)))?"#)
        .expect("attribute pattern is valid")
});

static VIEW_BODY_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"</?[^\s=/!>]+:(?:[\s>]|$)").expect("view body end pattern is valid")
});

/// Receives scanner events in document order.
pub trait TagHandler {
    /// A start tag. `tag` is the full source text of the tag, `name` its name
    /// as written.
    fn start(&mut self, tag: &str, name: &str, attributes: Attributes) -> Result<()>;

    /// Text between tags, or the whole body of a raw tag (`is_raw`). A raw
    /// body is always reported, even when empty.
    fn text(&mut self, text: &str, is_raw: bool) -> Result<()>;

    fn end(&mut self, _tag: &str, _name: &str) -> Result<()> {
        Ok(())
    }
}

/// Whether a tag name declares a view.
pub fn is_view_tag(name: &str) -> bool {
    name.len() > 1 && name.ends_with(':')
}

/// Raw-tag predicate for view files: view tags, `style` and `script`.
pub fn is_raw_view_tag(name: &str) -> bool {
    is_view_tag(name) || name.eq_ignore_ascii_case("style") || name.eq_ignore_ascii_case("script")
}

/// Scan `input`, reporting events to `handler`. Stops at the first error a
/// handler returns.
pub fn scan<H>(input: &str, is_raw_tag: impl Fn(&str) -> bool, handler: &mut H) -> Result<()>
where
    H: TagHandler + ?Sized,
{
    let mut rest = input;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<!--") {
            rest = match after.find("-->") {
                Some(end) => &after[end + 3..],
                None => "",
            };
            continue;
        }

        if let Some(caps) = END_TAG.captures(rest) {
            let tag = caps.get(0).map_or("", |m| m.as_str());
            handler.end(tag, &caps[1])?;
            rest = &rest[tag.len()..];
            continue;
        }

        if rest.starts_with("<!") {
            rest = match rest.find('>') {
                Some(end) => &rest[end + 1..],
                None => "",
            };
            continue;
        }

        if let Some(caps) = START_TAG.captures(rest) {
            let tag = caps.get(0).map_or("", |m| m.as_str());
            let name = caps.get(1).map_or("", |m| m.as_str());
            let attributes = parse_attributes(caps.get(2).map_or("", |m| m.as_str()));
            handler.start(tag, name, attributes)?;
            rest = &rest[tag.len()..];

            if is_raw_tag(name) {
                let body_len = raw_body_len(name, rest);
                handler.text(&rest[..body_len], true)?;
                rest = &rest[body_len..];
            }
            continue;
        }

        // Plain text up to the next '<'. A '<' that starts no recognizable
        // tag is consumed as text.
        let text_len = match rest.strip_prefix('<') {
            Some(after) => after.find('<').map_or(rest.len(), |i| i + 1),
            None => rest.find('<').unwrap_or(rest.len()),
        };
        handler.text(&rest[..text_len], false)?;
        rest = &rest[text_len..];
    }
    Ok(())
}

/// Length of the raw body of tag `name` at the start of `rest`.
fn raw_body_len(name: &str, rest: &str) -> usize {
    if is_view_tag(name) {
        return VIEW_BODY_END.find(rest).map_or(rest.len(), |m| m.start());
    }
    let closing = format!("</{}", name.to_ascii_lowercase());
    rest.to_ascii_lowercase()
        .find(&closing)
        .unwrap_or(rest.len())
}

/// Parse the attribute list of a start tag. Later duplicates win.
pub fn parse_attributes(source: &str) -> Attributes {
    ATTRIBUTE
        .captures_iter(source)
        .map(|caps| {
            let name = caps[1].to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or_else(String::new, |m| m.as_str().to_owned());
            (name, value)
        })
        .collect()
}
