//! JavaScript literal encoding for generated code

use cow_utils::CowUtils;

use crate::types::Attributes;

/// Encode `value` as a double-quoted JavaScript string literal.
///
/// Line and paragraph separators are escaped (they end a line in older
/// engines) and `</` is written as `<\/` so the literal can be inlined in a
/// `<script>` element.
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out.cow_replace("</", "<\\/").into_owned()
}

/// Encode attributes as an object literal, keys in source order.
pub fn object_literal(attributes: &Attributes) -> String {
    let fields: Vec<String> = attributes
        .iter()
        .map(|(key, value)| format!("{}: {}", string_literal(key), string_literal(value)))
        .collect();
    format!("{{{}}}", fields.join(", "))
}

/// Encode a list of strings as an array literal.
pub fn array_literal<S: AsRef<str>>(items: &[S]) -> String {
    let items: Vec<String> = items
        .iter()
        .map(|item| string_literal(item.as_ref()))
        .collect();
    format!("[{}]", items.join(", "))
}
