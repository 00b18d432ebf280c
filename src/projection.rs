//! Plain-text rendering of the homework document.

use std::fmt::Write;

use serde_json::Value;

use crate::types::Document;

/// First line of every text rendering.
pub const TEXT_HEADER: &str = "Hausaufgaben: \n";

/// Render `document` as `key: value` lines in field order.
///
/// Strings are written verbatim; any other value (numbers, booleans, null,
/// arrays, nested objects) is written as compact JSON without further
/// formatting.
pub fn render_text(document: &Document) -> String {
    let mut text = String::from(TEXT_HEADER);
    for (key, value) in document {
        // Writing to a String cannot fail
        let _ = match value {
            Value::String(s) => writeln!(text, "{key}: {s}"),
            other => writeln!(text, "{key}: {other}"),
        };
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(json: &str) -> Document {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn renders_fields_in_document_order() {
        let text = render_text(&doc(r#"{"math": "p.12", "art": "poster"}"#));
        assert_eq!(text, "Hausaufgaben: \nmath: p.12\nart: poster\n");
    }

    #[test]
    fn empty_document_is_header_only() {
        assert_eq!(render_text(&Document::new()), "Hausaufgaben: \n");
    }

    #[test]
    fn non_string_values_are_compact_json() {
        let text = render_text(&doc(
            r#"{"id": 7, "done": false, "note": null, "pages": [1, 2], "meta": {"a": "b"}}"#,
        ));
        assert_eq!(
            text,
            "Hausaufgaben: \nid: 7\ndone: false\nnote: null\npages: [1,2]\nmeta: {\"a\":\"b\"}\n"
        );
    }

    #[test]
    fn strings_are_not_quoted_or_escaped() {
        let text = render_text(&doc(r#"{"deutsch": "Gedicht \"Herbst\" lernen\nbis Mo"}"#));
        assert_eq!(
            text,
            "Hausaufgaben: \ndeutsch: Gedicht \"Herbst\" lernen\nbis Mo\n"
        );
    }
}
