//! Emphasis markup codec
//!
//! Outline text marks emphasis with paired `**` delimiters. Editors and
//! renderers work on HTML, so this module converts between the two:
//!
//! - [`encode`] turns delimited text into escaped HTML with `<strong>` spans
//! - [`decode`] turns editor HTML back into delimited text
//!
//! Malformed input never fails: an unpaired or empty delimiter is kept as
//! literal text.

use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Emphasis delimiter
pub const DELIMITER: &str = "**";

/// Bullet marker recognised by [`is_bullet_list`]
pub const BULLET_MARKER: &str = "- ";

/// A run of text with or without emphasis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub emphasized: bool,
}

/// Split text into plain and emphasized runs
///
/// Delimiters pair left to right. A span must enclose at least one
/// character; a delimiter without a partner stays in the plain text.
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut plain_start = 0;
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(DELIMITER) {
        let open = cursor + offset;
        let content_start = open + DELIMITER.len();
        // The closing delimiter is searched after the first content char
        let close = text[content_start..].chars().next().and_then(|first| {
            let search_from = content_start + first.len_utf8();
            text[search_from..]
                .find(DELIMITER)
                .map(|pos| search_from + pos)
        });

        let Some(close) = close else {
            break;
        };

        if open > plain_start {
            out.push(Segment {
                text: &text[plain_start..open],
                emphasized: false,
            });
        }
        out.push(Segment {
            text: &text[content_start..close],
            emphasized: true,
        });
        cursor = close + DELIMITER.len();
        plain_start = cursor;
    }

    if plain_start < text.len() {
        out.push(Segment {
            text: &text[plain_start..],
            emphasized: false,
        });
    }
    out
}

/// Whether every delimiter in the text belongs to an emphasis span
pub fn is_balanced(text: &str) -> bool {
    segments(text)
        .iter()
        .all(|seg| seg.emphasized || !seg.text.contains(DELIMITER))
}

/// Convert delimited text into HTML markup
pub fn encode(text: &str) -> String {
    let mut html = String::with_capacity(text.len() + 16);
    for seg in segments(text) {
        if seg.emphasized {
            html.push_str("<strong>");
            escape_into(seg.text, &mut html);
            html.push_str("</strong>");
        } else {
            escape_into(seg.text, &mut html);
        }
    }
    html
}

/// Convert HTML markup back into delimited text
///
/// `<strong>` and `<b>` become `**` spans, `<br>` becomes a newline and
/// `div`/`p` blocks start a new line. Other elements are dropped but keep
/// their text.
pub fn decode(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    let mut out = String::with_capacity(markup.len());
    decode_children(fragment.root_element(), &mut out);
    out
}

fn decode_children(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    decode_element(child_el, out);
                }
            }
            _ => {}
        }
    }
}

fn decode_element(element: ElementRef<'_>, out: &mut String) {
    match element.value().name() {
        "br" => out.push('\n'),
        "strong" | "b" => {
            let mut inner = String::new();
            decode_children(element, &mut inner);
            if inner.is_empty() {
                return;
            }
            out.push_str(DELIMITER);
            out.push_str(&inner);
            out.push_str(DELIMITER);
        }
        "div" | "p" => {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            decode_children(element, out);
        }
        _ => decode_children(element, out),
    }
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("<br>"),
            // Raw CR would be folded into LF by the HTML tokenizer
            '\r' => out.push_str("&#13;"),
            _ => out.push(ch),
        }
    }
}

/// Whether a block should be shown as a bulleted list
pub fn is_bullet_list(text: &str) -> bool {
    text.lines()
        .any(|line| line.trim_start().starts_with(BULLET_MARKER))
}

/// Items of a bulleted block with the markers removed
///
/// Lines without a marker are kept as items so no text is lost.
pub fn list_items(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .map(|line| line.strip_prefix(BULLET_MARKER).unwrap_or(line).trim())
        .filter(|line| !line.is_empty())
        .collect()
}
