use std::borrow::Cow;

use scraper::Html;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Display width of a string in terminal columns (CJK and emoji count as 2).
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncates a string to fit within `max_width` terminal columns.
///
/// When the text has to be cut and there is room for more than the ellipsis,
/// "..." is appended. For widths of 3 or less the text is cut without an
/// ellipsis. Returns `Cow::Borrowed` when the text already fits.
///
/// ```
/// use feedview::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
/// assert_eq!(truncate_to_width("Test", 2), "Te");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let (budget, suffix) = if max_width <= ELLIPSIS_WIDTH {
        (max_width, "")
    } else {
        (max_width - ELLIPSIS_WIDTH, ELLIPSIS)
    };

    let mut width = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        end = idx + c.len_utf8();
    }

    Cow::Owned(format!("{}{}", &s[..end], suffix))
}

/// Strip terminal control characters and ANSI escape sequences from text.
///
/// Feed content is remote input and is written straight to the terminal, so
/// CSI (`ESC [` .. final byte) and OSC (`ESC ]` .. BEL or `ESC \`) sequences
/// are dropped along with C0 controls and DEL. Tab, newline and carriage
/// return survive.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_stripped_control) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            match chars.peek() {
                Some('[') => {
                    chars.next();
                    // parameter and intermediate bytes, then one final byte
                    for c in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&c) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == '\x07' {
                            break;
                        }
                        if c == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
        } else if !is_stripped_control(c) {
            out.push(c);
        }
    }

    Cow::Owned(out)
}

fn is_stripped_control(c: char) -> bool {
    c == '\x1b' || c == '\x7f' || (c < '\x20' && !matches!(c, '\t' | '\n' | '\r'))
}

/// Reduce an HTML fragment from a feed to a single line of plain text.
///
/// The fragment goes through an HTML5 parser, so every named and numeric
/// character reference is decoded. Text inside `<script>` and `<style>` is
/// dropped, block elements separate words, and runs of whitespace collapse to
/// one space.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut text = String::with_capacity(html.len());

    for node in fragment.root_element().descendants() {
        if let Some(text_node) = node.value().as_text() {
            let hidden = node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|e| e.name()))
                .is_some_and(|name| matches!(name, "script" | "style"));
            if !hidden {
                text.push_str(text_node);
            }
        } else if let Some(element) = node.value().as_element() {
            if matches!(
                element.name(),
                "p" | "br" | "div" | "li" | "blockquote" | "h1" | "h2" | "h3" | "h4"
            ) {
                text.push(' ');
            }
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
