//! Re-parsing of attribute values into inline content.

use crate::document::{InlineElement, Line, QuoteKind, merge_text};

/// Turns the raw text of an attribute value into inline elements.
///
/// The assembler calls this for every resolved `{name}` so that markup in an
/// attribute value renders like markup written in place. Implementations must
/// not emit [`InlineElement::AttributeSubstitution`]; values are never
/// expanded twice.
pub trait InlineParser {
    fn parse_inline(&self, text: &str) -> Line;
}

/// Keeps the value as one plain text run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl InlineParser for PlainText {
    fn parse_inline(&self, text: &str) -> Line {
        merge_text(vec![InlineElement::text(text)])
    }
}

/// The default value parser.
///
/// Recognizes constrained quotes (`*bold*`, `_italic_`, `` `mono` ``,
/// `#marked#`) and bare URLs (`https://`, `http://`, `mailto:`) with an
/// optional `[label]`. Everything else stays literal text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueParser;

const SCHEMES: &[&str] = &["https://", "http://", "mailto:"];

impl InlineParser for ValueParser {
    fn parse_inline(&self, text: &str) -> Line {
        let mut out = Vec::new();
        let mut plain = String::new();
        let mut i = 0;

        while i < text.len() {
            let rest = &text[i..];
            if at_boundary(text[..i].chars().next_back()) {
                let scanned = self.scan_link(rest).or_else(|| self.scan_quoted(rest));
                if let Some((element, consumed)) = scanned {
                    if !plain.is_empty() {
                        out.push(InlineElement::text(std::mem::take(&mut plain)));
                    }
                    out.push(element);
                    i += consumed;
                    continue;
                }
            }
            let Some(ch) = rest.chars().next() else {
                break;
            };
            plain.push(ch);
            i += ch.len_utf8();
        }

        if !plain.is_empty() {
            out.push(InlineElement::text(plain));
        }
        merge_text(out)
    }
}

impl ValueParser {
    /// A bare URL, optionally followed by `[label]`.
    fn scan_link(&self, rest: &str) -> Option<(InlineElement, usize)> {
        let scheme = SCHEMES.iter().find(|scheme| rest.starts_with(**scheme))?;
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '[')
            .unwrap_or(rest.len());
        if end == scheme.len() {
            return None;
        }

        if rest[end..].starts_with('[') {
            if let Some(close) = rest[end..].find(']') {
                let element = InlineElement::Link {
                    url: rest[..end].to_string(),
                    text: self.parse_inline(&rest[end + 1..end + close]),
                };
                return Some((element, end + close + 1));
            }
        }

        let url = rest[..end].trim_end_matches(['.', ',', ';', ':', '!', '?', ')']);
        if url.len() <= scheme.len() {
            return None;
        }
        let element = InlineElement::Link {
            url: url.to_string(),
            text: Vec::new(),
        };
        Some((element, url.len()))
    }

    /// `*text*` and friends. The closing mark must not be followed by a word
    /// character and the content must not start or end with whitespace.
    fn scan_quoted(&self, rest: &str) -> Option<(InlineElement, usize)> {
        let mark = rest.chars().next()?;
        let kind = match mark {
            '*' => QuoteKind::Bold,
            '_' => QuoteKind::Italic,
            '`' => QuoteKind::Monospace,
            '#' => QuoteKind::Marked,
            _ => return None,
        };
        let body = &rest[1..];
        if body.starts_with(char::is_whitespace) {
            return None;
        }
        let close = body.char_indices().find_map(|(offset, ch)| {
            if ch != mark || offset == 0 {
                return None;
            }
            at_boundary(body[offset + 1..].chars().next()).then_some(offset)
        })?;
        let content = &body[..close];
        if content.ends_with(char::is_whitespace) {
            return None;
        }
        let element = InlineElement::Quoted {
            kind,
            elements: self.parse_inline(content),
        };
        Some((element, close + 2))
    }
}

/// Quotes and URLs only start or end next to a non-word character.
fn at_boundary(neighbour: Option<char>) -> bool {
    neighbour.is_none_or(|c| !c.is_alphanumeric())
}
