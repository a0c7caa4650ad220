use serde::Deserialize;

/// One line of inline content.
pub type Line = Vec<InlineElement>;

/// Inline elements that appear within a line of text.
/// Quoted text and link labels nest freely.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineElement {
    Text {
        text: String,
    },
    Quoted {
        kind: QuoteKind,
        #[serde(default)]
        elements: Vec<InlineElement>,
    },
    Link {
        url: String,
        /// Link label. Empty means the URL is displayed.
        #[serde(default)]
        text: Vec<InlineElement>,
    },
    CrossReference {
        id: String,
        #[serde(default)]
        label: Option<Vec<InlineElement>>,
    },
    Passthrough {
        kind: PassthroughKind,
        text: String,
    },
    Image {
        path: String,
        #[serde(default)]
        alt: Option<String>,
    },
    /// `{name}` placeholder, replaced during assembly.
    AttributeSubstitution {
        name: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteKind {
    Bold,
    Italic,
    Monospace,
    Marked,
    Superscript,
    Subscript,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassthroughKind {
    /// `+text+`
    Single,
    /// `+++text+++`
    Triple,
    /// `pass:[text]`
    Macro,
}

impl InlineElement {
    pub fn text(text: impl Into<String>) -> Self {
        InlineElement::Text { text: text.into() }
    }

    pub fn substitution(name: impl Into<String>) -> Self {
        InlineElement::AttributeSubstitution { name: name.into() }
    }
}

/// Flatten inline content into plain text, dropping all markup.
pub fn flatten(elements: &[InlineElement]) -> String {
    let mut out = String::new();
    flatten_into(elements, &mut out);
    out
}

/// Flatten several lines, joined by single spaces.
pub fn flatten_lines(lines: &[Line]) -> String {
    lines
        .iter()
        .map(|line| flatten(line))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn flatten_into(elements: &[InlineElement], out: &mut String) {
    for element in elements {
        match element {
            InlineElement::Text { text } | InlineElement::Passthrough { text, .. } => {
                out.push_str(text)
            }
            InlineElement::Quoted { elements, .. } => flatten_into(elements, out),
            InlineElement::Link { url, text } => {
                if text.is_empty() {
                    out.push_str(url);
                } else {
                    flatten_into(text, out);
                }
            }
            InlineElement::CrossReference { id, label } => match label {
                Some(label) => flatten_into(label, out),
                None => out.push_str(id),
            },
            InlineElement::Image { path, alt } => out.push_str(alt.as_deref().unwrap_or(path)),
            InlineElement::AttributeSubstitution { name } => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
    }
}

/// Merge adjacent text runs into one element and drop empty ones.
/// Nested sequences are merged too.
pub fn merge_text(elements: Vec<InlineElement>) -> Vec<InlineElement> {
    let mut merged: Vec<InlineElement> = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            InlineElement::Text { text } if text.is_empty() => {}
            InlineElement::Text { text } => match merged.last_mut() {
                Some(InlineElement::Text { text: previous }) => previous.push_str(&text),
                _ => merged.push(InlineElement::Text { text }),
            },
            InlineElement::Quoted { kind, elements } => merged.push(InlineElement::Quoted {
                kind,
                elements: merge_text(elements),
            }),
            InlineElement::Link { url, text } => merged.push(InlineElement::Link {
                url,
                text: merge_text(text),
            }),
            InlineElement::CrossReference { id, label } => {
                merged.push(InlineElement::CrossReference {
                    id,
                    label: label.map(merge_text),
                })
            }
            other => merged.push(other),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_joins_adjacent_text() {
        let merged = merge_text(vec![
            InlineElement::text("a"),
            InlineElement::text(""),
            InlineElement::text("b"),
            InlineElement::Quoted {
                kind: QuoteKind::Bold,
                elements: vec![InlineElement::text("c"), InlineElement::text("d")],
            },
            InlineElement::text("e"),
        ]);
        assert_eq!(
            merged,
            vec![
                InlineElement::text("ab"),
                InlineElement::Quoted {
                    kind: QuoteKind::Bold,
                    elements: vec![InlineElement::text("cd")],
                },
                InlineElement::text("e"),
            ]
        );
    }

    #[test]
    fn flatten_drops_markup() {
        let line = vec![
            InlineElement::text("see "),
            InlineElement::Link {
                url: "https://example.org".into(),
                text: vec![],
            },
            InlineElement::text(" and "),
            InlineElement::CrossReference {
                id: "_intro".into(),
                label: None,
            },
            InlineElement::text(" "),
            InlineElement::substitution("version"),
        ];
        assert_eq!(
            flatten(&line),
            "see https://example.org and _intro {version}"
        );
    }
}
