use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::inline::Line;
use super::{Attributes, Block};

/// The role of a list: which family of markers its items use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Ordered,
    Unordered,
    Labeled,
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListKind::Ordered => write!(f, "ordered"),
            ListKind::Unordered => write!(f, "unordered"),
            ListKind::Labeled => write!(f, "labeled"),
        }
    }
}

/// Numbering alphabet of an ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberingStyle {
    Arabic,
    /// Arabic with leading zeros (`01.`).
    Decimal,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
    LowerGreek,
}

impl NumberingStyle {
    /// Style implied by an implicit `.` marker repeated `depth` times.
    pub fn for_depth(depth: usize) -> Self {
        match depth {
            0 | 1 => NumberingStyle::Arabic,
            2 => NumberingStyle::LowerAlpha,
            3 => NumberingStyle::LowerRoman,
            4 => NumberingStyle::UpperAlpha,
            _ => NumberingStyle::UpperRoman,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NumberingStyle::Arabic => "arabic",
            NumberingStyle::Decimal => "decimal",
            NumberingStyle::LowerAlpha => "loweralpha",
            NumberingStyle::UpperAlpha => "upperalpha",
            NumberingStyle::LowerRoman => "lowerroman",
            NumberingStyle::UpperRoman => "upperroman",
            NumberingStyle::LowerGreek => "lowergreek",
        }
    }
}

impl fmt::Display for NumberingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NumberingStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "arabic" => Ok(NumberingStyle::Arabic),
            "decimal" => Ok(NumberingStyle::Decimal),
            "loweralpha" => Ok(NumberingStyle::LowerAlpha),
            "upperalpha" => Ok(NumberingStyle::UpperAlpha),
            "lowerroman" => Ok(NumberingStyle::LowerRoman),
            "upperroman" => Ok(NumberingStyle::UpperRoman),
            "lowergreek" => Ok(NumberingStyle::LowerGreek),
            other => Err(format!("unknown numbering style `{}`", other)),
        }
    }
}

/// Bullet glyph of an unordered list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulletStyle {
    Dash,
    OneAsterisk,
    TwoAsterisks,
    ThreeAsterisks,
    FourAsterisks,
    FiveAsterisks,
}

impl BulletStyle {
    /// Style for a marker made of `count` asterisks.
    ///
    /// Only five asterisk glyphs exist; longer markers wrap around to `Dash`.
    pub fn from_count(count: usize) -> Self {
        match count {
            1 => BulletStyle::OneAsterisk,
            2 => BulletStyle::TwoAsterisks,
            3 => BulletStyle::ThreeAsterisks,
            4 => BulletStyle::FourAsterisks,
            5 => BulletStyle::FiveAsterisks,
            _ => BulletStyle::Dash,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BulletStyle::Dash => "dash",
            BulletStyle::OneAsterisk => "one_asterisk",
            BulletStyle::TwoAsterisks => "two_asterisks",
            BulletStyle::ThreeAsterisks => "three_asterisks",
            BulletStyle::FourAsterisks => "four_asterisks",
            BulletStyle::FiveAsterisks => "five_asterisks",
        }
    }
}

/// Term/description separator of a labeled list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabeledStyle {
    DoubleColon,
    TripleColon,
    QuadrupleColon,
    DoubleSemicolon,
}

impl LabeledStyle {
    pub fn name(self) -> &'static str {
        match self {
            LabeledStyle::DoubleColon => "::",
            LabeledStyle::TripleColon => ":::",
            LabeledStyle::QuadrupleColon => "::::",
            LabeledStyle::DoubleSemicolon => ";;",
        }
    }
}

/// Marker style of a list item, including its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListStyle {
    Ordered(NumberingStyle),
    Unordered(BulletStyle),
    Labeled(LabeledStyle),
}

impl ListStyle {
    pub fn kind(self) -> ListKind {
        match self {
            ListStyle::Ordered(_) => ListKind::Ordered,
            ListStyle::Unordered(_) => ListKind::Unordered,
            ListStyle::Labeled(_) => ListKind::Labeled,
        }
    }
}

/// `(Style, Level)` of a list item, inferred from its lexical marker alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct ListItemPrefix {
    pub style: ListStyle,
    /// Relative nesting depth suggested by the marker, starting at 1.
    pub level: u8,
}

impl ListItemPrefix {
    pub fn new(style: ListStyle, level: u8) -> Self {
        ListItemPrefix { style, level }
    }

    /// Infer the prefix of a list item from its marker, e.g. `**`, `..`,
    /// `1.`, `b.`, `iv)`, `-` or `:::`.
    pub fn from_marker(marker: &str) -> Option<Self> {
        let marker = marker.trim();
        let labeled = match marker {
            "::" => Some((LabeledStyle::DoubleColon, 1)),
            ":::" => Some((LabeledStyle::TripleColon, 2)),
            "::::" => Some((LabeledStyle::QuadrupleColon, 3)),
            ";;" => Some((LabeledStyle::DoubleSemicolon, 4)),
            _ => None,
        };
        if let Some((style, level)) = labeled {
            return Some(ListItemPrefix::new(ListStyle::Labeled(style), level));
        }
        if marker == "-" {
            return Some(ListItemPrefix::new(ListStyle::Unordered(BulletStyle::Dash), 1));
        }
        if marker.is_empty() {
            return None;
        }
        let count = marker.len();
        let level = u8::try_from(count).unwrap_or(u8::MAX);
        if marker.bytes().all(|b| b == b'*') {
            let style = BulletStyle::from_count(count);
            return Some(ListItemPrefix::new(ListStyle::Unordered(style), level));
        }
        if marker.bytes().all(|b| b == b'.') {
            let style = NumberingStyle::for_depth(count);
            return Some(ListItemPrefix::new(ListStyle::Ordered(style), level));
        }
        explicit_numbering(marker).map(|style| ListItemPrefix::new(ListStyle::Ordered(style), 1))
    }
}

/// Explicit numbering markers: `1.`, `01.`, `a.`, `A.`, `iv)`, `IV)`.
fn explicit_numbering(marker: &str) -> Option<NumberingStyle> {
    let delimiter = marker.chars().last()?;
    let body = &marker[..marker.len() - delimiter.len_utf8()];
    if body.is_empty() {
        return None;
    }
    match delimiter {
        '.' if body.bytes().all(|b| b.is_ascii_digit()) => {
            if body.len() > 1 && body.starts_with('0') {
                Some(NumberingStyle::Decimal)
            } else {
                Some(NumberingStyle::Arabic)
            }
        }
        '.' if body.len() == 1 && body.bytes().all(|b| b.is_ascii_lowercase()) => {
            Some(NumberingStyle::LowerAlpha)
        }
        '.' if body.len() == 1 && body.bytes().all(|b| b.is_ascii_uppercase()) => {
            Some(NumberingStyle::UpperAlpha)
        }
        ')' if body.bytes().all(|b| b"ivxlcdm".contains(&b)) => Some(NumberingStyle::LowerRoman),
        ')' if body.bytes().all(|b| b"IVXLCDM".contains(&b)) => Some(NumberingStyle::UpperRoman),
        _ => None,
    }
}

impl TryFrom<String> for ListItemPrefix {
    type Error = String;

    fn try_from(marker: String) -> Result<Self, Self::Error> {
        ListItemPrefix::from_marker(&marker)
            .ok_or_else(|| format!("unrecognized list marker `{}`", marker))
    }
}

/// Checkbox state of an unordered list item (`[x]` / `[ ]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    Checked,
    Unchecked,
}

/// A fully nested list.
#[derive(Debug, Clone, PartialEq)]
pub enum List {
    Ordered(OrderedList),
    Unordered(UnorderedList),
    Labeled(LabeledList),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderedList {
    pub attributes: Attributes,
    pub style: NumberingStyle,
    pub start: u32,
    pub items: Vec<OrderedListItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderedListItem {
    pub attributes: Attributes,
    /// Position of the item in its list, counted from the list's start.
    pub number: u32,
    pub text: Vec<Line>,
    /// Attached blocks, followed by at most one nested list.
    pub elements: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnorderedList {
    pub attributes: Attributes,
    pub style: BulletStyle,
    pub items: Vec<UnorderedListItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnorderedListItem {
    pub attributes: Attributes,
    pub check: Option<CheckState>,
    pub text: Vec<Line>,
    pub elements: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledList {
    pub attributes: Attributes,
    pub style: LabeledStyle,
    pub items: Vec<LabeledListItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledListItem {
    pub attributes: Attributes,
    pub term: Line,
    pub text: Vec<Line>,
    pub elements: Vec<Block>,
}

impl List {
    pub fn kind(&self) -> ListKind {
        match self {
            List::Ordered(_) => ListKind::Ordered,
            List::Unordered(_) => ListKind::Unordered,
            List::Labeled(_) => ListKind::Labeled,
        }
    }

    pub fn attributes(&self) -> &Attributes {
        match self {
            List::Ordered(list) => &list.attributes,
            List::Unordered(list) => &list.attributes,
            List::Labeled(list) => &list.attributes,
        }
    }

    /// Number of direct items.
    pub fn len(&self) -> usize {
        match self {
            List::Ordered(list) => list.items.len(),
            List::Unordered(list) => list.items.len(),
            List::Labeled(list) => list.items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1.", NumberingStyle::Arabic)]
    #[case("42.", NumberingStyle::Arabic)]
    #[case("01.", NumberingStyle::Decimal)]
    #[case("a.", NumberingStyle::LowerAlpha)]
    #[case("B.", NumberingStyle::UpperAlpha)]
    #[case("iv)", NumberingStyle::LowerRoman)]
    #[case("x)", NumberingStyle::LowerRoman)]
    #[case("XII)", NumberingStyle::UpperRoman)]
    fn explicit_markers_sit_at_level_one(#[case] marker: &str, #[case] style: NumberingStyle) {
        assert_eq!(
            ListItemPrefix::from_marker(marker),
            Some(ListItemPrefix::new(ListStyle::Ordered(style), 1))
        );
    }

    #[test]
    fn repeated_markers_carry_their_depth() {
        assert_eq!(
            ListItemPrefix::from_marker("..."),
            Some(ListItemPrefix::new(
                ListStyle::Ordered(NumberingStyle::LowerRoman),
                3
            ))
        );
        assert_eq!(
            ListItemPrefix::from_marker("**"),
            Some(ListItemPrefix::new(
                ListStyle::Unordered(BulletStyle::TwoAsterisks),
                2
            ))
        );
        assert_eq!(
            ListItemPrefix::from_marker(";;"),
            Some(ListItemPrefix::new(
                ListStyle::Labeled(LabeledStyle::DoubleSemicolon),
                4
            ))
        );
    }

    #[test]
    fn six_asterisks_wrap_to_dash() {
        let prefix = ListItemPrefix::from_marker("******").unwrap();
        assert_eq!(prefix.style, ListStyle::Unordered(BulletStyle::Dash));
        assert_eq!(prefix.level, 6);
    }

    #[test]
    fn garbage_markers_are_rejected() {
        assert_eq!(ListItemPrefix::from_marker(""), None);
        assert_eq!(ListItemPrefix::from_marker("ab."), None);
        assert_eq!(ListItemPrefix::from_marker("q)"), None);
        assert_eq!(ListItemPrefix::from_marker("1)"), None);
        assert_eq!(ListItemPrefix::from_marker("+"), None);
    }

    #[test]
    fn numbering_style_names_round_trip() {
        for style in [
            NumberingStyle::Arabic,
            NumberingStyle::Decimal,
            NumberingStyle::LowerAlpha,
            NumberingStyle::UpperAlpha,
            NumberingStyle::LowerRoman,
            NumberingStyle::UpperRoman,
            NumberingStyle::LowerGreek,
        ] {
            assert_eq!(style.name().parse::<NumberingStyle>(), Ok(style));
        }
        assert!("fancy".parse::<NumberingStyle>().is_err());
    }
}
