/// Built-in character replacement attributes.
const PREDEFINED: &[(&str, &str)] = &[
    ("sp", " "),
    ("blank", ""),
    ("empty", ""),
    ("nbsp", "\u{00a0}"),
    ("zwsp", "\u{200b}"),
    ("wj", "\u{2060}"),
    ("apos", "'"),
    ("quot", "\""),
    ("lsquo", "\u{2018}"),
    ("rsquo", "\u{2019}"),
    ("ldquo", "\u{201c}"),
    ("rdquo", "\u{201d}"),
    ("deg", "\u{00b0}"),
    ("plus", "+"),
    ("brvbar", "\u{00a6}"),
    ("vbar", "|"),
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("startsb", "["),
    ("endsb", "]"),
    ("caret", "^"),
    ("asterisk", "*"),
    ("tilde", "~"),
    ("backslash", "\\"),
    ("backtick", "`"),
    ("two-colons", "::"),
    ("two-semicolons", ";;"),
    ("cpp", "C++"),
];

/// Value of a built-in attribute, if `name` is one.
pub fn predefined(name: &str) -> Option<&'static str> {
    PREDEFINED
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| *value)
}
