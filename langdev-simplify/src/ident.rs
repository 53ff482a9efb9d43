//! Identifier naming conventions.
//!
//! Each function takes a space-separated label such as `"created at"` and
//! joins its words into one identifier. Pass one of them as the
//! simplifier's identifier map: camelCase for JSON, PascalCase for
//! property lists, snake_case wherever else it reads naturally.

/// Maps a multi-word label to an identifier.
pub type IdentifierMap = fn(&str) -> String;

/// Lowercases every word and joins them with underscores.
///
/// `"encode URL"` becomes `"encode_url"`.
#[must_use]
pub fn snake(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Uppercases the first letter of every word, keeping the rest as is.
///
/// `"encode URL"` becomes `"EncodeURL"`.
#[must_use]
pub fn pascal(label: &str) -> String {
    label.split_whitespace().map(upper_first).collect()
}

/// Lowercases the whole first word and capitalizes the others.
///
/// `"encode URL"` becomes `"encodeUrl"`; `"URL encoder"` becomes
/// `"urlEncoder"`.
#[must_use]
pub fn camel(label: &str) -> String {
    let mut words = label.split_whitespace();
    let Some(first) = words.next() else {
        return String::new();
    };
    let mut out = first.to_lowercase();
    for word in words {
        out.push_str(&capitalize(word));
    }
    out
}

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
