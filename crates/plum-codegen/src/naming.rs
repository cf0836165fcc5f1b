//! Case conversion, type-expression unwrapping and synthetic path names.
//!
//! Every function here is pure and total: any input string produces a value.

use sha2::{Digest, Sha256};

const WORD_SEPARATORS: [char; 3] = ['.', '/', '_'];
const PATH_ANCESTOR_SEPARATOR: &str = "#";
const PATH_TYPE_SEPARATOR: char = '@';

// ---------------------------------------------------------------------------
// Case conversion
// ---------------------------------------------------------------------------

/// `foo_bar.baz` → `FooBarBaz`, `/order/searchList` → `OrderSearchList`.
pub fn snake_to_pascal(s: &str) -> String {
    s.split(WORD_SEPARATORS)
        .filter(|segment| !segment.is_empty())
        .map(capitalize)
        .collect()
}

/// `orderId` → `order_id`, `sku2Name` → `sku2_name`.
pub fn pascal_to_snake(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev: Option<char> = None;
    for c in s.chars() {
        if c.is_uppercase()
            && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit())
        {
            out.push('_');
        }
        out.extend(c.to_lowercase());
        prev = Some(c);
    }
    out
}

/// Dotted request name → slashed path name. Inverse of [`pathname_to_request_name`].
pub fn pascal_to_pathname(s: &str) -> String {
    swap_separators(s)
}

/// Slashed path name → dotted request name. Inverse of [`pascal_to_pathname`].
pub fn pathname_to_request_name(s: &str) -> String {
    swap_separators(s)
}

fn swap_separators(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' => '.',
            '.' => '/',
            other => other,
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

// ---------------------------------------------------------------------------
// Type expressions
// ---------------------------------------------------------------------------

/// Unwrap `List<X>`, `Array<X>` or `X[]` to `X`. A bare name is returned
/// trimmed, so an unparametrized `List` stays `List`.
pub fn parse_array_name(expr: &str) -> String {
    let trimmed = expr.trim();
    if let Some(inner) = trimmed.strip_suffix("[]") {
        return inner.trim().to_string();
    }
    if let Some(open) = trimmed.find('<')
        && trimmed.ends_with('>')
    {
        let inner = trimmed[open + 1..trimmed.len() - 1].trim();
        if inner.is_empty() {
            return trimmed[..open].trim().to_string();
        }
        return inner.to_string();
    }
    trimmed.to_string()
}

/// `com.example.trade.OrderItem` → `OrderItem`.
pub fn parse_object_name(dotted: &str) -> String {
    snake_to_pascal(dotted.rsplit('.').next().unwrap_or(dotted))
}

// ---------------------------------------------------------------------------
// Synthetic path names
// ---------------------------------------------------------------------------

/// Encode a nested model's position: `ancestor1#ancestor2@TypeName`.
pub fn build_parent_path_name(type_name: &str, ancestors: &[&str]) -> String {
    let path: Vec<&str> = ancestors.iter().copied().filter(|a| !a.is_empty()).collect();
    if path.is_empty() {
        return type_name.to_string();
    }
    format!(
        "{}{PATH_TYPE_SEPARATOR}{type_name}",
        path.join(PATH_ANCESTOR_SEPARATOR)
    )
}

/// The local type name at the end of a synthetic path name.
pub fn parse_parent_path_name(name: &str) -> &str {
    name.rsplit(PATH_TYPE_SEPARATOR).next().unwrap_or(name)
}

/// Stable fingerprint of a canonical model encoding.
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

// ---------------------------------------------------------------------------
// Free-text cleanup
// ---------------------------------------------------------------------------

/// Drop quotes and non-printable characters; line breaks and tabs become spaces.
pub fn remove_special_characters(s: &str) -> String {
    s.chars()
        .filter_map(|c| match c {
            '\n' | '\r' | '\t' => Some(' '),
            '"' | '\'' | '`' | '\u{200b}' | '\u{200e}' | '\u{200f}' | '\u{feff}' => None,
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn is_python_keyword(name: &str) -> bool {
    matches!(
        name,
        "False"
            | "None"
            | "True"
            | "and"
            | "as"
            | "assert"
            | "async"
            | "await"
            | "break"
            | "class"
            | "continue"
            | "def"
            | "del"
            | "elif"
            | "else"
            | "except"
            | "finally"
            | "for"
            | "from"
            | "global"
            | "if"
            | "import"
            | "in"
            | "is"
            | "lambda"
            | "nonlocal"
            | "not"
            | "or"
            | "pass"
            | "raise"
            | "return"
            | "try"
            | "while"
            | "with"
            | "yield"
    )
}
