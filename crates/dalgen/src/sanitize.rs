//! Mapping of schema identifiers onto valid C++ identifiers.
//!
//! Schema names may contain characters such as `-` or `.` that C++ rejects; every such
//! character becomes `_`. Both functions are pure and ASCII-based.

/// Replace every character that is not an ASCII letter or digit with `_`.
pub fn alnum_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Upper-case a leading ASCII letter, or prefix `_` when the name starts with anything else.
pub fn capitalize_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        None => String::new(),
        Some(first) if first.is_ascii_alphabetic() => {
            let mut out = String::with_capacity(name.len());
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
            out
        }
        Some(_) => format!("_{name}"),
    }
}

/// Whether a byte may be part of a C++ identifier.
pub(crate) fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
