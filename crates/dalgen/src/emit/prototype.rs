//! Lexical handling of method prototypes.
//!
//! Prototypes are opaque text. The only structure recognised is
//! `<head> <name>(<params>) <tail>`: the method name is the identifier right before the
//! first `(`, the parameter list ends at the last `)`. Trailing return types
//! (`auto f() -> T`) and specifier words nested inside template arguments are not handled.

use crate::sanitize::is_ident_byte;

/// Declaration-only specifiers that are invalid in an out-of-class definition
const DECLARATION_SPECIFIERS: [&str; 3] = ["virtual", "override", "final"];

/// A prototype split around the method name and parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prototype<'a> {
    /// Return type and leading specifiers, trimmed
    pub head: &'a str,
    /// Method name
    pub name: &'a str,
    /// Parameter list including both parentheses
    pub params: &'a str,
    /// Everything after the parameter list, trimmed
    pub tail: &'a str,
}

impl<'a> Prototype<'a> {
    /// Split a prototype. Returns `None` when there is no parameter list or no identifier
    /// before it (e.g. operator overloads).
    pub fn parse(text: &'a str) -> Option<Self> {
        let open = text.find('(')?;
        let close = text.rfind(')').filter(|close| *close > open)?;

        let before = text[..open].trim_end();
        let bytes = before.as_bytes();
        let mut name_start = bytes.len();
        while name_start > 0 && is_ident_byte(bytes[name_start - 1]) {
            name_start -= 1;
        }
        if name_start == bytes.len() {
            return None;
        }

        Some(Self {
            head: before[..name_start].trim(),
            name: &before[name_start..],
            params: &text[open..=close],
            tail: text[close + 1..].trim(),
        })
    }

    /// Out-of-class definition line(s): `<head>\n<dx><class>::<name>(<params>) <tail>`,
    /// with declaration-only specifiers removed from head and tail.
    pub fn definition(&self, class: &str, dx: &str) -> String {
        let head = strip_specifiers(self.head);
        let tail = strip_specifiers(self.tail);

        let mut output = String::new();
        if !head.is_empty() {
            output.push_str(&format!("{dx}{head}\n"));
        }
        output.push_str(&format!("{dx}{class}::{}{}", self.name, self.params));
        if !tail.is_empty() {
            output.push(' ');
            output.push_str(&tail);
        }
        output
    }

    /// Class-like identifier named by a pointer return type.
    ///
    /// `const Foo*` and `std::vector<const ns::Foo*>` both yield `Foo`. Returns `None` when the
    /// head holds no `*`.
    pub fn pointee(&self) -> Option<&'a str> {
        let star = self.head.rfind('*')?;
        self.head[..star]
            .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .filter(|token| !token.is_empty() && *token != "const")
            .last()
    }
}

/// Name of the method declared by a prototype.
pub fn method_name(prototype: &str) -> Option<&str> {
    Prototype::parse(prototype).map(|p| p.name)
}

/// Remove the first whole-word occurrence of each declaration-only specifier.
pub fn strip_specifiers(text: &str) -> String {
    let mut result = text.to_string();
    for specifier in DECLARATION_SPECIFIERS {
        if let Some(idx) = find_word(&result, specifier) {
            result.replace_range(idx..idx + specifier.len(), "");
        }
        result = result.trim().to_string();
    }
    collapse_spaces(&result)
}

/// Byte offset of the first whole-word occurrence of `word`.
pub fn find_word(text: &str, word: &str) -> Option<usize> {
    if word.is_empty() {
        return None;
    }
    let bytes = text.as_bytes();
    text.match_indices(word).map(|(idx, _)| idx).find(|&idx| {
        let end = idx + word.len();
        (idx == 0 || !is_ident_byte(bytes[idx - 1])) && (end == bytes.len() || !is_ident_byte(bytes[end]))
    })
}

/// Whether `word` occurs in `text` delimited by non-identifier characters.
pub fn mentions_word(text: &str, word: &str) -> bool {
    find_word(text, word).is_some()
}

// Removing a specifier from the middle leaves a double space behind.
fn collapse_spaces(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut previous_space = false;
    for c in text.chars() {
        if c == ' ' {
            if !previous_space {
                output.push(c);
            }
            previous_space = true;
        } else {
            output.push(c);
            previous_space = false;
        }
    }
    output
}
