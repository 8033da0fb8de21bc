//! Extension-marker scanner for method implementation text.
//!
//! A method body may carry fixed begin/end marker pairs whose content is spliced elsewhere in
//! the generated class (header prologue/epilogue, public or private section, constructor
//! initializer list), plus two flag markers declaring the method as a bulk-result or
//! single-result algorithm. Only the first pair of each kind is honoured. What remains after
//! removing every marked region is the residual body.

/// Flag marker for algorithms returning a single object
pub const SINGLE_RESULT_MARKER: &str = "ADD_ALGO_1";

/// Flag marker for algorithms returning a list of objects
pub const BULK_RESULT_MARKER: &str = "ADD_ALGO_N";

/// Delimited region kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Block {
    HeaderPrologue,
    HeaderEpilogue,
    PublicSection,
    PrivateSection,
    MemberInitializerList,
}

impl Block {
    pub const ALL: [Block; 5] = [
        Block::HeaderPrologue,
        Block::HeaderEpilogue,
        Block::PublicSection,
        Block::PrivateSection,
        Block::MemberInitializerList,
    ];

    pub fn begin_marker(self) -> &'static str {
        match self {
            Self::HeaderPrologue => "BEGIN_HEADER_PROLOGUE",
            Self::HeaderEpilogue => "BEGIN_HEADER_EPILOGUE",
            Self::PublicSection => "BEGIN_PUBLIC_SECTION",
            Self::PrivateSection => "BEGIN_PRIVATE_SECTION",
            Self::MemberInitializerList => "BEGIN_MEMBER_INITIALIZER_LIST",
        }
    }

    pub fn end_marker(self) -> &'static str {
        match self {
            Self::HeaderPrologue => "END_HEADER_PROLOGUE",
            Self::HeaderEpilogue => "END_HEADER_EPILOGUE",
            Self::PublicSection => "END_PUBLIC_SECTION",
            Self::PrivateSection => "END_PRIVATE_SECTION",
            Self::MemberInitializerList => "END_MEMBER_INITIALIZER_LIST",
        }
    }
}

/// Text between the first begin marker of `block` and the next end marker.
///
/// Returns an empty slice when either marker is missing.
pub fn extract_block(body: &str, block: Block) -> &str {
    let begin = block.begin_marker();
    let Some(begin_idx) = body.find(begin) else {
        return "";
    };
    let content_start = begin_idx + begin.len();
    match body[content_start..].find(block.end_marker()) {
        Some(len) => &body[content_start..content_start + len],
        None => "",
    }
}

/// Whether the body declares a single-result algorithm.
pub fn is_single_result(body: &str) -> bool {
    body.contains(SINGLE_RESULT_MARKER)
}

/// Whether the body declares a bulk-result algorithm.
pub fn is_bulk_result(body: &str) -> bool {
    body.contains(BULK_RESULT_MARKER)
}

/// Remove the first `begin ... end` region (or a lone `begin` token when `end` is empty)
/// together with the newlines that directly follow it.
fn remove_region(text: &mut String, begin: &str, end: &str) {
    let Some(begin_idx) = text.find(begin) else {
        return;
    };
    let after_begin = begin_idx + begin.len();
    let mut end_idx = if end.is_empty() {
        after_begin
    } else {
        match text[after_begin..].find(end) {
            Some(len) => after_begin + len + end.len(),
            None => return,
        }
    };

    let bytes = text.as_bytes();
    while end_idx < bytes.len() && bytes[end_idx] == b'\n' {
        end_idx += 1;
    }

    text.replace_range(begin_idx..end_idx, "");
}

/// Body text with every marked region and flag marker removed.
///
/// An all-whitespace residual collapses to the empty string, meaning "no body to emit".
pub fn residual_body(body: &str) -> String {
    let mut text = body.to_string();
    for block in Block::ALL {
        remove_region(&mut text, block.begin_marker(), block.end_marker());
    }
    remove_region(&mut text, SINGLE_RESULT_MARKER, "");
    remove_region(&mut text, BULK_RESULT_MARKER, "");

    if text.chars().all(char::is_whitespace) {
        String::new()
    } else {
        text
    }
}

/// All extension pieces of one method body, extracted in a single pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextBlocks<'a> {
    pub header_prologue: &'a str,
    pub header_epilogue: &'a str,
    pub public_section: &'a str,
    pub private_section: &'a str,
    pub member_initializer_list: &'a str,
    pub single_result: bool,
    pub bulk_result: bool,
    /// Residual body, empty when nothing but markers and whitespace remained
    pub body: String,
}

impl<'a> TextBlocks<'a> {
    pub fn parse(body: &'a str) -> Self {
        Self {
            header_prologue: extract_block(body, Block::HeaderPrologue),
            header_epilogue: extract_block(body, Block::HeaderEpilogue),
            public_section: extract_block(body, Block::PublicSection),
            private_section: extract_block(body, Block::PrivateSection),
            member_initializer_list: extract_block(body, Block::MemberInitializerList),
            single_result: is_single_result(body),
            bulk_result: is_bulk_result(body),
            body: residual_body(body),
        }
    }

    /// Initializer-list fragment with line breaks removed, as one constructor entry.
    pub fn initializer(&self) -> String {
        self.member_initializer_list
            .chars()
            .filter(|c| *c != '\n')
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_private_section_verbatim() {
        let body = "BEGIN_PRIVATE_SECTION\n  int m_cache = 0;\nEND_PRIVATE_SECTION\nreturn m_cache;\n";
        assert_eq!(extract_block(body, Block::PrivateSection), "\n  int m_cache = 0;\n");
        assert_eq!(residual_body(body), "return m_cache;\n");
    }

    #[test]
    fn test_missing_end_marker_extracts_nothing() {
        let body = "BEGIN_PUBLIC_SECTION\nvoid f();\n";
        assert_eq!(extract_block(body, Block::PublicSection), "");
        assert_eq!(residual_body(body), body);
    }

    #[test]
    fn test_only_markers_leaves_empty_body() {
        let body = "ADD_ALGO_N\nBEGIN_HEADER_PROLOGUE\n#include <set>\nEND_HEADER_PROLOGUE\n\n  \n";
        let blocks = TextBlocks::parse(body);
        assert!(blocks.bulk_result);
        assert!(!blocks.single_result);
        assert_eq!(blocks.header_prologue, "\n#include <set>\n");
        assert!(blocks.body.is_empty());
    }

    #[test]
    fn test_only_first_region_removed() {
        let body = "BEGIN_PRIVATE_SECTION a END_PRIVATE_SECTION x BEGIN_PRIVATE_SECTION b END_PRIVATE_SECTION";
        assert_eq!(extract_block(body, Block::PrivateSection), " a ");
        assert_eq!(
            residual_body(body),
            " x BEGIN_PRIVATE_SECTION b END_PRIVATE_SECTION"
        );
    }

    #[test]
    fn test_initializer_joins_lines() {
        let body = "BEGIN_MEMBER_INITIALIZER_LIST\nm_count(0)\nEND_MEMBER_INITIALIZER_LIST\nreturn m_count;";
        let blocks = TextBlocks::parse(body);
        assert_eq!(blocks.initializer(), "m_count(0)");
        assert_eq!(blocks.body, "return m_count;");
    }

    #[test]
    fn test_single_result_marker() {
        let blocks = TextBlocks::parse("ADD_ALGO_1\nreturn m_owner;");
        assert!(blocks.single_result);
        assert_eq!(blocks.body, "return m_owner;");
    }
}
