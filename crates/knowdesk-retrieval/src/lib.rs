//! # KnowDesk Retrieval
//!
//! The retrieval-and-context-assembly engine: keyword relevance scoring,
//! paragraph-level snippet selection for long documents, and assembly of a
//! budget-capped context string with a best-source attribution.
//!
//! Everything in this crate is synchronous, read-only, and side-effect
//! free, so it is safe to share across concurrent chat turns.
//!
//! ```text
//! query + knowledge bases
//!   ↓ score every synced document (occurrence counting)
//!   ↓ sort candidates by score (stable)
//!   ↓ per long document: pick the most relevant paragraphs
//!   ↓ concatenate under the character budget
//! ContextBundle { text, source }
//! ```

pub mod assembler;
pub mod scorer;
pub mod snippet;

pub use assembler::{ContextAssembler, ContextBundle};
pub use scorer::{KeywordScorer, RelevanceScorer, query_tokens};
pub use snippet::select_snippet;

/// Truncate a string to at most `limit` characters (not bytes).
///
/// Hard cap, no attempt to avoid mid-word cuts.
pub(crate) fn truncate_chars(s: &str, limit: usize) -> String {
    if s.chars().count() <= limit {
        s.to_string()
    } else {
        s.chars().take(limit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_counts_chars_not_bytes() {
        assert_eq!(truncate_chars("年假规定", 2), "年假");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 5), "");
    }
}
