//! Document-level relevance scoring by keyword occurrence counting.
//!
//! The scorer is deliberately simple: tokenize the query, count
//! case-insensitive substring occurrences of each token in the document
//! text, sum. It is exposed behind [`RelevanceScorer`] so a term-frequency
//! or embedding ranker can be swapped in without touching the assembler.

use regex::Regex;

/// Sentence punctuation treated as token separators, both ASCII and the
/// CJK set.
const SEPARATORS: &str = "，。！？,.?!";

/// Split a query into keyword tokens.
///
/// Splits on whitespace and sentence punctuation, then discards tokens of
/// one character or less — single ideograms are noise for substring
/// matching (a precision/recall trade-off, inherited from the upstream
/// prompt contract).
pub fn query_tokens(query: &str) -> Vec<String> {
    query
        .split(|c: char| c.is_whitespace() || SEPARATORS.contains(c))
        .filter(|t| t.chars().count() > 1)
        .map(|t| t.to_string())
        .collect()
}

/// Scores one document's text against a query.
pub trait RelevanceScorer: Send + Sync {
    /// Non-negative relevance score; 0 means no token matched.
    fn score(&self, query: &str, document_text: &str) -> u32;
}

/// Default scorer: sum of per-token occurrence counts.
///
/// Occurrences are counted with a case-insensitive regex over the raw
/// text, so a token may match inside a larger word.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordScorer;

impl RelevanceScorer for KeywordScorer {
    fn score(&self, query: &str, document_text: &str) -> u32 {
        if document_text.is_empty() {
            return 0;
        }
        let mut score = 0u32;
        for token in query_tokens(query) {
            let Ok(re) = Regex::new(&format!("(?i){}", regex::escape(&token))) else {
                continue;
            };
            score += re.find_iter(document_text).count() as u32;
        }
        score
    }
}
