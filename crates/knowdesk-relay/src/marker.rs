//! Grammar for the inline source marker the upstream model is prompted to
//! emit: `【来源：<label>】`.
//!
//! The marker format is part of the upstream prompt contract; this module
//! is the single parser for it.

use regex::Regex;
use std::sync::OnceLock;

fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("【来源：([^】]+)】").expect("marker regex"))
}

/// Result of scanning a finished completion for source markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerScan {
    /// Text with every marker occurrence stripped, trimmed.
    pub text: String,
    /// The first marker's label, if any marker was present.
    pub label: Option<String>,
}

/// Scan `text` for source markers: capture the first label and strip all
/// occurrences from the visible text.
pub fn scan(text: &str) -> MarkerScan {
    let re = marker_re();
    let label = re
        .captures(text)
        .map(|caps| caps[1].to_string());
    let text = if label.is_some() {
        re.replace_all(text, "").trim().to_string()
    } else {
        text.to_string()
    };
    MarkerScan { text, label }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_round_trip() {
        let scan = scan("foo【来源：Bar】baz");
        assert_eq!(scan.text, "foobaz");
        assert_eq!(scan.label.as_deref(), Some("Bar"));
    }

    #[test]
    fn test_no_marker() {
        let out = scan("您好！有什么可以帮您？");
        assert_eq!(out.text, "您好！有什么可以帮您？");
        assert!(out.label.is_none());
    }

    #[test]
    fn test_all_occurrences_stripped_first_label_wins() {
        let out = scan("答案一【来源：员工手册】补充【来源：公司政策】");
        assert_eq!(out.text, "答案一补充");
        assert_eq!(out.label.as_deref(), Some("员工手册"));
    }

    #[test]
    fn test_trailing_marker_and_whitespace() {
        let out = scan("您好！\n【来源：员工手册 - 福利章节】 ");
        assert_eq!(out.text, "您好！");
        assert_eq!(out.label.as_deref(), Some("员工手册 - 福利章节"));
    }
}
