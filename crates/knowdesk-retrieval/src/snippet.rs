//! Paragraph-level snippet selection for long documents.

use knowdesk_core::config::RetrievalConfig;

use crate::truncate_chars;

/// Extract the most relevant paragraph subset of a long document.
///
/// Documents at or under the long-document threshold are returned
/// unmodified. Longer documents are split into paragraphs on newline runs;
/// short fragments (headers, page numbers) are dropped, the rest are ranked
/// by how many distinct query tokens they contain, and the top paragraphs
/// are joined. With no query tokens every paragraph is equally eligible.
/// If nothing qualifies, the document's head is used instead. The result is
/// hard-capped at `budget` characters.
pub fn select_snippet(
    document_text: &str,
    query_tokens: &[String],
    budget: usize,
    cfg: &RetrievalConfig,
) -> String {
    if document_text.chars().count() <= cfg.long_doc_threshold {
        return document_text.to_string();
    }

    let lowered_tokens: Vec<String> = query_tokens.iter().map(|t| t.to_lowercase()).collect();

    let mut scored: Vec<(&str, usize)> = document_text
        .split('\n')
        .filter(|p| p.trim().chars().count() > cfg.min_paragraph_chars)
        .map(|p| {
            let lower = p.to_lowercase();
            let hits = lowered_tokens.iter().filter(|t| lower.contains(t.as_str())).count();
            (p, hits)
        })
        // with no tokens the score filter is bypassed, not applied at zero
        .filter(|(_, hits)| *hits > 0 || lowered_tokens.is_empty())
        .collect();

    // stable: ties keep source order
    scored.sort_by_key(|(_, hits)| std::cmp::Reverse(*hits));

    let selected = scored
        .iter()
        .take(cfg.max_paragraphs)
        .map(|(p, _)| *p)
        .collect::<Vec<_>>()
        .join("\n");

    let snippet = if selected.is_empty() {
        truncate_chars(document_text, cfg.long_doc_threshold)
    } else {
        selected
    };

    truncate_chars(&snippet, budget)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> RetrievalConfig {
        RetrievalConfig::default()
    }

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_short_document_returned_unchanged() {
        let text = "年假规定：入职满1年的员工享有5天年假。";
        let out = select_snippet(text, &tokens(&["年假"]), 3000, &cfg());
        assert_eq!(out, text);
    }

    #[test]
    fn test_only_matching_paragraph_selected() {
        // one paragraph mentions 年假, the rest is filler pushing the
        // document well past the long-document threshold
        let filler = "这是一段与问题无关的内容，用来撑大文档体积，不包含任何相关词。".repeat(3);
        let target = "年假规定：入职满1年不满10年的员工，每年享有5天带薪年假。";
        let mut doc = String::new();
        for _ in 0..60 {
            doc.push_str(&filler);
            doc.push('\n');
        }
        doc.push_str(target);
        assert!(doc.chars().count() > 5000);

        let out = select_snippet(&doc, &tokens(&["年假"]), 3000, &cfg());
        assert_eq!(out, target);
    }

    #[test]
    fn test_tie_order_is_stable() {
        let para = |tag: &str| format!("段落{tag}提到关键词报销，并附有足够长度的说明文字以通过过滤。");
        let doc = format!(
            "{}\n{}\n{}\n{}",
            para("一"),
            para("二"),
            para("三"),
            "凑长度用的无关段落，反复出现的填充文字。".repeat(60),
        );
        assert!(doc.chars().count() > 1500);

        let out = select_snippet(&doc, &tokens(&["报销"]), 3000, &cfg());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], para("一"));
        assert_eq!(lines[1], para("二"));
        assert_eq!(lines[2], para("三"));
    }

    #[test]
    fn test_top_five_paragraphs_cap() {
        let matching = "报销流程说明段落，包含报销关键词且长度足够参与段落筛选。";
        let doc = format!("{}\n{}", vec![matching; 10].join("\n"), "填充内容".repeat(500));

        let out = select_snippet(&doc, &tokens(&["报销"]), 10_000, &cfg());
        assert_eq!(out.lines().count(), 5);
    }

    #[test]
    fn test_empty_tokens_keep_all_paragraphs() {
        let para = "一段长度超过二十个字符的普通段落内容，用于验证空查询时的行为。";
        let doc = format!("{}\n{}", vec![para; 3].join("\n"), "甲乙丙丁".repeat(500));

        let out = select_snippet(&doc, &[], 10_000, &cfg());
        // score filter bypassed: unrelated paragraphs survive
        assert!(out.contains(para));
    }

    #[test]
    fn test_fallback_to_document_head() {
        // long document, no paragraph passes the length filter (every line
        // is short), so selection falls back to the head of the text
        let doc = "短行\n".repeat(2000);
        let out = select_snippet(&doc, &tokens(&["关键词"]), 3000, &cfg());
        assert_eq!(out.chars().count(), 1500);
        assert!(out.starts_with("短行"));
    }

    #[test]
    fn test_result_truncated_to_budget() {
        let para = "报销相关的段落内容，说明文字足够长以通过段落长度过滤条件。";
        let doc = format!("{}\n{}", vec![para; 5].join("\n"), "填充".repeat(2000));
        let out = select_snippet(&doc, &tokens(&["报销"]), 30, &cfg());
        assert_eq!(out.chars().count(), 30);
    }
}
