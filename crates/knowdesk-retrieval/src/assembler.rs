//! Context assembly: scoring and selection across knowledge bases into one
//! budget-capped context string.

use std::cmp::Reverse;

use knowdesk_core::config::RetrievalConfig;
use knowdesk_core::traits::TextStore;
use knowdesk_core::types::{DocStatus, KnowledgeBase, SourceRef};
use serde::Serialize;

use crate::scorer::{RelevanceScorer, query_tokens};
use crate::snippet::select_snippet;
use crate::truncate_chars;

/// The assembled, budget-capped context injected into the generation
/// prompt, with the best-source attribution when any document matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextBundle {
    pub text: String,
    pub source: Option<SourceRef>,
}

struct Candidate<'a> {
    kb: &'a KnowledgeBase,
    doc_name: &'a str,
    uploaded_at: &'a str,
    text: String,
    score: u32,
}

/// Walks every synced document across the knowledge bases, ranks by
/// relevance, and concatenates snippets under the character budget.
///
/// Never fails: missing text is absence, an empty candidate set degrades to
/// a knowledge-base summary. The scorer is pluggable.
pub struct ContextAssembler {
    cfg: RetrievalConfig,
    scorer: Box<dyn RelevanceScorer>,
}

impl ContextAssembler {
    pub fn new(cfg: RetrievalConfig, scorer: Box<dyn RelevanceScorer>) -> Self {
        Self { cfg, scorer }
    }

    /// Assemble the context bundle for one chat turn.
    pub fn assemble(
        &self,
        query: &str,
        bases: &[KnowledgeBase],
        texts: &dyn TextStore,
    ) -> ContextBundle {
        let tokens = query_tokens(query);
        let budget = self.cfg.context_budget;

        // candidate set: synced documents with non-empty text, whether or
        // not any token matched (unscored-but-present documents still ride)
        let mut candidates: Vec<Candidate<'_>> = Vec::new();
        for kb in bases {
            for doc in &kb.files {
                if doc.status != DocStatus::Synced {
                    continue;
                }
                let text = texts.text(&doc.id);
                if text.is_empty() {
                    continue;
                }
                let score = self.scorer.score(query, &text);
                candidates.push(Candidate {
                    kb,
                    doc_name: &doc.name,
                    uploaded_at: &doc.uploaded_at,
                    text,
                    score,
                });
            }
        }

        // stable: equal scores keep the scan order across knowledge bases
        candidates.sort_by_key(|c| Reverse(c.score));

        let mut out = String::new();
        let mut source: Option<SourceRef> = None;

        for c in &candidates {
            let used = out.chars().count();
            if used >= budget {
                break;
            }
            let remaining = budget - used;

            let header = format!(
                "\n\n📄 来源文件：{}（知识库：{}）\n",
                c.doc_name, c.kb.name
            );
            let header_len = header.chars().count();
            if header_len >= remaining {
                break;
            }
            // the whole formatted block counts against the budget, so the
            // bundle never exceeds it
            let allowance = remaining - header_len;

            let snippet = if c.text.chars().count() > self.cfg.long_doc_threshold {
                select_snippet(&c.text, &tokens, allowance, &self.cfg)
            } else {
                truncate_chars(&c.text, allowance)
            };

            out.push_str(&header);
            out.push_str(&snippet);

            if source.is_none() && c.score > 0 {
                let updated = if c.uploaded_at.is_empty() {
                    c.kb.updated_at.clone()
                } else {
                    c.uploaded_at.to_string()
                };
                source = Some(SourceRef {
                    name: format!("{} - {}", c.kb.name, c.doc_name),
                    updated_at: updated,
                });
            }
        }

        if out.is_empty() {
            let names = bases
                .iter()
                .map(|k| format!("「{}」({})", k.name, k.description))
                .collect::<Vec<_>>()
                .join("、");
            let summary = format!(
                "当前知识库包含：{names}。注意：这些知识库中的文件尚未提取到文本内容，或用户上传的文件未包含索引内容。"
            );
            return ContextBundle {
                text: truncate_chars(&summary, budget),
                source: None,
            };
        }

        tracing::debug!(
            "context assembled: {} candidate(s), {} chars",
            candidates.len(),
            out.chars().count()
        );

        ContextBundle { text: out, source }
    }
}
