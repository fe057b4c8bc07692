//! # KnowDesk Relay
//!
//! Forwards an upstream token stream to a chat subscriber as ordered
//! events, resolves the inline source marker on completion, and produces
//! the finalized assistant message for persistence.
//!
//! The relay itself is storage-free: the caller owns persisting the
//! returned [`ChatMessage`] through its repository. A turn ends in exactly
//! one terminal event — `done` or `error` — and is never retried here.

pub mod marker;

use futures::StreamExt;
use tokio::sync::mpsc;

use knowdesk_core::traits::UpstreamStream;
use knowdesk_core::types::{ChatEvent, ChatMessage, SourceRef, UpstreamEvent};

/// Generic user-facing message for an upstream transport failure.
pub const UPSTREAM_UNAVAILABLE: &str = "抱歉，服务暂时不可用，请稍后重试。";

/// A knowledge base the marker label can resolve against.
#[derive(Debug, Clone)]
pub struct KnownBase {
    pub name: String,
    pub updated_at: String,
}

/// Per-turn streaming relay.
pub struct StreamRelay {
    known_bases: Vec<KnownBase>,
    /// Attribution from the context assembler, used when the model emitted
    /// no marker of its own.
    fallback_source: Option<SourceRef>,
}

impl StreamRelay {
    pub fn new(known_bases: Vec<KnownBase>, fallback_source: Option<SourceRef>) -> Self {
        Self { known_bases, fallback_source }
    }

    /// Consume the upstream stream, forwarding deltas to `events` in
    /// arrival order, and return the finalized assistant message.
    ///
    /// If the subscriber goes away mid-stream, forwarding stops but
    /// consumption continues, so the returned message carries the full
    /// accumulated text.
    pub async fn run(
        &self,
        mut upstream: UpstreamStream,
        events: mpsc::Sender<ChatEvent>,
    ) -> ChatMessage {
        let mut full_text = String::new();
        let mut subscriber_gone = false;

        while let Some(event) = upstream.next().await {
            match event {
                UpstreamEvent::Delta(delta) => {
                    full_text.push_str(&delta);
                    if !subscriber_gone {
                        let ev = ChatEvent::Delta { content: delta };
                        if events.send(ev).await.is_err() {
                            tracing::debug!("subscriber went away, draining upstream");
                            subscriber_gone = true;
                        }
                    }
                }
                UpstreamEvent::Done => {
                    return self.finalize(&full_text, &events).await;
                }
                UpstreamEvent::Error(reason) => {
                    tracing::error!("upstream failed: {reason}");
                    let message = ChatMessage::assistant(UPSTREAM_UNAVAILABLE, None);
                    let _ = events
                        .send(ChatEvent::Error { content: UPSTREAM_UNAVAILABLE.to_string() })
                        .await;
                    return message;
                }
            }
        }

        // upstream ended without a terminal event; treat as completion
        self.finalize(&full_text, &events).await
    }

    async fn finalize(&self, full_text: &str, events: &mpsc::Sender<ChatEvent>) -> ChatMessage {
        let scan = marker::scan(full_text);
        let source = match scan.label {
            Some(label) => Some(self.resolve_label(&label)),
            None => self.fallback_source.clone(),
        };

        let message = ChatMessage::assistant(&scan.text, source.clone());
        let _ = events
            .send(ChatEvent::Done { source, message_id: message.id.clone() })
            .await;
        message
    }

    /// Resolve a marker label against the known knowledge bases: a
    /// substring match in either direction wins; otherwise the label is
    /// taken verbatim with a placeholder freshness.
    fn resolve_label(&self, label: &str) -> SourceRef {
        for kb in &self.known_bases {
            if kb.name.contains(label) || label.contains(&kb.name) {
                return SourceRef {
                    name: kb.name.clone(),
                    updated_at: kb.updated_at.clone(),
                };
            }
        }
        SourceRef {
            name: label.to_string(),
            updated_at: "刚刚更新".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knowdesk_core::types::Role;

    fn upstream(events: Vec<UpstreamEvent>) -> UpstreamStream {
        Box::pin(futures::stream::iter(events))
    }

    fn relay() -> StreamRelay {
        StreamRelay::new(
            vec![
                KnownBase { name: "员工手册".into(), updated_at: "1天前".into() },
                KnownBase { name: "公司政策".into(), updated_at: "2小时前".into() },
            ],
            None,
        )
    }

    fn drain(rx: &mut mpsc::Receiver<ChatEvent>) -> Vec<ChatEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    #[tokio::test]
    async fn test_deltas_then_done_with_marker_attribution() {
        let (tx, mut rx) = mpsc::channel(16);
        let stream = upstream(vec![
            UpstreamEvent::Delta("您好".into()),
            UpstreamEvent::Delta("！".into()),
            UpstreamEvent::Delta("【来源：员工手册】".into()),
            UpstreamEvent::Done,
        ]);

        let message = relay().run(stream, tx).await;

        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "您好！");
        assert_eq!(message.source.as_ref().unwrap().name, "员工手册");
        assert_eq!(message.source.as_ref().unwrap().updated_at, "1天前");

        let events = drain(&mut rx);
        assert_eq!(events.len(), 4); // three deltas, one done
        assert_eq!(events[0], ChatEvent::Delta { content: "您好".into() });
        assert_eq!(events[1], ChatEvent::Delta { content: "！".into() });
        match &events[3] {
            ChatEvent::Done { source, message_id } => {
                assert_eq!(source.as_ref().unwrap().name, "员工手册");
                assert_eq!(message_id, &message.id);
            }
            other => panic!("expected done, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_before_any_delta() {
        let (tx, mut rx) = mpsc::channel(16);
        let stream = upstream(vec![UpstreamEvent::Error("connect refused".into())]);

        let message = relay().run(stream, tx).await;

        assert_eq!(message.content, UPSTREAM_UNAVAILABLE);
        assert!(message.source.is_none());

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1); // no deltas were ever sent
        assert_eq!(events[0], ChatEvent::Error { content: UPSTREAM_UNAVAILABLE.into() });
    }

    #[tokio::test]
    async fn test_no_marker_falls_back_to_retrieval_attribution() {
        let fallback = SourceRef { name: "公司政策 - 报销指南.pdf".into(), updated_at: "10分钟前".into() };
        let relay = StreamRelay::new(vec![], Some(fallback.clone()));

        let (tx, mut rx) = mpsc::channel(16);
        let stream = upstream(vec![
            UpstreamEvent::Delta("报销需提交凭证。".into()),
            UpstreamEvent::Done,
        ]);

        let message = relay.run(stream, tx).await;
        assert_eq!(message.source, Some(fallback));

        let events = drain(&mut rx);
        assert!(matches!(events.last(), Some(ChatEvent::Done { .. })));
    }

    #[tokio::test]
    async fn test_unresolved_label_kept_verbatim() {
        let (tx, _rx) = mpsc::channel(16);
        let stream = upstream(vec![
            UpstreamEvent::Delta("见内部文档【来源：未知资料】".into()),
            UpstreamEvent::Done,
        ]);

        let message = relay().run(stream, tx).await;
        let source = message.source.unwrap();
        assert_eq!(source.name, "未知资料");
        assert_eq!(source.updated_at, "刚刚更新");
    }

    #[tokio::test]
    async fn test_partial_label_resolves_to_known_base() {
        let (tx, _rx) = mpsc::channel(16);
        let stream = upstream(vec![
            UpstreamEvent::Delta("答案【来源：员工手册 - 福利章节】".into()),
            UpstreamEvent::Done,
        ]);

        let message = relay().run(stream, tx).await;
        // label contains a known base name, so the base wins
        assert_eq!(message.source.unwrap().name, "员工手册");
    }

    #[tokio::test]
    async fn test_subscriber_disconnect_still_accumulates() {
        let (tx, rx) = mpsc::channel(16);
        drop(rx); // client gone before the first delta

        let stream = upstream(vec![
            UpstreamEvent::Delta("第一段".into()),
            UpstreamEvent::Delta("第二段".into()),
            UpstreamEvent::Done,
        ]);

        let message = relay().run(stream, tx).await;
        assert_eq!(message.content, "第一段第二段");
    }
}
