//! The chat turn: persist the user message, assemble retrieval context,
//! call the upstream model, and relay the answer as server-sent events.
//!
//! The relay task is detached from the HTTP response, so a client
//! disconnect stops delta delivery but never loses the persisted message.

use axum::{
    Json,
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use knowdesk_core::KnowDeskError;
use knowdesk_core::traits::{Repository, UpstreamStream};
use knowdesk_core::types::{ChatMessage, GenerateParams, Message, Role, UpstreamEvent};
use knowdesk_relay::{KnownBase, StreamRelay};

use super::server::AppState;

/// Handle `POST /api/v1/chats/{id}/messages`.
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, Json<serde_json::Value>> {
    let content = body["content"].as_str().unwrap_or("").trim().to_string();
    if content.is_empty() {
        return Err(Json(serde_json::json!({"ok": false, "error": "消息内容不能为空"})));
    }

    // persist the user message and derive the title from the first turn
    let history = state
        .store
        .update_chats(|chats| {
            let chat = chats
                .iter_mut()
                .find(|c| c.id == chat_id)
                .ok_or_else(|| KnowDeskError::NotFound("对话不存在".into()))?;
            chat.messages.push(ChatMessage::user(&content));
            if chat.messages.iter().filter(|m| m.role == Role::User).count() == 1 {
                chat.title = title_from(&content);
            }
            Ok(history_window(&chat.messages))
        })
        .map_err(|e| Json(serde_json::json!({"ok": false, "error": e.to_string()})))?;

    // retrieval: context bundle + fallback attribution
    let bases = state.store.load_knowledge_bases().unwrap_or_default();
    let bundle = state.assembler.assemble(&content, &bases, state.texts.as_ref());
    tracing::info!(
        "🔍 Chat {chat_id}: query {} chars → context {} chars",
        content.chars().count(),
        bundle.text.chars().count()
    );

    let mut messages = vec![Message::system(&system_prompt(&bundle.text))];
    messages.extend(history);
    messages.push(Message::user(&content));

    let params = GenerateParams {
        model: state.config.llm.model.clone(),
        temperature: state.config.llm.temperature,
        max_tokens: state.config.llm.max_tokens,
    };
    let known: Vec<KnownBase> = bases
        .iter()
        .map(|k| KnownBase { name: k.name.clone(), updated_at: k.updated_at.clone() })
        .collect();

    let (tx, rx) = mpsc::channel(64);
    let provider = state.provider.clone();
    let store = state.store.clone();
    let fallback = bundle.source;
    let task_chat_id = chat_id.clone();

    tokio::spawn(async move {
        let upstream = match provider.chat_stream(&messages, &params).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!("upstream call could not start: {e}");
                Box::pin(futures::stream::iter(vec![UpstreamEvent::Error(e.to_string())]))
                    as UpstreamStream
            }
        };

        let relay = StreamRelay::new(known, fallback);
        let message = relay.run(upstream, tx).await;

        if let Err(e) = store.append_message(&task_chat_id, message) {
            tracing::error!("failed to persist assistant message: {e}");
        }
    });

    let stream = ReceiverStream::new(rx).map(|ev| {
        Ok::<_, Infallible>(Event::default().data(serde_json::to_string(&ev).unwrap_or_default()))
    });
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// System prompt carrying the retrieved context. The `【来源：…】` tagging
/// rule here is the upstream half of the source-marker contract the relay
/// parses on completion.
fn system_prompt(context: &str) -> String {
    format!(
        r#"你是一个企业智能客服助手，名叫"KnowDesk助手"。

以下是从知识库中检索到的相关文档内容，请优先基于这些内容来回答用户问题：

=====知识库文档内容=====
{context}
======================

回答规则：
1. **优先使用**上方文档中的实际内容回答，尽量引用原文中的关键数据和信息
2. 使用 **加粗** 标注关键信息
3. 如果文档中有相关内容，在回答末尾用【来源：文件名或知识库名】标注
4. 如果文档内容不足以完整回答，可以补充通用知识，但要说明哪些是文档内容，哪些是补充
5. 语言简洁专业，可使用分点列举
6. 如果完全没有相关内容，诚实说明"#
    )
}

/// Up to the last five messages before the one just appended.
fn history_window(messages: &[ChatMessage]) -> Vec<Message> {
    let end = messages.len().saturating_sub(1);
    let start = end.saturating_sub(5);
    messages[start..end]
        .iter()
        .map(|m| match m.role {
            Role::User => Message::user(&m.content),
            Role::Assistant => Message::assistant(&m.content),
        })
        .collect()
}

/// Chat title derived from the first user message.
fn title_from(content: &str) -> String {
    let title: String = content.chars().take(20).collect();
    if content.chars().count() > 20 {
        format!("{title}…")
    } else {
        title
    }
}
