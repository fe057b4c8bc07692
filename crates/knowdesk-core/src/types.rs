//! Core data model: knowledge bases, documents, chats, and stream events.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Extraction status of a document. Only `Synced` documents participate
/// in retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocStatus {
    Indexing,
    Synced,
    Failed,
}

/// A document owned by a knowledge base. The extracted text is not stored
/// inline; it is loaded through the [`crate::traits::TextStore`] seam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub size: String,
    #[serde(rename = "uploadedAt", default)]
    pub uploaded_at: String,
    pub status: DocStatus,
}

/// A named collection of documents used as a retrieval corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(rename = "fileCount", default)]
    pub file_count: usize,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: String,
    #[serde(default)]
    pub files: Vec<Document>,
}

/// Attribution shown to the user as "this answer came from X".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub name: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// Message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A persisted chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,
}

impl ChatMessage {
    /// New user message with a fresh id and HH:MM label.
    pub fn user(content: &str) -> Self {
        Self {
            id: new_id("m"),
            role: Role::User,
            content: content.to_string(),
            created_at: time_label(),
            source: None,
        }
    }

    /// New assistant message with a fresh id and HH:MM label.
    pub fn assistant(content: &str, source: Option<SourceRef>) -> Self {
        Self {
            id: new_id("m"),
            role: Role::Assistant,
            content: content.to_string(),
            created_at: time_label(),
            source,
        }
    }
}

/// A conversation thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    #[serde(rename = "userId", default)]
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub pinned: bool,
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// Prompt message sent to the upstream model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: &str) -> Self {
        Self { role: "system".into(), content: content.into() }
    }
    pub fn user(content: &str) -> Self {
        Self { role: "user".into(), content: content.into() }
    }
    pub fn assistant(content: &str) -> Self {
        Self { role: "assistant".into(), content: content.into() }
    }
}

/// Generation parameters for an upstream call.
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// One event of the normalized upstream token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamEvent {
    /// One incremental text fragment.
    Delta(String),
    /// Upstream finished the completion.
    Done,
    /// Transport-level failure. Terminal for the turn.
    Error(String),
}

/// One event delivered to the chat subscriber. Serialized shape matches the
/// wire contract: `{"type":"delta","content":...}` etc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChatEvent {
    Delta {
        content: String,
    },
    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<SourceRef>,
        #[serde(rename = "messageId")]
        message_id: String,
    },
    Error {
        content: String,
    },
}

/// Short prefixed entity id, e.g. `m_1a2b3c4d`.
pub fn new_id(prefix: &str) -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &uuid[..8])
}

/// Local HH:MM label used on chat messages.
pub fn time_label() -> String {
    Local::now().format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_event_wire_shape() {
        let ev = ChatEvent::Delta { content: "您好".into() };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "delta");
        assert_eq!(json["content"], "您好");

        let ev = ChatEvent::Done {
            source: Some(SourceRef { name: "员工手册".into(), updated_at: "1天前".into() }),
            message_id: "m_12345678".into(),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "done");
        assert_eq!(json["source"]["name"], "员工手册");
        assert_eq!(json["messageId"], "m_12345678");
    }

    #[test]
    fn test_doc_status_roundtrip() {
        let s: DocStatus = serde_json::from_str("\"synced\"").unwrap();
        assert_eq!(s, DocStatus::Synced);
        assert_eq!(serde_json::to_string(&DocStatus::Indexing).unwrap(), "\"indexing\"");
    }

    #[test]
    fn test_new_id_prefix() {
        let id = new_id("kb");
        assert!(id.starts_with("kb_"));
        assert_eq!(id.len(), 11);
    }
}
