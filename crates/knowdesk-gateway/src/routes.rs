//! API route handlers for the gateway.

use axum::{
    Json,
    extract::{Path, State},
};
use rand::Rng;
use std::sync::Arc;

use knowdesk_core::traits::{Repository, TextStore};
use knowdesk_core::types::{ChatSession, KnowledgeBase, new_id};

use super::server::AppState;

/// Health check endpoint.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "knowdesk-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// System health with uptime.
pub async fn system_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "provider": state.provider.name(),
        "model": state.config.llm.model,
    }))
}

/// List all knowledge bases.
pub async fn list_knowledge_bases(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    match state.store.load_knowledge_bases() {
        Ok(bases) => Json(serde_json::json!(bases)),
        Err(e) => Json(serde_json::json!({"ok": false, "error": e.to_string()})),
    }
}

/// Create a knowledge base.
pub async fn create_knowledge_base(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    let name = body["name"].as_str().unwrap_or("").trim().to_string();
    if name.is_empty() {
        return Json(serde_json::json!({"ok": false, "error": "知识库名称不能为空"}));
    }
    let description = body["description"].as_str().unwrap_or("").to_string();

    let icons = ["📄", "❓", "📗", "🔧", "📊", "🎯", "💡", "📋"];
    let colors = ["#4F46E5", "#3B82F6", "#F59E0B", "#10B981", "#EF4444", "#8B5CF6"];
    let mut rng = rand::thread_rng();
    let kb = KnowledgeBase {
        id: new_id("kb"),
        name,
        description,
        icon: icons[rng.gen_range(0..icons.len())].to_string(),
        color: colors[rng.gen_range(0..colors.len())].to_string(),
        file_count: 0,
        updated_at: "刚刚".into(),
        files: vec![],
    };

    let created = kb.clone();
    match state.store.update_knowledge_bases(move |bases| {
        bases.push(kb);
        Ok(())
    }) {
        Ok(()) => Json(serde_json::json!(created)),
        Err(e) => Json(serde_json::json!({"ok": false, "error": e.to_string()})),
    }
}

/// Fetch one knowledge base.
pub async fn get_knowledge_base(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<serde_json::Value> {
    let bases = state.store.load_knowledge_bases().unwrap_or_default();
    match bases.into_iter().find(|k| k.id == id) {
        Some(kb) => Json(serde_json::json!(kb)),
        None => Json(serde_json::json!({"ok": false, "error": "知识库不存在"})),
    }
}

/// Preview a document's extracted text (first 2000 chars).
pub async fn document_content(
    State(state): State<Arc<AppState>>,
    Path((_kb_id, doc_id)): Path<(String, String)>,
) -> Json<serde_json::Value> {
    let content = state.texts.text(&doc_id);
    let preview: String = content.chars().take(2000).collect();
    Json(serde_json::json!({
        "content": preview,
        "length": content.chars().count(),
    }))
}

/// Remove a document record and its stored text.
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path((kb_id, doc_id)): Path<(String, String)>,
) -> Json<serde_json::Value> {
    let result = state.store.update_knowledge_bases(|bases| {
        let kb = bases
            .iter_mut()
            .find(|k| k.id == kb_id)
            .ok_or_else(|| knowdesk_core::KnowDeskError::NotFound("知识库不存在".into()))?;
        kb.files.retain(|f| f.id != doc_id);
        kb.file_count = kb.files.len();
        Ok(())
    });
    match result {
        Ok(()) => {
            state.texts.remove(&doc_id);
            Json(serde_json::json!({"ok": true}))
        }
        Err(e) => Json(serde_json::json!({"ok": false, "error": e.to_string()})),
    }
}

/// List chats without message bodies.
pub async fn list_chats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let chats = state.store.load_chats().unwrap_or_default();
    let summaries: Vec<serde_json::Value> = chats
        .iter()
        .map(|c| {
            serde_json::json!({
                "id": c.id,
                "userId": c.user_id,
                "title": c.title,
                "pinned": c.pinned,
                "createdAt": c.created_at,
                "messageCount": c.messages.len(),
            })
        })
        .collect();
    Json(serde_json::json!(summaries))
}

/// Create a chat.
pub async fn create_chat(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let chat = ChatSession {
        id: new_id("c"),
        user_id: "default".into(),
        title: "新对话".into(),
        pinned: false,
        created_at: chrono::Utc::now().to_rfc3339(),
        messages: vec![],
    };
    let created = chat.clone();
    match state.store.update_chats(move |chats| {
        chats.insert(0, chat);
        Ok(())
    }) {
        Ok(()) => Json(serde_json::json!(created)),
        Err(e) => Json(serde_json::json!({"ok": false, "error": e.to_string()})),
    }
}

/// Fetch one chat with all messages.
pub async fn get_chat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<serde_json::Value> {
    let chats = state.store.load_chats().unwrap_or_default();
    match chats.into_iter().find(|c| c.id == id) {
        Some(chat) => Json(serde_json::json!(chat)),
        None => Json(serde_json::json!({"ok": false, "error": "对话不存在"})),
    }
}
