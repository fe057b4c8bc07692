//! Trait seams between the retrieval core and its collaborators.

use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;

use crate::error::Result;
use crate::types::{ChatMessage, ChatSession, GenerateParams, KnowledgeBase, Message, UpstreamEvent};

/// Boxed upstream token stream: deltas followed by exactly one terminal
/// `Done` or `Error`.
pub type UpstreamStream = Pin<Box<dyn Stream<Item = UpstreamEvent> + Send>>;

/// Access to previously extracted document text.
///
/// Missing content is absence, not an error: an unknown or empty document
/// yields an empty string.
pub trait TextStore: Send + Sync {
    /// Return the extracted text for a document, or empty.
    fn text(&self, document_id: &str) -> String;
}

/// An upstream chat-completion backend.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Start a streamed completion. The returned stream yields deltas in
    /// arrival order and terminates with `Done` or `Error`. `Err` here means
    /// the call could not be attempted at all (e.g. missing API key).
    async fn chat_stream(
        &self,
        messages: &[Message],
        params: &GenerateParams,
    ) -> Result<UpstreamStream>;
}

/// Typed persistence over the document and chat collections.
///
/// Implementations are full-collection load/save; callers needing atomic
/// read-modify-write go through the store's update helpers.
pub trait Repository: Send + Sync {
    fn load_knowledge_bases(&self) -> Result<Vec<KnowledgeBase>>;
    fn save_knowledge_bases(&self, bases: &[KnowledgeBase]) -> Result<()>;
    fn load_chats(&self) -> Result<Vec<ChatSession>>;
    fn save_chats(&self, chats: &[ChatSession]) -> Result<()>;

    /// Append a finalized message to a chat, serialized against other
    /// writers of the chat collection.
    fn append_message(&self, chat_id: &str, message: ChatMessage) -> Result<()>;
}
