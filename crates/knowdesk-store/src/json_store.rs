//! JSON-file repository — lightweight persistence.
//! Collections saved as pretty JSON files — human-readable, git-friendly.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use knowdesk_core::error::{KnowDeskError, Result};
use knowdesk_core::traits::Repository;
use knowdesk_core::types::{ChatMessage, ChatSession, KnowledgeBase};

/// Directory-backed store for knowledge bases and chats.
pub struct JsonStore {
    dir: PathBuf,
    // one write lock per entity file
    kb_lock: Mutex<()>,
    chat_lock: Mutex<()>,
}

impl JsonStore {
    /// Open a store at the given directory, seeding the demo data set on
    /// first run.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        std::fs::create_dir_all(dir.join("contents"))?;
        let store = Self {
            dir: dir.to_path_buf(),
            kb_lock: Mutex::new(()),
            chat_lock: Mutex::new(()),
        };
        if !store.kb_path().exists() {
            store.write_collection(&store.kb_path(), &crate::seed::knowledge_bases())?;
            tracing::info!("📚 Seeded default knowledge bases");
        }
        if !store.chats_path().exists() {
            store.write_collection(&store.chats_path(), &crate::seed::chats())?;
            tracing::info!("💬 Seeded default chats");
        }
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn kb_path(&self) -> PathBuf {
        self.dir.join("knowledge_bases.json")
    }

    fn chats_path(&self) -> PathBuf {
        self.dir.join("chats.json")
    }

    fn read_collection<T: serde::de::DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| {
            KnowDeskError::Storage(format!("Failed to parse {}: {e}", path.display()))
        })
    }

    fn write_collection<T: serde::Serialize>(&self, path: &Path, items: &[T]) -> Result<()> {
        let json = serde_json::to_string_pretty(items)?;
        std::fs::write(path, &json)?;
        tracing::debug!("💾 Saved {} item(s) to {}", items.len(), path.display());
        Ok(())
    }

    /// Read-modify-write over the knowledge-base collection, serialized
    /// against other writers.
    pub fn update_knowledge_bases<F, R>(&self, mutate: F) -> Result<R>
    where
        F: FnOnce(&mut Vec<KnowledgeBase>) -> Result<R>,
    {
        let _guard = self
            .kb_lock
            .lock()
            .map_err(|e| KnowDeskError::Storage(format!("kb lock poisoned: {e}")))?;
        let mut bases = self.read_collection(&self.kb_path())?;
        let result = mutate(&mut bases)?;
        self.write_collection(&self.kb_path(), &bases)?;
        Ok(result)
    }

    /// Read-modify-write over the chat collection, serialized against
    /// other writers.
    pub fn update_chats<F, R>(&self, mutate: F) -> Result<R>
    where
        F: FnOnce(&mut Vec<ChatSession>) -> Result<R>,
    {
        let _guard = self
            .chat_lock
            .lock()
            .map_err(|e| KnowDeskError::Storage(format!("chat lock poisoned: {e}")))?;
        let mut chats = self.read_collection(&self.chats_path())?;
        let result = mutate(&mut chats)?;
        self.write_collection(&self.chats_path(), &chats)?;
        Ok(result)
    }
}

impl Repository for JsonStore {
    fn load_knowledge_bases(&self) -> Result<Vec<KnowledgeBase>> {
        self.read_collection(&self.kb_path())
    }

    fn save_knowledge_bases(&self, bases: &[KnowledgeBase]) -> Result<()> {
        let _guard = self
            .kb_lock
            .lock()
            .map_err(|e| KnowDeskError::Storage(format!("kb lock poisoned: {e}")))?;
        self.write_collection(&self.kb_path(), bases)
    }

    fn load_chats(&self) -> Result<Vec<ChatSession>> {
        self.read_collection(&self.chats_path())
    }

    fn save_chats(&self, chats: &[ChatSession]) -> Result<()> {
        let _guard = self
            .chat_lock
            .lock()
            .map_err(|e| KnowDeskError::Storage(format!("chat lock poisoned: {e}")))?;
        self.write_collection(&self.chats_path(), chats)
    }

    fn append_message(&self, chat_id: &str, message: ChatMessage) -> Result<()> {
        self.update_chats(|chats| {
            let chat = chats
                .iter_mut()
                .find(|c| c.id == chat_id)
                .ok_or_else(|| KnowDeskError::NotFound(format!("chat {chat_id}")))?;
            chat.messages.push(message);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knowdesk_core::types::Role;

    fn temp_store(tag: &str) -> (JsonStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("knowdesk-store-test-{tag}"));
        std::fs::remove_dir_all(&dir).ok();
        let store = JsonStore::open(&dir).unwrap();
        (store, dir)
    }

    #[test]
    fn test_open_seeds_defaults() {
        let (store, dir) = temp_store("seed");
        let bases = store.load_knowledge_bases().unwrap();
        assert_eq!(bases.len(), 4);
        assert!(bases.iter().any(|k| k.name == "员工手册"));

        let chats = store.load_chats().unwrap();
        assert!(!chats.is_empty());
        assert_eq!(chats[0].messages.len(), 3);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let (store, dir) = temp_store("roundtrip");
        let mut bases = store.load_knowledge_bases().unwrap();
        bases[0].description = "更新后的描述".into();
        store.save_knowledge_bases(&bases).unwrap();

        let reloaded = store.load_knowledge_bases().unwrap();
        assert_eq!(reloaded[0].description, "更新后的描述");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_append_message() {
        let (store, dir) = temp_store("append");
        let chat_id = store.load_chats().unwrap()[0].id.clone();
        store
            .append_message(&chat_id, ChatMessage::user("新消息"))
            .unwrap();

        let chats = store.load_chats().unwrap();
        let chat = chats.iter().find(|c| c.id == chat_id).unwrap();
        let last = chat.messages.last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(last.content, "新消息");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_append_to_unknown_chat_errors() {
        let (store, dir) = temp_store("missing-chat");
        let err = store.append_message("c_missing", ChatMessage::user("x"));
        assert!(err.is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_update_helper_persists() {
        let (store, dir) = temp_store("update");
        store
            .update_chats(|chats| {
                chats[0].pinned = false;
                chats[0].title = "改名".into();
                Ok(())
            })
            .unwrap();
        let chats = store.load_chats().unwrap();
        assert_eq!(chats[0].title, "改名");
        std::fs::remove_dir_all(&dir).ok();
    }
}
