//! File-per-document text store.
//!
//! Extracted text lives at `{data_dir}/contents/{doc_id}.txt`. A missing
//! file is an empty document, never an error.

use std::path::{Path, PathBuf};

use knowdesk_core::error::Result;
use knowdesk_core::traits::TextStore;

pub struct FileTextStore {
    dir: PathBuf,
}

impl FileTextStore {
    /// Store rooted at `{data_dir}/contents`.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let dir = data_dir.join("contents");
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, document_id: &str) -> PathBuf {
        self.dir.join(format!("{document_id}.txt"))
    }

    /// Persist extracted text for a document.
    pub fn save(&self, document_id: &str, text: &str) -> Result<()> {
        std::fs::write(self.path_for(document_id), text)?;
        tracing::debug!("💾 Stored {} chars for document {document_id}", text.chars().count());
        Ok(())
    }

    /// Remove a document's text, ignoring absence.
    pub fn remove(&self, document_id: &str) {
        std::fs::remove_file(self.path_for(document_id)).ok();
    }
}

impl TextStore for FileTextStore {
    fn text(&self, document_id: &str) -> String {
        std::fs::read_to_string(self.path_for(document_id)).unwrap_or_default()
    }
}
