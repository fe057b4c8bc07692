//! # KnowDesk Store
//!
//! Persistence collaborators for the retrieval core: a JSON-file
//! [`JsonStore`] implementing the typed `Repository` seam, and a
//! file-per-document [`FileTextStore`] implementing `TextStore`.
//!
//! Collections are human-readable JSON, rewritten whole on mutation.
//! Writers of the same collection are serialized behind one lock per
//! entity file.

pub mod content;
pub mod json_store;
mod seed;

pub use content::FileTextStore;
pub use json_store::JsonStore;
