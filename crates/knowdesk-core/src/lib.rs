//! # KnowDesk Core
//!
//! Shared foundation for the KnowDesk workspace: configuration, the error
//! type, the data model (knowledge bases, documents, chats, stream events),
//! and the trait seams the other crates plug into.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{KnowDeskError, Result};
