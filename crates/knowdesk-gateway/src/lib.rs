//! # KnowDesk Gateway
//!
//! HTTP API for knowledge bases and chats, with the chat turn delivered as
//! a server-sent event stream.

pub mod chat;
pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
