//! Anthropic Messages API client for the support assistant.
//!
//! Only plain-text, non-streaming chat is used: the storefront forwards a
//! short conversation and returns the model's text reply.

mod client;
mod error;
mod types;

pub use client::ClaudeClient;
pub use error::ClaudeError;
pub use types::{ChatRequest, ChatResponse, ContentBlock, Message, Role, StopReason, Usage};
