//! LLM capability for the assistant delegate
//!
//! A deliberately small surface: one blocking completion call per request,
//! no tools, no streaming, and no retries - a failed call degrades to an
//! error reply at the delegate, it never aborts the webhook request.

pub mod client;
pub mod error;
pub mod openai;
pub mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use openai::OpenAiClient;
pub use types::{CompletionRequest, CompletionResponse, Message, Role, TokenUsage};
