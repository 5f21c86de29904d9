//! ChamaBot - conversational webhook backend for a community savings group
//!
//! Members message a WhatsApp number; the webhook classifies each inbound
//! text into exactly one flow - registration, contribution logging, balance
//! inquiry, or an LLM-backed assistant for admins - and maintains an
//! insert-only ledger of per-member, per-period, per-category payments
//! against fixed expected amounts.
//!
//! # Core Concepts
//!
//! - **Stateless requests**: every webhook call is classified on its own;
//!   no conversation state is kept between messages
//! - **Additive side effects**: flows perform at most one insert and never
//!   undo earlier ones
//! - **Injected capabilities**: the ledger store, LLM client and outbound
//!   messenger are constructor-injected traits, so tests substitute fakes
//!
//! # Modules
//!
//! - [`router`] - inbound message classification and dispatch
//! - [`registration`] - the unknown-phone to member transition
//! - [`contribution`] - amount/category parsing and ledger inserts
//! - [`balance`] - per-period aggregation against expected targets
//! - [`assistant`] - LLM delegate with ledger-derived context
//! - [`reminder`] - batch sweep messaging members with unpaid categories
//! - [`llm`] - LLM client trait and OpenAI-compatible implementation
//! - [`outbound`] - outbound message capability (Twilio WhatsApp)
//! - [`server`] - axum HTTP surface
//! - [`config`] - configuration types and loading

pub mod assistant;
pub mod balance;
pub mod cli;
pub mod config;
pub mod contribution;
pub mod domain;
pub mod error;
pub mod llm;
pub mod outbound;
pub mod prompts;
pub mod registration;
pub mod reminder;
pub mod router;
pub mod server;

// Re-export commonly used types
pub use assistant::AssistantDelegate;
pub use config::{Config, ContributionsConfig, LlmConfig, MessagingConfig, RoutePrecedence};
pub use error::BotError;
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, OpenAiClient};
pub use outbound::{Messenger, SendError, TwilioMessenger};
pub use reminder::{ReminderJob, ReminderStats};
pub use router::{InboundMessage, Intent, IntentRouter};
pub use server::{AppState, build_router};
