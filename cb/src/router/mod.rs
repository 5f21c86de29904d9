//! Intent router
//!
//! Classifies each inbound message into exactly one flow and dispatches it.
//! Precedence lives in an ordered list of (intent, predicate) pairs over a
//! pre-fetched [`RouteContext`], so the tie-breaks between lexically
//! overlapping keyword sets are explicit and testable rather than implicit
//! in control flow.

pub mod triggers;

use std::sync::Arc;
use tracing::debug;

use ledgerstore::LedgerStore;

use crate::assistant::AssistantDelegate;
use crate::balance;
use crate::config::{ContributionsConfig, RoutePrecedence};
use crate::contribution;
use crate::error::BotError;
use crate::registration;

/// An inbound webhook message after field resolution
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Caller phone number; `None` fails the request with `MissingIdentity`
    pub phone: Option<String>,

    /// Explicit name field, when the channel supplies one
    pub name: Option<String>,

    /// Free-form message text
    pub message: String,
}

impl InboundMessage {
    /// Normalize raw webhook fields: blank strings become `None`
    pub fn new(phone: Option<String>, name: Option<String>, message: Option<String>) -> Self {
        let clean = |s: Option<String>| s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            phone: clean(phone),
            name: clean(name),
            message: message.map(|m| m.trim().to_string()).unwrap_or_default(),
        }
    }
}

/// The classified purpose of an inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Register the caller, or acknowledge an already-registered one
    Registration,
    /// Parse and record a payment
    Contribution,
    /// Report the current period's balance
    Balance,
    /// Free-form question for the LLM assistant
    Assistant,
}

/// Everything a routing predicate may look at, fetched once per request
#[derive(Debug, Clone)]
pub struct RouteContext {
    pub message: String,
    pub message_lower: String,
    pub supplied_name: Option<String>,
    pub registered: bool,
    pub admin: bool,
}

type Predicate = fn(&RouteContext) -> bool;

fn name_only(ctx: &RouteContext) -> bool {
    ctx.supplied_name.is_some() && ctx.message.is_empty()
}

fn contribution_trigger(ctx: &RouteContext) -> bool {
    triggers::is_contribution(&ctx.message_lower)
}

fn balance_trigger(ctx: &RouteContext) -> bool {
    triggers::is_balance(&ctx.message_lower)
}

fn admin_caller(ctx: &RouteContext) -> bool {
    ctx.admin
}

fn unregistered(ctx: &RouteContext) -> bool {
    !ctx.registered
}

fn always(_ctx: &RouteContext) -> bool {
    true
}

/// The ordered route table for a precedence configuration
///
/// First match wins. The final catch-all is the registration/acknowledgment
/// flow, so classification always lands somewhere.
pub fn routes(precedence: RoutePrecedence) -> Vec<(Intent, Predicate)> {
    match precedence {
        RoutePrecedence::KeywordFirst => vec![
            (Intent::Registration, name_only),
            (Intent::Contribution, contribution_trigger),
            (Intent::Balance, balance_trigger),
            (Intent::Assistant, admin_caller),
            (Intent::Registration, always),
        ],
        RoutePrecedence::RegistrationFirst => vec![
            (Intent::Registration, name_only),
            (Intent::Registration, unregistered),
            (Intent::Contribution, contribution_trigger),
            (Intent::Balance, balance_trigger),
            (Intent::Assistant, admin_caller),
            (Intent::Registration, always),
        ],
    }
}

/// Classify a message by walking the route table in order
pub fn classify(ctx: &RouteContext, precedence: RoutePrecedence) -> Intent {
    for (intent, predicate) in routes(precedence) {
        if predicate(ctx) {
            return intent;
        }
    }
    // The table ends in a catch-all
    Intent::Registration
}

/// Classifies inbound messages and runs the matching flow
pub struct IntentRouter {
    ledger: Arc<dyn LedgerStore>,
    assistant: AssistantDelegate,
    contributions: ContributionsConfig,
    precedence: RoutePrecedence,
}

impl IntentRouter {
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        assistant: AssistantDelegate,
        contributions: ContributionsConfig,
        precedence: RoutePrecedence,
    ) -> Self {
        Self {
            ledger,
            assistant,
            contributions,
            precedence,
        }
    }

    /// Route one inbound message and produce the reply
    ///
    /// Side effects are strictly additive: whichever flow fires performs at
    /// most one insert and nothing is ever undone.
    pub async fn handle(&self, inbound: &InboundMessage) -> Result<String, BotError> {
        let phone = inbound.phone.as_deref().ok_or(BotError::MissingIdentity)?;

        let registered = self.ledger.find_member_by_phone(phone).await?.is_some();
        let admin = self.ledger.is_admin(phone).await?;

        let ctx = RouteContext {
            message: inbound.message.clone(),
            message_lower: inbound.message.to_lowercase(),
            supplied_name: inbound.name.clone(),
            registered,
            admin,
        };

        let intent = classify(&ctx, self.precedence);
        debug!(?intent, %registered, %admin, "message classified");

        let reply = match intent {
            Intent::Contribution => {
                contribution::handle(self.ledger.as_ref(), &self.contributions, phone, &ctx.message).await?
            }
            Intent::Balance => balance::handle(self.ledger.as_ref(), &self.contributions, phone).await?,
            Intent::Assistant => self.assistant.handle(phone, &ctx.message).await?,
            Intent::Registration => {
                registration::handle(self.ledger.as_ref(), phone, ctx.supplied_name.as_deref(), &ctx.message)
                    .await?
            }
        };

        Ok(reply)
    }
}
