//! HTTP surface
//!
//! Two POST endpoints and a liveness probe. The webhook always answers with
//! a `{ "reply": ... }` body; only a missing caller identity (400) or a
//! ledger store fault (500) changes the status code. An assistant fault is
//! a chat failure, not an HTTP failure - those requests still return 200.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::domain::current_period;
use crate::error::BotError;
use crate::reminder::ReminderJob;
use crate::router::{InboundMessage, IntentRouter};

const MISSING_PHONE_REPLY: &str = "⚠️ Missing phone number.";

/// Shared request state; capabilities are injected at construction
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<IntentRouter>,
    pub reminders: Arc<ReminderJob>,
}

/// Inbound webhook body
///
/// The channel sometimes sends the caller under `phone`, sometimes `from`;
/// `phone` wins when both are present.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookRequest {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
struct WebhookReply {
    reply: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz_handler))
        .route("/webhook", post(webhook_handler))
        .route("/send-reminders", post(send_reminders_handler))
        .with_state(state)
}

async fn healthz_handler() -> &'static str {
    "ok"
}

async fn webhook_handler(State(state): State<AppState>, Json(body): Json<WebhookRequest>) -> Response {
    // A blank phone field falls through to the channel's `from`
    let phone = body.phone.filter(|p| !p.trim().is_empty()).or(body.from);
    let inbound = InboundMessage::new(phone, body.name, body.message);

    match state.router.handle(&inbound).await {
        Ok(reply) => (StatusCode::OK, Json(WebhookReply { reply })).into_response(),
        Err(BotError::MissingIdentity) => (
            StatusCode::BAD_REQUEST,
            Json(WebhookReply {
                reply: MISSING_PHONE_REPLY.to_string(),
            }),
        )
            .into_response(),
        Err(BotError::Store(e)) => {
            error!(error = %e, "webhook failed on ledger store fault");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "ledger store failure" })),
            )
                .into_response()
        }
    }
}

async fn send_reminders_handler(State(state): State<AppState>) -> Response {
    match state.reminders.run(&current_period()).await {
        Ok(stats) => {
            info!(?stats, "reminder endpoint completed");
            (
                StatusCode::OK,
                Json(serde_json::json!({ "status": "success", "message": "Reminders sent." })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "reminder sweep failed on ledger store fault");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "ledger store failure" })),
            )
                .into_response()
        }
    }
}
