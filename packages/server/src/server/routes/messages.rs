use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::domains::chat::InboundMessage;
use crate::server::app::AppState;

#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub reply: Option<String>,
}

/// Transport webhook: one chat message in, at most one reply out.
///
/// Action failures are replies, not HTTP errors.
pub async fn message_handler(
    Extension(state): Extension<AppState>,
    Json(message): Json<InboundMessage>,
) -> Json<MessageResponse> {
    let reply = state.dispatcher.handle(&message).await;
    Json(MessageResponse { reply })
}
