/// Chat endpoint
///
/// Sends the caller's message, together with the stored history when
/// continuing a chat, to the coaching model and persists both turns.
///
/// # Access
///
/// - Maintenance mode blocks non-admins (503)
/// - While chat is flagged "coming soon", only admins may use it (403)
/// - Continuing a chat requires owning it (404 otherwise)
///
/// The message is validated only after the gate has allowed the caller.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{success, Envelope},
};
use axum::{extract::State, Extension, Json};
use fitcoach_shared::auth::gate::{evaluate_all, Denial, Policy};
use fitcoach_shared::auth::projector::project;
use fitcoach_shared::models::chat::{title_from_message, ChatMessage};
use fitcoach_shared::models::user::Identity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Chat request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// User message
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub message: String,

    /// Existing chat to continue; omitted to start a new one
    pub chat_id: Option<Uuid>,
}

/// Chat response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub chat_id: Uuid,
    pub reply: String,
}

/// Send a message
///
/// # Endpoint
///
/// ```text
/// POST /api/chat
/// Authorization: Bearer <access_token>
/// Content-Type: application/json
///
/// { "message": "How many sets per week for legs?", "chatId": null }
/// ```
///
/// # Response
///
/// ```json
/// { "success": true, "chatId": "...", "reply": "...", "error": null }
/// ```
pub async fn send_message(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<Envelope<ChatResponse>>> {
    let user = project(state.store.as_ref(), &identity).await?;

    let mut policies = vec![Policy::MaintenanceGate];
    if state.config.site.chat_coming_soon {
        policies.push(Policy::AdminOnly);
    }
    evaluate_all(&user, &policies, &state.gate_context()).into_result()?;

    request.validate()?;
    if request.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message must not be blank".to_string()));
    }

    let existing = match request.chat_id {
        Some(chat_id) => Some(
            state
                .store
                .find_chat(chat_id, user.id)
                .await?
                .ok_or(Denial::NotOwner)?,
        ),
        None => None,
    };

    let user_message = ChatMessage::user(request.message.trim());
    let mut conversation = existing
        .as_ref()
        .map(|chat| chat.messages.clone())
        .unwrap_or_default();
    conversation.push(user_message.clone());

    let reply = state.llm.send(&conversation, Some(user.id)).await?;
    let turn = vec![user_message, ChatMessage::assistant(reply.clone())];

    let chat_id = match existing {
        Some(chat) => {
            state
                .store
                .append_messages(chat.id, user.id, turn)
                .await?
                .ok_or(Denial::NotOwner)?
                .id
        }
        None => {
            state
                .store
                .create_chat(user.id, title_from_message(&request.message), turn)
                .await?
                .id
        }
    };

    tracing::info!(user_id = %user.id, %chat_id, "Chat turn completed");

    Ok(success(ChatResponse { chat_id, reply }))
}
