/// Conversation history endpoints
///
/// Chats are owner-scoped. A chat that belongs to someone else is reported
/// exactly like a missing one (404 with the same body).
///
/// # Endpoints
///
/// - `GET /api/conversations` - List caller's chats
/// - `GET /api/conversations/:id` - Get one chat with messages
/// - `DELETE /api/conversations/:id` - Delete a chat

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{success, Envelope},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use fitcoach_shared::auth::gate::{evaluate, Denial, Policy};
use fitcoach_shared::auth::projector::project;
use fitcoach_shared::models::chat::{Chat, ChatSummary};
use fitcoach_shared::models::user::{ApplicationUser, Identity};
use serde::Serialize;
use uuid::Uuid;

/// List response
#[derive(Debug, Serialize)]
pub struct ConversationsResponse {
    pub conversations: Vec<ChatSummary>,
}

/// Single conversation response
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub conversation: Chat,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// List caller's conversations, most recent first
pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Json<Envelope<ConversationsResponse>>> {
    let user = project(state.store.as_ref(), &identity).await?;
    let conversations = state.store.list_chats(user.id).await?;

    Ok(success(ConversationsResponse { conversations }))
}

/// Get one conversation
pub async fn get_conversation(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<ConversationResponse>>> {
    let user = project(state.store.as_ref(), &identity).await?;
    let conversation = owned_chat(&state, &user, &id).await?;

    Ok(success(ConversationResponse { conversation }))
}

/// Delete a conversation
///
/// # Endpoint
///
/// ```text
/// DELETE /api/conversations/:id
/// Authorization: Bearer <access_token>
/// ```
///
/// # Response
///
/// ```json
/// { "success": true, "message": "Conversation deleted", "error": null }
/// ```
///
/// Not found and not owned both answer `404 {"error": "Resource not found"}`.
pub async fn delete_conversation(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<DeleteResponse>>> {
    let user = project(state.store.as_ref(), &identity).await?;
    let chat = owned_chat(&state, &user, &id).await?;

    if !state.store.delete_chat(chat.id, user.id).await? {
        return Err(Denial::NotOwner.into());
    }

    tracing::info!(user_id = %user.id, chat_id = %chat.id, "Conversation deleted");

    Ok(success(DeleteResponse {
        message: "Conversation deleted".to_string(),
    }))
}

/// Loads a chat the caller owns
///
/// Malformed ids, absent chats, and foreign chats all collapse into the
/// same not-owner denial.
async fn owned_chat(state: &AppState, user: &ApplicationUser, id: &str) -> ApiResult<Chat> {
    let id = Uuid::parse_str(id).map_err(|_| ApiError::from(Denial::NotOwner))?;

    let chat = state
        .store
        .find_chat(id, user.id)
        .await?
        .ok_or(Denial::NotOwner)?;

    evaluate(user, &Policy::Ownership { owner_id: chat.user_id }, &state.gate_context())
        .into_result()?;

    Ok(chat)
}
