//! Read-only chat queries
//!
//! Conversation lookup by participant pair and message history.
use crate::error::AppError;
use crate::models::ConversationId;
use crate::state::AppState;
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RoomQuery {
    pub user1: String,
    pub user2: String,
}

/// Resolve (creating on first contact) the conversation between two participants.
///
/// **Endpoint**: `GET /api/chat/room?user1=..&user2=..`
#[get("/api/chat/room")]
pub async fn get_room(
    state: web::Data<AppState>,
    query: web::Query<RoomQuery>,
) -> Result<HttpResponse, AppError> {
    let RoomQuery { user1, user2 } = query.into_inner();
    if user1.trim().is_empty() || user2.trim().is_empty() {
        return Err(AppError::BadRequest(
            "user1 and user2 must be non-empty".to_string(),
        ));
    }

    let conversation = state
        .resolver
        .get_or_create_conversation(&user1, &user2)
        .await?;
    Ok(HttpResponse::Ok().json(conversation))
}

/// Messages of a conversation, oldest first. Unknown ids give an empty list.
///
/// **Endpoint**: `GET /api/chat/history/{room_id}`
#[get("/api/chat/history/{room_id}")]
pub async fn get_history(
    state: web::Data<AppState>,
    room_id: web::Path<ConversationId>,
) -> Result<HttpResponse, AppError> {
    let messages = state.store.list_messages(room_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(messages))
}
