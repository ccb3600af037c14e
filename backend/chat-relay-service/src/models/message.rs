use super::ConversationId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted chat line. `content` is the post-moderation text and
/// `created_at` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    #[sqlx(rename = "chat_room_id")]
    pub conversation_id: ConversationId,
    pub sender_name: String,
    pub receiver_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the relay when appending a message.
#[derive(Debug, Clone)]
pub struct NewMessage<'a> {
    pub conversation_id: ConversationId,
    pub sender_name: &'a str,
    pub receiver_name: &'a str,
    pub content: &'a str,
}
