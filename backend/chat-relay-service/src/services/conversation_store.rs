//! Conversation persistence
//!
//! [`ConversationStore`] is the read/write contract the relay needs from
//! durable storage. Counter increments are single atomic statements so
//! concurrent departures or flags on one conversation never lose updates.

use crate::error::{AppError, AppResult};
use crate::models::{Conversation, ConversationId, Message, NewMessage};
use async_trait::async_trait;
use sqlx::{Pool, Postgres};

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Exact-order lookup: `user1_name = a AND user2_name = b`.
    async fn find_by_pair(&self, a: &str, b: &str) -> AppResult<Option<Conversation>>;

    /// Create the conversation for `{a, b}` with zeroed counters. If a row for
    /// the unordered pair already exists, that row is returned instead.
    async fn create(&self, a: &str, b: &str) -> AppResult<Conversation>;

    async fn get(&self, id: ConversationId) -> AppResult<Option<Conversation>>;

    /// Add one to the departure counter. `ConversationNotFound` if `id` is unknown.
    async fn increment_departure(&self, id: ConversationId) -> AppResult<Conversation>;

    /// Add one to the flagged-message counter. `ConversationNotFound` if `id` is unknown.
    async fn increment_flagged(&self, id: ConversationId) -> AppResult<Conversation>;

    async fn append_message(&self, message: NewMessage<'_>) -> AppResult<Message>;

    /// Messages of one conversation, oldest first. Unknown ids yield an empty list.
    async fn list_messages(&self, id: ConversationId) -> AppResult<Vec<Message>>;
}

const CONVERSATION_COLUMNS: &str =
    "id, user1_name, user2_name, leave_count, badword_count, created_at";
const MESSAGE_COLUMNS: &str =
    "id, chat_room_id, sender_name, receiver_name, content, created_at";

const FOREIGN_KEY_VIOLATION: &str = "23503";

/// PostgreSQL-backed store (tables `chat_rooms` and `messages`).
#[derive(Clone)]
pub struct PgConversationStore {
    db: Pool<Postgres>,
}

impl PgConversationStore {
    pub fn new(db: Pool<Postgres>) -> Self {
        Self { db }
    }

    async fn increment(&self, column: &str, id: ConversationId) -> AppResult<Conversation> {
        let sql = format!(
            "UPDATE chat_rooms SET {column} = {column} + 1 WHERE id = $1 RETURNING {CONVERSATION_COLUMNS}"
        );
        sqlx::query_as::<_, Conversation>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::ConversationNotFound(id))
    }
}

#[async_trait]
impl ConversationStore for PgConversationStore {
    async fn find_by_pair(&self, a: &str, b: &str) -> AppResult<Option<Conversation>> {
        let sql = format!(
            "SELECT {CONVERSATION_COLUMNS} FROM chat_rooms WHERE user1_name = $1 AND user2_name = $2"
        );
        let row = sqlx::query_as::<_, Conversation>(&sql)
            .bind(a)
            .bind(b)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn create(&self, a: &str, b: &str) -> AppResult<Conversation> {
        // The no-op update makes RETURNING yield the surviving row when a
        // concurrent first contact from the other side won the insert.
        let sql = format!(
            r#"
            INSERT INTO chat_rooms (user1_name, user2_name)
            VALUES ($1, $2)
            ON CONFLICT ((LEAST(user1_name, user2_name)), (GREATEST(user1_name, user2_name)))
            DO UPDATE SET user1_name = chat_rooms.user1_name
            RETURNING {CONVERSATION_COLUMNS}
            "#
        );
        let conversation = sqlx::query_as::<_, Conversation>(&sql)
            .bind(a)
            .bind(b)
            .fetch_one(&self.db)
            .await?;
        Ok(conversation)
    }

    async fn get(&self, id: ConversationId) -> AppResult<Option<Conversation>> {
        let sql = format!("SELECT {CONVERSATION_COLUMNS} FROM chat_rooms WHERE id = $1");
        let row = sqlx::query_as::<_, Conversation>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn increment_departure(&self, id: ConversationId) -> AppResult<Conversation> {
        self.increment("leave_count", id).await
    }

    async fn increment_flagged(&self, id: ConversationId) -> AppResult<Conversation> {
        self.increment("badword_count", id).await
    }

    async fn append_message(&self, message: NewMessage<'_>) -> AppResult<Message> {
        let sql = format!(
            r#"
            INSERT INTO messages (chat_room_id, sender_name, receiver_name, content)
            VALUES ($1, $2, $3, $4)
            RETURNING {MESSAGE_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Message>(&sql)
            .bind(message.conversation_id)
            .bind(message.sender_name)
            .bind(message.receiver_name)
            .bind(message.content)
            .fetch_one(&self.db)
            .await
            .map_err(|e| {
                let missing_room = e
                    .as_database_error()
                    .and_then(|db_err| db_err.code())
                    .is_some_and(|code| code == FOREIGN_KEY_VIOLATION);
                if missing_room {
                    AppError::ConversationNotFound(message.conversation_id)
                } else {
                    AppError::from(e)
                }
            })
    }

    async fn list_messages(&self, id: ConversationId) -> AppResult<Vec<Message>> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE chat_room_id = $1 ORDER BY created_at ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, Message>(&sql)
            .bind(id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }
}
