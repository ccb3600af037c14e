use super::conversation_store::ConversationStore;
use crate::error::{AppError, AppResult};
use crate::models::{Conversation, ConversationId, Message, NewMessage};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    conversations: BTreeMap<ConversationId, Conversation>,
    messages: Vec<Message>,
    next_conversation_id: ConversationId,
    next_message_id: i64,
}

/// Process-local [`ConversationStore`]. Ids start at 1 like the SQL sequences.
///
/// `create` checks both orderings under the write lock, so the unordered-pair
/// uniqueness holds here as well.
#[derive(Clone, Default)]
pub struct InMemoryConversationStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of conversation rows (for tests and debugging)
    pub async fn conversation_count(&self) -> usize {
        self.inner.read().await.conversations.len()
    }

    async fn update<F>(&self, id: ConversationId, apply: F) -> AppResult<Conversation>
    where
        F: FnOnce(&mut Conversation) + Send,
    {
        let mut guard = self.inner.write().await;
        let conversation = guard
            .conversations
            .get_mut(&id)
            .ok_or(AppError::ConversationNotFound(id))?;
        apply(conversation);
        Ok(conversation.clone())
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn find_by_pair(&self, a: &str, b: &str) -> AppResult<Option<Conversation>> {
        let guard = self.inner.read().await;
        Ok(guard
            .conversations
            .values()
            .find(|c| c.user1_name == a && c.user2_name == b)
            .cloned())
    }

    async fn create(&self, a: &str, b: &str) -> AppResult<Conversation> {
        let mut guard = self.inner.write().await;
        if let Some(existing) = guard.conversations.values().find(|c| c.involves(a, b)) {
            return Ok(existing.clone());
        }

        guard.next_conversation_id += 1;
        let conversation = Conversation {
            id: guard.next_conversation_id,
            user1_name: a.to_string(),
            user2_name: b.to_string(),
            departure_count: 0,
            flagged_count: 0,
            created_at: Utc::now(),
        };
        guard
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(conversation)
    }

    async fn get(&self, id: ConversationId) -> AppResult<Option<Conversation>> {
        Ok(self.inner.read().await.conversations.get(&id).cloned())
    }

    async fn increment_departure(&self, id: ConversationId) -> AppResult<Conversation> {
        self.update(id, |c| c.departure_count += 1).await
    }

    async fn increment_flagged(&self, id: ConversationId) -> AppResult<Conversation> {
        self.update(id, |c| c.flagged_count += 1).await
    }

    async fn append_message(&self, message: NewMessage<'_>) -> AppResult<Message> {
        let mut guard = self.inner.write().await;
        if !guard.conversations.contains_key(&message.conversation_id) {
            return Err(AppError::ConversationNotFound(message.conversation_id));
        }

        guard.next_message_id += 1;
        let stored = Message {
            id: guard.next_message_id,
            conversation_id: message.conversation_id,
            sender_name: message.sender_name.to_string(),
            receiver_name: message.receiver_name.to_string(),
            content: message.content.to_string(),
            created_at: Utc::now(),
        };
        guard.messages.push(stored.clone());
        Ok(stored)
    }

    async fn list_messages(&self, id: ConversationId) -> AppResult<Vec<Message>> {
        let guard = self.inner.read().await;
        let mut messages: Vec<Message> = guard
            .messages
            .iter()
            .filter(|m| m.conversation_id == id)
            .cloned()
            .collect();
        messages.sort_by(|x, y| x.created_at.cmp(&y.created_at).then(x.id.cmp(&y.id)));
        Ok(messages)
    }
}
