use super::conversation_store::ConversationStore;
use crate::error::AppResult;
use crate::models::Conversation;
use std::sync::Arc;

/// Maps an unordered participant pair to its single conversation.
#[derive(Clone)]
pub struct RoomResolver {
    store: Arc<dyn ConversationStore>,
}

impl RoomResolver {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    /// Look up `(a, b)`, then `(b, a)`, and create the conversation with
    /// zeroed counters on first contact.
    pub async fn get_or_create_conversation(&self, a: &str, b: &str) -> AppResult<Conversation> {
        if let Some(conversation) = self.store.find_by_pair(a, b).await? {
            return Ok(conversation);
        }
        if let Some(conversation) = self.store.find_by_pair(b, a).await? {
            return Ok(conversation);
        }

        let conversation = self.store.create(a, b).await?;
        tracing::info!(
            conversation_id = conversation.id,
            user1 = %conversation.user1_name,
            user2 = %conversation.user2_name,
            "conversation created"
        );
        Ok(conversation)
    }
}
