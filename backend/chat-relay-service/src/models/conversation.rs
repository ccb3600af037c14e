use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ConversationId = i32;

/// Durable record for one unordered participant pair.
///
/// The pair is stored in first-contact order; `involves` and the store
/// lookups treat it as unordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    pub user1_name: String,
    pub user2_name: String,
    #[sqlx(rename = "leave_count")]
    #[serde(rename = "leaveCount")]
    pub departure_count: i32,
    #[sqlx(rename = "badword_count")]
    #[serde(rename = "badwordCount")]
    pub flagged_count: i32,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// True when `{a, b}` is this conversation's pair, in either order.
    pub fn involves(&self, a: &str, b: &str) -> bool {
        (self.user1_name == a && self.user2_name == b)
            || (self.user1_name == b && self.user2_name == a)
    }
}
