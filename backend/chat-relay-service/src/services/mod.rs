pub mod conversation_store;
pub mod memory_store;
pub mod moderation;
pub mod room_resolver;

pub use conversation_store::{ConversationStore, PgConversationStore};
pub use memory_store::InMemoryConversationStore;
pub use moderation::{HttpModerationGateway, ModerationGateway, ModerationVerdict, PassThroughGateway};
pub use room_resolver::RoomResolver;
