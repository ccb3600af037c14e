use crate::{
    config::Config,
    services::{ConversationStore, ModerationGateway, RoomResolver},
    websocket::{MessageRouter, SessionRegistry},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn ConversationStore>,
    pub resolver: RoomResolver,
    /// Shared by every WebSocket session
    pub router: MessageRouter,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn ConversationStore>,
        gateway: Arc<dyn ModerationGateway>,
    ) -> Self {
        let router = MessageRouter::new(store.clone(), gateway, SessionRegistry::new());
        Self {
            config,
            resolver: RoomResolver::new(store.clone()),
            store,
            router,
        }
    }
}
