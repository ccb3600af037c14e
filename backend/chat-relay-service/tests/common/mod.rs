#![allow(dead_code)]

use async_trait::async_trait;
use chat_relay_service::services::{
    HttpModerationGateway, InMemoryConversationStore, ModerationGateway, ModerationVerdict,
};
use chat_relay_service::websocket::{Envelope, MessageRouter, SessionHandle, SessionRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

/// Flags every message and substitutes `rewrite` when given.
pub struct FlaggingGateway {
    pub rewrite: Option<&'static str>,
}

#[async_trait]
impl ModerationGateway for FlaggingGateway {
    async fn evaluate(&self, _text: &str) -> ModerationVerdict {
        ModerationVerdict {
            flagged: true,
            rewritten_text: self.rewrite.map(str::to_string),
        }
    }
}

/// Never flags, but always rewrites.
pub struct RewritingGateway(pub &'static str);

#[async_trait]
impl ModerationGateway for RewritingGateway {
    async fn evaluate(&self, _text: &str) -> ModerationVerdict {
        ModerationVerdict {
            flagged: false,
            rewritten_text: Some(self.0.to_string()),
        }
    }
}

/// HTTP gateway aimed at a port nothing listens on.
pub fn unreachable_gateway() -> HttpModerationGateway {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    HttpModerationGateway::new(
        format!("http://127.0.0.1:{port}/analyze"),
        Duration::from_millis(500),
    )
    .unwrap()
}

pub struct Harness {
    pub router: MessageRouter,
    pub store: InMemoryConversationStore,
    pub registry: SessionRegistry,
}

pub fn harness(gateway: Arc<dyn ModerationGateway>) -> Harness {
    let store = InMemoryConversationStore::new();
    let registry = SessionRegistry::new();
    let router = MessageRouter::new(Arc::new(store.clone()), gateway, registry.clone());
    Harness {
        router,
        store,
        registry,
    }
}

/// A fake client connection: the handle the router writes to plus the
/// receiving end the session actor would drain.
pub struct TestClient {
    pub handle: SessionHandle,
    rx: UnboundedReceiver<String>,
}

impl TestClient {
    pub fn connect() -> Self {
        let (handle, rx) = SessionHandle::new();
        Self { handle, rx }
    }

    /// Every frame queued so far, decoded.
    pub fn received(&mut self) -> Vec<Envelope> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.rx.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }
}

pub fn enter(sender: &str, receiver: &str) -> String {
    serde_json::json!({"type": "ENTER", "sender": sender, "receiver": receiver}).to_string()
}

pub fn talk(sender: &str, receiver: &str, content: &str) -> String {
    serde_json::json!({
        "type": "TALK",
        "roomId": "ignored",
        "sender": sender,
        "receiver": receiver,
        "content": content,
    })
    .to_string()
}

pub fn leave(sender: &str, receiver: &str) -> String {
    serde_json::json!({"type": "LEAVE", "sender": sender, "receiver": receiver}).to_string()
}
