use crate::metrics;
use crate::models::ConversationId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    RwLock,
};
use uuid::Uuid;

pub mod message_types;
pub mod router;
pub mod session;

pub use message_types::{Envelope, EnvelopeKind, InboundEnvelope};
pub use router::{MessageRouter, RouterError};
pub use session::ChatSession;

/// Identity of one WebSocket connection, assigned when the socket is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Outbound side of a connection. Frames pushed here are written to the
/// socket by the owning session actor.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    connection_id: ConnectionId,
    sender: UnboundedSender<String>,
}

impl SessionHandle {
    /// New handle plus the receiver the session actor drains.
    pub fn new() -> (Self, UnboundedReceiver<String>) {
        let (sender, receiver) = unbounded_channel();
        let handle = Self {
            connection_id: ConnectionId::new(),
            sender,
        };
        (handle, receiver)
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    /// Queue a frame. Returns false when the connection is already gone;
    /// the frame is dropped in that case.
    pub fn send(&self, frame: String) -> bool {
        self.sender.send(frame).is_ok()
    }
}

/// A registered participant: where to reach them and which conversation
/// they entered.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub session: SessionHandle,
    pub conversation_id: ConversationId,
}

#[derive(Default)]
struct Indices {
    by_name: HashMap<String, SessionEntry>,
    by_connection: HashMap<ConnectionId, String>,
}

impl Indices {
    /// Drop `name` only while it is still bound to `connection_id`.
    fn release_name(&mut self, name: &str, connection_id: ConnectionId) -> Option<SessionEntry> {
        let bound_here = self
            .by_name
            .get(name)
            .is_some_and(|entry| entry.session.connection_id == connection_id);
        if bound_here {
            self.by_name.remove(name)
        } else {
            None
        }
    }
}

/// Participant name -> live session, plus connection -> name.
///
/// Both maps sit behind one lock so they never disagree. At most one session
/// per name: registering again under the same name replaces the earlier
/// connection, whose later close then finds nothing to clean up.
#[derive(Default, Clone)]
pub struct SessionRegistry {
    inner: Arc<RwLock<Indices>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `session` in `conversation_id`. Returns the entry it replaced.
    pub async fn register(
        &self,
        name: &str,
        session: SessionHandle,
        conversation_id: ConversationId,
    ) -> Option<SessionEntry> {
        let connection_id = session.connection_id;
        let mut guard = self.inner.write().await;

        // Same connection re-entering under another name gives up the old one.
        if let Some(old_name) = guard.by_connection.get(&connection_id).cloned() {
            if old_name != name {
                guard.release_name(&old_name, connection_id);
            }
        }

        let previous = guard.by_name.insert(
            name.to_string(),
            SessionEntry {
                session,
                conversation_id,
            },
        );
        if let Some(prev) = &previous {
            let prev_id = prev.session.connection_id;
            if prev_id != connection_id {
                guard.by_connection.remove(&prev_id);
                tracing::info!(
                    participant = %name,
                    superseded = %prev_id,
                    connection_id = %connection_id,
                    "session superseded"
                );
            }
        }
        guard.by_connection.insert(connection_id, name.to_string());

        metrics::set_active_sessions(guard.by_name.len());
        previous
    }

    pub async fn lookup(&self, name: &str) -> Option<SessionHandle> {
        let guard = self.inner.read().await;
        guard.by_name.get(name).map(|entry| entry.session.clone())
    }

    pub async fn bound_conversation(&self, name: &str) -> Option<ConversationId> {
        let guard = self.inner.read().await;
        guard.by_name.get(name).map(|entry| entry.conversation_id)
    }

    pub async fn find_name_by_connection(&self, connection_id: ConnectionId) -> Option<String> {
        let guard = self.inner.read().await;
        guard.by_connection.get(&connection_id).cloned()
    }

    pub async fn remove(&self, name: &str) -> Option<SessionEntry> {
        let mut guard = self.inner.write().await;
        let entry = guard.by_name.remove(name)?;
        guard.by_connection.remove(&entry.session.connection_id);
        metrics::set_active_sessions(guard.by_name.len());
        Some(entry)
    }

    /// Reverse lookup and removal in one step, for the close path.
    pub async fn remove_connection(
        &self,
        connection_id: ConnectionId,
    ) -> Option<(String, ConversationId)> {
        let mut guard = self.inner.write().await;
        let name = guard.by_connection.remove(&connection_id)?;
        let entry = guard.release_name(&name, connection_id)?;
        metrics::set_active_sessions(guard.by_name.len());
        Some((name, entry.conversation_id))
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_name.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
