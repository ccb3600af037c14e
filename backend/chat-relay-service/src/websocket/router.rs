//! ENTER / TALK / LEAVE state machine
//!
//! A connection starts out CONNECTED, becomes IN_ROOM once its ENTER is
//! handled, and is CLOSED after LEAVE or when the socket goes away. Every
//! transition re-resolves the conversation from the participant pair, so a
//! client-supplied room id is never trusted.

use super::message_types::{Envelope, EnvelopeKind, InboundEnvelope};
use super::{ConnectionId, SessionHandle, SessionRegistry};
use crate::error::AppError;
use crate::metrics;
use crate::models::NewMessage;
use crate::services::{ConversationStore, ModerationGateway, RoomResolver};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    /// Frame was dropped; the connection stays open.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("failed to encode envelope: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    App(#[from] AppError),
}

#[derive(Clone)]
pub struct MessageRouter {
    resolver: RoomResolver,
    store: Arc<dyn ConversationStore>,
    gateway: Arc<dyn ModerationGateway>,
    registry: SessionRegistry,
}

impl MessageRouter {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        gateway: Arc<dyn ModerationGateway>,
        registry: SessionRegistry,
    ) -> Self {
        Self {
            resolver: RoomResolver::new(store.clone()),
            store,
            gateway,
            registry,
        }
    }

    /// Decode one text frame from `session` and run the matching transition.
    pub async fn handle_text(&self, session: &SessionHandle, frame: &str) -> Result<(), RouterError> {
        let envelope = match InboundEnvelope::parse(frame) {
            Ok(envelope) => envelope,
            Err(reason) => {
                tracing::warn!(
                    connection_id = %session.connection_id(),
                    reason = %reason,
                    "dropping malformed frame"
                );
                metrics::record_malformed_frame();
                return Err(RouterError::MalformedEnvelope(reason));
            }
        };

        metrics::record_envelope(envelope.kind().as_str());
        match envelope {
            InboundEnvelope::Enter { sender, receiver } => {
                self.handle_enter(session, &sender, &receiver).await
            }
            InboundEnvelope::Talk {
                sender,
                receiver,
                content,
            } => self.handle_talk(&sender, &receiver, &content).await,
            InboundEnvelope::Leave { sender, receiver } => {
                self.handle_leave(&sender, &receiver).await
            }
        }
    }

    /// Join `sender` to the conversation with `receiver` over `session`.
    ///
    /// The notice goes back to the joining connection and to the receiver
    /// if they are online.
    pub async fn handle_enter(
        &self,
        session: &SessionHandle,
        sender: &str,
        receiver: &str,
    ) -> Result<(), RouterError> {
        let conversation = self.resolver.get_or_create_conversation(sender, receiver).await?;
        self.registry
            .register(sender, session.clone(), conversation.id)
            .await;

        let notice = Envelope::new(
            EnvelopeKind::Enter,
            conversation.id,
            sender,
            receiver,
            format!("{sender} joined"),
        );
        let frame = notice.to_json()?;

        session.send(frame.clone());
        if let Some(peer) = self.registry.lookup(receiver).await {
            if peer.connection_id() != session.connection_id() {
                peer.send(frame);
            }
        }

        tracing::info!(
            connection_id = %session.connection_id(),
            conversation_id = conversation.id,
            sender = %sender,
            receiver = %receiver,
            "participant entered"
        );
        Ok(())
    }

    /// Moderate, persist and relay one message.
    pub async fn handle_talk(
        &self,
        sender: &str,
        receiver: &str,
        content: &str,
    ) -> Result<(), RouterError> {
        let conversation = self.resolver.get_or_create_conversation(sender, receiver).await?;

        let verdict = self.gateway.evaluate(content).await;
        let text = verdict.display_text(content);
        if verdict.flagged {
            let updated = self.store.increment_flagged(conversation.id).await?;
            tracing::info!(
                conversation_id = conversation.id,
                sender = %sender,
                flagged_count = updated.flagged_count,
                "message flagged by moderation"
            );
        }

        self.store
            .append_message(NewMessage {
                conversation_id: conversation.id,
                sender_name: sender,
                receiver_name: receiver,
                content: &text,
            })
            .await?;

        let frame = Envelope::new(EnvelopeKind::Talk, conversation.id, sender, receiver, text)
            .to_json()?;

        let sender_session = self.registry.lookup(sender).await;
        let receiver_session = self.registry.lookup(receiver).await;
        if let Some(own) = &sender_session {
            own.send(frame.clone());
        }
        if let Some(peer) = receiver_session {
            let same_connection = sender_session
                .as_ref()
                .is_some_and(|own| own.connection_id() == peer.connection_id());
            if !same_connection {
                peer.send(frame);
            }
        }

        tracing::debug!(
            conversation_id = conversation.id,
            sender = %sender,
            receiver = %receiver,
            "message relayed"
        );
        Ok(())
    }

    /// Explicit departure: count it, unregister `sender`, tell the receiver.
    pub async fn handle_leave(&self, sender: &str, receiver: &str) -> Result<(), RouterError> {
        let conversation = self.resolver.get_or_create_conversation(sender, receiver).await?;
        let updated = self.store.increment_departure(conversation.id).await?;
        self.registry.remove(sender).await;

        let frame = Envelope::new(
            EnvelopeKind::Leave,
            conversation.id,
            sender,
            receiver,
            format!("{sender} left"),
        )
        .to_json()?;
        if let Some(peer) = self.registry.lookup(receiver).await {
            peer.send(frame);
        }

        tracing::info!(
            conversation_id = conversation.id,
            sender = %sender,
            departure_count = updated.departure_count,
            "participant left"
        );
        Ok(())
    }

    /// Socket closed without LEAVE. Counts a departure for the bound
    /// conversation and unregisters the participant; nobody is notified.
    pub async fn handle_disconnect(&self, connection_id: ConnectionId) -> Result<(), RouterError> {
        let Some((name, conversation_id)) = self.registry.remove_connection(connection_id).await
        else {
            tracing::debug!(connection_id = %connection_id, "closed connection had no participant");
            return Ok(());
        };

        let updated = self.store.increment_departure(conversation_id).await?;
        tracing::info!(
            connection_id = %connection_id,
            conversation_id,
            participant = %name,
            departure_count = updated.departure_count,
            "participant disconnected"
        );
        Ok(())
    }
}
