use crate::models::ConversationId;
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Wall-clock format of the `time` field.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Client -> relay frames.
///
/// Inbound `roomId` and `time` are accepted but ignored: the room is always
/// re-resolved from the participant pair and the relay stamps its own time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum InboundEnvelope {
    Enter {
        sender: String,
        receiver: String,
    },
    Talk {
        sender: String,
        receiver: String,
        content: String,
    },
    Leave {
        sender: String,
        receiver: String,
    },
}

impl InboundEnvelope {
    /// Decode a text frame. Empty participant names are rejected.
    pub fn parse(frame: &str) -> Result<Self, String> {
        let envelope: Self = serde_json::from_str(frame).map_err(|e| e.to_string())?;
        let (sender, receiver) = envelope.participants();
        if sender.trim().is_empty() || receiver.trim().is_empty() {
            return Err("sender and receiver must be non-empty".to_string());
        }
        Ok(envelope)
    }

    pub fn kind(&self) -> EnvelopeKind {
        match self {
            Self::Enter { .. } => EnvelopeKind::Enter,
            Self::Talk { .. } => EnvelopeKind::Talk,
            Self::Leave { .. } => EnvelopeKind::Leave,
        }
    }

    pub fn participants(&self) -> (&str, &str) {
        match self {
            Self::Enter { sender, receiver }
            | Self::Talk {
                sender, receiver, ..
            }
            | Self::Leave { sender, receiver } => (sender.as_str(), receiver.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnvelopeKind {
    Enter,
    Talk,
    Leave,
}

impl EnvelopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enter => "ENTER",
            Self::Talk => "TALK",
            Self::Leave => "LEAVE",
        }
    }
}

/// Relay -> client frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
    pub room_id: String,
    pub sender: String,
    pub receiver: String,
    pub content: String,
    pub time: String,
}

impl Envelope {
    /// Build an envelope stamped with the current local time.
    pub fn new(
        kind: EnvelopeKind,
        conversation_id: ConversationId,
        sender: &str,
        receiver: &str,
        content: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            room_id: conversation_id.to_string(),
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            content: content.into(),
            time: Local::now().format(TIME_FORMAT).to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
