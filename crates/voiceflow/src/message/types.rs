use crate::media::MediaRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    Text,
    Image,
    Audio,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Text => write!(f, "text"),
            MessageKind::Image => write!(f, "image"),
            MessageKind::Audio => write!(f, "audio"),
        }
    }
}

/// Log-unique identifier, increasing in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(u64);

impl MessageId {
    pub(crate) fn new(seq: u64) -> Self {
        Self(seq)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{:06}", self.0)
    }
}

/// One entry of the conversation log
///
/// Entries never change after they are appended. `pending` is only set on the
/// synthesized typing placeholder, which is not part of the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    pub kind: MessageKind,
    pub content: String,
    pub media: Option<MediaRef>,
    pub pending: bool,
}

impl Message {
    pub(crate) fn new(
        id: MessageId,
        sender: Sender,
        kind: MessageKind,
        content: String,
        media: Option<MediaRef>,
    ) -> Self {
        Self {
            id,
            sender,
            timestamp: Utc::now(),
            kind,
            content,
            media,
            pending: false,
        }
    }

    /// Typing indicator shown while an assistant reply is outstanding
    pub(crate) fn placeholder(id: MessageId) -> Self {
        Self {
            pending: true,
            ..Self::new(id, Sender::Assistant, MessageKind::Text, String::new(), None)
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    pub fn is_assistant(&self) -> bool {
        self.sender == Sender::Assistant
    }
}
