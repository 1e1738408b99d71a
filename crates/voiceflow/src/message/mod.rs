//! Conversation messages and the payloads that produce them

pub mod payload;
pub mod types;

pub use payload::{AssistantReply, OutboundMessage};
pub use types::{Message, MessageId, MessageKind, Sender};
