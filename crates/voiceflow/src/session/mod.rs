//! Conversation log and assistant replies

pub mod responder;
pub mod store;

pub use responder::{
    ResponseProvider, ScheduledReply, SimulatedResponder, AUDIO_REPLY, IMAGE_REPLY, TEXT_REPLY,
};
pub use store::{PendingReply, ReplyTicket, SessionStore};
