//! Assistant reply providers
//!
//! A [`ResponseProvider`] decides what the assistant says to a user message
//! and how long the session waits before showing it.

use crate::config::AppConfig;
use crate::message::{AssistantReply, OutboundMessage};
use std::time::Duration;

pub const TEXT_REPLY: &str = "I'm an AI assistant. This is a simulated response to your message.";
pub const IMAGE_REPLY: &str =
    "Thanks for sharing this image! I can analyze it or provide feedback if you'd like.";
pub const AUDIO_REPLY: &str = "I've received your audio message.";

/// A reply and the delay before it is delivered
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledReply {
    pub reply: AssistantReply,
    pub delay: Duration,
}

pub trait ResponseProvider: Send {
    fn respond(&self, message: &OutboundMessage) -> ScheduledReply;
}

/// Canned replies after a fixed delay
///
/// Audio messages already carry the backend's spoken reply, so they are
/// answered with that clip and no added delay.
#[derive(Debug, Clone)]
pub struct SimulatedResponder {
    delay: Duration,
}

impl SimulatedResponder {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.response_delay())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedResponder {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl ResponseProvider for SimulatedResponder {
    fn respond(&self, message: &OutboundMessage) -> ScheduledReply {
        match message {
            OutboundMessage::Text { .. } => ScheduledReply {
                reply: AssistantReply::text(TEXT_REPLY),
                delay: self.delay,
            },
            OutboundMessage::Image { .. } => ScheduledReply {
                reply: AssistantReply::text(IMAGE_REPLY),
                delay: self.delay,
            },
            OutboundMessage::Audio { reply_audio, .. } => ScheduledReply {
                reply: AssistantReply::audio(AUDIO_REPLY, reply_audio.clone()),
                delay: Duration::ZERO,
            },
        }
    }
}
