//! The conversation log
//!
//! [`SessionStore`] is the only writer of the message log. The log is
//! append-only and already in display order. Each user message schedules one
//! assistant reply; replies are appended in the order their user messages
//! were, and a single typing placeholder is shown while any is outstanding.

use super::responder::ResponseProvider;
use crate::media::{MediaRef, MediaStore};
use crate::message::{AssistantReply, Message, MessageId, MessageKind, OutboundMessage, Sender};
use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

/// Identifies one outstanding assistant reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplyTicket(u64);

impl fmt::Display for ReplyTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reply-{}", self.0)
    }
}

/// Returned by [`SessionStore::append_user_message`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingReply {
    /// The appended user message
    pub message: MessageId,
    pub ticket: ReplyTicket,
    /// When the scheduled reply becomes deliverable
    pub due_at: Instant,
}

struct Outstanding {
    ticket: ReplyTicket,
    due_at: Instant,
    /// Provider's reply, until it is due or overridden
    scheduled: Option<AssistantReply>,
    /// Reply ready to append once everything ahead of it is
    resolved: Option<AssistantReply>,
}

pub struct SessionStore {
    log: Vec<Message>,
    next_id: u64,
    next_ticket: u64,
    outstanding: VecDeque<Outstanding>,
    responder: Box<dyn ResponseProvider>,
    media: MediaStore,
    greeting: Option<String>,
}

impl SessionStore {
    pub fn new(responder: Box<dyn ResponseProvider>, media: MediaStore) -> Self {
        Self {
            log: Vec::new(),
            next_id: 1,
            next_ticket: 1,
            outstanding: VecDeque::new(),
            responder,
            media,
            greeting: None,
        }
    }

    /// Open every conversation, and every cleared one, with `greeting`
    pub fn with_greeting(mut self, greeting: Option<String>) -> Self {
        self.greeting = greeting;
        self.seed_greeting();
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.log
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Whether an assistant reply is outstanding
    pub fn is_pending(&self) -> bool {
        !self.outstanding.is_empty()
    }

    pub fn outstanding_count(&self) -> usize {
        self.outstanding.len()
    }

    /// The typing indicator, if one should be shown
    ///
    /// Never part of the log, and there is at most one no matter how many
    /// replies are outstanding.
    pub fn placeholder(&self) -> Option<Message> {
        self.is_pending()
            .then(|| Message::placeholder(MessageId::new(self.next_id)))
    }

    /// Append a user message and schedule the assistant's reply
    pub fn append_user_message(&mut self, outbound: OutboundMessage, now: Instant) -> PendingReply {
        let scheduled = self.responder.respond(&outbound);

        let (kind, content, media) = match outbound {
            OutboundMessage::Text { text } => (MessageKind::Text, text, None),
            OutboundMessage::Image { caption, image } => (MessageKind::Image, caption, Some(image)),
            OutboundMessage::Audio {
                caption, recording, ..
            } => (MessageKind::Audio, caption, Some(recording)),
        };
        let message = self.push(Sender::User, kind, content, media);

        let ticket = ReplyTicket(self.next_ticket);
        self.next_ticket += 1;
        let due_at = now + scheduled.delay;
        debug!(
            "{} scheduled for {} in {:?}",
            ticket, message, scheduled.delay
        );

        self.outstanding.push_back(Outstanding {
            ticket,
            due_at,
            scheduled: Some(scheduled.reply),
            resolved: None,
        });

        // Zero-delay replies land immediately when nothing is ahead of them
        self.deliver_due(now);

        PendingReply {
            message,
            ticket,
            due_at,
        }
    }

    /// Resolve `ticket` with `reply`, appending every reply now in order
    ///
    /// Returns the ids appended. A ticket that is no longer outstanding, for
    /// example after the log was cleared, is dropped and its media released.
    pub fn resolve_assistant_response(
        &mut self,
        ticket: ReplyTicket,
        reply: AssistantReply,
    ) -> Vec<MessageId> {
        let Some(entry) = self.outstanding.iter_mut().find(|o| o.ticket == ticket) else {
            debug!("Dropping reply for abandoned {}", ticket);
            if let Some(media) = &reply.media {
                self.media.revoke(media);
            }
            return Vec::new();
        };

        if let Some(scheduled) = entry.scheduled.take() {
            if scheduled.media.is_some() && scheduled.media != reply.media {
                release(&self.media, scheduled.media.as_ref());
            }
        }
        if let Some(previous) = entry.resolved.replace(reply) {
            release(&self.media, previous.media.as_ref());
        }
        self.flush()
    }

    /// Resolve every scheduled reply that is due at `now`
    pub fn deliver_due(&mut self, now: Instant) -> Vec<MessageId> {
        for entry in self.outstanding.iter_mut() {
            if entry.resolved.is_none() && entry.due_at <= now {
                entry.resolved = entry.scheduled.take();
            }
        }
        self.flush()
    }

    /// Empty the log, abandon outstanding replies and release their media
    pub fn clear(&mut self) {
        let mut released = 0;
        for message in self.log.drain(..) {
            if let Some(media) = &message.media {
                released += usize::from(self.media.revoke(media));
            }
        }
        for entry in self.outstanding.drain(..) {
            for reply in entry.scheduled.iter().chain(entry.resolved.iter()) {
                if let Some(media) = &reply.media {
                    released += usize::from(self.media.revoke(media));
                }
            }
        }
        info!("Conversation cleared ({} media references released)", released);
        self.seed_greeting();
    }

    fn flush(&mut self) -> Vec<MessageId> {
        let mut appended = Vec::new();
        while self
            .outstanding
            .front()
            .map(|o| o.resolved.is_some())
            .unwrap_or(false)
        {
            let Some(entry) = self.outstanding.pop_front() else {
                break;
            };
            let Some(reply) = entry.resolved else {
                continue;
            };
            let id = self.push(Sender::Assistant, reply.kind, reply.content, reply.media);
            debug!("{} delivered as {}", entry.ticket, id);
            appended.push(id);
        }
        appended
    }

    fn push(
        &mut self,
        sender: Sender,
        kind: MessageKind,
        content: String,
        media: Option<MediaRef>,
    ) -> MessageId {
        let id = MessageId::new(self.next_id);
        self.next_id += 1;
        self.log.push(Message::new(id, sender, kind, content, media));
        id
    }

    fn seed_greeting(&mut self) {
        if let Some(greeting) = self.greeting.clone() {
            self.push(Sender::Assistant, MessageKind::Text, greeting, None);
        }
    }
}

fn release(media: &MediaStore, reference: Option<&MediaRef>) {
    if let Some(reference) = reference {
        media.revoke(reference);
    }
}
