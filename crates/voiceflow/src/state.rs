//! Shared chat state, commands and events
//!
//! The core thread owns the conversation and publishes an immutable
//! [`ChatState`] after every change. Presentation code reads it through
//! [`SharedChatState`] and sends [`ChatCommand`]s back; it never mutates the
//! state directly.

use crate::capture::RecordingState;
use crate::composer::{ComposerDraft, HINT_MESSAGE};
use crate::message::Message;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Everything the presentation layer renders
#[derive(Clone, Debug)]
pub struct ChatState {
    /// Conversation log in display order
    pub messages: Vec<Message>,
    /// Typing indicator while a reply is outstanding
    pub placeholder: Option<Message>,
    pub draft: ComposerDraft,
    pub recording: RecordingState,
    /// Time recorded so far in the current session
    pub recording_elapsed: Duration,
    /// Auto-stop ceiling
    pub max_recording: Duration,
    /// Recent microphone samples for the level preview
    pub waveform: Vec<f32>,
    /// RMS of `waveform`
    pub level: f32,
    pub can_send: bool,
    pub hint_text: &'static str,
    /// Last failure shown to the user
    pub error: Option<String>,
    /// Set once the core thread has torn down
    pub shut_down: bool,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            placeholder: None,
            draft: ComposerDraft::default(),
            recording: RecordingState::Idle,
            recording_elapsed: Duration::ZERO,
            max_recording: Duration::from_secs(30),
            waveform: Vec::new(),
            level: 0.0,
            can_send: false,
            hint_text: HINT_MESSAGE,
            error: None,
            shut_down: false,
        }
    }
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the typing indicator is visible
    pub fn is_pending(&self) -> bool {
        self.placeholder.is_some()
    }

    /// Log followed by the placeholder, as rendered
    pub fn timeline(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().chain(self.placeholder.iter())
    }

    pub fn set_error(&mut self, error: String) {
        self.error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

/// Thread-safe handle on the published [`ChatState`]
#[derive(Clone, Default)]
pub struct SharedChatState {
    inner: Arc<RwLock<ChatState>>,
}

impl SharedChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, ChatState> {
        self.inner.read()
    }

    pub(crate) fn write(&self) -> parking_lot::RwLockWriteGuard<'_, ChatState> {
        self.inner.write()
    }

    /// Copy of the current state; no lock is held after return
    pub fn snapshot(&self) -> ChatState {
        self.inner.read().clone()
    }

    // === Convenience read methods ===

    pub fn message_count(&self) -> usize {
        self.inner.read().messages.len()
    }

    pub fn recording_state(&self) -> RecordingState {
        self.inner.read().recording
    }

    pub fn is_pending(&self) -> bool {
        self.inner.read().is_pending()
    }

    pub fn can_send(&self) -> bool {
        self.inner.read().can_send
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.read().error.clone()
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.read().shut_down
    }
}

/// User intents, the only way presentation code changes the conversation
#[derive(Clone, Debug, PartialEq)]
pub enum ChatCommand {
    /// Replace the draft text
    SetText(String),
    /// Send the draft
    Submit,
    /// Start recording when idle, stop when recording
    ToggleRecord,
    /// Drop the current recording without uploading
    CancelRecording,
    /// Stage an image file
    PickFile(PathBuf),
    ClearImage,
    DiscardAudio,
    /// Empty the conversation
    ClearHistory,
    /// Tear down the core thread
    Shutdown,
}

/// Notifications for the presentation layer
///
/// State is read from [`SharedChatState`]; events only say when to look.
#[derive(Clone, Debug, PartialEq)]
pub enum ChatEvent {
    /// A new snapshot was published
    StateChanged,
    /// The draft was sent and reset
    MessageSent,
    /// A user-visible failure
    Error(String),
    /// Teardown complete
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaStore;
    use crate::message::Message;
    use crate::session::{SessionStore, SimulatedResponder};
    use std::time::Instant;

    #[test]
    fn test_default_state() {
        let state = ChatState::new();
        assert!(state.messages.is_empty());
        assert!(!state.is_pending());
        assert!(!state.can_send);
        assert_eq!(state.hint_text, HINT_MESSAGE);
    }

    #[test]
    fn test_timeline_appends_placeholder() {
        let mut store = SessionStore::new(
            Box::new(SimulatedResponder::new(Duration::from_secs(1))),
            MediaStore::new(),
        );
        store.append_user_message(
            crate::message::OutboundMessage::Text {
                text: "hi".into(),
            },
            Instant::now(),
        );

        let state = ChatState {
            messages: store.messages().to_vec(),
            placeholder: store.placeholder(),
            ..ChatState::default()
        };
        let timeline: Vec<&Message> = state.timeline().collect();
        assert_eq!(timeline.len(), 2);
        assert!(timeline[1].pending);
        assert_eq!(timeline.iter().filter(|m| m.pending).count(), 1);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let shared = SharedChatState::new();
        let before = shared.snapshot();

        shared.write().set_error("boom".into());

        assert!(before.error.is_none());
        assert_eq!(shared.last_error(), Some("boom".to_string()));
    }
}
