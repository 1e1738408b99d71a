//! A single microphone-capture attempt

use crate::audio::{AudioFormat, CaptureStream};
use crate::error::VoiceFlowError;
use crate::media::MediaRef;
use crossbeam_channel::Receiver;
use std::fmt;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Recording lifecycle
///
/// `idle → recording → uploading → {ready | error}`. `ready` and `error` are
/// terminal for a session; the next recording starts a fresh one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecordingState {
    /// No session
    #[default]
    Idle,
    /// Microphone held, chunks buffering
    Recording,
    /// Microphone released, waiting on the backend
    Uploading,
    /// Backend replied; the audio pair was handed to the composer
    Ready,
    /// Upload or finalization failed; the session is discarded
    Error,
}

impl RecordingState {
    pub fn is_idle(&self) -> bool {
        matches!(self, RecordingState::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, RecordingState::Recording)
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self, RecordingState::Uploading)
    }

    /// Recording or uploading; sending is blocked while this holds
    pub fn is_capture_active(&self) -> bool {
        matches!(self, RecordingState::Recording | RecordingState::Uploading)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RecordingState::Ready | RecordingState::Error)
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingState::Idle => write!(f, "Idle"),
            RecordingState::Recording => write!(f, "Recording"),
            RecordingState::Uploading => write!(f, "Uploading"),
            RecordingState::Ready => write!(f, "Ready"),
            RecordingState::Error => write!(f, "Error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rec-{}", self.0.simple())
    }
}

/// The user's clip and the backend's spoken reply to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPair {
    pub recording: MediaRef,
    pub reply: MediaRef,
}

/// State owned by the capture controller for one recording
pub struct RecordingSession {
    pub(crate) id: SessionId,
    pub(crate) state: RecordingState,
    pub(crate) started_at: Instant,
    pub(crate) stopped_at: Option<Instant>,
    pub(crate) format: AudioFormat,
    /// Live device hold; `None` once released
    pub(crate) stream: Option<Box<dyn CaptureStream>>,
    pub(crate) chunk_rx: Receiver<Vec<f32>>,
    pub(crate) chunks: Vec<Vec<f32>>,
    /// Locally registered clip, owned until handed off or revoked
    pub(crate) user_audio: Option<MediaRef>,
    pub(crate) error: Option<VoiceFlowError>,
}

impl RecordingSession {
    pub(crate) fn new(stream: Box<dyn CaptureStream>, chunk_rx: Receiver<Vec<f32>>) -> Self {
        Self {
            id: SessionId::new(),
            state: RecordingState::Recording,
            started_at: Instant::now(),
            stopped_at: None,
            format: stream.format(),
            stream: Some(stream),
            chunk_rx,
            chunks: Vec::new(),
            user_audio: None,
            error: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn holds_device(&self) -> bool {
        self.stream.is_some()
    }

    /// Time spent recording, frozen once the session stops
    pub fn elapsed(&self) -> Duration {
        let end = self.stopped_at.unwrap_or_else(Instant::now);
        end.duration_since(self.started_at)
    }

    pub fn error(&self) -> Option<&VoiceFlowError> {
        self.error.as_ref()
    }

    /// Release the device hold; returns whether one was held
    pub(crate) fn release_device(&mut self) -> bool {
        match self.stream.take() {
            Some(stream) => {
                drop(stream);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for RecordingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("format", &self.format)
            .field("holds_device", &self.holds_device())
            .field("chunks", &self.chunks.len())
            .field("user_audio", &self.user_audio)
            .field("error", &self.error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert!(RecordingState::Idle.is_idle());
        assert!(RecordingState::Recording.is_capture_active());
        assert!(RecordingState::Uploading.is_capture_active());
        assert!(!RecordingState::Ready.is_capture_active());
        assert!(RecordingState::Ready.is_terminal());
        assert!(RecordingState::Error.is_terminal());
        assert!(!RecordingState::Uploading.is_terminal());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(RecordingState::Uploading.to_string(), "Uploading");
    }
}
