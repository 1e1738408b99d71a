//! Recording lifecycle controller
//!
//! Owns the microphone, the current [`RecordingSession`] and the media
//! references a session allocates. Uploads are not performed here: stopping a
//! recording yields a [`PendingUpload`] which the caller sends and later feeds
//! back through [`MediaCaptureController::complete_upload`].

use super::session::{AudioPair, RecordingSession, RecordingState, SessionId};
use super::upload::{EncodedAudio, UploadedAudio};
use crate::audio::{encode_wav, AudioRingBuffer, Microphone};
use crate::error::{Result, VoiceFlowError};
use crate::media::MediaStore;
use crossbeam_channel::bounded;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Chunks the device may queue between two drains
const CHUNK_QUEUE_CAPACITY: usize = 1024;

/// Samples kept for the live level preview
const PREVIEW_CAPACITY: usize = 4800;

/// A stopped recording waiting to be sent to the backend
#[derive(Debug)]
pub struct PendingUpload {
    pub session: SessionId,
    pub audio: EncodedAudio,
}

pub struct MediaCaptureController {
    microphone: Box<dyn Microphone>,
    media: MediaStore,
    max_duration: Duration,
    session: Option<RecordingSession>,
    preview: AudioRingBuffer,
}

impl MediaCaptureController {
    pub fn new(microphone: Box<dyn Microphone>, media: MediaStore, max_duration: Duration) -> Self {
        Self {
            microphone,
            media,
            max_duration,
            session: None,
            preview: AudioRingBuffer::new(PREVIEW_CAPACITY),
        }
    }

    /// Acquire the microphone and begin a fresh session
    ///
    /// Any previous session is discarded first. Acquisition fails fast; on
    /// failure the controller is left idle with no device held.
    pub fn start_recording(&mut self) -> Result<SessionId> {
        self.discard();

        let (chunk_tx, chunk_rx) = bounded(CHUNK_QUEUE_CAPACITY);
        let stream = match self.microphone.open(chunk_tx) {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Failed to start recording: {}", e);
                return Err(e);
            }
        };

        let session = RecordingSession::new(stream, chunk_rx);
        let id = session.id();
        info!(
            "Recording {} started ({}Hz, {} channel(s))",
            id,
            session.format().sample_rate,
            session.format().channels
        );
        self.preview.clear();
        self.session = Some(session);
        Ok(id)
    }

    /// Move chunks delivered by the device into the session
    ///
    /// Returns the number of chunks taken.
    pub fn drain_chunks(&mut self) -> usize {
        let Some(session) = self.session.as_mut() else {
            return 0;
        };
        if !session.state.is_recording() {
            return 0;
        }

        let mut drained = 0;
        while let Ok(chunk) = session.chunk_rx.try_recv() {
            self.preview.write(&chunk);
            session.chunks.push(chunk);
            drained += 1;
        }
        drained
    }

    /// Whether the recording has reached the duration ceiling at `now`
    pub fn auto_stop_due(&self, now: Instant) -> bool {
        match &self.session {
            Some(session) if session.state.is_recording() => {
                now.saturating_duration_since(session.started_at) >= self.max_duration
            }
            _ => false,
        }
    }

    /// Finalize the recording and hand back the audio to upload
    ///
    /// The device is released before anything else happens. Returns `Ok(None)`
    /// when no recording is in progress. A recording with no samples ends the
    /// session in `Error` with [`VoiceFlowError::EmptyRecording`].
    pub fn stop_recording(&mut self) -> Result<Option<PendingUpload>> {
        self.drain_chunks();

        let Some(session) = self.session.as_mut() else {
            debug!("Stop requested with no session");
            return Ok(None);
        };
        if !session.state.is_recording() {
            debug!("Stop requested while {}", session.state);
            return Ok(None);
        }

        session.release_device();
        session.stopped_at = Some(Instant::now());
        session.state = RecordingState::Uploading;

        // Chunks that raced the release are still ours
        while let Ok(chunk) = session.chunk_rx.try_recv() {
            session.chunks.push(chunk);
        }

        let samples: Vec<f32> = session.chunks.drain(..).flatten().collect();
        info!(
            "Recording {} stopped after {:.1}s with {} samples",
            session.id,
            session.elapsed().as_secs_f32(),
            samples.len()
        );

        if samples.is_empty() {
            return Err(fail(session, VoiceFlowError::EmptyRecording));
        }

        let format = session.format;
        let bytes = match encode_wav(&samples, format.sample_rate, format.channels) {
            Ok(bytes) => bytes,
            Err(e) => return Err(fail(session, e)),
        };

        let audio = EncodedAudio::wav(bytes);
        session.user_audio = Some(self.media.register(audio.bytes.clone(), audio.mime_type.clone()));

        Ok(Some(PendingUpload {
            session: session.id,
            audio,
        }))
    }

    /// Apply the outcome of an upload started from [`Self::stop_recording`]
    ///
    /// On success the session becomes `Ready` and the audio pair is handed to
    /// the caller, which takes ownership of both references. On failure the
    /// user clip is revoked and the session becomes `Error`. Outcomes for a
    /// session that is no longer current return `Ok(None)`.
    pub fn complete_upload(
        &mut self,
        id: SessionId,
        outcome: Result<UploadedAudio>,
    ) -> Result<Option<AudioPair>> {
        let session = match self.session.as_mut() {
            Some(session) if session.id == id && session.state.is_uploading() => session,
            _ => {
                debug!("Dropping upload result for stale session {}", id);
                return Ok(None);
            }
        };

        match outcome {
            Ok(uploaded) => {
                let Some(recording) = session.user_audio.take() else {
                    return Err(fail(
                        session,
                        VoiceFlowError::AudioProcessingError("Recorded clip missing".to_string()),
                    ));
                };
                let reply = self.media.register(uploaded.bytes, uploaded.mime_type);
                session.state = RecordingState::Ready;
                info!("Recording {} ready", id);
                Ok(Some(AudioPair { recording, reply }))
            }
            Err(e) => {
                if let Some(media) = session.user_audio.take() {
                    self.media.revoke(&media);
                }
                Err(fail(session, e))
            }
        }
    }

    /// Drop the current session, releasing the device and any media it owns
    pub fn discard(&mut self) {
        if let Some(mut session) = self.session.take() {
            if session.release_device() {
                debug!("Released microphone held by {}", session.id);
            }
            if let Some(media) = session.user_audio.take() {
                self.media.revoke(&media);
            }
            debug!("Discarded recording {} ({})", session.id, session.state);
        }
        self.preview.clear();
    }

    pub fn state(&self) -> RecordingState {
        self.session
            .as_ref()
            .map(RecordingSession::state)
            .unwrap_or_default()
    }

    pub fn session(&self) -> Option<&RecordingSession> {
        self.session.as_ref()
    }

    /// Recording time so far, if a session exists
    pub fn elapsed(&self) -> Option<Duration> {
        self.session.as_ref().map(RecordingSession::elapsed)
    }

    pub fn device_held(&self) -> bool {
        self.session
            .as_ref()
            .map(RecordingSession::holds_device)
            .unwrap_or(false)
    }

    pub fn last_error(&self) -> Option<&VoiceFlowError> {
        self.session.as_ref().and_then(RecordingSession::error)
    }

    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    pub fn preview(&self) -> &AudioRingBuffer {
        &self.preview
    }
}

impl Drop for MediaCaptureController {
    fn drop(&mut self) {
        self.discard();
    }
}

fn fail(session: &mut RecordingSession, e: VoiceFlowError) -> VoiceFlowError {
    error!("Recording {} failed: {}", session.id, e);
    session.release_device();
    session.chunks.clear();
    session.state = RecordingState::Error;
    session.error = Some(e.clone());
    e
}
