//! Playback of audio message blobs using rodio
//!
//! Which clip is playing is presentation state; nothing here touches the
//! conversation log.

use super::PlaybackState;
use crate::error::{Result, VoiceFlowError};
use crate::media::MediaRef;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::io::Cursor;
use tracing::{debug, info};

/// Plays one clip at a time on the default output device
pub struct AudioPlayer {
    // Dropping the stream silences the sink
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sink: Option<Sink>,
    current: Option<MediaRef>,
}

impl AudioPlayer {
    pub fn new() -> Result<Self> {
        let (stream, handle) = OutputStream::try_default().map_err(|e| {
            VoiceFlowError::DeviceUnavailable(format!("No output device available: {}", e))
        })?;
        info!("Audio output initialized");

        Ok(Self {
            _stream: stream,
            handle,
            sink: None,
            current: None,
        })
    }

    /// Start playing `bytes`, replacing whatever was playing
    pub fn play(&mut self, media: &MediaRef, bytes: Vec<u8>) -> Result<()> {
        self.stop();

        let source = Decoder::new(Cursor::new(bytes)).map_err(|e| {
            VoiceFlowError::AudioProcessingError(format!("Failed to decode {}: {}", media, e))
        })?;
        let sink = Sink::try_new(&self.handle).map_err(|e| {
            VoiceFlowError::DeviceUnavailable(format!("Failed to open output sink: {}", e))
        })?;
        sink.append(source);

        debug!("Playing {}", media);
        self.sink = Some(sink);
        self.current = Some(media.clone());
        Ok(())
    }

    /// Pause or resume the current clip
    pub fn toggle_pause(&mut self) {
        if let Some(sink) = &self.sink {
            if sink.is_paused() {
                sink.play();
            } else {
                sink.pause();
            }
        }
    }

    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.current = None;
    }

    /// State of `media` as seen by the player
    pub fn state_of(&self, media: &MediaRef) -> PlaybackState {
        match (&self.current, &self.sink) {
            (Some(current), Some(sink)) if current == media && !sink.empty() => {
                if sink.is_paused() {
                    PlaybackState::Paused
                } else {
                    PlaybackState::Playing
                }
            }
            _ => PlaybackState::Stopped,
        }
    }

    /// Clip loaded in the sink, playing or paused
    pub fn current(&self) -> Option<&MediaRef> {
        self.current.as_ref()
    }
}
