//! Pending user input and send-time validation
//!
//! The composer owns the draft: typed text, at most one staged image and at
//! most one recorded audio pair. Staged media references belong to the draft
//! until they are sent, replaced or cleared.

use crate::capture::{AudioPair, RecordingState};
use crate::error::{Result, VoiceFlowError};
use crate::media::{MediaRef, MediaStore};
use crate::message::OutboundMessage;
use std::path::Path;
use tracing::{debug, info, warn};

pub const HINT_RECORDING: &str = "Recording...";
pub const HINT_CAPTION: &str = "Add a description (optional)";
pub const HINT_MESSAGE: &str = "Type a message...";

/// An image file read from disk, not yet staged
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Read `path`, accepting only `image/*` files
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .ok_or_else(|| VoiceFlowError::UnsupportedMedia(format!("{}: unknown type", file_name)))?;

        if !mime_type.starts_with("image/") {
            return Err(VoiceFlowError::UnsupportedMedia(format!(
                "{}: {} is not an image",
                file_name, mime_type
            )));
        }

        let bytes = std::fs::read(path)?;
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }
}

/// Image held by the draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedImage {
    pub media: MediaRef,
    pub file_name: String,
    pub size: usize,
}

/// The composer's unsent input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposerDraft {
    pub text: String,
    pub image: Option<StagedImage>,
    pub audio: Option<AudioPair>,
}

impl ComposerDraft {
    /// Nothing that could be sent
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.image.is_none() && self.audio.is_none()
    }
}

/// Why a submit produced nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No text, image or audio pair
    Empty,
    /// A recording is in progress or uploading
    CaptureActive,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Send(OutboundMessage),
    Rejected(Rejection),
}

/// What the Enter key does in the message field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterAction {
    Submit,
    NewLine,
}

impl EnterAction {
    /// Plain Enter submits; Enter with any modifier held breaks the line
    pub fn for_modifiers(modifier_held: bool) -> Self {
        if modifier_held {
            EnterAction::NewLine
        } else {
            EnterAction::Submit
        }
    }
}

pub struct MessageComposer {
    draft: ComposerDraft,
    media: MediaStore,
}

impl MessageComposer {
    pub fn new(media: MediaStore) -> Self {
        Self {
            draft: ComposerDraft::default(),
            media,
        }
    }

    pub fn draft(&self) -> &ComposerDraft {
        &self.draft
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.draft.text = text.into();
    }

    /// Stage an image, replacing any image already staged
    pub fn stage_image(&mut self, file: ImageFile) -> Result<MediaRef> {
        if !file.mime_type.starts_with("image/") {
            return Err(VoiceFlowError::UnsupportedMedia(format!(
                "{}: {} is not an image",
                file.file_name, file.mime_type
            )));
        }

        let size = file.bytes.len();
        let media = self.media.register(file.bytes, file.mime_type);
        info!("Staged image {} ({} bytes) as {}", file.file_name, size, media);

        if let Some(previous) = self.draft.image.replace(StagedImage {
            media: media.clone(),
            file_name: file.file_name,
            size,
        }) {
            self.media.revoke(&previous.media);
        }
        Ok(media)
    }

    /// Stage a recorded clip and its reply, replacing any pair already staged
    pub fn attach_recorded_audio(&mut self, pair: AudioPair) {
        info!("Staged audio {} with reply {}", pair.recording, pair.reply);
        if let Some(previous) = self.draft.audio.replace(pair) {
            revoke_pair(&self.media, &previous);
        }
    }

    /// Remove the staged image; returns whether one was staged
    pub fn clear_image(&mut self) -> bool {
        match self.draft.image.take() {
            Some(image) => {
                self.media.revoke(&image.media);
                true
            }
            None => false,
        }
    }

    /// Remove the staged audio pair; returns whether one was staged
    pub fn discard_audio(&mut self) -> bool {
        match self.draft.audio.take() {
            Some(pair) => {
                revoke_pair(&self.media, &pair);
                true
            }
            None => false,
        }
    }

    /// Produce the outbound message for the current draft
    ///
    /// Precedence is image, then audio pair, then text. The typed text rides
    /// along as the caption of a media message and is sent exactly as typed;
    /// whitespace only matters for deciding whether there is anything to send. On success the draft is reset
    /// and staged media that was not sent is revoked. Rejections leave the
    /// draft untouched.
    pub fn submit(&mut self, capture: RecordingState) -> Submission {
        if capture.is_capture_active() {
            warn!("Submit rejected while capture is {}", capture);
            return Submission::Rejected(Rejection::CaptureActive);
        }

        let draft = std::mem::take(&mut self.draft);
        let text = draft.text.clone();

        let outbound = match draft {
            ComposerDraft {
                image: Some(image),
                audio,
                ..
            } => {
                if let Some(pair) = audio {
                    revoke_pair(&self.media, &pair);
                }
                OutboundMessage::Image {
                    caption: text,
                    image: image.media,
                }
            }
            ComposerDraft {
                audio: Some(pair), ..
            } => OutboundMessage::Audio {
                caption: text,
                recording: pair.recording,
                reply_audio: pair.reply,
            },
            _ if !text.trim().is_empty() => OutboundMessage::Text { text },
            draft => {
                debug!("Submit ignored: draft is empty");
                self.draft = draft;
                return Submission::Rejected(Rejection::Empty);
            }
        };

        info!("Submitting {} message", outbound.kind());
        Submission::Send(outbound)
    }

    pub fn can_send(&self, capture: RecordingState) -> bool {
        !capture.is_capture_active() && !self.draft.is_empty()
    }

    /// Placeholder text for the message field
    pub fn hint_text(&self, capture: RecordingState) -> &'static str {
        if capture.is_recording() {
            HINT_RECORDING
        } else if self.draft.audio.is_some() {
            HINT_CAPTION
        } else {
            HINT_MESSAGE
        }
    }

    /// Drop the whole draft, revoking staged media
    pub fn reset(&mut self) {
        self.clear_image();
        self.discard_audio();
        self.draft.text.clear();
    }
}

fn revoke_pair(media: &MediaStore, pair: &AudioPair) {
    media.revoke(&pair.recording);
    media.revoke(&pair.reply);
}
