//! Microphone capture, recording lifecycle and audio upload

pub mod controller;
pub mod session;
pub mod upload;

pub use controller::{MediaCaptureController, PendingUpload};
pub use session::{AudioPair, RecordingSession, RecordingState, SessionId};
pub use upload::{AudioUploader, EncodedAudio, HttpUploader, UploadedAudio};
