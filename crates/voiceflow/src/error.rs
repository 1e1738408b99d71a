//! Error types for the VoiceFlow client
//!
//! Every failure the conversation core can hit is local and recoverable: the
//! message log and the composer stay usable after any single error.

use thiserror::Error;

/// VoiceFlow errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoiceFlowError {
    /// The microphone exists but access was refused
    #[error("Microphone access denied: {0}")]
    DeviceAccessDenied(String),

    /// No usable input device
    #[error("No input device available: {0}")]
    DeviceUnavailable(String),

    /// Network or backend failure while uploading a recording
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// Recording stopped before any audio was captured
    #[error("Recording contains no audio")]
    EmptyRecording,

    /// A picked file is not something the composer can stage
    #[error("Unsupported media: {0}")]
    UnsupportedMedia(String),

    /// Encoding or decoding of audio data failed
    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Channel communication error between the UI and the core thread
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// File system I/O error
    #[error("IO error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for VoiceFlowError {
    fn from(e: std::io::Error) -> Self {
        VoiceFlowError::IOError(e.to_string())
    }
}

impl VoiceFlowError {
    /// Check if this error is recoverable
    ///
    /// Recoverable errors leave the conversation usable; the user retries with
    /// a fresh action.
    pub fn is_recoverable(&self) -> bool {
        match self {
            VoiceFlowError::DeviceAccessDenied(_) => true,
            VoiceFlowError::DeviceUnavailable(_) => true,
            VoiceFlowError::UploadFailed(_) => true,
            VoiceFlowError::EmptyRecording => true,
            VoiceFlowError::UnsupportedMedia(_) => true,
            VoiceFlowError::AudioProcessingError(_) => true,
            VoiceFlowError::IOError(_) => true,
            // Config errors require user intervention
            VoiceFlowError::ConfigError(_) => false,
            // The core thread is gone
            VoiceFlowError::ChannelError(_) => false,
        }
    }

    /// Get a user-friendly description of the error
    pub fn user_message(&self) -> String {
        match self {
            VoiceFlowError::DeviceAccessDenied(_) => {
                "Microphone access was denied. Check your system permissions.".to_string()
            }
            VoiceFlowError::DeviceUnavailable(_) => {
                "No microphone found. Connect an input device and try again.".to_string()
            }
            VoiceFlowError::UploadFailed(_) => {
                "Could not send your recording. Please record again.".to_string()
            }
            VoiceFlowError::EmptyRecording => {
                "Nothing was recorded. Please try again.".to_string()
            }
            VoiceFlowError::UnsupportedMedia(name) => {
                format!("{} is not an image that can be sent.", name)
            }
            VoiceFlowError::AudioProcessingError(_) => {
                "Audio processing failed. Please try again.".to_string()
            }
            VoiceFlowError::ConfigError(_) => {
                "Configuration error. Please check settings.".to_string()
            }
            VoiceFlowError::ChannelError(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
            VoiceFlowError::IOError(_) => "File system error occurred.".to_string(),
        }
    }
}

/// Result type alias for VoiceFlow operations
pub type Result<T> = std::result::Result<T, VoiceFlowError>;
