//! Audio capture, encoding and playback
//!
//! The capture side is abstracted behind [`Microphone`] so the recording state
//! machine does not depend on real hardware.

pub mod buffer;
pub mod device;
#[cfg(feature = "audio-io")]
pub mod input;
#[cfg(feature = "audio-io")]
pub mod playback;
pub mod wav;

pub use buffer::AudioRingBuffer;
pub use device::{AudioFormat, CaptureStream, Microphone, UnavailableMicrophone};
#[cfg(feature = "audio-io")]
pub use input::CpalMicrophone;
#[cfg(feature = "audio-io")]
pub use playback::AudioPlayer;
pub use wav::encode_wav;

/// Playback state of a single clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Microphone used by the desktop app for this build
pub fn default_microphone() -> Box<dyn Microphone> {
    #[cfg(feature = "audio-io")]
    {
        Box::new(CpalMicrophone::new())
    }
    #[cfg(not(feature = "audio-io"))]
    {
        Box::new(UnavailableMicrophone)
    }
}
