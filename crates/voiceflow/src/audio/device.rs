//! Microphone abstraction
//!
//! A [`Microphone`] hands out a [`CaptureStream`] that holds the input device
//! exclusively. Dropping the stream releases the device.

use crate::error::{Result, VoiceFlowError};
use crossbeam_channel::Sender;

/// Sample layout of the chunks a capture stream delivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioFormat {
    pub fn mono(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: 1,
        }
    }
}

/// A live hold on an input device
///
/// Implementations stop the underlying stream when dropped.
pub trait CaptureStream {
    /// Format of the chunks sent to the channel passed to [`Microphone::open`]
    fn format(&self) -> AudioFormat;
}

/// Source of microphone audio
pub trait Microphone: Send {
    /// Acquire the device and start delivering sample chunks to `chunks`
    ///
    /// Fails fast with `DeviceUnavailable` when there is no input device and
    /// `DeviceAccessDenied` when the device refuses to open.
    fn open(&mut self, chunks: Sender<Vec<f32>>) -> Result<Box<dyn CaptureStream>>;
}

/// Microphone for builds without audio I/O
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableMicrophone;

impl Microphone for UnavailableMicrophone {
    fn open(&mut self, _chunks: Sender<Vec<f32>>) -> Result<Box<dyn CaptureStream>> {
        Err(VoiceFlowError::DeviceUnavailable(
            "audio input support is not compiled in".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn test_unavailable_microphone_fails_fast() {
        let (tx, _rx) = bounded(1);
        let err = UnavailableMicrophone.open(tx).err().unwrap();
        assert!(matches!(err, VoiceFlowError::DeviceUnavailable(_)));
    }
}
