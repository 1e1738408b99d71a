//! Reusable widgets for the chat window

pub mod image_cache;
pub mod input_bar;
pub mod message_list;
pub mod record_button;
pub mod waveform;

pub use image_cache::ImageCache;
pub use input_bar::{ImagePicker, InputBar, InputBarOutput};
pub use message_list::MessageList;
pub use record_button::RecordButton;
pub use waveform::Waveform;

use crate::audio::PlaybackState;
use crate::media::MediaRef;

/// The clip the local player has loaded, if any
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NowPlaying {
    pub media: Option<MediaRef>,
    pub state: PlaybackState,
}

impl NowPlaying {
    pub fn state_of(&self, media: &MediaRef) -> PlaybackState {
        match &self.media {
            Some(current) if current == media => self.state,
            _ => PlaybackState::Stopped,
        }
    }
}

/// Human-readable byte count
pub(crate) fn format_size(bytes: usize) -> String {
    match bytes {
        b if b < 1024 => format!("{} B", b),
        b if b < 1024 * 1024 => format!("{:.1} KB", b as f64 / 1024.0),
        b => format!("{:.1} MB", b as f64 / (1024.0 * 1024.0)),
    }
}
