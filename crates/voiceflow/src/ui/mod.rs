//! Desktop presentation layer (eframe/egui)
//!
//! Widgets only read published snapshots and emit `ChatCommand`s.

mod app;
pub mod components;
mod theme;

pub use app::VoiceFlowApp;
pub use components::{ImageCache, InputBar, MessageList, NowPlaying, RecordButton, Waveform};
pub use theme::Theme;
