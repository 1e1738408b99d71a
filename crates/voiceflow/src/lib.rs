//! VoiceFlow - chat client core for text, image and voice messages
//!
//! The crate owns the conversation log, the composer draft and the microphone
//! capture pipeline, and reconciles backend audio replies into the timeline.
//! An egui window renders it.

pub mod audio;
pub mod capture;
pub mod composer;
pub mod config;
pub mod error;
pub mod media;
pub mod message;
pub mod orchestrator;
pub mod session;
pub mod state;
pub mod ui;

pub use error::{Result, VoiceFlowError};

pub use capture::{AudioPair, AudioUploader, HttpUploader, MediaCaptureController, RecordingState};
pub use composer::{ComposerDraft, MessageComposer, Submission};
pub use config::AppConfig;
pub use media::{MediaRef, MediaStore};
pub use message::{Message, MessageKind, OutboundMessage, Sender};
pub use orchestrator::{Orchestrator, OrchestratorHandle};
pub use session::{ResponseProvider, SessionStore, SimulatedResponder};
pub use state::{ChatCommand, ChatEvent, ChatState, SharedChatState};
