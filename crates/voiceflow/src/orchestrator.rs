//! Orchestrator for the chat core
//!
//! One dedicated thread owns the capture controller, the composer and the
//! session store, and applies every change in the order it arrives:
//! - User intents from the UI or tests (`ChatCommand`)
//! - Upload completions posted back from the tokio runtime
//! - Timer work on each tick: microphone chunks, the recording ceiling and
//!   due assistant replies
//!
//! After each change a fresh snapshot is published to `SharedChatState`.

use crate::audio::{default_microphone, Microphone};
use crate::capture::{AudioUploader, HttpUploader, MediaCaptureController, RecordingState, SessionId, UploadedAudio};
use crate::composer::{ImageFile, MessageComposer, Submission};
use crate::config::AppConfig;
use crate::error::{Result, VoiceFlowError};
use crate::media::MediaStore;
use crate::session::{ResponseProvider, SessionStore, SimulatedResponder};
use crate::state::{ChatCommand, ChatEvent, SharedChatState};
use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};

/// Idle wake-up interval of the core loop
const TICK: Duration = Duration::from_millis(10);

type UploadDone = (SessionId, Result<UploadedAudio>);

/// Handle for driving the core from the UI or tests
#[derive(Clone)]
pub struct OrchestratorHandle {
    command_tx: Sender<ChatCommand>,
    event_rx: Receiver<ChatEvent>,
    state: SharedChatState,
    media: MediaStore,
}

impl OrchestratorHandle {
    /// Send a command to the core thread
    pub fn send_command(&self, cmd: ChatCommand) -> Result<()> {
        self.command_tx
            .send(cmd)
            .map_err(|e| VoiceFlowError::ChannelError(format!("Failed to send command: {}", e)))
    }

    pub fn set_text(&self, text: impl Into<String>) -> Result<()> {
        self.send_command(ChatCommand::SetText(text.into()))
    }

    pub fn submit(&self) -> Result<()> {
        self.send_command(ChatCommand::Submit)
    }

    pub fn toggle_record(&self) -> Result<()> {
        self.send_command(ChatCommand::ToggleRecord)
    }

    pub fn cancel_recording(&self) -> Result<()> {
        self.send_command(ChatCommand::CancelRecording)
    }

    pub fn pick_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.send_command(ChatCommand::PickFile(path.into()))
    }

    pub fn clear_image(&self) -> Result<()> {
        self.send_command(ChatCommand::ClearImage)
    }

    pub fn discard_audio(&self) -> Result<()> {
        self.send_command(ChatCommand::DiscardAudio)
    }

    pub fn clear_history(&self) -> Result<()> {
        self.send_command(ChatCommand::ClearHistory)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send_command(ChatCommand::Shutdown)
    }

    /// Try to receive an event (non-blocking)
    pub fn try_recv_event(&self) -> Option<ChatEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Published state
    pub fn state(&self) -> &SharedChatState {
        &self.state
    }

    /// Read access to media blobs, for rendering and playback
    pub fn media(&self) -> &MediaStore {
        &self.media
    }
}

/// Builds and starts the core thread
pub struct Orchestrator {
    config: AppConfig,
    state: SharedChatState,
    media: MediaStore,
    command_rx: Receiver<ChatCommand>,
    event_tx: Sender<ChatEvent>,
    microphone: Box<dyn Microphone>,
    uploader: Arc<dyn AudioUploader>,
    responder: Box<dyn ResponseProvider>,
}

impl Orchestrator {
    /// Create an orchestrator with the desktop collaborators
    ///
    /// Returns the orchestrator and a handle for controlling it. Nothing runs
    /// until [`Orchestrator::start`].
    pub fn new(config: AppConfig) -> Result<(Self, OrchestratorHandle)> {
        config.validate()?;

        let buffer_size = config.channel_buffer_size;
        let (command_tx, command_rx) = bounded(buffer_size);
        let (event_tx, event_rx) = bounded(buffer_size);
        let state = SharedChatState::new();
        let media = MediaStore::new();

        let handle = OrchestratorHandle {
            command_tx,
            event_rx,
            state: state.clone(),
            media: media.clone(),
        };

        let orchestrator = Self {
            uploader: Arc::new(HttpUploader::from_config(&config)?),
            responder: Box::new(SimulatedResponder::from_config(&config)),
            microphone: default_microphone(),
            config,
            state,
            media,
            command_rx,
            event_tx,
        };

        Ok((orchestrator, handle))
    }

    pub fn with_microphone(mut self, microphone: Box<dyn Microphone>) -> Self {
        self.microphone = microphone;
        self
    }

    pub fn with_uploader(mut self, uploader: Arc<dyn AudioUploader>) -> Self {
        self.uploader = uploader;
        self
    }

    pub fn with_responder(mut self, responder: Box<dyn ResponseProvider>) -> Self {
        self.responder = responder;
        self
    }

    /// Start the core thread
    ///
    /// The thread exits after `Shutdown` or when every handle is dropped,
    /// releasing the microphone and all media either way.
    pub fn start(self) -> Result<JoinHandle<()>> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("voiceflow-upload")
            .enable_all()
            .build()
            .map_err(|e| VoiceFlowError::ConfigError(format!("Failed to start runtime: {}", e)))?;

        let (upload_tx, upload_rx) = unbounded();
        let Self {
            config,
            state,
            media,
            command_rx,
            event_tx,
            microphone,
            uploader,
            responder,
        } = self;

        let handle = thread::Builder::new()
            .name("voiceflow-core".to_string())
            .spawn(move || {
                // Capture streams are not Send, so the core lives on this thread only
                let mut core = ChatCore {
                    capture: MediaCaptureController::new(
                        microphone,
                        media.clone(),
                        config.max_recording(),
                    ),
                    composer: MessageComposer::new(media.clone()),
                    store: SessionStore::new(responder, media.clone())
                        .with_greeting(config.greeting.clone()),
                    media,
                    state,
                    event_tx,
                    uploader,
                    upload_tx,
                    runtime,
                };

                info!("Chat core loop starting");
                core.publish();

                loop {
                    select! {
                        recv(command_rx) -> cmd => {
                            match cmd {
                                Ok(ChatCommand::Shutdown) => {
                                    info!("Shutdown requested");
                                    break;
                                }
                                Ok(cmd) => core.handle_command(cmd),
                                Err(_) => {
                                    warn!("Command channel disconnected");
                                    break;
                                }
                            }
                        }

                        recv(upload_rx) -> done => {
                            if let Ok((session, outcome)) = done {
                                core.on_upload(session, outcome);
                            }
                        }

                        default(TICK) => {}
                    }

                    core.tick(Instant::now());
                }

                core.teardown();
                info!("Chat core loop exiting");
            })
            .map_err(|e| VoiceFlowError::ChannelError(format!("Failed to spawn core thread: {}", e)))?;

        Ok(handle)
    }
}

/// State owned by the core thread
struct ChatCore {
    capture: MediaCaptureController,
    composer: MessageComposer,
    store: SessionStore,
    media: MediaStore,
    state: SharedChatState,
    event_tx: Sender<ChatEvent>,
    uploader: Arc<dyn AudioUploader>,
    upload_tx: Sender<UploadDone>,
    runtime: Runtime,
}

impl ChatCore {
    fn handle_command(&mut self, cmd: ChatCommand) {
        debug!("Command: {:?}", cmd);
        match cmd {
            ChatCommand::SetText(text) => {
                self.composer.set_text(text);
            }

            ChatCommand::Submit => match self.composer.submit(self.capture.state()) {
                Submission::Send(outbound) => {
                    let pending = self.store.append_user_message(outbound, Instant::now());
                    debug!("Sent {}, awaiting {}", pending.message, pending.ticket);
                    self.state.write().clear_error();
                    self.publish();
                    self.emit(ChatEvent::MessageSent);
                    return;
                }
                Submission::Rejected(reason) => {
                    debug!("Submit rejected: {:?}", reason);
                    return;
                }
            },

            ChatCommand::ToggleRecord => match self.capture.state() {
                RecordingState::Recording => self.stop_recording(),
                RecordingState::Uploading => {
                    warn!("Cannot toggle recording while uploading");
                    return;
                }
                _ => self.start_recording(),
            },

            ChatCommand::CancelRecording => match self.capture.state() {
                RecordingState::Uploading => {
                    warn!("Cannot cancel a recording while it uploads");
                    return;
                }
                RecordingState::Recording => {
                    info!("Recording cancelled");
                    self.capture.discard();
                }
                _ => self.capture.discard(),
            },

            ChatCommand::PickFile(path) => {
                match ImageFile::load(&path).and_then(|file| self.composer.stage_image(file)) {
                    Ok(_) => self.state.write().clear_error(),
                    Err(e) => self.report(e),
                }
            }

            ChatCommand::ClearImage => {
                self.composer.clear_image();
            }

            ChatCommand::DiscardAudio => {
                self.composer.discard_audio();
            }

            ChatCommand::ClearHistory => {
                self.store.clear();
            }

            // Handled by the loop
            ChatCommand::Shutdown => return,
        }

        self.publish();
    }

    fn start_recording(&mut self) {
        self.state.write().clear_error();
        if let Err(e) = self.capture.start_recording() {
            self.report(e);
        }
    }

    fn stop_recording(&mut self) {
        match self.capture.stop_recording() {
            Ok(Some(pending)) => {
                let upload = self.uploader.upload(pending.audio);
                let done = self.upload_tx.clone();
                let session = pending.session;
                self.runtime.spawn(async move {
                    let outcome = upload.await;
                    if done.send((session, outcome)).is_err() {
                        debug!("Core gone before upload of {} finished", session);
                    }
                });
            }
            Ok(None) => {}
            Err(e) => self.report(e),
        }
    }

    fn on_upload(&mut self, session: SessionId, outcome: Result<UploadedAudio>) {
        match self.capture.complete_upload(session, outcome) {
            Ok(Some(pair)) => self.composer.attach_recorded_audio(pair),
            Ok(None) => return,
            Err(e) => self.report(e),
        }
        self.publish();
    }

    /// Timer work; publishes when anything visible moved
    fn tick(&mut self, now: Instant) {
        let mut changed = false;

        if self.capture.state().is_recording() {
            self.capture.drain_chunks();
            // Elapsed time and the level meter move on every tick
            changed = true;

            if self.capture.auto_stop_due(now) {
                info!(
                    "Recording reached {:?} ceiling, stopping",
                    self.capture.max_duration()
                );
                self.stop_recording();
            }
        }

        if !self.store.deliver_due(now).is_empty() {
            changed = true;
        }

        if changed {
            self.publish();
        }
    }

    fn report(&mut self, e: VoiceFlowError) {
        error!("{}", e);
        let message = e.user_message();
        self.state.write().set_error(message.clone());
        self.publish();
        self.emit(ChatEvent::Error(message));
    }

    fn publish(&mut self) {
        let capture = self.capture.state();
        let waveform = if capture.is_recording() {
            self.capture.preview().recent()
        } else {
            Vec::new()
        };

        {
            let mut s = self.state.write();
            s.messages = self.store.messages().to_vec();
            s.placeholder = self.store.placeholder();
            s.draft = self.composer.draft().clone();
            s.recording = capture;
            s.recording_elapsed = self.capture.elapsed().unwrap_or_default();
            s.max_recording = self.capture.max_duration();
            s.level = if waveform.is_empty() {
                0.0
            } else {
                self.capture.preview().rms()
            };
            s.waveform = waveform;
            s.can_send = self.composer.can_send(capture);
            s.hint_text = self.composer.hint_text(capture);
        }
        self.emit(ChatEvent::StateChanged);
    }

    fn emit(&self, event: ChatEvent) {
        // A full queue only means nobody is listening right now
        if let Err(e) = self.event_tx.try_send(event) {
            debug!("Event not delivered: {}", e);
        }
    }

    /// Release the device and every media reference
    fn teardown(&mut self) {
        self.capture.discard();
        self.composer.reset();
        let released = self.media.revoke_all();
        info!("Released {} media references", released);

        self.state.write().shut_down = true;
        self.publish();
        self.emit(ChatEvent::Shutdown);
    }
}
