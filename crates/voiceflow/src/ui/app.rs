//! Main VoiceFlow window and eframe integration

use crate::media::MediaRef;
use crate::orchestrator::OrchestratorHandle;
use crate::state::{ChatCommand, ChatEvent};
use crate::ui::components::{ImageCache, ImagePicker, InputBar, MessageList, NowPlaying};
use crate::ui::theme::Theme;
use egui::{CentralPanel, RichText, TopBottomPanel};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[cfg(feature = "audio-io")]
use crate::audio::{AudioPlayer, PlaybackState};

/// Chat window
///
/// Renders snapshots published by the core thread and forwards user intents
/// to it. The only state kept here is presentation state: the text being
/// typed, the image path prompt, decoded image textures and which clip is
/// playing.
pub struct VoiceFlowApp {
    handle: OrchestratorHandle,
    core: Option<JoinHandle<()>>,
    theme: Theme,
    text: String,
    picker: ImagePicker,
    images: ImageCache,
    #[cfg(feature = "audio-io")]
    player: Option<AudioPlayer>,
}

impl VoiceFlowApp {
    pub fn new(cc: &eframe::CreationContext<'_>, handle: OrchestratorHandle, core: JoinHandle<()>) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);

        Self {
            handle,
            core: Some(core),
            theme,
            text: String::new(),
            picker: ImagePicker::default(),
            images: ImageCache::new(),
            #[cfg(feature = "audio-io")]
            player: None,
        }
    }

    fn send(&self, cmd: ChatCommand) {
        if let Err(e) = self.handle.send_command(cmd) {
            error!("{}", e);
        }
    }

    fn process_events(&mut self) {
        while let Some(event) = self.handle.try_recv_event() {
            match event {
                ChatEvent::StateChanged => {}
                ChatEvent::MessageSent => self.text.clear(),
                ChatEvent::Error(message) => debug!("Core reported: {}", message),
                ChatEvent::Shutdown => info!("Core shut down"),
            }
        }
    }

    /// Files dropped on the window are staged as images
    fn handle_dropped_files(&self, ctx: &egui::Context) {
        let dropped: Vec<_> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });
        for path in dropped {
            debug!("File dropped: {}", path.display());
            self.send(ChatCommand::PickFile(path));
        }
    }

    #[cfg(feature = "audio-io")]
    fn now_playing(&self) -> NowPlaying {
        match self.player.as_ref().and_then(|p| p.current().map(|m| (p, m))) {
            Some((player, media)) => NowPlaying {
                media: Some(media.clone()),
                state: player.state_of(media),
            },
            None => NowPlaying::default(),
        }
    }

    #[cfg(not(feature = "audio-io"))]
    fn now_playing(&self) -> NowPlaying {
        NowPlaying::default()
    }

    #[cfg(feature = "audio-io")]
    fn toggle_playback(&mut self, media: MediaRef) {
        if self.player.is_none() {
            match AudioPlayer::new() {
                Ok(player) => self.player = Some(player),
                Err(e) => {
                    warn!("Playback unavailable: {}", e);
                    return;
                }
            }
        }
        let Some(player) = self.player.as_mut() else {
            return;
        };

        if player.current() == Some(&media) && player.state_of(&media) != PlaybackState::Stopped {
            player.toggle_pause();
            return;
        }

        match self.handle.media().get(&media) {
            Some(blob) => {
                if let Err(e) = player.play(&media, blob.bytes.clone()) {
                    warn!("{}", e);
                }
            }
            None => warn!("{} is no longer available", media),
        }
    }

    #[cfg(not(feature = "audio-io"))]
    fn toggle_playback(&mut self, media: MediaRef) {
        warn!("Playback of {} needs the audio-io feature", media);
    }
}

impl eframe::App for VoiceFlowApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_events();
        self.handle_dropped_files(ctx);

        let snapshot = self.handle.state().snapshot();
        self.images.retain_live(self.handle.media());
        let playing = self.now_playing();
        let mut commands = Vec::new();
        let mut toggled: Option<MediaRef> = None;

        TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(self.theme.gap);
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new("VoiceFlow")
                        .heading()
                        .strong()
                        .color(self.theme.text),
                );
                ui.label(
                    RichText::new("Chat with text, images and voice")
                        .small()
                        .color(self.theme.text_faint),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Clear chat").clicked() {
                        commands.push(ChatCommand::ClearHistory);
                    }
                });
            });
            ui.add_space(self.theme.gap);
        });

        TopBottomPanel::bottom("composer").show(ctx, |ui| {
            ui.add_space(self.theme.gap);
            if let Some(error) = &snapshot.error {
                ui.label(RichText::new(error).color(self.theme.danger));
            }
            let out = InputBar::new(
                &snapshot,
                &mut self.text,
                &mut self.picker,
                self.handle.media(),
                &mut self.images,
                &playing,
                &self.theme,
            )
            .show(ui);
            commands.extend(out.commands);
            if out.toggled.is_some() {
                toggled = out.toggled;
            }
            ui.add_space(self.theme.gap);
        });

        CentralPanel::default().show(ctx, |ui| {
            let clicked = MessageList::new(
                &snapshot.messages,
                self.handle.media(),
                &mut self.images,
                &playing,
                &self.theme,
            )
                .placeholder(snapshot.placeholder.as_ref())
                .show(ui);
            if clicked.is_some() {
                toggled = clicked;
            }
        });

        for cmd in commands {
            self.send(cmd);
        }
        if let Some(media) = toggled {
            self.toggle_playback(media);
        }

        // Snapshots change without input (replies, uploads)
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

impl Drop for VoiceFlowApp {
    fn drop(&mut self) {
        info!("Window closed, shutting down core");
        if let Err(e) = self.handle.shutdown() {
            debug!("{}", e);
        }
        if let Some(core) = self.core.take() {
            if core.join().is_err() {
                error!("Core thread panicked");
            }
        }
    }
}
