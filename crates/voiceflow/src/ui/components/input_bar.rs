//! Composer: staged media previews, record button, message field and send

use super::image_cache::fit_within;
use super::{format_size, ImageCache, NowPlaying, RecordButton, Waveform};
use crate::audio::PlaybackState;
use crate::composer::EnterAction;
use crate::media::{MediaRef, MediaStore};
use crate::state::{ChatCommand, ChatState};
use crate::ui::theme::Theme;
use egui::{Id, InputState, Key, Modifiers, RichText, TextEdit, Ui, Vec2};
use std::path::PathBuf;

const TEXT_ID: &str = "voiceflow-composer-text";

/// Bounds of the staged image thumbnail
const THUMBNAIL: Vec2 = Vec2::new(96.0, 96.0);

/// Local state of the "attach image" path prompt
#[derive(Debug, Default)]
pub struct ImagePicker {
    pub open: bool,
    pub path: String,
}

/// What the user asked for this frame
#[derive(Debug, Default)]
pub struct InputBarOutput {
    pub commands: Vec<ChatCommand>,
    /// Preview clip whose play button was clicked
    pub toggled: Option<MediaRef>,
}

pub struct InputBar<'a> {
    state: &'a ChatState,
    text: &'a mut String,
    picker: &'a mut ImagePicker,
    media: &'a MediaStore,
    images: &'a mut ImageCache,
    playing: &'a NowPlaying,
    theme: &'a Theme,
}

impl<'a> InputBar<'a> {
    pub fn new(
        state: &'a ChatState,
        text: &'a mut String,
        picker: &'a mut ImagePicker,
        media: &'a MediaStore,
        images: &'a mut ImageCache,
        playing: &'a NowPlaying,
        theme: &'a Theme,
    ) -> Self {
        Self {
            state,
            text,
            picker,
            media,
            images,
            playing,
            theme,
        }
    }

    pub fn show(mut self, ui: &mut Ui) -> InputBarOutput {
        let mut out = InputBarOutput::default();

        self.previews(ui, &mut out);

        if self.state.recording.is_recording() {
            Waveform::new(&self.state.waveform, self.theme)
                .timer(self.state.recording_elapsed, self.state.max_recording)
                .show(ui);
        } else if self.state.recording.is_uploading() {
            ui.label(RichText::new("Sending recording...").color(self.theme.text_faint));
        }

        if self.picker.open {
            self.path_prompt(ui, &mut out);
        }

        ui.horizontal(|ui| {
            if ui
                .add_enabled(!self.state.recording.is_capture_active(), egui::Button::new("🖼"))
                .on_hover_text("Attach an image")
                .clicked()
            {
                self.picker.open = !self.picker.open;
            }

            if let Some(cmd) = RecordButton::new(self.state.recording, self.theme).show(ui) {
                out.commands.push(cmd);
            }

            let send_width = 40.0;
            let text_id = Id::new(TEXT_ID);

            // Plain Enter sends; it must be taken before the multiline field sees it
            let focused = ui.memory(|m| m.has_focus(text_id));
            let mut submit = false;
            if focused && ui.input(enter_action) == Some(EnterAction::Submit) {
                ui.input_mut(|i| i.consume_key(Modifiers::NONE, Key::Enter));
                submit = true;
            }

            let editable = !self.state.recording.is_recording();
            let response = ui.add_sized(
                [ui.available_width() - send_width, 32.0],
                TextEdit::multiline(&mut *self.text)
                    .id(text_id)
                    .hint_text(self.state.hint_text)
                    .desired_rows(1)
                    .interactive(editable),
            );
            if response.changed() {
                out.commands.push(ChatCommand::SetText(self.text.clone()));
            }

            let send = ui
                .add_enabled(
                    self.state.can_send,
                    egui::Button::new(RichText::new("➤").color(self.theme.text))
                        .fill(self.theme.accent)
                        .rounding(self.theme.control_rounding),
                )
                .on_hover_text("Send");
            if send.clicked() || submit {
                out.commands.push(ChatCommand::Submit);
            }
        });

        out
    }

    fn previews(&mut self, ui: &mut Ui, out: &mut InputBarOutput) {
        if let Some(image) = &self.state.draft.image {
            let texture = self.images.texture(ui.ctx(), self.media, &image.media);
            ui.horizontal(|ui| {
                if let Some(texture) = &texture {
                    let size = fit_within(texture.size_vec2(), THUMBNAIL);
                    ui.add(egui::Image::new((texture.id(), size)).rounding(self.theme.card_rounding));
                }
                ui.label(
                    RichText::new(format!("🖼 {} ({})", image.file_name, format_size(image.size)))
                        .color(self.theme.text_dim),
                );
                if ui.small_button("✕").on_hover_text("Remove image").clicked() {
                    out.commands.push(ChatCommand::ClearImage);
                }
            });
        }

        if let Some(pair) = &self.state.draft.audio {
            ui.horizontal(|ui| {
                for (label, media) in [("Your Recording", &pair.recording), ("AI Response", &pair.reply)] {
                    ui.label(RichText::new(label).small().color(self.theme.text_faint));
                    let icon = match self.playing.state_of(media) {
                        PlaybackState::Playing => "⏸",
                        _ => "▶",
                    };
                    if ui.small_button(icon).clicked() {
                        out.toggled = Some(media.clone());
                    }
                }
                if ui.small_button("✕").on_hover_text("Discard recording").clicked() {
                    out.commands.push(ChatCommand::DiscardAudio);
                }
            });
        }
    }

    fn path_prompt(&mut self, ui: &mut Ui, out: &mut InputBarOutput) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("Image file").small().color(self.theme.text_faint));
            let field = ui.add(
                TextEdit::singleline(&mut self.picker.path)
                    .hint_text("/path/to/image.png")
                    .desired_width(ui.available_width() - 120.0),
            );
            let entered = field.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
            if (ui.button("Attach").clicked() || entered) && !self.picker.path.trim().is_empty() {
                out.commands
                    .push(ChatCommand::PickFile(PathBuf::from(self.picker.path.trim())));
                self.picker.path.clear();
                self.picker.open = false;
            }
            if ui.button("Cancel").clicked() {
                self.picker.open = false;
            }
        });
    }
}

/// What a key press in the focused message field means this frame
fn enter_action(input: &InputState) -> Option<EnterAction> {
    input
        .key_pressed(Key::Enter)
        .then(|| EnterAction::for_modifiers(input.modifiers.any()))
}
