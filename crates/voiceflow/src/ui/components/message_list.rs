//! Conversation timeline
//!
//! A stateless projection of the log. The only thing it reports back is which
//! audio clip the user asked to play or pause.

use super::image_cache::fit_within;
use super::{format_size, ImageCache, NowPlaying};
use crate::audio::PlaybackState;
use crate::media::{MediaRef, MediaStore};
use crate::message::{Message, MessageKind};
use crate::ui::theme::Theme;
use egui::{Align, Layout, Margin, RichText, ScrollArea, Ui, Vec2};

/// Largest size an image is drawn at inside a bubble
const MAX_IMAGE: Vec2 = Vec2::new(260.0, 220.0);

pub struct MessageList<'a> {
    messages: &'a [Message],
    placeholder: Option<&'a Message>,
    media: &'a MediaStore,
    images: &'a mut ImageCache,
    playing: &'a NowPlaying,
    theme: &'a Theme,
}

impl<'a> MessageList<'a> {
    pub fn new(
        messages: &'a [Message],
        media: &'a MediaStore,
        images: &'a mut ImageCache,
        playing: &'a NowPlaying,
        theme: &'a Theme,
    ) -> Self {
        Self {
            messages,
            placeholder: None,
            media,
            images,
            playing,
            theme,
        }
    }

    /// Typing indicator rendered after the last entry
    pub fn placeholder(mut self, placeholder: Option<&'a Message>) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Returns the clip whose play button was clicked
    pub fn show(mut self, ui: &mut Ui) -> Option<MediaRef> {
        let mut toggled = None;

        ScrollArea::vertical()
            .auto_shrink([false; 2])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.add_space(self.theme.gap);
                for message in self.messages {
                    if let Some(media) = self.bubble(ui, message) {
                        toggled = Some(media);
                    }
                }
                if let Some(placeholder) = self.placeholder {
                    self.bubble(ui, placeholder);
                }
                ui.add_space(self.theme.gap);
            });

        toggled
    }

    fn bubble(&mut self, ui: &mut Ui, message: &Message) -> Option<MediaRef> {
        let (layout, fill) = if message.is_user() {
            (Layout::right_to_left(Align::Min), self.theme.user_bubble)
        } else {
            (Layout::left_to_right(Align::Min), self.theme.assistant_bubble)
        };
        let max_width = ui.available_width() * 0.7;
        let mut toggled = None;

        ui.with_layout(layout, |ui| {
            egui::Frame::none()
                .fill(fill)
                .rounding(self.theme.bubble_rounding)
                .inner_margin(Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    ui.set_max_width(max_width);
                    ui.vertical(|ui| {
                        if message.pending {
                            self.typing_dots(ui);
                            return;
                        }
                        toggled = self.body(ui, message);
                        ui.label(
                            RichText::new(
                                message
                                    .timestamp
                                    .with_timezone(&chrono::Local)
                                    .format("%H:%M")
                                    .to_string(),
                            )
                            .small()
                            .color(self.theme.text_faint),
                        );
                    });
                });
        });
        ui.add_space(4.0);

        toggled
    }

    fn body(&mut self, ui: &mut Ui, message: &Message) -> Option<MediaRef> {
        let mut toggled = None;

        match (message.kind, &message.media) {
            (MessageKind::Image, Some(media)) => {
                match self.images.texture(ui.ctx(), self.media, media) {
                    Some(texture) => {
                        let size = fit_within(texture.size_vec2(), MAX_IMAGE);
                        ui.add(
                            egui::Image::new((texture.id(), size))
                                .rounding(self.theme.card_rounding),
                        );
                    }
                    None => {
                        let detail = match self.media.get(media) {
                            Some(blob) => {
                                format!("🖼 {} · {}", blob.mime_type, format_size(blob.len()))
                            }
                            None => "🖼 image unavailable".to_string(),
                        };
                        ui.label(RichText::new(detail).color(self.theme.text_dim));
                    }
                }
            }
            (MessageKind::Audio, Some(media)) => {
                let label = match self.playing.state_of(media) {
                    PlaybackState::Playing => "⏸ Pause",
                    PlaybackState::Paused | PlaybackState::Stopped => "▶ Play",
                };
                ui.horizontal(|ui| {
                    if ui.button(label).clicked() {
                        toggled = Some(media.clone());
                    }
                    if let Some(blob) = self.media.get(media) {
                        ui.label(
                            RichText::new(format_size(blob.len()))
                                .small()
                                .color(self.theme.text_faint),
                        );
                    }
                });
            }
            _ => {}
        }

        if !message.content.is_empty() {
            ui.label(RichText::new(&message.content).color(self.theme.text));
        }

        toggled
    }

    fn typing_dots(&self, ui: &mut Ui) {
        let t = ui.ctx().input(|i| i.time);
        ui.horizontal(|ui| {
            for i in 0..3 {
                let phase = ((t * 4.0 - i as f64 * 0.6).sin() * 0.5 + 0.5) as f32;
                ui.label(
                    RichText::new("●")
                        .size(10.0)
                        .color(self.theme.text_faint.gamma_multiply(0.4 + phase * 0.6)),
                );
            }
        });
        ui.ctx().request_repaint();
    }
}
