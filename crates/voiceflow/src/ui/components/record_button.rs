//! Microphone toggle

use crate::capture::RecordingState;
use crate::state::ChatCommand;
use crate::ui::theme::Theme;
use egui::{Color32, Rect, Sense, Vec2};

/// Round button that starts and stops recording
///
/// Click toggles, right-click cancels a live recording. Disabled while the
/// clip uploads.
pub struct RecordButton<'a> {
    state: RecordingState,
    theme: &'a Theme,
    radius: f32,
}

impl<'a> RecordButton<'a> {
    pub fn new(state: RecordingState, theme: &'a Theme) -> Self {
        Self {
            state,
            theme,
            radius: 18.0,
        }
    }

    pub fn show(self, ui: &mut egui::Ui) -> Option<ChatCommand> {
        let size = Vec2::splat(self.radius * 2.0 + 4.0);
        let sense = if self.state.is_uploading() {
            Sense::hover()
        } else {
            Sense::click()
        };
        let (rect, response) = ui.allocate_exact_size(size, sense);

        if ui.is_rect_visible(rect) {
            self.paint(ui, rect, &response);
        }

        let tooltip = match self.state {
            RecordingState::Recording => "Click to stop\nRight-click to cancel",
            RecordingState::Uploading => "Sending recording...",
            _ => "Record a voice message",
        };
        let response = response.on_hover_text(tooltip);

        if response.clicked() {
            Some(ChatCommand::ToggleRecord)
        } else if response.secondary_clicked() && self.state.is_recording() {
            Some(ChatCommand::CancelRecording)
        } else {
            None
        }
    }

    fn paint(&self, ui: &egui::Ui, rect: Rect, response: &egui::Response) {
        let painter = ui.painter();
        let center = rect.center();

        let bg = match self.state {
            RecordingState::Recording => self.theme.recording,
            RecordingState::Uploading => self.theme.raised,
            _ if response.hovered() => self.theme.accent.gamma_multiply(0.8),
            _ => self.theme.raised,
        };
        painter.circle_filled(center, self.radius, bg);

        match self.state {
            RecordingState::Recording => {
                painter.rect_filled(
                    Rect::from_center_size(center, Vec2::splat(10.0)),
                    2.0,
                    Color32::WHITE,
                );
                self.paint_pulse(ui, center);
            }
            RecordingState::Uploading => self.paint_spinner(ui, center),
            _ => self.paint_mic(painter, center),
        }
    }

    fn paint_mic(&self, painter: &egui::Painter, center: egui::Pos2) {
        let color = self.theme.text;
        let body = Rect::from_center_size(egui::pos2(center.x, center.y - 3.0), Vec2::new(6.0, 11.0));
        painter.rect_filled(body, 3.0, color);

        let arc_center = egui::pos2(center.x, center.y);
        let arc_radius = 7.0;
        let segments = 8;
        for i in 0..segments {
            let a0 = std::f32::consts::PI * (i as f32 / segments as f32);
            let a1 = std::f32::consts::PI * ((i + 1) as f32 / segments as f32);
            painter.line_segment(
                [
                    egui::pos2(arc_center.x - arc_radius * a0.cos(), arc_center.y + arc_radius * a0.sin()),
                    egui::pos2(arc_center.x - arc_radius * a1.cos(), arc_center.y + arc_radius * a1.sin()),
                ],
                egui::Stroke::new(1.5, color),
            );
        }
        painter.line_segment(
            [
                egui::pos2(center.x, center.y + arc_radius),
                egui::pos2(center.x, center.y + arc_radius + 4.0),
            ],
            egui::Stroke::new(1.5, color),
        );
    }

    fn paint_pulse(&self, ui: &egui::Ui, center: egui::Pos2) {
        let t = ui.ctx().input(|i| i.time);
        let pulse = ((t * 3.0).sin() * 0.5 + 0.5) as f32;
        ui.painter().circle_stroke(
            center,
            self.radius + 2.0 + pulse * 5.0,
            egui::Stroke::new(1.5 + pulse, self.theme.recording.gamma_multiply((1.0 - pulse) * 0.6)),
        );
        ui.ctx().request_repaint();
    }

    fn paint_spinner(&self, ui: &egui::Ui, center: egui::Pos2) {
        let t = ui.ctx().input(|i| i.time);
        for i in 0..3 {
            let angle = t * 3.0 + i as f64 * std::f64::consts::TAU / 3.0;
            let pos = egui::pos2(
                center.x + angle.cos() as f32 * 7.0,
                center.y + angle.sin() as f32 * 7.0,
            );
            let alpha = 1.0 - i as f32 * 0.3;
            ui.painter()
                .circle_filled(pos, 2.5, Color32::from_white_alpha((255.0 * alpha) as u8));
        }
        ui.ctx().request_repaint();
    }
}
