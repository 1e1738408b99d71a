//! Live input level while recording

use crate::ui::theme::Theme;
use egui::{Pos2, Rect, Stroke, Vec2};
use std::time::Duration;

/// Bar-style waveform of the most recent microphone samples
pub struct Waveform<'a> {
    samples: &'a [f32],
    theme: &'a Theme,
    height: f32,
    elapsed: Duration,
    ceiling: Duration,
}

impl<'a> Waveform<'a> {
    pub fn new(samples: &'a [f32], theme: &'a Theme) -> Self {
        Self {
            samples,
            theme,
            height: 36.0,
            elapsed: Duration::ZERO,
            ceiling: Duration::from_secs(30),
        }
    }

    /// Show `elapsed / ceiling` next to the bars
    pub fn timer(mut self, elapsed: Duration, ceiling: Duration) -> Self {
        self.elapsed = elapsed;
        self.ceiling = ceiling;
        self
    }

    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        let desired_size = Vec2::new(ui.available_width(), self.height);
        let (rect, response) = ui.allocate_exact_size(desired_size, egui::Sense::hover());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            painter.rect_filled(rect, self.theme.card_rounding, self.theme.surface);

            let label_width = 90.0;
            let bars = Rect::from_min_max(rect.min, Pos2::new(rect.right() - label_width, rect.bottom()));
            if self.samples.is_empty() {
                let center_y = bars.center().y;
                painter.line_segment(
                    [
                        Pos2::new(bars.left() + 8.0, center_y),
                        Pos2::new(bars.right() - 8.0, center_y),
                    ],
                    Stroke::new(1.0, self.theme.level_idle),
                );
            } else {
                self.draw_bars(ui, bars);
            }

            painter.text(
                Pos2::new(rect.right() - 8.0, rect.center().y),
                egui::Align2::RIGHT_CENTER,
                format!(
                    "{} / {}",
                    format_clock(self.elapsed),
                    format_clock(self.ceiling)
                ),
                egui::FontId::monospace(12.0),
                self.theme.recording,
            );
        }

        response
    }

    fn draw_bars(&self, ui: &egui::Ui, rect: Rect) {
        let painter = ui.painter();
        let draw_rect = rect.shrink(6.0);
        let center_y = draw_rect.center().y;
        let max_height = draw_rect.height();

        let bar_count = 48;
        let samples_per_bar = (self.samples.len() / bar_count).max(1);
        let bar_width = draw_rect.width() / bar_count as f32;

        for (i, chunk) in self.samples.chunks(samples_per_bar).take(bar_count).enumerate() {
            let x = draw_rect.left() + i as f32 * bar_width;
            let bar_height = (rms(chunk) * max_height * 4.0).clamp(2.0, max_height);
            let bar = Rect::from_center_size(
                Pos2::new(x + bar_width / 2.0, center_y),
                Vec2::new((bar_width - 1.0).max(1.0), bar_height),
            );
            painter.rect_filled(bar, 1.0, self.theme.level_bar);
        }
    }
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// `m:ss`
fn format_clock(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
