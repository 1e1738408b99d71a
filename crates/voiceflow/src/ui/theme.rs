//! Palette and metrics for the chat window

use egui::{Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Vec2, Visuals};

/// Colors, corner radii and spacing shared by all widgets
#[derive(Clone, Debug)]
pub struct Theme {
    /// Send button, hover and selection
    pub accent: Color32,
    pub danger: Color32,

    /// Window background
    pub panel: Color32,
    /// Cards and the waveform strip
    pub surface: Color32,
    /// Idle buttons and text fields
    pub raised: Color32,

    pub text: Color32,
    pub text_dim: Color32,
    pub text_faint: Color32,

    pub user_bubble: Color32,
    pub assistant_bubble: Color32,

    /// Record button and timer while the microphone is live
    pub recording: Color32,
    pub level_bar: Color32,
    pub level_idle: Color32,

    pub control_rounding: Rounding,
    pub bubble_rounding: Rounding,
    pub card_rounding: Rounding,

    /// Gap between stacked widgets
    pub gap: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        let teal = Color32::from_rgb(20, 184, 166);
        let slate = Color32::from_rgb(51, 65, 85);

        Self {
            accent: teal,
            danger: Color32::from_rgb(244, 63, 94),

            panel: Color32::from_rgb(15, 23, 42),
            surface: Color32::from_rgb(30, 41, 59),
            raised: slate,

            text: Color32::from_rgb(241, 245, 249),
            text_dim: Color32::from_rgb(203, 213, 225),
            text_faint: Color32::from_rgb(148, 163, 184),

            user_bubble: Color32::from_rgb(13, 148, 136),
            assistant_bubble: slate,

            recording: Color32::from_rgb(244, 63, 94),
            level_bar: teal,
            level_idle: Color32::from_rgb(71, 85, 105),

            control_rounding: Rounding::same(10.0),
            bubble_rounding: Rounding::same(16.0),
            card_rounding: Rounding::same(10.0),

            gap: 8.0,
        }
    }

    /// Install the palette and text sizes on `ctx`
    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = Visuals::dark();
        visuals.panel_fill = self.panel;
        visuals.window_fill = self.surface;
        visuals.extreme_bg_color = self.raised;
        visuals.window_rounding = self.card_rounding;
        visuals.window_stroke = Stroke::new(1.0, self.raised);
        visuals.selection.bg_fill = self.accent.gamma_multiply(0.35);
        visuals.selection.stroke = Stroke::new(1.0, self.accent);

        let widgets = &mut visuals.widgets;
        for (state, fill, ink) in [
            (&mut widgets.noninteractive, self.surface, self.text_faint),
            (&mut widgets.inactive, self.raised, self.text_dim),
            (&mut widgets.hovered, self.accent.gamma_multiply(0.7), self.text),
            (&mut widgets.active, self.accent, self.text),
        ] {
            state.bg_fill = fill;
            state.weak_bg_fill = fill;
            state.fg_stroke = Stroke::new(1.0, ink);
            state.rounding = self.control_rounding;
        }
        ctx.set_visuals(visuals);

        let mut style = (*ctx.style()).clone();
        style.spacing.item_spacing = Vec2::splat(self.gap);
        style.spacing.button_padding = Vec2::new(self.gap, self.gap / 2.0);
        for (text_style, size) in [
            (TextStyle::Heading, 19.0),
            (TextStyle::Body, 14.0),
            (TextStyle::Button, 14.0),
            (TextStyle::Small, 11.0),
        ] {
            style
                .text_styles
                .insert(text_style, FontId::new(size, FontFamily::Proportional));
        }
        ctx.set_style(style);
    }
}
