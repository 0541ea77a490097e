//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter can
//! remain agnostic of Macroquad's UI types.

use infiltration_core::MissionPhase;
use infiltration_rendering::Hud;
use macroquad::{
    color::{Color, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, Ui},
};

/// Outcome of drawing the HUD panel during the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct HudUiResult {
    /// Whether the restart button was pressed during this frame.
    pub restart_pressed: bool,
}

/// Layout of the HUD panel for the current frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HudUiContext {
    /// Top-left corner of the panel in screen coordinates.
    pub origin: Vec2,
    /// Panel dimensions in screen space.
    pub size: Vec2,
    /// Background colour of the panel.
    pub background: Color,
}

/// Renders the HUD panel: phase, score, carried objective and recent messages.
pub(crate) fn draw_hud_ui(ui: &mut Ui, hud: &Hud, context: HudUiContext) -> HudUiResult {
    let mut skin = ui.default_skin();
    skin.margin = 0.0;

    let window_style = ui
        .style_builder()
        .color(context.background)
        .color_hovered(context.background)
        .color_clicked(context.background)
        .color_inactive(context.background)
        .text_color(WHITE)
        .margin(RectOffset::new(12.0, 12.0, 12.0, 12.0))
        .build();
    skin.window_style = window_style;

    let label_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(0.0, 0.0, 2.0, 2.0))
        .build();
    skin.label_style = label_style;

    let button_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .color(Color::from_rgba(70, 70, 70, 255))
        .color_hovered(Color::from_rgba(96, 96, 96, 255))
        .color_clicked(Color::from_rgba(56, 56, 56, 255))
        .margin(RectOffset::new(0.0, 0.0, 6.0, 6.0))
        .build();
    skin.button_style = button_style;

    ui.push_skin(&skin);

    let mut restart_pressed = false;
    let _ = ui.window(hash!("hud"), context.origin, context.size, |ui| {
        ui.label(None, &phase_label(hud.phase));

        let score = match hud.score {
            Some(score) => format!("Security level: {score}"),
            None => "Security level: -".to_owned(),
        };
        ui.label(None, &score);

        let carried = if hud.holding_objective {
            "Objective: carried"
        } else {
            "Objective: not carried"
        };
        ui.label(None, carried);

        for message in &hud.messages {
            ui.label(None, message);
        }

        restart_pressed = ui.button(None, "Restart (R)");
    });

    ui.pop_skin();

    HudUiResult { restart_pressed }
}

fn phase_label(phase: MissionPhase) -> String {
    let name = match phase {
        MissionPhase::Menu => "Menu (R to start)",
        MissionPhase::Loading => "Loading",
        MissionPhase::Playing => "Infiltrating",
        MissionPhase::Won => "Mission complete",
        MissionPhase::Caught => "Caught",
    };
    format!("Phase: {name}")
}
