#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for the infiltration mini-game.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, so the adapter depends on macroquad without its default `audio`
//! feature. The HUD panel uses Macroquad's immediate-mode UI module; all
//! UI-specific calls live inside the local `ui` module.

mod ui;

use self::ui::{draw_hud_ui, HudUiContext, HudUiResult};
use anyhow::Result;
use glam::Vec2;
use infiltration_core::HeldKeys;
use infiltration_rendering::{
    FrameInput, GuardPresentation, MarkerPresentation, MissionScene, Presentation,
    RenderingBackend, Scene,
};
use macroquad::input::{is_key_down, is_key_pressed, KeyCode};
use macroquad::math::Vec2 as MacroquadVec2;
use std::time::Duration;

/// Width of the HUD panel in screen pixels.
const HUD_WIDTH: f32 = 240.0;
/// Number of triangles used to approximate a view cone.
const CONE_SEGMENTS: u32 = 16;

/// Tracks UI-sourced interactions so they can be merged with physical input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct HudInputState {
    restart_latched: bool,
}

impl HudInputState {
    /// Returns whether the UI requested a restart and clears the latch so the
    /// action fires only once.
    pub fn take_restart(&mut self) -> bool {
        std::mem::take(&mut self.restart_latched)
    }

    /// Records a restart request issued by the UI.
    pub fn register_restart(&mut self) {
        self.restart_latched = true;
    }
}

/// Raw key states sampled from the window on a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct KeyboardObservations {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    abort: bool,
    restart: bool,
    quit: bool,
}

impl KeyboardObservations {
    fn poll() -> Self {
        Self {
            up: is_key_down(KeyCode::W) || is_key_down(KeyCode::Up),
            down: is_key_down(KeyCode::S) || is_key_down(KeyCode::Down),
            left: is_key_down(KeyCode::A) || is_key_down(KeyCode::Left),
            right: is_key_down(KeyCode::D) || is_key_down(KeyCode::Right),
            abort: is_key_pressed(KeyCode::Escape),
            restart: is_key_pressed(KeyCode::R) || is_key_pressed(KeyCode::Enter),
            quit: is_key_pressed(KeyCode::Q),
        }
    }
}

fn frame_input_from_observations(
    observations: KeyboardObservations,
    ui_restart: bool,
) -> FrameInput {
    FrameInput {
        held: HeldKeys {
            up: observations.up,
            down: observations.down,
            left: observations.left,
            right: observations.right,
        },
        abort: observations.abort,
        restart: observations.restart || ui_restart,
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    window_size: (i32, i32),
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            window_size: (1200, 800),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(mut self, enabled: bool) -> Self {
        self.swap_interval = if enabled { Some(1) } else { Some(0) };
        self
    }

    /// Configures the initial window size in pixels.
    #[must_use]
    pub fn with_window_size(mut self, width: i32, height: i32) -> Self {
        self.window_size = (width.max(1), height.max(1));
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            window_size,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: window_size.0,
            window_height: window_size.1,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut hud_input = HudInputState::default();

            loop {
                let keyboard = KeyboardObservations::poll();
                if keyboard.quit {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input =
                    frame_input_from_observations(keyboard, hud_input.take_restart());

                update_scene(frame_dt, frame_input, &mut scene);

                let metrics = SceneMetrics::from_scene(&scene, screen_width, screen_height);
                if let Some(mission) = &scene.mission {
                    draw_mission(mission, &scene, &metrics);
                }

                let mut hud_ui = macroquad::ui::root_ui();
                let HudUiResult { restart_pressed } = draw_hud_ui(
                    &mut hud_ui,
                    &scene.hud,
                    HudUiContext {
                        origin: MacroquadVec2::new((screen_width - HUD_WIDTH).max(0.0), 0.0),
                        size: MacroquadVec2::new(HUD_WIDTH.min(screen_width), screen_height),
                        background: macroquad::color::Color::from_rgba(24, 24, 32, 230),
                    },
                );
                if restart_pressed {
                    hud_input.register_restart();
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Maps viewport coordinates onto the part of the screen left of the HUD.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    offset: Vec2,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let available = Vec2::new((screen_width - HUD_WIDTH).max(0.0), screen_height.max(0.0));
        let viewport = scene.viewport.max(Vec2::splat(1.0));
        let scale = (available.x / viewport.x).min(available.y / viewport.y).max(0.0);
        let offset = (available - viewport * scale) * 0.5;
        Self { scale, offset }
    }

    fn to_screen(&self, scene: &Scene, world: Vec2) -> Vec2 {
        self.offset + scene.to_view(world) * self.scale
    }
}

fn draw_mission(mission: &MissionScene, scene: &Scene, metrics: &SceneMetrics) {
    let grid = &mission.tile_grid;
    let origin = metrics.to_screen(scene, Vec2::ZERO);
    macroquad::shapes::draw_rectangle(
        origin.x,
        origin.y,
        grid.width() * metrics.scale,
        grid.height() * metrics.scale,
        to_macroquad_color(grid.floor_color),
    );

    let tile_step = grid.tile_size * metrics.scale;
    let wall_color = to_macroquad_color(grid.wall_color);
    for (column, row) in grid.solid_tiles() {
        let corner = Vec2::new(column as f32, row as f32) * grid.tile_size;
        let screen = metrics.to_screen(scene, corner);
        macroquad::shapes::draw_rectangle(screen.x, screen.y, tile_step, tile_step, wall_color);
    }

    draw_marker(&mission.extraction, scene, metrics);
    if let Some(objective) = &mission.objective {
        draw_marker(objective, scene, metrics);
    }

    for guard in &mission.guards {
        draw_view_cone(guard, scene, metrics);
    }
    for guard in &mission.guards {
        let center = metrics.to_screen(scene, guard.position);
        macroquad::shapes::draw_circle(
            center.x,
            center.y,
            guard.radius * metrics.scale,
            to_macroquad_color(guard.color),
        );
    }

    let player = &mission.player;
    let center = metrics.to_screen(scene, player.position);
    let radius = player.radius * metrics.scale;
    macroquad::shapes::draw_circle(center.x, center.y, radius, to_macroquad_color(player.color));
    if player.holding_objective {
        macroquad::shapes::draw_circle_lines(
            center.x,
            center.y,
            radius,
            2.0,
            macroquad::color::YELLOW,
        );
    }
}

fn draw_marker(marker: &MarkerPresentation, scene: &Scene, metrics: &SceneMetrics) {
    let center = metrics.to_screen(scene, marker.center);
    macroquad::shapes::draw_circle(
        center.x,
        center.y,
        marker.radius * metrics.scale,
        to_macroquad_color(marker.color),
    );
}

fn draw_view_cone(guard: &GuardPresentation, scene: &Scene, metrics: &SceneMetrics) {
    let apex = metrics.to_screen(scene, guard.position);
    let color = to_macroquad_color(guard.cone_color);
    for (from, to) in cone_segments(guard) {
        let from = metrics.to_screen(scene, from);
        let to = metrics.to_screen(scene, to);
        macroquad::shapes::draw_triangle(
            MacroquadVec2::new(apex.x, apex.y),
            MacroquadVec2::new(from.x, from.y),
            MacroquadVec2::new(to.x, to.y),
            color,
        );
    }
}

/// Outer arc of the view cone split into consecutive world-space chords.
fn cone_segments(guard: &GuardPresentation) -> Vec<(Vec2, Vec2)> {
    let start = guard.facing - guard.fov_angle * 0.5;
    let step = guard.fov_angle / CONE_SEGMENTS as f32;
    let point = |index: u32| {
        guard.position + Vec2::from_angle(start + step * index as f32) * guard.fov_range
    };
    (0..CONE_SEGMENTS)
        .map(|index| (point(index), point(index + 1)))
        .collect()
}

fn to_macroquad_color(color: infiltration_rendering::Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
