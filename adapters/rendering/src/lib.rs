#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for infiltration adapters.

mod hud;

use anyhow::Result as AnyResult;
use glam::Vec2;
use infiltration_core::{GuardId, HeldKeys, MissionPhase, MissionSnapshot, Tile, TileMapView};
use std::{error::Error, fmt, time::Duration};

pub use hud::{HudLog, HudMessage};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with the provided alpha.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Colors used to draw a mission.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Walkable floor tiles.
    pub floor: Color,
    /// Wall tiles.
    pub wall: Color,
    /// Player body.
    pub player: Color,
    /// Guard bodies.
    pub guard: Color,
    /// Guard view cones.
    pub view_cone: Color,
    /// Objective item.
    pub objective: Color,
    /// Extraction zone.
    pub extraction: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            floor: Color::from_rgb_u8(46, 52, 64),
            wall: Color::from_rgb_u8(20, 22, 28),
            player: Color::from_rgb_u8(94, 196, 255),
            guard: Color::from_rgb_u8(226, 88, 72),
            view_cone: Color::from_rgb_u8(255, 214, 102).with_alpha(0.25),
            objective: Color::from_rgb_u8(250, 204, 21),
            extraction: Color::from_rgb_u8(74, 222, 128).with_alpha(0.35),
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Movement keys held on this frame.
    pub held: HeldKeys,
    /// Whether the adapter detected an abort request on this frame.
    pub abort: bool,
    /// Whether the adapter detected a restart request on this frame.
    pub restart: bool,
}

/// Tile grid of a mission, ready to be drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Length of a tile edge in world units.
    pub tile_size: f32,
    /// Row-major tile contents.
    pub cells: Vec<Tile>,
    /// Color of open tiles.
    pub floor_color: Color,
    /// Color of solid tiles.
    pub wall_color: Color,
}

impl TileGridPresentation {
    /// Captures the provided tile map.
    pub fn from_view(
        map: &TileMapView<'_>,
        floor_color: Color,
        wall_color: Color,
    ) -> Result<Self, RenderingError> {
        let tile_size = map.tile_size();
        if !(tile_size > 0.0) || !tile_size.is_finite() {
            return Err(RenderingError::InvalidTileSize { tile_size });
        }

        Ok(Self {
            columns: map.columns(),
            rows: map.rows(),
            tile_size,
            cells: map.iter().collect(),
            floor_color,
            wall_color,
        })
    }

    /// Width of the grid in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_size
    }

    /// Height of the grid in world units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_size
    }

    /// Iterates over the solid tiles as `(column, row)` pairs.
    pub fn solid_tiles(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let columns = self.columns.max(1);
        self.cells
            .iter()
            .zip(0_u32..)
            .filter(|(tile, _)| **tile == Tile::Solid)
            .map(move |(_, index)| (index % columns, index / columns))
    }
}

/// Player body as drawn on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerPresentation {
    /// Center in world units.
    pub position: Vec2,
    /// Body radius in world units.
    pub radius: f32,
    /// Whether the player carries the objective.
    pub holding_objective: bool,
    /// Fill color.
    pub color: Color,
}

/// Guard body and view cone as drawn on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GuardPresentation {
    /// Identifier allocated to the guard by the world.
    pub id: GuardId,
    /// Center in world units.
    pub position: Vec2,
    /// Body radius in world units.
    pub radius: f32,
    /// Facing angle in radians.
    pub facing: f32,
    /// Full opening angle of the view cone in radians.
    pub fov_angle: f32,
    /// Length of the view cone in world units.
    pub fov_range: f32,
    /// Body color.
    pub color: Color,
    /// View cone color.
    pub cone_color: Color,
}

impl GuardPresentation {
    /// Endpoints of the view cone's outer edges, counter-clockwise first.
    #[must_use]
    pub fn cone_edges(&self) -> (Vec2, Vec2) {
        let half = self.fov_angle * 0.5;
        let edge = |angle: f32| self.position + Vec2::from_angle(angle) * self.fov_range;
        (edge(self.facing - half), edge(self.facing + half))
    }
}

/// Circular marker such as the objective or the extraction zone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerPresentation {
    /// Center in world units.
    pub center: Vec2,
    /// Radius in world units.
    pub radius: f32,
    /// Fill color.
    pub color: Color,
}

/// Everything drawn for a loaded mission.
#[derive(Clone, Debug, PartialEq)]
pub struct MissionScene {
    /// Tile grid of the level.
    pub tile_grid: TileGridPresentation,
    /// Player body.
    pub player: PlayerPresentation,
    /// Guards in ascending id order.
    pub guards: Vec<GuardPresentation>,
    /// Objective item; hidden while the player holds it.
    pub objective: Option<MarkerPresentation>,
    /// Extraction zone.
    pub extraction: MarkerPresentation,
}

/// Heads-up display content.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hud {
    /// Current phase of the mission state machine.
    pub phase: MissionPhase,
    /// Remaining security level, when a mission is loaded.
    pub score: Option<u32>,
    /// Whether the player carries the objective.
    pub holding_objective: bool,
    /// Transient messages, oldest first.
    pub messages: Vec<String>,
}

/// Scene description combining the camera, the mission and the HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Size of the visible area in world units.
    pub viewport: Vec2,
    /// World position of the viewport's top-left corner.
    pub camera_offset: Vec2,
    /// Mission content, absent while in the menu.
    pub mission: Option<MissionScene>,
    /// Heads-up display.
    pub hud: Hud,
}

impl Scene {
    /// Creates an empty scene showing only the HUD.
    #[must_use]
    pub fn empty(viewport: Vec2) -> Self {
        Self {
            viewport,
            camera_offset: Vec2::ZERO,
            mission: None,
            hud: Hud::default(),
        }
    }

    /// Captures a mission snapshot into drawable descriptors.
    pub fn capture(
        &mut self,
        mission: &MissionSnapshot,
        map: &TileMapView<'_>,
        camera_offset: Vec2,
        palette: &Palette,
    ) -> Result<(), RenderingError> {
        let tile_grid = TileGridPresentation::from_view(map, palette.floor, palette.wall)?;
        let guards = mission
            .guards
            .iter()
            .map(|guard| GuardPresentation {
                id: guard.id,
                position: guard.position,
                radius: guard.radius,
                facing: guard.facing,
                fov_angle: guard.fov_angle,
                fov_range: guard.fov_range,
                color: palette.guard,
                cone_color: palette.view_cone,
            })
            .collect();

        let objective = (!mission.player.holding_objective).then_some(MarkerPresentation {
            center: mission.objective,
            radius: mission.objective_radius,
            color: palette.objective,
        });

        self.camera_offset = camera_offset;
        self.mission = Some(MissionScene {
            tile_grid,
            player: PlayerPresentation {
                position: mission.player.position,
                radius: mission.player.radius,
                holding_objective: mission.player.holding_objective,
                color: palette.player,
            },
            guards,
            objective,
            extraction: MarkerPresentation {
                center: mission.extraction,
                radius: mission.extraction_radius,
                color: palette.extraction,
            },
        });
        self.hud.phase = mission.phase;
        self.hud.score = Some(mission.score);
        self.hud.holding_objective = mission.player.holding_objective;
        Ok(())
    }

    /// Drops mission content, keeping the HUD messages.
    pub fn clear_mission(&mut self, phase: MissionPhase) {
        self.mission = None;
        self.camera_offset = Vec2::ZERO;
        self.hud.phase = phase;
        self.hud.score = None;
        self.hud.holding_objective = false;
    }

    /// Converts a world-space point into viewport coordinates.
    #[must_use]
    pub fn to_view(&self, world: Vec2) -> Vec2 {
        world - self.camera_offset
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting infiltration scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// per-frame input captured by the adapter, and updates the scene before it
    /// is rendered. Simulation stays inside the closure; backends only draw.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Tile edges must be positive and finite.
    InvalidTileSize {
        /// Provided tile size that failed validation.
        tile_size: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileSize { tile_size } => {
                write!(f, "tile size must be positive (received {tile_size})")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use infiltration_core::{GuardSnapshot, GuardView, PlayerSnapshot};

    fn cells() -> Vec<Tile> {
        // 3x2: solid border on the left column only.
        vec![
            Tile::Solid,
            Tile::Open,
            Tile::Open,
            Tile::Solid,
            Tile::Open,
            Tile::Open,
        ]
    }

    fn snapshot(holding: bool) -> MissionSnapshot {
        MissionSnapshot {
            phase: MissionPhase::Playing,
            score: 60,
            elapsed: Duration::from_secs(2),
            player: PlayerSnapshot {
                position: Vec2::new(60.0, 20.0),
                radius: 12.0,
                holding_objective: holding,
            },
            objective: Vec2::new(100.0, 60.0),
            objective_radius: 10.0,
            pickup_tolerance: 5.0,
            extraction: Vec2::new(60.0, 20.0),
            extraction_radius: 30.0,
            guards: GuardView::from_snapshots(vec![GuardSnapshot {
                id: GuardId::new(3),
                room: 0,
                position: Vec2::new(100.0, 20.0),
                velocity: Vec2::Y,
                facing: std::f32::consts::FRAC_PI_2,
                speed: 60.0,
                radius: 12.0,
                fov_angle: std::f32::consts::FRAC_PI_2,
                fov_range: 100.0,
            }]),
        }
    }

    #[test]
    fn capture_copies_the_mission_into_the_scene() {
        let cells = cells();
        let map = TileMapView::new(&cells, 3, 2, 40.0);
        let mut scene = Scene::empty(Vec2::new(320.0, 240.0));
        scene
            .capture(&snapshot(false), &map, Vec2::new(5.0, 0.0), &Palette::default())
            .expect("valid map");

        let mission = scene.mission.as_ref().expect("mission captured");
        assert_eq!(mission.tile_grid.width(), 120.0);
        assert_eq!(
            mission.tile_grid.solid_tiles().collect::<Vec<_>>(),
            vec![(0, 0), (0, 1)]
        );
        assert_eq!(mission.guards.len(), 1);
        assert!(mission.objective.is_some());
        assert_eq!(scene.hud.score, Some(60));
        assert_eq!(scene.to_view(Vec2::new(5.0, 0.0)), Vec2::ZERO);
    }

    #[test]
    fn held_objective_is_hidden() {
        let cells = cells();
        let map = TileMapView::new(&cells, 3, 2, 40.0);
        let mut scene = Scene::empty(Vec2::new(320.0, 240.0));
        scene
            .capture(&snapshot(true), &map, Vec2::ZERO, &Palette::default())
            .expect("valid map");

        let mission = scene.mission.as_ref().expect("mission captured");
        assert!(mission.objective.is_none());
        assert!(scene.hud.holding_objective);
    }

    #[test]
    fn zero_tile_size_is_rejected_without_panicking() {
        let cells = cells();
        let map = TileMapView::new(&cells, 3, 2, 0.0);
        let palette = Palette::default();
        let error = TileGridPresentation::from_view(&map, palette.floor, palette.wall)
            .expect_err("zero tile size must be rejected");

        assert_eq!(error, RenderingError::InvalidTileSize { tile_size: 0.0 });
    }

    #[test]
    fn cone_edges_straddle_the_facing() {
        let guard = snapshot(false).guards.into_vec()[0];
        let presentation = GuardPresentation {
            id: guard.id,
            position: guard.position,
            radius: guard.radius,
            facing: guard.facing,
            fov_angle: guard.fov_angle,
            fov_range: guard.fov_range,
            color: Palette::default().guard,
            cone_color: Palette::default().view_cone,
        };
        let (left, right) = presentation.cone_edges();

        assert!((left.y - right.y).abs() < 1e-3);
        assert!(left.x > right.x);
        assert!((left.distance(guard.position) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn clearing_the_mission_resets_the_hud() {
        let cells = cells();
        let map = TileMapView::new(&cells, 3, 2, 40.0);
        let mut scene = Scene::empty(Vec2::new(320.0, 240.0));
        scene
            .capture(&snapshot(true), &map, Vec2::ZERO, &Palette::default())
            .expect("valid map");
        scene.clear_mission(MissionPhase::Menu);

        assert!(scene.mission.is_none());
        assert_eq!(scene.hud.score, None);
        assert_eq!(scene.hud.phase, MissionPhase::Menu);
    }

    #[test]
    fn lighten_moves_channels_towards_white() {
        let color = Color::from_rgb_u8(0, 128, 255).lighten(0.5);

        assert!((color.red - 0.5).abs() < 1e-6);
        assert!((color.blue - 1.0).abs() < 1e-6);
    }
}
