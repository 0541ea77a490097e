#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the infiltration engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots such as [`MissionSnapshot`] and [`TileMapView`], and respond
//! exclusively with new command batches.

mod level;

use std::time::Duration;

use glam::Vec2;

pub use level::{
    DetectionPolicy, LevelConfig, LevelError, MissionTuning, TileRect, MAX_GRID_CELLS, MAX_GUARDS,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Infiltration: get in, grab the package, get out unseen.";

/// Nominal duration of a single simulation frame.
pub const FRAME_DT: Duration = Duration::from_nanos(16_666_667);

/// Lifecycle phase of the mission state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MissionPhase {
    /// No mission is loaded; waiting for a level selection.
    #[default]
    Menu,
    /// A level was selected and the mission is being constructed.
    Loading,
    /// The mission is running and accepts per-frame commands.
    Playing,
    /// The player extracted with the objective.
    Won,
    /// The player was spotted under the hard-fail detection policy.
    Caught,
}

impl MissionPhase {
    /// Reports whether the phase ends the mission.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Caught)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Loads the provided level and starts a mission.
    SelectLevel {
        /// Level to build the mission from.
        level: LevelConfig,
        /// Seed for the mission's pseudo-random generator.
        seed: u64,
    },
    /// Moves the player along a normalized direction for the given frame time.
    MovePlayer {
        /// Direction of travel, either zero or unit length.
        direction: Vec2,
        /// Duration of simulated time covered by the displacement.
        dt: Duration,
    },
    /// Advances the mission clock and every guard by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Reports that a guard currently sees the player.
    ReportSighting {
        /// Guard that spotted the player.
        guard: GuardId,
    },
    /// Requests that the player pick up the objective.
    CollectObjective,
    /// Requests that the player leave through the extraction zone.
    Extract,
    /// Abandons any mission and returns to the menu.
    Abort,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that the mission state machine entered a new phase.
    PhaseChanged {
        /// Phase that became active.
        phase: MissionPhase,
    },
    /// Reports that a level selection was refused.
    LevelRejected {
        /// Validation failure that prevented the mission from starting.
        reason: LevelError,
    },
    /// Confirms that a mission was constructed from a level.
    MissionStarted {
        /// Spawn point of the player.
        player: Vec2,
        /// Location of the objective item.
        objective: Vec2,
        /// Center of the extraction zone.
        extraction: Vec2,
        /// Number of guards placed on the map.
        guards: u32,
        /// Score the mission starts with.
        score: u32,
    },
    /// Confirms the player's position after collision resolution.
    PlayerMoved {
        /// Position before the move.
        from: Vec2,
        /// Position after the move.
        to: Vec2,
    },
    /// Indicates that the mission clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// The player picked up the objective.
    ObjectiveAcquired {
        /// Where the objective was collected.
        position: Vec2,
    },
    /// A guard spotted the player and the detection policy was applied.
    PlayerSpotted {
        /// Guard that spotted the player.
        guard: GuardId,
        /// Score remaining after the penalty.
        score: u32,
    },
    /// The player extracted with the objective.
    MissionWon {
        /// Final score.
        score: u32,
    },
    /// The mission ended because the player was caught.
    MissionFailed {
        /// Final score.
        score: u32,
    },
    /// The running mission was discarded.
    MissionAborted,
}

/// Unique identifier assigned to a guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GuardId(u32);

impl GuardId {
    /// Creates a new guard identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Movement keys held during a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct HeldKeys {
    /// Toward decreasing `y`.
    pub up: bool,
    /// Toward increasing `y`.
    pub down: bool,
    /// Toward decreasing `x`.
    pub left: bool,
    /// Toward increasing `x`.
    pub right: bool,
}

/// Content of a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tile {
    /// Walkable floor that does not block sight.
    Open = 0,
    /// Wall that blocks movement and sight.
    Solid = 1,
}

/// Read-only view into the tile grid of a running mission.
///
/// Every coordinate outside the grid reads as [`Tile::Solid`].
#[derive(Clone, Copy, Debug)]
pub struct TileMapView<'a> {
    cells: &'a [Tile],
    columns: u32,
    rows: u32,
    tile_size: f32,
}

impl<'a> TileMapView<'a> {
    /// Captures a view backed by row-major `cells`.
    #[must_use]
    pub fn new(cells: &'a [Tile], columns: u32, rows: u32, tile_size: f32) -> Self {
        Self {
            cells,
            columns,
            rows,
            tile_size,
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Length of a tile edge in world units.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Size of the whole grid in world units.
    #[must_use]
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(self.columns as f32, self.rows as f32) * self.tile_size
    }

    /// Returns the tile at the provided indices, if they lie inside the grid.
    #[must_use]
    pub fn tile(&self, column: i64, row: i64) -> Option<Tile> {
        if column < 0 || row < 0 || column >= i64::from(self.columns) || row >= i64::from(self.rows)
        {
            return None;
        }
        let index = usize::try_from(row * i64::from(self.columns) + column).ok()?;
        self.cells.get(index).copied()
    }

    /// Reports whether the tile at the provided indices blocks movement and sight.
    #[must_use]
    pub fn is_solid_tile(&self, column: i64, row: i64) -> bool {
        self.tile(column, row).map_or(true, |tile| tile == Tile::Solid)
    }

    /// Reports whether the world-space point falls inside a solid tile.
    #[must_use]
    pub fn is_solid(&self, point: Vec2) -> bool {
        if !(self.tile_size > 0.0) || !point.is_finite() {
            return true;
        }
        let column = (point.x / self.tile_size).floor();
        let row = (point.y / self.tile_size).floor();
        self.is_solid_tile(column as i64, row as i64)
    }

    /// Iterates over every tile in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Tile> + 'a {
        self.cells.iter().copied()
    }
}

/// Immutable representation of the player body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Position of the body center.
    pub position: Vec2,
    /// Collision radius.
    pub radius: f32,
    /// Whether the player carries the objective.
    pub holding_objective: bool,
}

/// Immutable representation of a single guard used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GuardSnapshot {
    /// Unique identifier assigned to the guard.
    pub id: GuardId,
    /// Index of the room the guard patrols.
    pub room: usize,
    /// Position of the guard center.
    pub position: Vec2,
    /// Unit direction of travel.
    pub velocity: Vec2,
    /// Facing angle in radians, derived from the velocity.
    pub facing: f32,
    /// Scalar speed in world units per second.
    pub speed: f32,
    /// Collision radius.
    pub radius: f32,
    /// Full opening angle of the view cone in radians.
    pub fov_angle: f32,
    /// Maximum sight distance.
    pub fov_range: f32,
}

/// Read-only snapshot describing all guards in the mission.
#[derive(Clone, Debug, Default)]
pub struct GuardView {
    snapshots: Vec<GuardSnapshot>,
}

impl GuardView {
    /// Creates a new guard view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<GuardSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured guard snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &GuardSnapshot> {
        self.snapshots.iter()
    }

    /// Number of guards captured in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no guards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<GuardSnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot of a running mission handed to systems and renderers.
#[derive(Clone, Debug)]
pub struct MissionSnapshot {
    /// Current phase of the mission state machine.
    pub phase: MissionPhase,
    /// Remaining security level.
    pub score: u32,
    /// Simulated time since the mission started.
    pub elapsed: Duration,
    /// Player body state.
    pub player: PlayerSnapshot,
    /// Location of the objective item.
    pub objective: Vec2,
    /// Pickup radius of the objective.
    pub objective_radius: f32,
    /// Slack added to the pickup distance.
    pub pickup_tolerance: f32,
    /// Center of the extraction zone.
    pub extraction: Vec2,
    /// Radius of the extraction zone.
    pub extraction_radius: f32,
    /// Guards patrolling the mission.
    pub guards: GuardView,
}

impl MissionSnapshot {
    /// Reports whether the player is close enough to pick up the objective.
    #[must_use]
    pub fn within_pickup_range(&self) -> bool {
        let reach = self.player.radius + self.objective_radius + self.pickup_tolerance;
        self.player.position.distance(self.objective) < reach
    }

    /// Reports whether the player stands inside the extraction zone.
    #[must_use]
    pub fn within_extraction_zone(&self) -> bool {
        let reach = self.player.radius + self.extraction_radius;
        self.player.position.distance(self.extraction) < reach
    }
}
