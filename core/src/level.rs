//! Authored level description consumed when a mission is selected.

use std::f32::consts::{FRAC_PI_3, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_TILE_SIZE: f32 = 40.0;
const DEFAULT_GUARD_SPEED: f32 = 60.0;

/// Largest number of tiles a level grid may contain.
pub const MAX_GRID_CELLS: u64 = 1_000_000;
/// Largest number of guards a level may place.
pub const MAX_GUARDS: usize = 1024;

/// Axis-aligned rectangle expressed in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    column: u32,
    row: u32,
    width: u32,
    height: u32,
}

impl TileRect {
    /// Creates a rectangle anchored at the provided upper-left tile.
    #[must_use]
    pub const fn new(column: u32, row: u32, width: u32, height: u32) -> Self {
        Self {
            column,
            row,
            width,
            height,
        }
    }

    /// Column of the upper-left tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Row of the upper-left tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Width of the rectangle in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the tile at `column`, `row` lies inside the rectangle.
    #[must_use]
    pub fn contains_tile(&self, column: u32, row: u32) -> bool {
        let column = u64::from(column);
        let row = u64::from(row);
        column >= u64::from(self.column)
            && column < u64::from(self.column) + u64::from(self.width)
            && row >= u64::from(self.row)
            && row < u64::from(self.row) + u64::from(self.height)
    }

    /// Reports whether the rectangle lies entirely inside a grid of the given size.
    #[must_use]
    pub fn fits_within(&self, columns: u32, rows: u32) -> bool {
        u64::from(self.column) + u64::from(self.width) <= u64::from(columns)
            && u64::from(self.row) + u64::from(self.height) <= u64::from(rows)
    }

    /// Upper-left corner in world units.
    #[must_use]
    pub fn world_min(&self, tile_size: f32) -> Vec2 {
        Vec2::new(self.column as f32, self.row as f32) * tile_size
    }

    /// Lower-right corner in world units.
    #[must_use]
    pub fn world_max(&self, tile_size: f32) -> Vec2 {
        Vec2::new(
            (self.column + self.width) as f32,
            (self.row + self.height) as f32,
        ) * tile_size
    }

    /// Center of the rectangle in world units.
    #[must_use]
    pub fn world_center(&self, tile_size: f32) -> Vec2 {
        (self.world_min(tile_size) + self.world_max(tile_size)) * 0.5
    }
}

/// How the mission reacts when a guard spots the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionPolicy {
    /// Deduct the penalty, send the player back to the start and drop the item.
    #[default]
    SoftReset,
    /// Zero the score and end the mission in the caught phase.
    HardFail,
}

/// Design constants shaping a mission. Every field may be overridden per level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionTuning {
    /// Collision radius of the player body in world units.
    pub player_radius: f32,
    /// Player speed in world units per second.
    pub player_speed: f32,
    /// Collision radius of every guard.
    pub guard_radius: f32,
    /// Extra inset applied on top of the guard radius when bounding patrols.
    pub guard_margin: f32,
    /// Full opening angle of the guard view cone in radians.
    pub guard_fov_angle: f32,
    /// Maximum distance at which a guard can spot the player.
    pub guard_fov_range: f32,
    /// Shortest delay between two guard heading changes.
    pub turn_interval_min_ms: u64,
    /// Longest delay between two guard heading changes.
    pub turn_interval_max_ms: u64,
    /// Pickup radius of the objective item.
    pub objective_radius: f32,
    /// Slack added to the pickup distance.
    pub pickup_tolerance: f32,
    /// Radius of the extraction zone around the start point.
    pub extraction_radius: f32,
    /// Security level the mission starts with.
    pub initial_score: u32,
    /// Security level lost each time the player is spotted.
    pub detection_penalty: u32,
}

impl Default for MissionTuning {
    fn default() -> Self {
        Self {
            player_radius: 12.0,
            player_speed: 180.0,
            guard_radius: 12.0,
            guard_margin: 5.0,
            guard_fov_angle: FRAC_PI_3,
            guard_fov_range: 200.0,
            turn_interval_min_ms: 1_500,
            turn_interval_max_ms: 3_500,
            objective_radius: 10.0,
            pickup_tolerance: 5.0,
            extraction_radius: 30.0,
            initial_score: 100,
            detection_penalty: 20,
        }
    }
}

impl MissionTuning {
    /// Checks that every constant lies in its supported range.
    pub fn validate(&self) -> Result<(), LevelError> {
        let positive = |field: &'static str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(LevelError::InvalidTuning { field })
            }
        };
        let non_negative = |field: &'static str, value: f32| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(LevelError::InvalidTuning { field })
            }
        };

        positive("player_radius", self.player_radius)?;
        non_negative("player_speed", self.player_speed)?;
        positive("guard_radius", self.guard_radius)?;
        non_negative("guard_margin", self.guard_margin)?;
        positive("guard_fov_angle", self.guard_fov_angle)?;
        if self.guard_fov_angle > TAU {
            return Err(LevelError::InvalidTuning {
                field: "guard_fov_angle",
            });
        }
        non_negative("guard_fov_range", self.guard_fov_range)?;
        if self.turn_interval_min_ms > self.turn_interval_max_ms {
            return Err(LevelError::InvalidTuning {
                field: "turn_interval_min_ms",
            });
        }
        non_negative("objective_radius", self.objective_radius)?;
        non_negative("pickup_tolerance", self.pickup_tolerance)?;
        non_negative("extraction_radius", self.extraction_radius)?;
        Ok(())
    }
}

/// Immutable description of a stealth level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Number of tile columns in the grid.
    pub columns: u32,
    /// Number of tile rows in the grid.
    pub rows: u32,
    /// Length of a tile edge in world units.
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    /// Rooms carved into the grid.
    pub rooms: Vec<TileRect>,
    /// Corridors carved into the grid.
    #[serde(default)]
    pub corridors: Vec<TileRect>,
    /// Index of the room holding the objective.
    pub item_room: usize,
    /// Index of the room where the player starts and extracts.
    pub start_room: usize,
    /// Number of guards placed in randomly chosen rooms.
    #[serde(default)]
    pub guard_count: u32,
    /// Guard speed in world units per second.
    #[serde(default = "default_guard_speed")]
    pub guard_speed: f32,
    /// Explicit patrol room per guard. Overrides `guard_count` when present.
    #[serde(default)]
    pub guard_rooms: Option<Vec<usize>>,
    /// Reaction applied when the player is spotted.
    #[serde(default)]
    pub detection: DetectionPolicy,
    /// Design constants for this level.
    #[serde(default)]
    pub tuning: MissionTuning,
}

fn default_tile_size() -> f32 {
    DEFAULT_TILE_SIZE
}

fn default_guard_speed() -> f32 {
    DEFAULT_GUARD_SPEED
}

impl LevelConfig {
    /// Creates a level with default tile size, speed, policy and tuning.
    #[must_use]
    pub fn new(
        columns: u32,
        rows: u32,
        rooms: Vec<TileRect>,
        item_room: usize,
        start_room: usize,
    ) -> Self {
        Self {
            columns,
            rows,
            tile_size: DEFAULT_TILE_SIZE,
            rooms,
            corridors: Vec::new(),
            item_room,
            start_room,
            guard_count: 0,
            guard_speed: DEFAULT_GUARD_SPEED,
            guard_rooms: None,
            detection: DetectionPolicy::default(),
            tuning: MissionTuning::default(),
        }
    }

    /// Validates indices, dimensions and tuning, failing on the first violation.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(LevelError::EmptyGrid {
                columns: self.columns,
                rows: self.rows,
            });
        }
        if u64::from(self.columns) * u64::from(self.rows) > MAX_GRID_CELLS {
            return Err(LevelError::GridTooLarge {
                columns: self.columns,
                rows: self.rows,
            });
        }

        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(LevelError::InvalidTileSize {
                tile_size: self.tile_size,
            });
        }

        if self.rooms.is_empty() {
            return Err(LevelError::NoRooms);
        }

        for (index, room) in self.rooms.iter().enumerate() {
            if room.width() == 0 || room.height() == 0 {
                return Err(LevelError::DegenerateRoom { index });
            }
            if !room.fits_within(self.columns, self.rows) {
                return Err(LevelError::RoomOutOfBounds { index });
            }
        }

        for (index, corridor) in self.corridors.iter().enumerate() {
            if !corridor.fits_within(self.columns, self.rows) {
                return Err(LevelError::CorridorOutOfBounds { index });
            }
        }

        let rooms = self.rooms.len();
        if self.item_room >= rooms {
            return Err(LevelError::ItemRoomOutOfRange {
                index: self.item_room,
                rooms,
            });
        }
        if self.start_room >= rooms {
            return Err(LevelError::StartRoomOutOfRange {
                index: self.start_room,
                rooms,
            });
        }
        let guards = match &self.guard_rooms {
            Some(guard_rooms) => guard_rooms.len(),
            None => usize::try_from(self.guard_count).unwrap_or(usize::MAX),
        };
        if guards > MAX_GUARDS {
            return Err(LevelError::TooManyGuards { count: guards });
        }
        if let Some(guard_rooms) = &self.guard_rooms {
            if let Some(&index) = guard_rooms.iter().find(|&&index| index >= rooms) {
                return Err(LevelError::GuardRoomOutOfRange { index, rooms });
            }
        }

        if !(self.guard_speed.is_finite() && self.guard_speed >= 0.0) {
            return Err(LevelError::InvalidGuardSpeed {
                speed: self.guard_speed,
            });
        }

        self.tuning.validate()
    }

    /// Rectangles that must be carved open: rooms followed by corridors.
    pub fn open_areas(&self) -> impl Iterator<Item = &TileRect> {
        self.rooms.iter().chain(self.corridors.iter())
    }
}

/// Reasons a level configuration cannot start a mission.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LevelError {
    /// The grid has no cells.
    #[error("grid must have at least one column and one row (got {columns}x{rows})")]
    EmptyGrid {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// The grid holds more than [`MAX_GRID_CELLS`] tiles.
    #[error("grid of {columns}x{rows} exceeds {} tiles", MAX_GRID_CELLS)]
    GridTooLarge {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// The level places more than [`MAX_GUARDS`] guards.
    #[error("{count} guards exceed the limit of {}", MAX_GUARDS)]
    TooManyGuards {
        /// Requested guard count.
        count: usize,
    },
    /// The tile edge is zero, negative or not finite.
    #[error("tile size must be a positive finite number (got {tile_size})")]
    InvalidTileSize {
        /// Configured tile size.
        tile_size: f32,
    },
    /// The level lists no rooms.
    #[error("level must declare at least one room")]
    NoRooms,
    /// A room has zero width or height.
    #[error("room {index} has zero width or height")]
    DegenerateRoom {
        /// Index of the offending room.
        index: usize,
    },
    /// A room extends beyond the grid.
    #[error("room {index} extends beyond the grid")]
    RoomOutOfBounds {
        /// Index of the offending room.
        index: usize,
    },
    /// A corridor extends beyond the grid.
    #[error("corridor {index} extends beyond the grid")]
    CorridorOutOfBounds {
        /// Index of the offending corridor.
        index: usize,
    },
    /// The objective room index does not name a room.
    #[error("item room {index} is out of range for {rooms} rooms")]
    ItemRoomOutOfRange {
        /// Configured index.
        index: usize,
        /// Number of rooms in the level.
        rooms: usize,
    },
    /// The start room index does not name a room.
    #[error("start room {index} is out of range for {rooms} rooms")]
    StartRoomOutOfRange {
        /// Configured index.
        index: usize,
        /// Number of rooms in the level.
        rooms: usize,
    },
    /// A guard patrol room index does not name a room.
    #[error("guard room {index} is out of range for {rooms} rooms")]
    GuardRoomOutOfRange {
        /// Configured index.
        index: usize,
        /// Number of rooms in the level.
        rooms: usize,
    },
    /// The guard speed is negative or not finite.
    #[error("guard speed must be a non-negative finite number (got {speed})")]
    InvalidGuardSpeed {
        /// Configured speed.
        speed: f32,
    },
    /// A tuning constant lies outside its supported range.
    #[error("tuning value `{field}` is out of range")]
    InvalidTuning {
        /// Name of the offending field.
        field: &'static str,
    },
    /// A mission is already running and must be aborted first.
    #[error("a mission is already in progress")]
    MissionInProgress,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_room_level() -> LevelConfig {
        LevelConfig::new(
            12,
            8,
            vec![TileRect::new(1, 1, 4, 4), TileRect::new(7, 2, 4, 4)],
            1,
            0,
        )
    }

    #[test]
    fn valid_level_passes() {
        assert_eq!(two_room_level().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_sized_grid() {
        let mut level = two_room_level();
        level.columns = 0;
        assert_eq!(
            level.validate(),
            Err(LevelError::EmptyGrid {
                columns: 0,
                rows: 8
            })
        );
    }

    #[test]
    fn rejects_oversized_grid() {
        let mut level = LevelConfig::new(200_000, 200_000, vec![TileRect::new(0, 0, 1, 1)], 0, 0);
        assert_eq!(
            level.validate(),
            Err(LevelError::GridTooLarge {
                columns: 200_000,
                rows: 200_000
            })
        );

        level.columns = 1000;
        level.rows = 1000;
        assert_eq!(level.validate(), Ok(()));
    }

    #[test]
    fn rejects_excessive_guard_counts() {
        let mut level = two_room_level();
        level.guard_count = u32::MAX;
        assert!(matches!(
            level.validate(),
            Err(LevelError::TooManyGuards { .. })
        ));

        level.guard_count = 0;
        level.guard_rooms = Some(vec![1; MAX_GUARDS + 1]);
        assert_eq!(
            level.validate(),
            Err(LevelError::TooManyGuards {
                count: MAX_GUARDS + 1
            })
        );

        level.guard_rooms = Some(vec![1; MAX_GUARDS]);
        assert_eq!(level.validate(), Ok(()));
    }

    #[test]
    fn rejects_item_room_out_of_range() {
        let mut level = two_room_level();
        level.item_room = 2;
        assert_eq!(
            level.validate(),
            Err(LevelError::ItemRoomOutOfRange { index: 2, rooms: 2 })
        );
    }

    #[test]
    fn rejects_start_room_out_of_range() {
        let mut level = two_room_level();
        level.start_room = 9;
        assert_eq!(
            level.validate(),
            Err(LevelError::StartRoomOutOfRange { index: 9, rooms: 2 })
        );
    }

    #[test]
    fn rejects_guard_room_out_of_range() {
        let mut level = two_room_level();
        level.guard_rooms = Some(vec![0, 5]);
        assert_eq!(
            level.validate(),
            Err(LevelError::GuardRoomOutOfRange { index: 5, rooms: 2 })
        );
    }

    #[test]
    fn rejects_room_beyond_grid() {
        let mut level = two_room_level();
        level.rooms.push(TileRect::new(10, 6, 4, 4));
        assert_eq!(
            level.validate(),
            Err(LevelError::RoomOutOfBounds { index: 2 })
        );
    }

    #[test]
    fn rejects_non_positive_player_radius() {
        let mut level = two_room_level();
        level.tuning.player_radius = 0.0;
        assert_eq!(
            level.validate(),
            Err(LevelError::InvalidTuning {
                field: "player_radius"
            })
        );
    }

    #[test]
    fn rect_world_geometry_scales_with_tile_size() {
        let rect = TileRect::new(2, 3, 4, 2);
        assert_eq!(rect.world_min(10.0), Vec2::new(20.0, 30.0));
        assert_eq!(rect.world_max(10.0), Vec2::new(60.0, 50.0));
        assert_eq!(rect.world_center(10.0), Vec2::new(40.0, 40.0));
        assert!(rect.contains_tile(5, 4));
        assert!(!rect.contains_tile(6, 4));
    }

    #[test]
    fn level_round_trips_through_bincode() {
        let mut level = two_room_level();
        level.corridors.push(TileRect::new(5, 2, 2, 1));
        level.guard_rooms = Some(vec![1]);
        level.detection = DetectionPolicy::HardFail;

        let bytes = bincode::serialize(&level).expect("serialize");
        let restored: LevelConfig = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, level);
    }
}
