//! Per-run mission state: map, player, guards, objective and score.

use std::time::Duration;

use glam::Vec2;
use infiltration_core::{
    DetectionPolicy, Event, GuardId, GuardView, LevelConfig, LevelError, MissionPhase,
    MissionSnapshot, MissionTuning, PlayerSnapshot, TileMapView,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{collision::resolve_circle, guards::Guard, tile_map::TileMap};

/// One playthrough of a level, owning every piece of per-run state.
#[derive(Clone, Debug)]
pub struct Mission {
    tuning: MissionTuning,
    detection: DetectionPolicy,
    map: TileMap,
    player: Player,
    start: Vec2,
    objective: Vec2,
    guards: Vec<Guard>,
    clock: Duration,
    score: u32,
    rng: ChaCha8Rng,
}

#[derive(Clone, Copy, Debug)]
struct Player {
    position: Vec2,
    radius: f32,
    speed: f32,
    holding_objective: bool,
}

/// Effect of a confirmed sighting under the level's detection policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SightingOutcome {
    /// The player was sent back to the start and play continues.
    Reset,
    /// The mission is over.
    Failed,
}

impl Mission {
    /// Validates `level` and builds the map, player, guards and objective from it.
    pub fn new(level: &LevelConfig, seed: u64) -> Result<Self, LevelError> {
        level.validate()?;

        let tile_size = level.tile_size;
        let tuning = level.tuning.clone();
        let map = TileMap::generate(level.columns, level.rows, tile_size, level.open_areas());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let start = level.rooms[level.start_room].world_center(tile_size);
        let objective = level.rooms[level.item_room].world_center(tile_size);

        let guards = patrol_rooms(level, &mut rng)
            .into_iter()
            .enumerate()
            .map(|(index, room_index)| {
                Guard::spawn(
                    GuardId::new(u32::try_from(index).unwrap_or(u32::MAX)),
                    room_index,
                    &level.rooms[room_index],
                    tile_size,
                    level.guard_speed,
                    &tuning,
                    &mut rng,
                )
            })
            .collect();

        Ok(Self {
            player: Player {
                position: start,
                radius: tuning.player_radius,
                speed: tuning.player_speed,
                holding_objective: false,
            },
            score: tuning.initial_score,
            detection: level.detection,
            tuning,
            map,
            start,
            objective,
            guards,
            clock: Duration::ZERO,
            rng,
        })
    }

    /// Read-only view of the mission's tile grid.
    #[must_use]
    pub fn tile_map(&self) -> TileMapView<'_> {
        self.map.view()
    }

    /// Captures the mission state as seen by systems and renderers.
    #[must_use]
    pub fn snapshot(&self, phase: MissionPhase) -> MissionSnapshot {
        MissionSnapshot {
            phase,
            score: self.score,
            elapsed: self.clock,
            player: PlayerSnapshot {
                position: self.player.position,
                radius: self.player.radius,
                holding_objective: self.player.holding_objective,
            },
            objective: self.objective,
            objective_radius: self.tuning.objective_radius,
            pickup_tolerance: self.tuning.pickup_tolerance,
            extraction: self.start,
            extraction_radius: self.tuning.extraction_radius,
            guards: GuardView::from_snapshots(self.guards.iter().map(Guard::snapshot).collect()),
        }
    }

    pub(crate) fn started_event(&self) -> Event {
        Event::MissionStarted {
            player: self.player.position,
            objective: self.objective,
            extraction: self.start,
            guards: u32::try_from(self.guards.len()).unwrap_or(u32::MAX),
            score: self.score,
        }
    }

    pub(crate) const fn score(&self) -> u32 {
        self.score
    }

    /// Displaces the player and resolves the result against the tile grid.
    ///
    /// Returns the positions before and after the move.
    pub(crate) fn move_player(&mut self, direction: Vec2, dt: Duration) -> (Vec2, Vec2) {
        let direction = if direction.is_finite() {
            direction.clamp_length_max(1.0)
        } else {
            Vec2::ZERO
        };

        let from = self.player.position;
        let candidate = from + direction * self.player.speed * dt.as_secs_f32();
        let to = resolve_circle(candidate, self.player.radius, &self.map.view());
        self.player.position = to;
        (from, to)
    }

    /// Advances the mission clock and every guard.
    pub(crate) fn advance(&mut self, dt: Duration) {
        self.clock = self.clock.saturating_add(dt);
        let now = self.clock;
        for guard in &mut self.guards {
            guard.advance(dt, now, &mut self.rng);
        }
    }

    pub(crate) fn has_guard(&self, id: GuardId) -> bool {
        self.guards.iter().any(|guard| guard.id() == id)
    }

    /// Applies the detection policy after a guard spotted the player.
    pub(crate) fn apply_sighting(&mut self) -> SightingOutcome {
        match self.detection {
            DetectionPolicy::SoftReset => {
                self.score = self.score.saturating_sub(self.tuning.detection_penalty);
                self.player.position = self.start;
                self.player.holding_objective = false;
                SightingOutcome::Reset
            }
            DetectionPolicy::HardFail => {
                self.score = 0;
                SightingOutcome::Failed
            }
        }
    }

    /// Picks up the objective when it is free and within reach.
    pub(crate) fn try_collect(&mut self) -> Option<Vec2> {
        if self.player.holding_objective {
            return None;
        }
        let reach =
            self.player.radius + self.tuning.objective_radius + self.tuning.pickup_tolerance;
        if self.player.position.distance(self.objective) < reach {
            self.player.holding_objective = true;
            Some(self.player.position)
        } else {
            None
        }
    }

    /// Reports whether the player carries the objective inside the extraction zone.
    pub(crate) fn can_extract(&self) -> bool {
        let reach = self.player.radius + self.tuning.extraction_radius;
        self.player.holding_objective && self.player.position.distance(self.start) < reach
    }
}

/// Chooses the patrol room of every guard.
///
/// Explicit assignments win. Otherwise each guard picks uniformly among the
/// rooms other than the start room, or among all rooms when the start room is
/// the only one.
fn patrol_rooms(level: &LevelConfig, rng: &mut ChaCha8Rng) -> Vec<usize> {
    if let Some(rooms) = &level.guard_rooms {
        return rooms.clone();
    }

    let mut candidates: Vec<usize> = (0..level.rooms.len())
        .filter(|&index| index != level.start_room)
        .collect();
    if candidates.is_empty() {
        candidates = (0..level.rooms.len()).collect();
    }

    (0..level.guard_count)
        .map(|_| candidates[rng.gen_range(0..candidates.len())])
        .collect()
}
