#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-step frame loop that drives the world and every system once per tick.

use glam::Vec2;
use infiltration_core::{
    Command, Event, HeldKeys, LevelConfig, MissionPhase, MissionSnapshot, TileMapView, FRAME_DT,
};
use infiltration_system_analytics::{Analytics, MissionStats};
use infiltration_system_camera::Camera;
use infiltration_system_detection::Detection;
use infiltration_system_objectives::Objectives;
use infiltration_world::{self as world, query, World};
use log::debug;

/// Converts held movement keys into a zero or unit-length direction.
///
/// Opposite keys cancel out; diagonals are normalized so they are not faster
/// than straight moves.
#[must_use]
pub fn sample_direction(held: HeldKeys) -> Vec2 {
    let axis = |negative: bool, positive: bool| {
        f32::from(u8::from(positive)) - f32::from(u8::from(negative))
    };
    Vec2::new(axis(held.left, held.right), axis(held.up, held.down)).normalize_or_zero()
}

/// Owns the world together with the systems reacting to it.
#[derive(Debug)]
pub struct FrameLoop {
    world: World,
    detection: Detection,
    objectives: Objectives,
    analytics: Analytics,
    camera: Camera,
}

impl FrameLoop {
    /// Creates a frame loop in the menu whose camera shows `viewport` world units.
    #[must_use]
    pub fn new(viewport: Vec2) -> Self {
        Self {
            world: World::new(),
            detection: Detection::new(),
            objectives: Objectives::new(),
            analytics: Analytics::new(),
            camera: Camera::new(viewport, true),
        }
    }

    /// Starts a mission on `level`, returning every event it produced.
    ///
    /// Systems run once after the mission is built, so an objective lying at
    /// the spawn point is picked up immediately.
    pub fn select_level(&mut self, level: LevelConfig, seed: u64) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::SelectLevel { level, seed },
            &mut events,
        );
        self.follow_player();
        self.run_systems(&mut events);
        events
    }

    /// Advances one frame with the provided held keys.
    ///
    /// Does nothing outside of the playing phase.
    pub fn tick(&mut self, held: HeldKeys) -> Vec<Event> {
        let mut events = Vec::new();
        if query::phase(&self.world) != MissionPhase::Playing {
            return events;
        }

        world::apply(
            &mut self.world,
            Command::MovePlayer {
                direction: sample_direction(held),
                dt: FRAME_DT,
            },
            &mut events,
        );
        self.follow_player();
        world::apply(&mut self.world, Command::Tick { dt: FRAME_DT }, &mut events);
        self.run_systems(&mut events);
        events
    }

    /// Abandons the running mission and returns to the menu.
    pub fn abort(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Abort, &mut events);
        self.run_systems(&mut events);
        events
    }

    /// Current phase of the mission state machine.
    #[must_use]
    pub fn phase(&self) -> MissionPhase {
        query::phase(&self.world)
    }

    /// Render view of the current mission.
    #[must_use]
    pub fn snapshot(&self) -> Option<MissionSnapshot> {
        query::mission_snapshot(&self.world)
    }

    /// Tile grid of the current mission.
    #[must_use]
    pub fn tile_map(&self) -> Option<TileMapView<'_>> {
        query::tile_map(&self.world)
    }

    /// Camera tracking the player.
    #[must_use]
    pub const fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable camera access, used by backends when the window is resized.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Statistics of the current or most recent mission.
    #[must_use]
    pub fn stats(&self) -> Option<&MissionStats> {
        self.analytics.stats()
    }

    /// Welcome banner of the world.
    #[must_use]
    pub fn banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    fn follow_player(&mut self) {
        let Some(snapshot) = query::mission_snapshot(&self.world) else {
            return;
        };
        let Some(map) = query::tile_map(&self.world) else {
            return;
        };
        self.camera.follow(snapshot.player.position, map.world_size());
    }

    /// Runs detection then objectives against the frame's events, applying
    /// their commands, and finally lets analytics observe everything.
    fn run_systems(&mut self, events: &mut Vec<Event>) {
        let mut commands = Vec::new();

        if let (Some(snapshot), Some(map)) = (
            query::mission_snapshot(&self.world),
            query::tile_map(&self.world),
        ) {
            self.detection.handle(events, &snapshot, map, &mut commands);
        }
        self.apply_all(&mut commands, events);

        if let Some(snapshot) = query::mission_snapshot(&self.world) {
            self.objectives.handle(events, &snapshot, &mut commands);
        }
        self.apply_all(&mut commands, events);

        self.analytics.handle(events);
    }

    fn apply_all(&mut self, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            debug!("system command {command:?}");
            world::apply(&mut self.world, command, events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_keys_cancel() {
        let held = HeldKeys {
            left: true,
            right: true,
            ..HeldKeys::default()
        };
        assert_eq!(sample_direction(held), Vec2::ZERO);
        assert_eq!(sample_direction(HeldKeys::default()), Vec2::ZERO);
    }

    #[test]
    fn diagonals_are_normalized() {
        let held = HeldKeys {
            up: true,
            right: true,
            ..HeldKeys::default()
        };
        let direction = sample_direction(held);

        assert!((direction.length() - 1.0).abs() < 1e-6);
        assert!(direction.x > 0.0 && direction.y < 0.0);
    }

    #[test]
    fn ticks_in_the_menu_do_nothing() {
        let mut frame_loop = FrameLoop::new(Vec2::new(800.0, 600.0));
        let held = HeldKeys {
            down: true,
            ..HeldKeys::default()
        };

        assert!(frame_loop.tick(held).is_empty());
        assert!(frame_loop.snapshot().is_none());
    }
}
