#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative mission state management for the infiltration engine.

pub mod collision;
mod guards;
mod mission;
mod tile_map;

use infiltration_core::{Command, Event, LevelError, MissionPhase, WELCOME_BANNER};
use log::{debug, info, warn};

pub use mission::Mission;

use mission::SightingOutcome;

/// Represents the authoritative infiltration world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    phase: MissionPhase,
    mission: Option<Mission>,
}

impl World {
    /// Creates a new world waiting in the menu.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            phase: MissionPhase::Menu,
            mission: None,
        }
    }

    fn set_phase(&mut self, phase: MissionPhase, out_events: &mut Vec<Event>) {
        if self.phase == phase {
            return;
        }
        info!("mission phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        out_events.push(Event::PhaseChanged { phase });
    }

    fn playing_mission_mut(&mut self) -> Option<&mut Mission> {
        if self.phase == MissionPhase::Playing {
            self.mission.as_mut()
        } else {
            None
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SelectLevel { level, seed } => {
            if world.phase == MissionPhase::Playing {
                warn!("level selection refused: mission in progress");
                out_events.push(Event::LevelRejected {
                    reason: LevelError::MissionInProgress,
                });
                return;
            }

            match Mission::new(&level, seed) {
                Ok(mission) => {
                    world.set_phase(MissionPhase::Loading, out_events);
                    let started = mission.started_event();
                    world.mission = Some(mission);
                    out_events.push(started);
                    world.set_phase(MissionPhase::Playing, out_events);
                }
                Err(reason) => {
                    warn!("level selection refused: {reason}");
                    out_events.push(Event::LevelRejected { reason });
                }
            }
        }
        Command::MovePlayer { direction, dt } => {
            let Some(mission) = world.playing_mission_mut() else {
                debug!("ignoring player move outside of play");
                return;
            };
            let (from, to) = mission.move_player(direction, dt);
            out_events.push(Event::PlayerMoved { from, to });
        }
        Command::Tick { dt } => {
            let Some(mission) = world.playing_mission_mut() else {
                return;
            };
            mission.advance(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::ReportSighting { guard } => {
            let Some(mission) = world.playing_mission_mut() else {
                debug!("ignoring sighting by guard {} outside of play", guard.get());
                return;
            };
            if !mission.has_guard(guard) {
                debug!("ignoring sighting by unknown guard {}", guard.get());
                return;
            }

            let outcome = mission.apply_sighting();
            let score = mission.score();
            info!("player spotted by guard {}; score now {score}", guard.get());
            out_events.push(Event::PlayerSpotted { guard, score });

            if outcome == SightingOutcome::Failed {
                out_events.push(Event::MissionFailed { score });
                world.set_phase(MissionPhase::Caught, out_events);
            }
        }
        Command::CollectObjective => {
            let Some(mission) = world.playing_mission_mut() else {
                return;
            };
            match mission.try_collect() {
                Some(position) => {
                    info!("objective acquired");
                    out_events.push(Event::ObjectiveAcquired { position });
                }
                None => debug!("objective pickup rejected: out of reach or already held"),
            }
        }
        Command::Extract => {
            let Some(mission) = world.playing_mission_mut() else {
                return;
            };
            if !mission.can_extract() {
                debug!("extraction rejected: objective missing or outside the zone");
                return;
            }
            let score = mission.score();
            info!("mission won with score {score}");
            out_events.push(Event::MissionWon { score });
            world.set_phase(MissionPhase::Won, out_events);
        }
        Command::Abort => {
            if world.mission.take().is_some() {
                info!("mission aborted");
                out_events.push(Event::MissionAborted);
            }
            world.set_phase(MissionPhase::Menu, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use infiltration_core::{GuardView, MissionPhase, MissionSnapshot, TileMapView};

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Current phase of the mission state machine.
    #[must_use]
    pub fn phase(world: &World) -> MissionPhase {
        world.phase
    }

    /// Captures the running (or just finished) mission, if any.
    #[must_use]
    pub fn mission_snapshot(world: &World) -> Option<MissionSnapshot> {
        world
            .mission
            .as_ref()
            .map(|mission| mission.snapshot(world.phase))
    }

    /// Provides read-only access to the mission's tile grid.
    #[must_use]
    pub fn tile_map(world: &World) -> Option<TileMapView<'_>> {
        world.mission.as_ref().map(|mission| mission.tile_map())
    }

    /// Captures a read-only view of the guards; empty when no mission is loaded.
    #[must_use]
    pub fn guard_view(world: &World) -> GuardView {
        mission_snapshot(world)
            .map(|snapshot| snapshot.guards)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use glam::Vec2;
    use infiltration_core::{DetectionPolicy, GuardId, LevelConfig, TileRect};

    use super::*;

    fn corridor_level() -> LevelConfig {
        let mut level = LevelConfig::new(
            20,
            7,
            vec![TileRect::new(1, 1, 5, 5), TileRect::new(14, 1, 5, 5)],
            1,
            0,
        );
        level.corridors.push(TileRect::new(6, 3, 8, 1));
        level.guard_rooms = Some(vec![1]);
        level
    }

    fn select(world: &mut World, level: LevelConfig) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::SelectLevel { level, seed: 17 }, &mut events);
        events
    }

    #[test]
    fn selecting_a_level_walks_through_loading_into_play() {
        let mut world = World::new();
        let events = select(&mut world, corridor_level());

        assert_eq!(
            events.first(),
            Some(&Event::PhaseChanged {
                phase: MissionPhase::Loading
            })
        );
        assert!(matches!(
            events.get(1),
            Some(Event::MissionStarted { guards: 1, .. })
        ));
        assert_eq!(
            events.last(),
            Some(&Event::PhaseChanged {
                phase: MissionPhase::Playing
            })
        );
        assert_eq!(query::phase(&world), MissionPhase::Playing);
        assert!(query::tile_map(&world).is_some());
    }

    #[test]
    fn invalid_level_is_rejected_and_menu_kept() {
        let mut world = World::new();
        let mut level = corridor_level();
        level.item_room = 4;
        let events = select(&mut world, level);

        assert_eq!(
            events,
            vec![Event::LevelRejected {
                reason: LevelError::ItemRoomOutOfRange { index: 4, rooms: 2 }
            }]
        );
        assert_eq!(query::phase(&world), MissionPhase::Menu);
        assert!(query::mission_snapshot(&world).is_none());
    }

    #[test]
    fn selection_during_play_is_rejected() {
        let mut world = World::new();
        let _ = select(&mut world, corridor_level());
        let events = select(&mut world, corridor_level());

        assert_eq!(
            events,
            vec![Event::LevelRejected {
                reason: LevelError::MissionInProgress
            }]
        );
    }

    #[test]
    fn commands_are_ignored_in_the_menu() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Vec2::X,
                dt: Duration::from_millis(16),
            },
            &mut events,
        );
        apply(&mut world, Command::Extract, &mut events);

        assert!(events.is_empty());
    }

    #[test]
    fn soft_sighting_penalizes_and_resets_the_player() {
        let mut world = World::new();
        let _ = select(&mut world, corridor_level());
        let start = query::mission_snapshot(&world)
            .expect("mission")
            .player
            .position;

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Vec2::X,
                dt: Duration::from_millis(200),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::ReportSighting {
                guard: GuardId::new(0),
            },
            &mut events,
        );

        let snapshot = query::mission_snapshot(&world).expect("mission");
        assert_eq!(snapshot.score, 80);
        assert_eq!(snapshot.player.position, start);
        assert_eq!(snapshot.phase, MissionPhase::Playing);
        assert!(events.contains(&Event::PlayerSpotted {
            guard: GuardId::new(0),
            score: 80
        }));
    }

    #[test]
    fn hard_sighting_ends_the_mission() {
        let mut world = World::new();
        let mut level = corridor_level();
        level.detection = DetectionPolicy::HardFail;
        let _ = select(&mut world, level);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ReportSighting {
                guard: GuardId::new(0),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::PlayerSpotted {
                    guard: GuardId::new(0),
                    score: 0
                },
                Event::MissionFailed { score: 0 },
                Event::PhaseChanged {
                    phase: MissionPhase::Caught
                },
            ]
        );
        assert!(query::phase(&world).is_terminal());
    }

    #[test]
    fn unknown_guards_cannot_report() {
        let mut world = World::new();
        let _ = select(&mut world, corridor_level());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ReportSighting {
                guard: GuardId::new(9),
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::mission_snapshot(&world).expect("mission").score, 100);
    }

    #[test]
    fn distant_objective_cannot_be_collected() {
        let mut world = World::new();
        let _ = select(&mut world, corridor_level());
        let mut events = Vec::new();
        apply(&mut world, Command::CollectObjective, &mut events);
        apply(&mut world, Command::Extract, &mut events);

        assert!(events.is_empty());
        assert_eq!(query::phase(&world), MissionPhase::Playing);
    }

    #[test]
    fn abort_discards_the_mission_from_any_phase() {
        let mut world = World::new();
        let _ = select(&mut world, corridor_level());
        let mut events = Vec::new();
        apply(&mut world, Command::Abort, &mut events);

        assert_eq!(
            events,
            vec![
                Event::MissionAborted,
                Event::PhaseChanged {
                    phase: MissionPhase::Menu
                }
            ]
        );
        assert!(query::mission_snapshot(&world).is_none());
        assert!(query::guard_view(&world).is_empty());

        events.clear();
        apply(&mut world, Command::Abort, &mut events);
        assert!(events.is_empty());
    }
}
