use std::{f32::consts::TAU, time::Duration};

use infiltration_core::{Command, Event, GuardId, LevelConfig, MissionTuning, TileRect};
use infiltration_system_detection::Detection;
use infiltration_world::{self as world, query, World};

fn watchful_tuning() -> MissionTuning {
    MissionTuning {
        guard_fov_angle: TAU,
        guard_fov_range: 10_000.0,
        ..MissionTuning::default()
    }
}

fn start(level: LevelConfig) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::SelectLevel { level, seed: 3 }, &mut events);
    world
}

fn tick_and_detect(world: &mut World) -> Vec<Command> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        &mut events,
    );

    let snapshot = query::mission_snapshot(world).expect("mission running");
    let map = query::tile_map(world).expect("mission running");
    let mut commands = Vec::new();
    Detection::new().handle(&events, &snapshot, map, &mut commands);
    commands
}

#[test]
fn guard_sharing_the_room_reports_the_player() {
    let mut level = LevelConfig::new(10, 10, vec![TileRect::new(1, 1, 8, 8)], 0, 0);
    level.guard_rooms = Some(vec![0, 0]);
    level.tuning = watchful_tuning();
    let mut world = start(level);

    assert_eq!(
        tick_and_detect(&mut world),
        vec![Command::ReportSighting {
            guard: GuardId::new(0)
        }]
    );
}

#[test]
fn sealed_rooms_hide_the_player() {
    let mut level = LevelConfig::new(
        12,
        5,
        vec![TileRect::new(1, 1, 4, 3), TileRect::new(7, 1, 4, 3)],
        1,
        0,
    );
    level.guard_rooms = Some(vec![1]);
    level.tuning = watchful_tuning();
    let mut world = start(level);

    for _ in 0..120 {
        assert!(tick_and_detect(&mut world).is_empty());
    }
}

#[test]
fn nothing_is_reported_without_a_tick() {
    let mut level = LevelConfig::new(10, 10, vec![TileRect::new(1, 1, 8, 8)], 0, 0);
    level.guard_rooms = Some(vec![0]);
    level.tuning = watchful_tuning();
    let world = start(level);

    let snapshot = query::mission_snapshot(&world).expect("mission running");
    let map = query::tile_map(&world).expect("mission running");
    let mut commands = Vec::new();
    Detection::new().handle(
        &[Event::PhaseChanged {
            phase: snapshot.phase,
        }],
        &snapshot,
        map,
        &mut commands,
    );

    assert!(commands.is_empty());
}
