#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that decides whether any guard currently sees the player.

pub mod sight;

use glam::Vec2;
use infiltration_core::{Command, Event, GuardSnapshot, MissionPhase, MissionSnapshot, TileMapView};
use log::debug;

pub use sight::has_line_of_sight;

/// Reports whether `guard` sees `target`.
///
/// Checks run cheapest first: range, then the view cone, then sampled line of
/// sight through the tile grid.
#[must_use]
pub fn can_see(guard: &GuardSnapshot, target: Vec2, map: &TileMapView<'_>) -> bool {
    let offset = target - guard.position;
    let distance = offset.length();
    if !(distance <= guard.fov_range) {
        return false;
    }

    if distance > 0.0 {
        let bearing = offset.y.atan2(offset.x);
        let difference = sight::normalize_angle(bearing - guard.facing);
        if difference.abs() > guard.fov_angle * 0.5 {
            return false;
        }
    }

    has_line_of_sight(guard.position, target, map)
}

/// Detection system that turns guard sight into sighting reports.
#[derive(Debug, Default)]
pub struct Detection;

impl Detection {
    /// Creates a new detection system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes world events and emits at most one sighting report per tick.
    ///
    /// Guards are visited in ascending id order; the first one that sees the
    /// player reports the sighting.
    pub fn handle(
        &self,
        events: &[Event],
        mission: &MissionSnapshot,
        map: TileMapView<'_>,
        out: &mut Vec<Command>,
    ) {
        let ticked = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));
        if !ticked || mission.phase != MissionPhase::Playing {
            return;
        }

        let target = mission.player.position;
        if let Some(guard) = mission
            .guards
            .iter()
            .find(|guard| can_see(guard, target, &map))
        {
            debug!(
                "guard {} sees the player at ({:.1}, {:.1})",
                guard.id.get(),
                target.x,
                target.y
            );
            out.push(Command::ReportSighting { guard: guard.id });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infiltration_core::{GuardId, Tile};
    use std::f32::consts::FRAC_PI_3;

    fn guard_facing_east() -> GuardSnapshot {
        GuardSnapshot {
            id: GuardId::new(0),
            room: 0,
            position: Vec2::new(100.0, 100.0),
            velocity: Vec2::X,
            facing: 0.0,
            speed: 60.0,
            radius: 12.0,
            fov_angle: FRAC_PI_3,
            fov_range: 200.0,
        }
    }

    fn open_map(cells: &[Tile]) -> TileMapView<'_> {
        TileMapView::new(cells, 20, 20, 40.0)
    }

    #[test]
    fn target_inside_cone_and_range_is_seen() {
        let cells = vec![Tile::Open; 400];
        let map = open_map(&cells);

        assert!(can_see(&guard_facing_east(), Vec2::new(250.0, 120.0), &map));
    }

    #[test]
    fn targets_beyond_range_are_missed() {
        let cells = vec![Tile::Open; 400];
        let map = open_map(&cells);
        let guard = guard_facing_east();

        assert!(can_see(&guard, Vec2::new(299.0, 100.0), &map));
        assert!(!can_see(&guard, Vec2::new(300.0 + 1e-2, 100.0), &map));
    }

    #[test]
    fn target_outside_cone_is_missed() {
        let cells = vec![Tile::Open; 400];
        let map = open_map(&cells);
        let guard = guard_facing_east();

        // 45 degrees off axis with a 60 degree full cone.
        assert!(!can_see(&guard, Vec2::new(150.0, 150.0), &map));
        assert!(!can_see(&guard, Vec2::new(20.0, 100.0), &map));
    }

    #[test]
    fn cone_wraps_across_the_negative_x_axis() {
        let cells = vec![Tile::Open; 400];
        let map = open_map(&cells);
        let mut guard = guard_facing_east();
        guard.facing = std::f32::consts::PI;
        guard.position = Vec2::new(400.0, 400.0);

        assert!(can_see(&guard, Vec2::new(300.0, 405.0), &map));
        assert!(can_see(&guard, Vec2::new(300.0, 395.0), &map));
    }

    #[test]
    fn walls_hide_the_target() {
        let mut cells = vec![Tile::Open; 400];
        for row in 0..20 {
            cells[row * 20 + 4] = Tile::Solid;
        }
        let map = open_map(&cells);

        assert!(!can_see(&guard_facing_east(), Vec2::new(250.0, 100.0), &map));
    }
}
