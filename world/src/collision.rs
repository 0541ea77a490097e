//! Circle-versus-tile collision resolution.

use glam::Vec2;
use infiltration_core::TileMapView;

/// Pushes a circular body out of every solid tile its bounding box touches.
///
/// Only tiles inside `floor((position ± radius) / tile_size)` are examined.
/// Each overlapping tile contributes a minimum-translation push applied in
/// sequence (row-major), so pushes in tight corners may leave the body open
/// but not minimally displaced. `radius` must be positive.
#[must_use]
pub fn resolve_circle(position: Vec2, radius: f32, map: &TileMapView<'_>) -> Vec2 {
    let tile_size = map.tile_size();
    if !(tile_size > 0.0) || !position.is_finite() {
        return position;
    }

    let min_column = ((position.x - radius) / tile_size).floor() as i64;
    let max_column = ((position.x + radius) / tile_size).floor() as i64;
    let min_row = ((position.y - radius) / tile_size).floor() as i64;
    let max_row = ((position.y + radius) / tile_size).floor() as i64;

    let mut resolved = position;
    for row in min_row..=max_row {
        for column in min_column..=max_column {
            if map.is_solid_tile(column, row) {
                resolved = push_out_of_tile(resolved, radius, column, row, tile_size);
            }
        }
    }
    resolved
}

fn push_out_of_tile(center: Vec2, radius: f32, column: i64, row: i64, tile_size: f32) -> Vec2 {
    let tile_min = Vec2::new(column as f32, row as f32) * tile_size;
    let tile_max = tile_min + Vec2::splat(tile_size);

    let closest = center.clamp(tile_min, tile_max);
    let offset = center - closest;
    let distance_sq = offset.length_squared();

    if distance_sq >= radius * radius {
        return center;
    }

    if distance_sq > 0.0 {
        let distance = distance_sq.sqrt();
        return center + offset / distance * (radius - distance);
    }

    // Center sits inside the tile: leave through the nearer edge of the dominant axis.
    let from_tile_center = center - (tile_min + tile_max) * 0.5;
    if from_tile_center.x.abs() > from_tile_center.y.abs() {
        let x = if from_tile_center.x > 0.0 {
            tile_max.x + radius
        } else {
            tile_min.x - radius
        };
        Vec2::new(x, center.y)
    } else {
        let y = if from_tile_center.y > 0.0 {
            tile_max.y + radius
        } else {
            tile_min.y - radius
        };
        Vec2::new(center.x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile_map::TileMap;
    use infiltration_core::TileRect;

    const TILE: f32 = 40.0;
    const EPSILON: f32 = 1e-3;

    /// 10x10 grid with a single open room spanning tiles (1,1)..(8,8).
    fn walled_room() -> TileMap {
        let room = [TileRect::new(1, 1, 8, 8)];
        TileMap::generate(10, 10, TILE, room.iter())
    }

    fn assert_clear_of_solids(position: Vec2, radius: f32, map: &TileMapView<'_>) {
        let min = ((position - Vec2::splat(radius)) / TILE).floor();
        let max = ((position + Vec2::splat(radius)) / TILE).floor();
        for row in (min.y as i64)..=(max.y as i64) {
            for column in (min.x as i64)..=(max.x as i64) {
                if !map.is_solid_tile(column, row) {
                    continue;
                }
                let tile_min = Vec2::new(column as f32, row as f32) * TILE;
                let closest = position.clamp(tile_min, tile_min + Vec2::splat(TILE));
                assert!(
                    position.distance(closest) >= radius - EPSILON,
                    "circle at {position:?} penetrates tile ({column}, {row})"
                );
            }
        }
    }

    #[test]
    fn valid_positions_are_returned_unchanged() {
        let map = walled_room();
        let view = map.view();
        for position in [
            Vec2::new(200.0, 200.0),
            Vec2::new(52.0, 52.0),
            Vec2::new(348.0, 100.0),
        ] {
            let resolved = resolve_circle(position, 12.0, &view);
            assert!(resolved.distance(position) < EPSILON);
        }
    }

    #[test]
    fn body_is_pushed_off_a_straight_wall() {
        let map = walled_room();
        let view = map.view();
        // Wall row 0 ends at y = 40; a radius-12 body at y = 45 penetrates by 7.
        let resolved = resolve_circle(Vec2::new(200.0, 45.0), 12.0, &view);

        assert!((resolved.y - 52.0).abs() < EPSILON);
        assert!((resolved.x - 200.0).abs() < EPSILON);
        assert_clear_of_solids(resolved, 12.0, &view);
    }

    #[test]
    fn body_pressed_along_a_wall_seam_is_pushed_once() {
        let map = walled_room();
        let view = map.view();
        // Straddles the boundary between two wall tiles on the left.
        let resolved = resolve_circle(Vec2::new(45.0, 80.0), 12.0, &view);

        assert!((resolved.x - 52.0).abs() < EPSILON);
        assert!((resolved.y - 80.0).abs() < EPSILON);
        assert_clear_of_solids(resolved, 12.0, &view);
    }

    #[test]
    fn body_in_an_inner_corner_clears_both_walls() {
        let map = walled_room();
        let view = map.view();
        let resolved = resolve_circle(Vec2::new(44.0, 46.0), 12.0, &view);

        assert!(resolved.x >= 52.0 - EPSILON);
        assert!(resolved.y >= 52.0 - EPSILON);
        assert_clear_of_solids(resolved, 12.0, &view);
    }

    #[test]
    fn center_inside_a_tile_leaves_through_the_nearer_edge() {
        // Everything open except a single pillar at (2, 2).
        let map = TileMap::generate(
            5,
            5,
            TILE,
            [
                TileRect::new(0, 0, 5, 2),
                TileRect::new(0, 3, 5, 2),
                TileRect::new(0, 2, 2, 1),
                TileRect::new(3, 2, 2, 1),
            ]
            .iter(),
        );
        let view = map.view();

        // Pillar spans x, y in [80, 120]; this center sits right of its middle.
        let resolved = resolve_circle(Vec2::new(110.0, 102.0), 10.0, &view);
        assert!((resolved.x - 130.0).abs() < EPSILON);
        assert!((resolved.y - 102.0).abs() < EPSILON);

        let resolved = resolve_circle(Vec2::new(99.0, 85.0), 10.0, &view);
        assert!((resolved.x - 99.0).abs() < EPSILON);
        assert!((resolved.y - 70.0).abs() < EPSILON);
        assert_clear_of_solids(resolved, 10.0, &view);
    }

    #[test]
    fn out_of_bounds_acts_as_wall() {
        let everything = [TileRect::new(0, 0, 4, 4)];
        let map = TileMap::generate(4, 4, TILE, everything.iter());
        let view = map.view();
        let resolved = resolve_circle(Vec2::new(5.0, 80.0), 12.0, &view);

        assert!((resolved.x - 12.0).abs() < EPSILON);
    }
}
