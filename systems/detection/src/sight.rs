//! Sampled line-of-sight queries against the tile grid.

use glam::Vec2;
use infiltration_core::TileMapView;

/// Fraction of the tile edge covered by one sight sample.
const SAMPLE_SPACING: f32 = 0.2;

/// Reports whether no solid tile lies strictly between `from` and `to`.
///
/// The segment is sampled `ceil(distance / (tile_size * 0.2))` times and only
/// interior samples are tested, so the endpoints themselves may sit in walls.
/// Zero-length segments have no interior samples and always report `true`.
#[must_use]
pub fn has_line_of_sight(from: Vec2, to: Vec2, map: &TileMapView<'_>) -> bool {
    let step = map.tile_size() * SAMPLE_SPACING;
    if !(step > 0.0) {
        return false;
    }

    let distance = from.distance(to);
    if !distance.is_finite() {
        return false;
    }

    let samples = (distance / step).ceil() as u32;
    (1..samples).all(|index| {
        let t = index as f32 / samples as f32;
        !map.is_solid(from.lerp(to, t))
    })
}

/// Normalizes an angle in radians into `(-π, π]`.
#[must_use]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};

    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}
