//! Wandering guard agents confined to their patrol rooms.

use std::{f32::consts::TAU, time::Duration};

use glam::Vec2;
use infiltration_core::{GuardId, GuardSnapshot, MissionTuning, TileRect};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Rectangle a guard center may occupy, already inset by radius and margin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PatrolBounds {
    min: Vec2,
    max: Vec2,
}

impl PatrolBounds {
    /// Shrinks `room` by `inset` on every side. Axes too narrow to shrink collapse
    /// onto the room's center line.
    pub(crate) fn inset(room: &TileRect, tile_size: f32, inset: f32) -> Self {
        let lower = room.world_min(tile_size) + Vec2::splat(inset);
        let upper = room.world_max(tile_size) - Vec2::splat(inset);
        let center = room.world_center(tile_size);

        let (min_x, max_x) = if lower.x <= upper.x {
            (lower.x, upper.x)
        } else {
            (center.x, center.x)
        };
        let (min_y, max_y) = if lower.y <= upper.y {
            (lower.y, upper.y)
        } else {
            (center.y, center.y)
        };

        Self {
            min: Vec2::new(min_x, min_y),
            max: Vec2::new(max_x, max_y),
        }
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Guard {
    id: GuardId,
    room: usize,
    bounds: PatrolBounds,
    position: Vec2,
    velocity: Vec2,
    facing: f32,
    speed: f32,
    radius: f32,
    fov_angle: f32,
    fov_range: f32,
    next_turn: Duration,
    turn_interval_ms: (u64, u64),
}

impl Guard {
    /// Places a guard at the center of `room` with a random initial heading.
    pub(crate) fn spawn(
        id: GuardId,
        room_index: usize,
        room: &TileRect,
        tile_size: f32,
        speed: f32,
        tuning: &MissionTuning,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let bounds = PatrolBounds::inset(
            room,
            tile_size,
            tuning.guard_radius + tuning.guard_margin,
        );
        let position = room
            .world_center(tile_size)
            .clamp(bounds.min, bounds.max);

        let mut guard = Self {
            id,
            room: room_index,
            bounds,
            position,
            velocity: Vec2::X,
            facing: 0.0,
            speed,
            radius: tuning.guard_radius,
            fov_angle: tuning.guard_fov_angle,
            fov_range: tuning.guard_fov_range,
            next_turn: Duration::ZERO,
            turn_interval_ms: (tuning.turn_interval_min_ms, tuning.turn_interval_max_ms),
        };
        guard.turn(Duration::ZERO, rng);
        guard.facing = guard.velocity.y.atan2(guard.velocity.x);
        guard
    }

    pub(crate) const fn id(&self) -> GuardId {
        self.id
    }

    /// Advances the guard by `dt`, with `now` being the mission clock after the tick.
    pub(crate) fn advance(&mut self, dt: Duration, now: Duration, rng: &mut ChaCha8Rng) {
        if now > self.next_turn {
            self.turn(now, rng);
        }

        self.position += self.velocity * self.speed * dt.as_secs_f32();

        let (x, velocity_x) = reflect_axis(
            self.position.x,
            self.velocity.x,
            self.bounds.min.x,
            self.bounds.max.x,
        );
        let (y, velocity_y) = reflect_axis(
            self.position.y,
            self.velocity.y,
            self.bounds.min.y,
            self.bounds.max.y,
        );
        self.position = Vec2::new(x, y);
        self.velocity = Vec2::new(velocity_x, velocity_y);

        self.facing = self.velocity.y.atan2(self.velocity.x);
    }

    fn turn(&mut self, now: Duration, rng: &mut ChaCha8Rng) {
        let heading: f32 = rng.gen_range(0.0..TAU);
        self.velocity = Vec2::new(heading.cos(), heading.sin());

        let (min_ms, max_ms) = self.turn_interval_ms;
        let delay = rng.gen_range(min_ms..=max_ms);
        self.next_turn = now.saturating_add(Duration::from_millis(delay));
    }

    pub(crate) fn snapshot(&self) -> GuardSnapshot {
        GuardSnapshot {
            id: self.id,
            room: self.room,
            position: self.position,
            velocity: self.velocity,
            facing: self.facing,
            speed: self.speed,
            radius: self.radius,
            fov_angle: self.fov_angle,
            fov_range: self.fov_range,
        }
    }
}

/// Clamps `position` into `[min, max]`, turning the velocity back inward when it
/// crossed a bound.
fn reflect_axis(position: f32, velocity: f32, min: f32, max: f32) -> (f32, f32) {
    if position < min {
        (min, velocity.abs())
    } else if position > max {
        (max, -velocity.abs())
    } else {
        (position, velocity)
    }
}
