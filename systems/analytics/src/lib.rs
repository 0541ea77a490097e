#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic analytics system that aggregates mission statistics from events.

use std::{fmt, time::Duration};

use infiltration_core::Event;

/// How a mission ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MissionOutcome {
    /// The player extracted with the objective.
    Won,
    /// The player was caught under the hard-fail policy.
    Caught,
    /// The mission was abandoned.
    Aborted,
}

/// Statistics gathered over a single mission.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MissionStats {
    ticks: u64,
    elapsed: Duration,
    sightings: u32,
    pickups: u32,
    distance: f32,
    outcome: Option<MissionOutcome>,
    score: u32,
}

impl MissionStats {
    /// Number of simulation ticks observed.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated time covered by the observed ticks.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of times a guard spotted the player.
    #[must_use]
    pub const fn sightings(&self) -> u32 {
        self.sightings
    }

    /// Number of objective pickups, including pickups after a reset.
    #[must_use]
    pub const fn pickups(&self) -> u32 {
        self.pickups
    }

    /// Distance walked by the player in world units.
    #[must_use]
    pub const fn distance(&self) -> f32 {
        self.distance
    }

    /// Final outcome, if the mission has ended.
    #[must_use]
    pub const fn outcome(&self) -> Option<MissionOutcome> {
        self.outcome
    }

    /// Most recently reported score.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }
}

impl fmt::Display for MissionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.outcome {
            Some(MissionOutcome::Won) => "won",
            Some(MissionOutcome::Caught) => "caught",
            Some(MissionOutcome::Aborted) => "aborted",
            None => "in progress",
        };
        write!(
            f,
            "{outcome}: score {} after {} ticks ({:.2}s), {} sightings, {} pickups, {:.1} units walked",
            self.score,
            self.ticks,
            self.elapsed.as_secs_f32(),
            self.sightings,
            self.pickups,
            self.distance,
        )
    }
}

/// Pure analytics system observing every event the world emits.
#[derive(Debug, Default)]
pub struct Analytics {
    stats: Option<MissionStats>,
}

impl Analytics {
    /// Creates a new analytics system with no mission observed yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the statistics of the current or most recent mission, if any.
    #[must_use]
    pub fn stats(&self) -> Option<&MissionStats> {
        self.stats.as_ref()
    }

    /// Folds world events into the mission statistics.
    ///
    /// `MissionStarted` resets the counters; events before the first mission
    /// are ignored.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            if let Event::MissionStarted { score, .. } = event {
                self.stats = Some(MissionStats {
                    score: *score,
                    ..MissionStats::default()
                });
                continue;
            }

            let Some(stats) = self.stats.as_mut() else {
                continue;
            };

            match event {
                Event::TimeAdvanced { dt } => {
                    stats.ticks = stats.ticks.saturating_add(1);
                    stats.elapsed = stats.elapsed.saturating_add(*dt);
                }
                Event::PlayerMoved { from, to } => stats.distance += from.distance(*to),
                Event::ObjectiveAcquired { .. } => stats.pickups = stats.pickups.saturating_add(1),
                Event::PlayerSpotted { score, .. } => {
                    stats.sightings = stats.sightings.saturating_add(1);
                    stats.score = *score;
                }
                Event::MissionWon { score } => {
                    stats.outcome = Some(MissionOutcome::Won);
                    stats.score = *score;
                }
                Event::MissionFailed { score } => {
                    stats.outcome = Some(MissionOutcome::Caught);
                    stats.score = *score;
                }
                Event::MissionAborted => {
                    if stats.outcome.is_none() {
                        stats.outcome = Some(MissionOutcome::Aborted);
                    }
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_before_a_mission_are_ignored() {
        let mut analytics = Analytics::new();
        analytics.handle(&[Event::TimeAdvanced {
            dt: Duration::from_millis(16),
        }]);

        assert!(analytics.stats().is_none());
    }

    #[test]
    fn abort_after_a_win_keeps_the_win() {
        let mut analytics = Analytics::new();
        analytics.handle(&[
            Event::MissionStarted {
                player: glam::Vec2::ZERO,
                objective: glam::Vec2::ZERO,
                extraction: glam::Vec2::ZERO,
                guards: 0,
                score: 100,
            },
            Event::MissionWon { score: 60 },
            Event::MissionAborted,
        ]);

        let stats = analytics.stats().expect("mission observed");
        assert_eq!(stats.outcome(), Some(MissionOutcome::Won));
        assert_eq!(stats.score(), 60);
    }
}
