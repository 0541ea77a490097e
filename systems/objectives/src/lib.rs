#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that requests objective pickup and extraction when in reach.

use infiltration_core::{Command, Event, MissionPhase, MissionSnapshot};

/// Objective system that proposes pickup and extraction commands.
#[derive(Debug, Default)]
pub struct Objectives;

impl Objectives {
    /// Creates a new objective system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes world events and the mission snapshot to emit objective commands.
    ///
    /// Checks run once after a mission starts and after every tick, except on
    /// a tick in which the player was spotted.
    pub fn handle(&self, events: &[Event], mission: &MissionSnapshot, out: &mut Vec<Command>) {
        if mission.phase != MissionPhase::Playing {
            return;
        }

        let mut triggered = false;
        for event in events {
            match event {
                Event::PlayerSpotted { .. } => return,
                Event::MissionStarted { .. } | Event::TimeAdvanced { .. } => triggered = true,
                _ => {}
            }
        }
        if !triggered {
            return;
        }

        if mission.player.holding_objective {
            if mission.within_extraction_zone() {
                out.push(Command::Extract);
            }
        } else if mission.within_pickup_range() {
            out.push(Command::CollectObjective);
        }
    }
}
