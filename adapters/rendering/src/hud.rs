//! Transient HUD messages driven by world events and logical tick timers.

use std::collections::VecDeque;

use infiltration_core::Event;

/// A message shown on the HUD until its timer runs out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HudMessage {
    text: String,
    remaining_ticks: u32,
}

impl HudMessage {
    /// Text displayed to the player.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of ticks before the message disappears.
    #[must_use]
    pub const fn remaining_ticks(&self) -> u32 {
        self.remaining_ticks
    }
}

/// Bounded log of HUD messages that expire after a number of ticks.
#[derive(Clone, Debug)]
pub struct HudLog {
    lifetime_ticks: u32,
    capacity: usize,
    messages: VecDeque<HudMessage>,
}

impl HudLog {
    /// Default lifetime: three seconds at the nominal frame rate.
    pub const DEFAULT_LIFETIME_TICKS: u32 = 180;
    /// Default number of messages kept at once.
    pub const DEFAULT_CAPACITY: usize = 4;

    /// Creates a log whose messages live for `lifetime_ticks` ticks.
    #[must_use]
    pub fn new(lifetime_ticks: u32, capacity: usize) -> Self {
        Self {
            lifetime_ticks,
            capacity: capacity.max(1),
            messages: VecDeque::new(),
        }
    }

    /// Turns the player-facing events into messages.
    pub fn record(&mut self, events: &[Event]) {
        for event in events {
            if let Some(text) = describe(event) {
                self.push(text);
            }
        }
    }

    /// Adds a message, evicting the oldest one when the log is full.
    pub fn push(&mut self, text: String) {
        if self.lifetime_ticks == 0 {
            return;
        }
        while self.messages.len() >= self.capacity {
            let _ = self.messages.pop_front();
        }
        self.messages.push_back(HudMessage {
            text,
            remaining_ticks: self.lifetime_ticks,
        });
    }

    /// Advances every message timer by one tick and drops expired messages.
    pub fn tick(&mut self) {
        for message in &mut self.messages {
            message.remaining_ticks = message.remaining_ticks.saturating_sub(1);
        }
        self.messages.retain(|message| message.remaining_ticks > 0);
    }

    /// Messages currently displayed, oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &HudMessage> {
        self.messages.iter()
    }

    /// Message texts currently displayed, oldest first.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.messages.iter().map(|message| message.text.clone()).collect()
    }
}

impl Default for HudLog {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIFETIME_TICKS, Self::DEFAULT_CAPACITY)
    }
}

fn describe(event: &Event) -> Option<String> {
    let text = match event {
        Event::MissionStarted { guards, .. } => {
            format!("Mission started: {guards} guards on patrol")
        }
        Event::ObjectiveAcquired { .. } => "Objective acquired, head for extraction".to_owned(),
        Event::PlayerSpotted { score, .. } => format!("Spotted! Security level {score}"),
        Event::MissionWon { score } => format!("Mission complete with score {score}"),
        Event::MissionFailed { .. } => "Caught! Mission failed".to_owned(),
        Event::MissionAborted => "Mission aborted".to_owned(),
        Event::LevelRejected { reason } => format!("Level rejected: {reason}"),
        _ => return None,
    };
    Some(text)
}
