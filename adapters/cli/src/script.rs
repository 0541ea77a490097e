use anyhow::{bail, Context, Result};
use infiltration_core::HeldKeys;

/// One step of a scripted run: keys held for a number of frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ScriptStep {
    pub(crate) held: HeldKeys,
    pub(crate) frames: u32,
}

/// Parses a move script such as `R30,DR12,S5`.
///
/// Every step is a set of direction letters (`U`, `D`, `L`, `R`, or `S` to
/// stand still) followed by the number of frames to hold them.
pub(crate) fn parse(script: &str) -> Result<Vec<ScriptStep>> {
    script
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(parse_step)
        .collect()
}

fn parse_step(token: &str) -> Result<ScriptStep> {
    let split = token
        .find(|character: char| character.is_ascii_digit())
        .with_context(|| format!("move '{token}' is missing a frame count"))?;
    let (letters, count) = token.split_at(split);
    if letters.is_empty() {
        bail!("move '{token}' is missing a direction");
    }

    let frames = count
        .parse::<u32>()
        .with_context(|| format!("move '{token}' has an invalid frame count"))?;

    let mut held = HeldKeys::default();
    for letter in letters.chars() {
        match letter.to_ascii_uppercase() {
            'U' => held.up = true,
            'D' => held.down = true,
            'L' => held.left = true,
            'R' => held.right = true,
            'S' => {}
            other => bail!("move '{token}' uses unknown direction '{other}'"),
        }
    }

    Ok(ScriptStep { held, frames })
}

/// Expands the steps into one held-key set per frame.
pub(crate) fn frames(steps: &[ScriptStep]) -> impl Iterator<Item = HeldKeys> + '_ {
    steps
        .iter()
        .flat_map(|step| (0..step.frames).map(move |_| step.held))
}
