//! Input streams: recorded replays and generated autoplay.
//!
//! A replay holds only raw inputs, so it can be re-judged under different
//! hit windows and still reproduce the same judgements for the same windows.

use crate::models::hit_object::{Chart, HitObjectKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current replay format version for compatibility.
pub const REPLAY_FORMAT_VERSION: u8 = 1;

/// Time a generated tap stays pressed.
const AUTOPLAY_TAP_MS: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    Press,
    Release,
}

/// A single discrete input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    /// Absolute time in ms since map start.
    pub time_ms: f64,
    /// Logical action (column / lane).
    pub action: usize,
    pub kind: InputKind,
}

impl InputEvent {
    pub fn press(time_ms: f64, action: usize) -> Self {
        Self {
            time_ms,
            action,
            kind: InputKind::Press,
        }
    }

    pub fn release(time_ms: f64, action: usize) -> Self {
        Self {
            time_ms,
            action,
            kind: InputKind::Release,
        }
    }
}

/// Minimal replay data containing only raw inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayData {
    /// Format version for future compatibility.
    pub version: u8,
    /// All user inputs in chronological order.
    pub inputs: Vec<InputEvent>,
}

impl Default for ReplayData {
    fn default() -> Self {
        Self {
            version: REPLAY_FORMAT_VERSION,
            inputs: Vec::new(),
        }
    }
}

impl ReplayData {
    pub fn new(mut inputs: Vec<InputEvent>) -> Self {
        sort_inputs(&mut inputs);
        Self {
            version: REPLAY_FORMAT_VERSION,
            inputs,
        }
    }

    /// Serializes to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes from JSON, restoring chronological order.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut data: Self = serde_json::from_str(json)?;
        sort_inputs(&mut data.inputs);
        Ok(data)
    }

    /// Perfect play for `chart`: every judgeable object is pressed on time
    /// and every hold is released exactly at its tail.
    pub fn autoplay(chart: &Chart) -> Self {
        let mut per_action: BTreeMap<usize, Vec<(f64, Option<f64>)>> = BTreeMap::new();

        for object in chart.objects() {
            let held_until = match object.kind {
                HitObjectKind::Composite => object
                    .children
                    .iter()
                    .map(|&c| chart.object(c))
                    .filter(|c| c.kind == HitObjectKind::Release)
                    .map(|c| c.start_time)
                    .next_back(),
                _ => None,
            };

            let in_hold = object
                .parent
                .is_some_and(|p| chart.object(p).kind == HitObjectKind::Composite);

            match object.kind {
                // Heads of composites are pressed by the composite entry.
                HitObjectKind::Hit | HitObjectKind::Bonus { .. } | HitObjectKind::Tick { .. }
                    if !in_hold =>
                {
                    per_action
                        .entry(object.action)
                        .or_default()
                        .push((object.start_time, None));
                }
                HitObjectKind::Composite => {
                    let press = object
                        .children
                        .first()
                        .map_or(object.start_time, |&c| chart.object(c).start_time);
                    per_action
                        .entry(object.action)
                        .or_default()
                        .push((press, held_until.or(object.end_time)));
                }
                _ => {}
            }
        }

        let mut inputs = Vec::new();
        for (action, mut presses) in per_action {
            presses.sort_by(|a, b| a.0.total_cmp(&b.0));
            for i in 0..presses.len() {
                let (press, hold_end) = presses[i];
                let next = presses.get(i + 1).map_or(f64::INFINITY, |p| p.0);
                let release = match hold_end {
                    Some(end) => end,
                    None => (press + AUTOPLAY_TAP_MS).min(press + (next - press) / 2.0),
                };
                inputs.push(InputEvent::press(press, action));
                inputs.push(InputEvent::release(release, action));
            }
        }

        Self::new(inputs)
    }
}

/// Chronological order; releases before presses at the same instant.
fn sort_inputs(inputs: &mut [InputEvent]) {
    inputs.sort_by(|a, b| {
        a.time_ms
            .total_cmp(&b.time_ms)
            .then_with(|| (a.kind == InputKind::Press).cmp(&(b.kind == InputKind::Press)))
    });
}
