//! Display snapshots for inter-thread communication.
//!
//! Snapshots are immutable captures of session state sent from the timing
//! thread to display consumers. They decouple judgement from presentation.

use crate::logic::object_state::ObjectPhase;
use crate::logic::score::ScoreSnapshot;
use crate::models::hit_object::{HitObjectKind, ObjectId};
use std::time::Instant;

/// An object inside the visible scroll range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibleObject {
    pub id: ObjectId,
    pub kind: HitObjectKind,
    pub action: usize,
    /// Scroll offset of the object's start from the judgement line.
    pub offset: f64,
    /// Scroll offset of the object's end (holds); equals `offset` otherwise.
    pub end_offset: f64,
    pub phase: ObjectPhase,
}

/// Snapshot of playfield state for display.
#[derive(Clone, Debug)]
pub struct PlayfieldSnapshot {
    /// Display clock in milliseconds.
    pub display_time: f64,
    /// Judgement clock in milliseconds.
    pub judge_time: f64,
    /// Wall-clock time when the snapshot was created (for interpolation).
    pub timestamp: Instant,
    /// Relative position on the track timeline (0.0-1.0).
    pub progress: f64,

    pub visible: Vec<VisibleObject>,
    /// Per-action held state.
    pub held: Vec<bool>,

    pub score: ScoreSnapshot,
    /// Objects not yet judged.
    pub remaining: usize,
}
