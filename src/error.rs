//! Error types for setup failures and broken engine invariants.
//!
//! Setup problems ([`ConfigError`], [`LoadError`]) are returned to the caller
//! before a play session starts. [`InvariantViolation`]s describe programming
//! errors; the engine reports them through [`fail_fast`] and never continues.

use crate::models::hit_object::ObjectId;
use crate::models::hit_result::HitResult;
use std::path::PathBuf;
use thiserror::Error;

/// Invalid judge configuration, detected before play starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("hit window table has no Miss window")]
    MissingMissWindow,

    #[error("{result:?} cannot have a hit window (only timing results are allowed)")]
    UnsupportedWindowResult { result: HitResult },

    #[error("{result:?} appears more than once in the hit window table")]
    DuplicateWindow { result: HitResult },

    #[error("{result:?} window has invalid width {width} ms")]
    InvalidWidth { result: HitResult, width: f64 },

    #[error(
        "{better:?} window ({better_ms} ms) is wider than {worse:?} window ({worse_ms} ms)"
    )]
    NonMonotonicWindows {
        better: HitResult,
        better_ms: f64,
        worse: HitResult,
        worse_ms: f64,
    },

    #[error("{name} = {value} is outside {min}..={max}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("scroll {name} must be positive and finite, got {value}")]
    InvalidScroll { name: &'static str, value: f64 },

    #[error("failed to read settings file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("failed to write settings: {0}")]
    Write(String),
}

/// Failure to obtain a beatmap from its source.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to decode beatmap {path:?}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("failed to decode beatmap bytes: {0}")]
    DecodeBytes(String),

    #[error("beatmap has {0} keys, expected 1..=18")]
    KeyCount(u8),
}

/// Anything that prevents a play session from starting.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Broken engine invariant. Continuing past one would corrupt score integrity.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("object {object} was already judged as {previous:?}")]
    AlreadyJudged { object: ObjectId, previous: HitResult },

    #[error("object {object} cannot be judged while {phase}")]
    NotAwaiting { object: ObjectId, phase: &'static str },

    #[error("object {object} does not exist (chart has {len} objects)")]
    UnknownObject { object: ObjectId, len: usize },

    #[error("judgement clock moved backwards from {from} ms to {to} ms")]
    BackwardClock { from: f64, to: f64 },

    #[error("unknown hit result index {0}")]
    UnknownHitResult(u8),
}

/// Logs and aborts on a broken invariant.
#[track_caller]
pub fn fail_fast(violation: InvariantViolation) -> ! {
    log::error!("INVARIANT: {violation}");
    panic!("{violation}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_object_context() {
        let v = InvariantViolation::AlreadyJudged {
            object: ObjectId(7),
            previous: HitResult::Great,
        };
        assert_eq!(v.to_string(), "object #7 was already judged as Great");
    }

    #[test]
    #[should_panic(expected = "judgement clock moved backwards")]
    fn fail_fast_panics() {
        fail_fast(InvariantViolation::BackwardClock {
            from: 100.0,
            to: 50.0,
        });
    }
}
