//! Definitions and constructors for hit window timing thresholds.

use crate::error::ConfigError;
use crate::models::hit_result::HitResult;
use serde::{Deserialize, Serialize};

/// Half-width of one result's window in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowEntry {
    pub result: HitResult,
    pub ms: f64,
}

/// Result of evaluating a timing delta against a [`HitWindows`] table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowOutcome {
    /// Too far in the future; the object stays pending.
    TooEarly,
    /// Within the table. `Miss` when inside the Miss window only.
    Hit(HitResult),
    /// Past the Miss window; the deadline already forced a miss.
    Expired,
}

/// Validated timing windows, best result first.
#[derive(Debug, Clone, PartialEq)]
pub struct HitWindows {
    entries: Vec<WindowEntry>,
    miss_ms: f64,
}

impl HitWindows {
    /// Builds a table from `(result, half-width)` pairs in any order.
    pub fn from_pairs(pairs: &[(HitResult, f64)]) -> Result<Self, ConfigError> {
        let mut entries: Vec<WindowEntry> = Vec::with_capacity(pairs.len());

        for &(result, ms) in pairs {
            if !HitResult::TIMED.contains(&result) {
                return Err(ConfigError::UnsupportedWindowResult { result });
            }
            if !ms.is_finite() || ms <= 0.0 {
                return Err(ConfigError::InvalidWidth { result, width: ms });
            }
            if entries.iter().any(|e| e.result == result) {
                return Err(ConfigError::DuplicateWindow { result });
            }
            entries.push(WindowEntry { result, ms });
        }

        entries.sort_by_key(|e| e.result.rank());

        let miss_ms = entries
            .iter()
            .find(|e| e.result == HitResult::Miss)
            .map(|e| e.ms)
            .ok_or(ConfigError::MissingMissWindow)?;

        for pair in entries.windows(2) {
            let (better, worse) = (pair[0], pair[1]);
            if better.ms > worse.ms {
                return Err(ConfigError::NonMonotonicWindows {
                    better: better.result,
                    better_ms: better.ms,
                    worse: worse.result,
                    worse_ms: worse.ms,
                });
            }
        }

        Ok(Self { entries, miss_ms })
    }

    /// Creates a window based on osu! Overall Difficulty.
    pub fn from_osu_od(od: f64) -> Result<Self, ConfigError> {
        check_range("overall difficulty", od, 0.0, 10.0)?;

        Self::from_pairs(&[
            (HitResult::Perfect, 16.0), // Fixed (legacy behavior)
            (HitResult::Great, 64.0 - 3.0 * od),
            (HitResult::Good, 97.0 - 3.0 * od),
            (HitResult::Ok, 127.0 - 3.0 * od),
            (HitResult::Meh, 151.0 - 3.0 * od),
            (HitResult::Miss, 188.0 - 3.0 * od),
        ])
    }

    /// Creates a window based on the Etterna judge level (J4 = standard).
    pub fn from_etterna_judge(judge_level: u8) -> Result<Self, ConfigError> {
        check_range("judge level", f64::from(judge_level), 1.0, 9.0)?;

        let scale = if judge_level == 9 {
            0.2
        } else {
            1.0 - ((f64::from(judge_level) - 4.0) / 6.0)
        };

        // Etterna rule: Bad never drops below 180ms.
        let meh = (180.0 * scale).max(180.0);

        Self::from_pairs(&[
            (HitResult::Perfect, 22.5 * scale),
            (HitResult::Great, 45.0 * scale),
            (HitResult::Good, 90.0 * scale),
            (HitResult::Ok, 135.0 * scale),
            (HitResult::Meh, meh),
            (HitResult::Miss, 500.0),
        ])
    }

    /// Width of the Miss window, always the widest.
    pub fn widest(&self) -> f64 {
        self.miss_ms
    }

    pub fn width(&self, result: HitResult) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.result == result)
            .map(|e| e.ms)
    }

    /// Last instant at which an object at `object_time` can still be hit.
    pub fn miss_deadline(&self, object_time: f64) -> f64 {
        object_time + self.miss_ms
    }

    /// Best result achievable in this table.
    pub fn best(&self) -> HitResult {
        self.entries
            .first()
            .map_or(HitResult::Miss, |e| e.result)
    }

    /// Classifies `delta = input_time - object_time`.
    ///
    /// A delta exactly on a boundary belongs to the stricter window.
    pub fn evaluate(&self, delta_ms: f64) -> WindowOutcome {
        if delta_ms < -self.miss_ms {
            return WindowOutcome::TooEarly;
        }
        if delta_ms > self.miss_ms {
            return WindowOutcome::Expired;
        }

        let abs_diff = delta_ms.abs();
        let result = self
            .entries
            .iter()
            .find(|e| abs_diff <= e.ms)
            .map_or(HitResult::Miss, |e| e.result);

        WindowOutcome::Hit(result)
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}
