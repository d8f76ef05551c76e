//! Mapping between timeline time and positions along the scroll axis.
//!
//! Everything here is a pure function of its arguments so live playback and
//! replay scrubbing agree on where an object is.

use crate::error::ConfigError;

/// Offset of an object from the judgement line along the scroll axis.
///
/// Positive offsets are still approaching; negative ones have passed.
#[inline]
pub fn position(object_time: f64, current_time: f64, scroll_speed: f64) -> f64 {
    (object_time - current_time) * scroll_speed
}

/// Scroll configuration of a playfield.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMapper {
    /// Axis units travelled per millisecond.
    pub speed: f64,
    /// Distance from the judgement line to the far edge of the playfield.
    pub distance: f64,
}

impl ScrollMapper {
    pub fn new(speed: f64, distance: f64) -> Result<Self, ConfigError> {
        check_positive("speed", speed)?;
        check_positive("distance", distance)?;
        Ok(Self { speed, distance })
    }

    /// Builds a mapper where an object is on screen for `visible_ms`.
    pub fn from_visible_time(visible_ms: f64, distance: f64) -> Result<Self, ConfigError> {
        check_positive("visible time", visible_ms)?;
        Self::new(distance / visible_ms, distance)
    }

    #[inline]
    pub fn offset(&self, object_time: f64, current_time: f64) -> f64 {
        position(object_time, current_time, self.speed)
    }

    /// How long before its time an object enters the playfield.
    pub fn lookahead_ms(&self) -> f64 {
        self.distance / self.speed
    }

    pub fn is_within_lookahead(&self, object_time: f64, current_time: f64) -> bool {
        self.offset(object_time, current_time) <= self.distance
    }

    /// Inverse of [`offset`](Self::offset).
    pub fn time_at(&self, offset: f64, current_time: f64) -> f64 {
        current_time + offset / self.speed
    }

    /// Time span visible at `current_time`, from the judgement line to the far edge.
    pub fn visible_range(&self, current_time: f64) -> (f64, f64) {
        (current_time, self.time_at(self.distance, current_time))
    }
}

/// Maps track time onto a summary timeline (`0.0..=1.0`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineMapper {
    track_length: f64,
}

impl TimelineMapper {
    /// Tracks shorter than 1 ms (or not yet loaded) map as 1 ms long.
    pub fn new(track_length: f64) -> Self {
        Self {
            track_length: track_length.max(1.0),
        }
    }

    pub fn track_length(&self) -> f64 {
        self.track_length
    }

    pub fn relative(&self, time: f64) -> f64 {
        (time / self.track_length).clamp(0.0, 1.0)
    }

    pub fn time_at(&self, relative: f64) -> f64 {
        relative.clamp(0.0, 1.0) * self.track_length
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidScroll { name, value })
    }
}
