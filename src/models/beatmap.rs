//! Ruleset-agnostic beatmap description fed to the conversion step.
//!
//! Decoding is delegated to `rosu-map`; this module only flattens the decoded
//! map into the few fields converters need.

use crate::error::LoadError;
use rosu_map::section::hit_objects::{HitObject, HitObjectKind};
use std::path::Path;

/// Source object type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Circle,
    Slider,
    Spinner,
    Hold,
}

/// Generic hit object as it appears in the beatmap file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceObject {
    pub start_time: f64,
    pub end_time: Option<f64>,
    pub kind: SourceKind,
    /// Horizontal playfield position (0..512).
    pub x: f32,
}

/// Beatmap-wide difficulty parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyParams {
    pub overall_difficulty: f64,
    pub circle_size: f64,
    pub slider_tick_rate: f64,
}

impl Default for DifficultyParams {
    fn default() -> Self {
        Self {
            overall_difficulty: 5.0,
            circle_size: 4.0,
            slider_tick_rate: 1.0,
        }
    }
}

/// Uninherited timing point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingPoint {
    pub time: f64,
    pub beat_len: f64,
}

impl TimingPoint {
    pub const DEFAULT_BEAT_LEN: f64 = 60_000.0 / 60.0;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceBeatmap {
    pub objects: Vec<SourceObject>,
    pub difficulty: DifficultyParams,
    /// Sorted by time.
    pub timing_points: Vec<TimingPoint>,
}

impl SourceBeatmap {
    /// Loads a map from a .osu file.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let map = rosu_map::Beatmap::from_path(path).map_err(|e| LoadError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(Self::from_rosu(&map))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let map = rosu_map::Beatmap::from_bytes(bytes)
            .map_err(|e| LoadError::DecodeBytes(e.to_string()))?;
        Ok(Self::from_rosu(&map))
    }

    pub fn from_rosu(map: &rosu_map::Beatmap) -> Self {
        let objects = map.hit_objects.iter().map(source_object).collect();

        let mut timing_points: Vec<TimingPoint> = map
            .control_points
            .timing_points
            .iter()
            .map(|tp| TimingPoint {
                time: tp.time,
                beat_len: tp.beat_len,
            })
            .collect();
        timing_points.sort_by(|a, b| a.time.total_cmp(&b.time));

        Self {
            objects,
            difficulty: DifficultyParams {
                overall_difficulty: f64::from(map.overall_difficulty),
                circle_size: f64::from(map.circle_size),
                slider_tick_rate: map.slider_tick_rate,
            },
            timing_points,
        }
    }

    /// Beat length in effect at `time`; the first point applies before it starts.
    pub fn beat_len_at(&self, time: f64) -> f64 {
        let idx = self
            .timing_points
            .partition_point(|tp| tp.time <= time)
            .saturating_sub(1);

        self.timing_points
            .get(idx)
            .map_or(TimingPoint::DEFAULT_BEAT_LEN, |tp| tp.beat_len)
    }
}

fn source_object(h: &HitObject) -> SourceObject {
    let (kind, x, end_time) = match &h.kind {
        HitObjectKind::Circle(circle) => (SourceKind::Circle, circle.pos.x, None),
        HitObjectKind::Slider(slider) => (SourceKind::Slider, slider.pos.x, None),
        HitObjectKind::Spinner(spinner) => (
            SourceKind::Spinner,
            spinner.pos.x,
            Some(h.start_time + spinner.duration),
        ),
        HitObjectKind::Hold(hold) => (
            SourceKind::Hold,
            hold.pos_x,
            Some(h.start_time + hold.duration),
        ),
    };

    SourceObject {
        start_time: h.start_time,
        end_time,
        kind,
        x,
    }
}
