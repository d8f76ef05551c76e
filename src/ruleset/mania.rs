//! Vertical-scrolling key-based ruleset (osu!mania style).

use super::{BeatmapConverter, CompositeRule, DefaultWeights, Ruleset, WeightTable};
use crate::error::{ConfigError, LoadError};
use crate::models::beatmap::{DifficultyParams, SourceBeatmap, SourceKind, SourceObject};
use crate::models::engine::hit_window::HitWindows;
use crate::models::hit_object::{ChartBuilder, HitObjectKind};
use crate::models::settings::ManiaSettings;

pub const MAX_KEYS: u8 = 18;

/// osu! playfield width the x coordinate is expressed in.
const PLAYFIELD_WIDTH: f32 = 512.0;

/// Converts an osu!mania X position into a column index.
pub fn x_to_column(x: f32, key_count: u8) -> Option<usize> {
    if key_count == 0 || !x.is_finite() || x < 0.0 {
        return None;
    }
    let column_width = PLAYFIELD_WIDTH / f32::from(key_count);
    let col = (x / column_width).floor() as usize;
    (col < usize::from(key_count)).then_some(col)
}

/// Key count stored in the beatmap's circle size.
pub fn key_count(difficulty: &DifficultyParams) -> Result<u8, LoadError> {
    let keys = difficulty.circle_size.round();
    if (1.0..=f64::from(MAX_KEYS)).contains(&keys) {
        Ok(keys as u8)
    } else {
        Err(LoadError::KeyCount(keys.clamp(0.0, 255.0) as u8))
    }
}

#[derive(Debug, Clone)]
pub struct ManiaConverter {
    pub hold_ticks: bool,
}

impl ManiaConverter {
    fn tick_spacing(beatmap: &SourceBeatmap, time: f64) -> Option<f64> {
        let spacing = beatmap.beat_len_at(time) / beatmap.difficulty.slider_tick_rate;
        (spacing.is_finite() && spacing > 0.0).then_some(spacing)
    }
}

impl BeatmapConverter for ManiaConverter {
    fn can_convert(&self, kind: SourceKind) -> bool {
        matches!(kind, SourceKind::Circle | SourceKind::Hold)
    }

    fn convert_object(
        &self,
        object: &SourceObject,
        beatmap: &SourceBeatmap,
        chart: &mut ChartBuilder,
    ) {
        let Ok(keys) = key_count(&beatmap.difficulty) else {
            return;
        };
        let Some(column) = x_to_column(object.x, keys) else {
            log::debug!(
                "CONVERT: Dropped object at {} ms, x = {} is outside {keys}K",
                object.start_time,
                object.x
            );
            return;
        };

        let start = object.start_time;
        let end = object.end_time.filter(|&end| end > start);

        match (object.kind, end) {
            (SourceKind::Hold, Some(end)) => {
                let hold = chart.add(HitObjectKind::Composite, start, Some(end), column);
                chart.add_child(hold, HitObjectKind::Hit, start, None);

                if self.hold_ticks
                    && let Some(spacing) = Self::tick_spacing(beatmap, start)
                {
                    let mut t = start + spacing;
                    while t < end {
                        chart.add_child(hold, HitObjectKind::Tick { large: true }, t, None);
                        t += spacing;
                    }
                }

                chart.add_child(hold, HitObjectKind::Release, end, None);
            }
            // Zero-length holds play as taps.
            _ => {
                chart.hit(start, column);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ManiaRuleset {
    converter: ManiaConverter,
    weights: DefaultWeights,
    hold_body: CompositeRule,
}

impl Default for ManiaRuleset {
    fn default() -> Self {
        Self::new(ManiaSettings::default())
    }
}

impl ManiaRuleset {
    pub const ID: &'static str = "mania";

    pub fn new(settings: ManiaSettings) -> Self {
        Self {
            converter: ManiaConverter {
                hold_ticks: settings.hold_ticks,
            },
            weights: DefaultWeights,
            hold_body: settings.hold_body,
        }
    }
}

impl Ruleset for ManiaRuleset {
    fn id(&self) -> &str {
        Self::ID
    }

    fn hit_windows(&self, difficulty: &DifficultyParams) -> Result<HitWindows, ConfigError> {
        HitWindows::from_osu_od(difficulty.overall_difficulty.clamp(0.0, 10.0))
    }

    fn weights(&self) -> &dyn WeightTable {
        &self.weights
    }

    fn converter(&self) -> &dyn BeatmapConverter {
        &self.converter
    }

    fn composite_rule(&self) -> CompositeRule {
        self.hold_body
    }

    fn validate_beatmap(&self, beatmap: &SourceBeatmap) -> Result<(), LoadError> {
        key_count(&beatmap.difficulty).map(|_| ())
    }
}
