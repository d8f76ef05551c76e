//! The ruleset plugin boundary.
//!
//! The engine is written once against these seams. A ruleset supplies its
//! hit-window table, its result weights, the beatmap converter, how composite
//! objects resolve, and how the tracked quantities combine into total score.

pub mod mania;
pub mod registry;

pub use mania::ManiaRuleset;
pub use registry::RulesetRegistry;

use crate::error::{ConfigError, LoadError};
use crate::models::beatmap::{DifficultyParams, SourceBeatmap, SourceKind, SourceObject};
use crate::models::engine::hit_window::HitWindows;
use crate::models::hit_object::{Chart, ChartBuilder, HitObject};
use crate::models::hit_result::HitResult;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Per-result weights used by the score processor.
pub trait WeightTable: Send + Sync + Debug {
    /// Quality on a `0.0..=1.0` scale for accuracy-affecting results.
    fn accuracy_weight(&self, result: HitResult) -> f64;

    /// Score added for bonus results.
    fn bonus_weight(&self, result: HitResult) -> f64;
}

/// Accuracy weights derived from the 6/4/2/1 point scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultWeights;

impl WeightTable for DefaultWeights {
    fn accuracy_weight(&self, result: HitResult) -> f64 {
        match result {
            HitResult::Perfect | HitResult::Great => 1.0,
            HitResult::Good => 4.0 / 6.0,
            HitResult::Ok => 2.0 / 6.0,
            HitResult::Meh => 1.0 / 6.0,
            HitResult::LargeTickHit | HitResult::SmallTickHit => 1.0,
            _ => 0.0,
        }
    }

    fn bonus_weight(&self, result: HitResult) -> f64 {
        match result {
            HitResult::SmallBonus => 10.0,
            HitResult::LargeBonus => 50.0,
            _ => 0.0,
        }
    }
}

/// Quantities tracked by the score processor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreInputs {
    pub combo: u32,
    pub highest_combo: u32,
    pub accuracy_numerator: f64,
    pub accuracy_denominator: f64,
    pub bonus: f64,
}

/// Combines [`ScoreInputs`] into total score.
///
/// Implementations must be non-decreasing in `highest_combo`,
/// `accuracy_numerator` and `bonus`.
pub trait ScoreFormula: Send + Sync + Debug {
    fn total(&self, inputs: &ScoreInputs) -> f64;
}

/// Million-point scale split 30/70 between accuracy and combo, plus bonus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardisedScore {
    pub max_combo: u32,
    pub max_accuracy: f64,
}

impl StandardisedScore {
    pub const MAX_SCORE: f64 = 1_000_000.0;
    const ACCURACY_PORTION: f64 = 0.3;
    const COMBO_PORTION: f64 = 0.7;

    pub fn new(max_combo: u32, max_accuracy: f64) -> Self {
        Self {
            max_combo,
            max_accuracy,
        }
    }
}

impl ScoreFormula for StandardisedScore {
    fn total(&self, inputs: &ScoreInputs) -> f64 {
        let accuracy = if self.max_accuracy > 0.0 {
            inputs.accuracy_numerator / self.max_accuracy
        } else {
            0.0
        };
        let combo = if self.max_combo > 0 {
            f64::from(inputs.highest_combo) / f64::from(self.max_combo)
        } else {
            0.0
        };

        Self::MAX_SCORE * (Self::ACCURACY_PORTION * accuracy + Self::COMBO_PORTION * combo)
            + inputs.bonus
    }
}

/// How a composite object resolves once all of its children are judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeRule {
    /// The container's own judgement carries no score.
    #[default]
    Ignore,
    /// Judged by the share of successful children.
    Ratio,
}

impl CompositeRule {
    pub fn max_result(self) -> HitResult {
        match self {
            Self::Ignore => HitResult::Ignore,
            Self::Ratio => HitResult::Perfect,
        }
    }

    pub fn resolve(self, children: &[HitResult]) -> HitResult {
        match self {
            Self::Ignore => HitResult::Ignore,
            Self::Ratio => {
                let scored: Vec<_> = children
                    .iter()
                    .filter(|r| r.affects_accuracy())
                    .collect();
                if scored.is_empty() {
                    return HitResult::Ignore;
                }

                let hits = scored.iter().filter(|r| r.is_hit()).count();
                let ratio = hits as f64 / scored.len() as f64;

                if ratio >= 1.0 {
                    HitResult::Perfect
                } else if ratio >= 0.8 {
                    HitResult::Great
                } else if ratio >= 0.5 {
                    HitResult::Good
                } else if ratio > 0.0 {
                    HitResult::Meh
                } else {
                    HitResult::Miss
                }
            }
        }
    }
}

/// Turns generic beatmap objects into ruleset hit objects.
///
/// Must be deterministic and side-effect free. Unsupported source kinds are
/// dropped without error.
pub trait BeatmapConverter: Send + Sync + Debug {
    fn can_convert(&self, kind: SourceKind) -> bool;

    /// Appends zero or more objects for `object`.
    fn convert_object(
        &self,
        object: &SourceObject,
        beatmap: &SourceBeatmap,
        chart: &mut ChartBuilder,
    );

    fn convert(&self, beatmap: &SourceBeatmap) -> Chart {
        let mut chart = ChartBuilder::new();
        let mut skipped = 0usize;

        for object in &beatmap.objects {
            if self.can_convert(object.kind) {
                self.convert_object(object, beatmap, &mut chart);
            } else {
                skipped += 1;
            }
        }

        if skipped > 0 {
            log::debug!("CONVERT: Skipped {skipped} unsupported objects");
        }

        chart.build()
    }
}

/// A complete rule set.
pub trait Ruleset: Send + Sync + Debug {
    /// Unique identifier (e.g., "mania").
    fn id(&self) -> &str;

    fn hit_windows(&self, difficulty: &DifficultyParams) -> Result<HitWindows, ConfigError>;

    fn weights(&self) -> &dyn WeightTable;

    fn converter(&self) -> &dyn BeatmapConverter;

    fn composite_rule(&self) -> CompositeRule {
        CompositeRule::Ignore
    }

    /// Rejects beatmaps this ruleset cannot play at all.
    fn validate_beatmap(&self, _beatmap: &SourceBeatmap) -> Result<(), LoadError> {
        Ok(())
    }

    /// Best result `object` can receive.
    fn max_result(&self, object: &HitObject) -> HitResult {
        if object.kind.is_composite() {
            self.composite_rule().max_result()
        } else {
            object.kind.max_result()
        }
    }

    /// Score formula normalised against `chart`.
    fn score_formula(&self, chart: &Chart) -> Box<dyn ScoreFormula> {
        let maxima = chart_maxima(self, chart);
        Box::new(StandardisedScore::new(maxima.max_combo, maxima.max_accuracy))
    }
}

/// Best combo and accuracy numerator a chart can yield.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChartMaxima {
    pub max_combo: u32,
    pub max_accuracy: f64,
}

pub fn chart_maxima<R: Ruleset + ?Sized>(ruleset: &R, chart: &Chart) -> ChartMaxima {
    let mut maxima = ChartMaxima::default();

    for object in chart.objects() {
        let best = ruleset.max_result(object);
        if best.affects_combo() {
            maxima.max_combo += 1;
        }
        if best.affects_accuracy() {
            maxima.max_accuracy += ruleset.weights().accuracy_weight(best);
        }
    }

    maxima
}
