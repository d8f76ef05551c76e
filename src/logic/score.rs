//! Running score: combo, accuracy, bonus and per-result counts.
//!
//! The processor is the single writer. After every judgement it republishes a
//! complete [`ScoreSnapshot`] into its [`ScoreBoard`], which any number of
//! display threads can read without seeing a half-updated state.

use crate::models::hit_object::Chart;
use crate::models::hit_result::HitResult;
use crate::models::judgement::Judgement;
use crate::models::stats::HitStats;
use crate::ruleset::{Ruleset, ScoreFormula, ScoreInputs};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// Aggregate state as seen by readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub combo: u32,
    pub highest_combo: u32,
    /// `0.0..=1.0`; 1.0 before anything accuracy-affecting was judged.
    pub accuracy: f64,
    pub bonus: f64,
    pub total_score: f64,
    pub judged: u32,
    pub stats: HitStats,
    pub last_judgement: Option<Judgement>,
}

impl Default for ScoreSnapshot {
    fn default() -> Self {
        Self {
            combo: 0,
            highest_combo: 0,
            accuracy: 1.0,
            bonus: 0.0,
            total_score: 0.0,
            judged: 0,
            stats: HitStats::new(),
            last_judgement: None,
        }
    }
}

/// Shared, read-mostly view of the running score.
#[derive(Debug, Clone, Default)]
pub struct ScoreBoard {
    inner: Arc<RwLock<ScoreSnapshot>>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the latest published snapshot.
    pub fn read(&self) -> ScoreSnapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn publish(&self, snapshot: ScoreSnapshot) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScoreRank {
    SS,
    S,
    A,
    B,
    C,
    D,
}

impl ScoreRank {
    pub fn from_accuracy(accuracy: f64) -> Self {
        match accuracy {
            a if a >= 1.0 => Self::SS,
            a if a >= 0.95 => Self::S,
            a if a >= 0.90 => Self::A,
            a if a >= 0.80 => Self::B,
            a if a >= 0.70 => Self::C,
            _ => Self::D,
        }
    }
}

/// Frozen result of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalScore {
    pub ruleset: String,
    pub total_score: f64,
    pub accuracy: f64,
    pub rank: ScoreRank,
    pub highest_combo: u32,
    pub max_combo: u32,
    pub bonus: f64,
    pub stats: HitStats,
}

#[derive(Debug)]
pub struct ScoreProcessor {
    ruleset: Arc<dyn Ruleset>,
    formula: Box<dyn ScoreFormula>,
    max_combo: u32,
    inputs: ScoreInputs,
    stats: HitStats,
    judged: u32,
    last_judgement: Option<Judgement>,
    board: ScoreBoard,
}

impl ScoreProcessor {
    pub fn new(ruleset: Arc<dyn Ruleset>, formula: Box<dyn ScoreFormula>, max_combo: u32) -> Self {
        Self {
            ruleset,
            formula,
            max_combo,
            inputs: ScoreInputs::default(),
            stats: HitStats::new(),
            judged: 0,
            last_judgement: None,
            board: ScoreBoard::new(),
        }
    }

    /// Processor normalised against everything `chart` can award.
    pub fn for_chart(ruleset: Arc<dyn Ruleset>, chart: &Chart) -> Self {
        let formula = ruleset.score_formula(chart);
        let max_combo = crate::ruleset::chart_maxima(ruleset.as_ref(), chart).max_combo;
        Self::new(ruleset, formula, max_combo)
    }

    pub fn consume(&mut self, judgement: &Judgement) {
        let result = judgement.result;
        let weights = self.ruleset.weights();

        if result.affects_combo() {
            if result.is_hit() {
                self.inputs.combo += 1;
                self.inputs.highest_combo = self.inputs.highest_combo.max(self.inputs.combo);
            } else {
                if self.inputs.combo > 0 {
                    log::debug!("SCORE: Combo break at {} ({})", self.inputs.combo, result);
                }
                self.inputs.combo = 0;
            }
        }

        if result.is_bonus() {
            self.inputs.bonus += weights.bonus_weight(result);
        }

        if result.affects_accuracy() {
            self.inputs.accuracy_numerator += weights.accuracy_weight(result);
            self.inputs.accuracy_denominator += weights.accuracy_weight(result.max_counterpart());
        }

        self.stats.record(result);
        self.judged += 1;
        self.last_judgement = Some(*judgement);

        self.board.publish(self.snapshot());
    }

    pub fn combo(&self) -> u32 {
        self.inputs.combo
    }

    pub fn highest_combo(&self) -> u32 {
        self.inputs.highest_combo
    }

    pub fn bonus(&self) -> f64 {
        self.inputs.bonus
    }

    pub fn inputs(&self) -> &ScoreInputs {
        &self.inputs
    }

    pub fn stats(&self) -> &HitStats {
        &self.stats
    }

    pub fn count(&self, result: HitResult) -> u32 {
        self.stats.count(result)
    }

    pub fn accuracy(&self) -> f64 {
        if self.inputs.accuracy_denominator > 0.0 {
            self.inputs.accuracy_numerator / self.inputs.accuracy_denominator
        } else {
            1.0
        }
    }

    pub fn total_score(&self) -> f64 {
        self.formula.total(&self.inputs)
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            combo: self.inputs.combo,
            highest_combo: self.inputs.highest_combo,
            accuracy: self.accuracy(),
            bonus: self.inputs.bonus,
            total_score: self.total_score(),
            judged: self.judged,
            stats: self.stats.clone(),
            last_judgement: self.last_judgement,
        }
    }

    /// Handle for display threads.
    pub fn board(&self) -> ScoreBoard {
        self.board.clone()
    }

    pub fn finalize(self) -> FinalScore {
        let accuracy = self.accuracy();
        let score = FinalScore {
            ruleset: self.ruleset.id().to_string(),
            total_score: self.total_score(),
            accuracy,
            rank: ScoreRank::from_accuracy(accuracy),
            highest_combo: self.inputs.highest_combo,
            max_combo: self.max_combo,
            bonus: self.inputs.bonus,
            stats: self.stats,
        };
        log::info!(
            "SCORE: Final {:.0} ({:.2}%, {:?}, {}x)",
            score.total_score,
            score.accuracy * 100.0,
            score.rank,
            score.highest_combo
        );
        score
    }
}
