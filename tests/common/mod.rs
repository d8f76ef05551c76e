#![allow(dead_code)]

use judgeline::logic::PlaySession;
use judgeline::models::beatmap::SourceBeatmap;
use judgeline::models::engine::{HitWindows, ScrollMapper};
use judgeline::models::hit_object::Chart;
use judgeline::models::hit_result::HitResult;
use judgeline::models::settings::{EarlyInputPolicy, JudgeSettings};
use judgeline::ruleset::{ManiaRuleset, Ruleset};
use std::path::Path;
use std::sync::Arc;

pub const SEVEN_KEY: &str = "./tests/resources/7k_holds.osu";
pub const NO_TICKS_CONFIG: &str = "./tests/resources/no_ticks.toml";

/// `Perfect ±10, Great ±20, Good ±40, Miss ±80`.
pub fn windows() -> HitWindows {
    HitWindows::from_pairs(&[
        (HitResult::Perfect, 10.0),
        (HitResult::Great, 20.0),
        (HitResult::Good, 40.0),
        (HitResult::Miss, 80.0),
    ])
    .unwrap()
}

pub fn session(chart: Chart) -> PlaySession {
    PlaySession::new(
        chart,
        Arc::new(ManiaRuleset::default()),
        windows(),
        ScrollMapper::new(1.0, 200.0).unwrap(),
        EarlyInputPolicy::Ignore,
    )
}

pub fn seven_key() -> SourceBeatmap {
    SourceBeatmap::from_path(Path::new(SEVEN_KEY)).unwrap()
}

pub fn seven_key_session(settings: &JudgeSettings) -> PlaySession {
    let ruleset: Arc<dyn Ruleset> = Arc::new(ManiaRuleset::new(settings.mania));
    PlaySession::from_beatmap(&seven_key(), ruleset, settings).unwrap()
}
