//! Shared fixtures for unit tests.

use crate::models::engine::hit_window::HitWindows;
use crate::models::hit_result::HitResult;

/// Small 4K map: a tap, a hold spanning two beats, another tap.
pub const MANIA_4K: &str = "osu file format v14

[General]
AudioFilename: audio.mp3
Mode: 3

[Difficulty]
HPDrainRate:8
CircleSize:4
OverallDifficulty:8
ApproachRate:5
SliderMultiplier:1.4
SliderTickRate:1

[TimingPoints]
0,500,4,2,0,50,1,0

[HitObjects]
64,192,1000,1,0,0:0:0:0:
192,192,1500,128,0,2500:0:0:0:0:
448,192,3000,1,0,0:0:0:0:
";

/// `Perfect ±10, Great ±20, Good ±40, Miss ±80`.
pub fn scenario_windows() -> HitWindows {
    HitWindows::from_pairs(&[
        (HitResult::Perfect, 10.0),
        (HitResult::Great, 20.0),
        (HitResult::Good, 40.0),
        (HitResult::Miss, 80.0),
    ])
    .expect("valid windows")
}
