//! Judgement and scoring engine for scrolling rhythm games.
//!
//! A [`ruleset::Ruleset`] converts a decoded beatmap into a [`models::hit_object::Chart`].
//! A [`logic::PlaySession`] judges that chart against timed input, and its
//! [`logic::ScoreProcessor`] turns the judgements into combo, accuracy and score.

pub mod error;
pub mod logic;
pub mod models;
pub mod ruleset;
pub mod shared;
pub mod system;

#[cfg(test)]
mod test_utils;
