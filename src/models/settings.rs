//! Judge settings loaded from TOML.
//!
//! ```toml
//! [hit_window]
//! mode = "osu_od"
//! value = 8.0
//!
//! [scroll]
//! visible_ms = 500.0
//! distance = 768.0
//!
//! [input]
//! early_policy = "ignore"
//!
//! [mania]
//! hold_ticks = true
//! hold_body = "ignore"
//! ```

use crate::error::ConfigError;
use crate::models::beatmap::DifficultyParams;
use crate::models::engine::hit_window::{HitWindows, WindowEntry};
use crate::models::engine::scroll::ScrollMapper;
use crate::ruleset::CompositeRule;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitWindowMode {
    /// Use the ruleset's windows for the beatmap's own difficulty.
    #[serde(rename = "beatmap")]
    Beatmap,
    #[serde(rename = "osu_od")]
    OsuOD,
    #[serde(rename = "etterna_judge")]
    EtternaJudge,
    /// Explicit table from `hit_window.custom`.
    #[serde(rename = "custom")]
    Custom,
}

/// What to do with a press earlier than every hit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarlyInputPolicy {
    /// Drop the press; the object stays pending.
    #[default]
    Ignore,
    /// Judge the nearest pending object of that action as a miss.
    CountAsMiss,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitWindowSettings {
    pub mode: HitWindowMode,
    /// OD (0.0-10.0) or judge level (1-9).
    pub value: f64,
    pub custom: Vec<WindowEntry>,
}

impl Default for HitWindowSettings {
    fn default() -> Self {
        Self {
            mode: HitWindowMode::Beatmap,
            value: 5.0,
            custom: Vec::new(),
        }
    }
}

impl HitWindowSettings {
    /// Resolves an override table, or `None` when the ruleset decides.
    pub fn build(&self) -> Result<Option<HitWindows>, ConfigError> {
        let windows = match self.mode {
            HitWindowMode::Beatmap => return Ok(None),
            HitWindowMode::OsuOD => HitWindows::from_osu_od(self.value)?,
            HitWindowMode::EtternaJudge => {
                if self.value.fract() != 0.0 || !(1.0..=9.0).contains(&self.value) {
                    return Err(ConfigError::OutOfRange {
                        name: "judge level",
                        value: self.value,
                        min: 1.0,
                        max: 9.0,
                    });
                }
                HitWindows::from_etterna_judge(self.value as u8)?
            }
            HitWindowMode::Custom => {
                let pairs: Vec<_> = self.custom.iter().map(|e| (e.result, e.ms)).collect();
                HitWindows::from_pairs(&pairs)?
            }
        };

        Ok(Some(windows))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollSettings {
    /// Time an object spends on screen before reaching the judgement line.
    pub visible_ms: f64,
    /// Playfield length along the scroll axis, in pixels.
    pub distance: f64,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            visible_ms: 500.0,
            distance: 768.0,
        }
    }
}

impl ScrollSettings {
    pub fn build(&self) -> Result<ScrollMapper, ConfigError> {
        ScrollMapper::from_visible_time(self.visible_ms, self.distance)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    pub early_policy: EarlyInputPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManiaSettings {
    /// Generate a large tick per beat inside hold bodies.
    pub hold_ticks: bool,
    /// How the hold itself is judged once head, ticks and tail are done.
    pub hold_body: CompositeRule,
}

impl Default for ManiaSettings {
    fn default() -> Self {
        Self {
            hold_ticks: true,
            hold_body: CompositeRule::Ignore,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeSettings {
    pub hit_window: HitWindowSettings,
    pub scroll: ScrollSettings,
    pub input: InputSettings,
    pub mania: ManiaSettings,
}

impl JudgeSettings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let settings: Self = load_toml(path)?;
        settings.validate()?;
        log::info!("CONFIG: Loaded judge settings from {:?}", path);
        Ok(settings)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: Default::default(),
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Write(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml_string()?;
        fs::write(path, content).map_err(|e| ConfigError::Write(e.to_string()))
    }

    /// Rejects a bad configuration before any session is created.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hit_window.build()?;
        self.scroll.build()?;
        Ok(())
    }

    /// Hit windows for a beatmap, honoring the override mode.
    pub fn resolve_hit_windows(
        &self,
        difficulty: &DifficultyParams,
        ruleset_windows: impl FnOnce(&DifficultyParams) -> Result<HitWindows, ConfigError>,
    ) -> Result<HitWindows, ConfigError> {
        match self.hit_window.build()? {
            Some(windows) => Ok(windows),
            None => ruleset_windows(difficulty),
        }
    }
}

/// Load a TOML file and deserialize it
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|e| {
        log::error!("CONFIG: Failed to parse TOML file {:?}: {}", path, e);
        ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })
}
