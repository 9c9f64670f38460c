//! Showcase configuration.
//!
//! Two presets mirror the two shipped viewers:
//!
//! * [`ShowcaseConfig::basic`]: dance list, no model cache, clips start at
//!   full weight, fog on.
//! * [`ShowcaseConfig::personalized`] (the default): five clips bound to keys
//!   `1`-`5`, cached models, eased cross-fades.
//!
//! Settings can be loaded from JSON; missing fields take the personalized
//! values.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::animation::{CrossFadeParams, Easing};
use crate::assets::AssetPaths;
use crate::errors::{Error, Result};
use crate::scene::StageConfig;

/// Inclusive slider range with a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl SliderRange {
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    /// Clamps to the range and rounds to the nearest step from `min`.
    #[must_use]
    pub fn snap(&self, value: f32) -> f32 {
        if !value.is_finite() {
            return self.min;
        }
        let clamped = value.clamp(self.min, self.max);
        if self.step <= 0.0 {
            return clamped;
        }
        let steps = ((clamped - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }
}

pub const DURATION_RANGE: SliderRange = SliderRange {
    min: 0.1,
    max: 3.0,
    step: 0.1,
};

pub const OVERLAP_RANGE: SliderRange = SliderRange {
    min: 0.1,
    max: 1.0,
    step: 0.1,
};

/// How a newly selected clip replaces the playing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SwitchMode {
    /// Stop the old clip and play the new one at full weight.
    Immediate,
    /// Blend with [`CrossFade`](crate::animation::CrossFade).
    CrossFade,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransitionSettings {
    pub transition_duration: f32,
    pub cross_fade_ratio: f32,
    pub interpolation: Easing,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            transition_duration: 1.0,
            cross_fade_ratio: 0.3,
            interpolation: Easing::SineInOut,
        }
    }
}

impl TransitionSettings {
    #[must_use]
    pub fn params(&self) -> CrossFadeParams {
        CrossFadeParams {
            duration: self.transition_duration,
            overlap: self.cross_fade_ratio,
            easing: self.interpolation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShowcaseConfig {
    /// Clip names in panel order; each is also a model file name.
    pub animations: Vec<String>,
    /// Clip loaded by [`Showcase::start`](crate::app::Showcase::start); the first entry when unset.
    pub initial_animation: Option<String>,
    pub models_dir: PathBuf,
    pub switch_mode: SwitchMode,
    /// Keep every loaded model instead of discarding the previous one.
    pub cache_models: bool,
    pub keyboard_shortcuts: bool,
    pub transition: TransitionSettings,
    pub error_notice_seconds: f32,
    pub stage: StageConfig,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self::personalized()
    }
}

impl ShowcaseConfig {
    #[must_use]
    pub fn basic() -> Self {
        Self {
            animations: [
                "Samba Dancing",
                "Hip Hop Dancing",
                "Breakdance",
                "Salsa Dancing",
                "Ballet",
                "Moonwalk",
            ]
            .map(String::from)
            .to_vec(),
            initial_animation: None,
            models_dir: PathBuf::from("models/fbx"),
            switch_mode: SwitchMode::Immediate,
            cache_models: false,
            keyboard_shortcuts: false,
            transition: TransitionSettings::default(),
            error_notice_seconds: 3.0,
            stage: StageConfig::studio_with_fog(),
        }
    }

    #[must_use]
    pub fn personalized() -> Self {
        Self {
            animations: ["Capoeira", "Taunt", "Angry", "Falling", "Taunt (1)"]
                .map(String::from)
                .to_vec(),
            initial_animation: None,
            models_dir: PathBuf::from("../models/fbx"),
            switch_mode: SwitchMode::CrossFade,
            cache_models: true,
            keyboard_shortcuts: true,
            transition: TransitionSettings::default(),
            error_notice_seconds: 3.0,
            stage: StageConfig::studio(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Name of the clip to load first.
    #[must_use]
    pub fn initial(&self) -> Option<&str> {
        self.initial_animation
            .as_deref()
            .or_else(|| self.animations.first().map(String::as_str))
    }

    #[must_use]
    pub fn asset_paths(&self) -> AssetPaths {
        AssetPaths::new(self.models_dir.clone())
    }

    pub fn validate(&self) -> Result<()> {
        if self.animations.is_empty() {
            return Err(Error::Config("animation list is empty".into()));
        }

        let paths = self.asset_paths();
        let mut seen = FxHashSet::default();
        for name in &self.animations {
            paths.model_path(name)?;
            if !seen.insert(name.as_str()) {
                return Err(Error::Config(format!("duplicate animation `{name}`")));
            }
        }

        if let Some(initial) = &self.initial_animation
            && !seen.contains(initial.as_str())
        {
            return Err(Error::Config(format!(
                "initial animation `{initial}` is not in the list"
            )));
        }

        if !DURATION_RANGE.contains(self.transition.transition_duration) {
            return Err(Error::Config(format!(
                "transition duration {} outside {}..={}",
                self.transition.transition_duration, DURATION_RANGE.min, DURATION_RANGE.max
            )));
        }
        if !OVERLAP_RANGE.contains(self.transition.cross_fade_ratio) {
            return Err(Error::Config(format!(
                "cross-fade ratio {} outside {}..={}",
                self.transition.cross_fade_ratio, OVERLAP_RANGE.min, OVERLAP_RANGE.max
            )));
        }
        if !self.error_notice_seconds.is_finite() || self.error_notice_seconds < 0.0 {
            return Err(Error::Config("error notice duration must be non-negative".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        ShowcaseConfig::basic().validate().unwrap();
        ShowcaseConfig::personalized().validate().unwrap();
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = ShowcaseConfig::from_json_str(
            r#"{ "animations": ["Taunt", "Angry"], "transition": { "interpolation": "cubicOut" } }"#,
        )
        .unwrap();
        assert_eq!(config.animations.len(), 2);
        assert_eq!(config.transition.interpolation, Easing::CubicOut);
        assert!((config.transition.transition_duration - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.switch_mode, SwitchMode::CrossFade);
    }

    #[test]
    fn out_of_range_duration_is_rejected() {
        let mut config = ShowcaseConfig::personalized();
        config.transition.transition_duration = 5.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
