use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::animation::{
    binding::PropertyBinding,
    clip::{AnimationClip, TrackData},
    tracks::KeyframeCursor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Once,
    Loop,
    PingPong,
}

/// Playback state of one clip inside a mixer.
///
/// The setters return `&mut Self` so calls can be chained the way the
/// switching code needs them:
///
/// ```rust,ignore
/// action.reset().set_effective_time_scale(1.0).set_effective_weight(0.0).play();
/// ```
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    pub time: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub loop_mode: LoopMode,
    pub paused: bool,
    pub enabled: bool,
    playing: bool,
    /// Ping-pong playback direction, `true` while running back toward zero.
    reversed: bool,

    pub(crate) bindings: Vec<PropertyBinding>,
    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Loop,
            paused: false,
            enabled: true,
            playing: false,
            reversed: false,
            bindings: Vec::new(),
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    /// Whether a ping-pong action is currently playing backwards.
    #[must_use]
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    #[must_use]
    pub fn bindings(&self) -> &[PropertyBinding] {
        &self.bindings
    }

    /// Whether the action contributes to the mixer output this frame.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.playing && self.enabled && !self.paused
    }

    /// Rewinds to the start and clears the paused state.
    pub fn reset(&mut self) -> &mut Self {
        self.time = 0.0;
        self.reversed = false;
        self.paused = false;
        self.enabled = true;
        self
    }

    pub fn set_effective_time_scale(&mut self, time_scale: f32) -> &mut Self {
        self.time_scale = time_scale;
        self
    }

    pub fn set_effective_weight(&mut self, weight: f32) -> &mut Self {
        self.weight = weight.clamp(0.0, 1.0);
        self
    }

    pub fn play(&mut self) -> &mut Self {
        self.playing = true;
        self
    }

    /// Deactivates the action and rewinds it.
    pub fn stop(&mut self) -> &mut Self {
        self.playing = false;
        self.reset()
    }

    /// Advances local time by `dt` scaled by `time_scale`, honoring the loop mode.
    pub fn update(&mut self, dt: f32) {
        if !self.is_running() {
            return;
        }

        let duration = self.clip.duration;
        if duration <= 0.0 {
            return;
        }

        let delta = dt * self.time_scale;

        match self.loop_mode {
            LoopMode::Once => {
                self.time += delta;
                if self.time >= duration {
                    self.time = duration;
                    self.paused = true;
                } else if self.time < 0.0 {
                    self.time = 0.0;
                    self.paused = true;
                }
            }
            LoopMode::Loop => {
                self.time = (self.time + delta).rem_euclid(duration);
            }
            LoopMode::PingPong => {
                // Unfold onto [0, 2d) where the second half plays backwards.
                let double_duration = duration * 2.0;
                let phase = if self.reversed {
                    double_duration - self.time
                } else {
                    self.time
                };
                let phase = (phase + delta).rem_euclid(double_duration);
                self.reversed = phase > duration;
                self.time = if self.reversed {
                    double_duration - phase
                } else {
                    phase
                };
            }
        }
    }

    /// Samples track `track_index` at the current time.
    pub fn sample_track(&mut self, track_index: usize) -> Option<TrackValue> {
        let track = self.clip.tracks.get(track_index)?;
        let cursor = self.track_cursors.get_mut(track_index)?;

        match &track.data {
            TrackData::Vector3(t) => t.sample_with_cursor(self.time, cursor).map(TrackValue::Vector3),
            TrackData::Quaternion(t) => t
                .sample_with_cursor(self.time, cursor)
                .map(TrackValue::Quaternion),
            TrackData::Scalar(t) => t.sample_with_cursor(self.time, cursor).map(TrackValue::Scalar),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackValue {
    Vector3(Vec3),
    Quaternion(Quat),
    Scalar(f32),
}
