//! Eased cross-fade between two actions of one mixer.
//!
//! The fade runs in fixed steps of [`TRANSITION_STEP`] seconds regardless of
//! the frame rate. Weights follow a two-phase rule controlled by the overlap
//! ratio `o`, with `start = 1 - o`:
//!
//! * `ratio < start`: the outgoing action stays at full weight while the
//!   incoming one eases from `0` up to `o`.
//! * `ratio >= start`: both move linearly, outgoing `1 -> 0` and incoming
//!   `o -> 1`.
//!
//! When the duration elapses the weights are pinned to `(0, 1)` and the
//! outgoing action is stopped.

use serde::{Deserialize, Serialize};

use crate::animation::easing::Easing;
use crate::animation::mixer::{ActionHandle, AnimationMixer};

/// Length of one scheduler step (60 Hz).
pub const TRANSITION_STEP: f32 = 1.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossFadeParams {
    /// Seconds from start to full incoming weight.
    pub duration: f32,
    /// Share of the transition during which both clips move (`0..=1`).
    pub overlap: f32,
    pub easing: Easing,
}

impl Default for CrossFadeParams {
    fn default() -> Self {
        Self {
            duration: 1.0,
            overlap: 0.3,
            easing: Easing::SineInOut,
        }
    }
}

/// Outgoing and incoming weights for a transition progress `ratio`.
#[must_use]
pub fn crossfade_weights(ratio: f32, overlap: f32, easing: Easing) -> (f32, f32) {
    let overlap = overlap.clamp(0.0, 1.0);
    let ratio = ratio.max(0.0);
    if ratio >= 1.0 {
        return (0.0, 1.0);
    }

    let start = 1.0 - overlap;
    if ratio < start {
        (1.0, easing.apply(ratio / start) * overlap)
    } else {
        let f = (ratio - start) / overlap;
        (1.0 - f, overlap + (1.0 - overlap) * f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossFadeState {
    Running,
    Finished,
}

/// A transition in progress.
#[derive(Debug, Clone)]
pub struct CrossFade {
    from: ActionHandle,
    to: ActionHandle,
    params: CrossFadeParams,
    elapsed: f32,
    /// Frame time not yet consumed by whole steps.
    pending: f32,
    state: CrossFadeState,
}

impl CrossFade {
    /// Starts a transition and applies its first step immediately.
    pub fn begin(
        from: ActionHandle,
        to: ActionHandle,
        params: CrossFadeParams,
        mixer: &mut AnimationMixer,
    ) -> Self {
        let mut fade = Self {
            from,
            to,
            params,
            elapsed: 0.0,
            pending: 0.0,
            state: CrossFadeState::Running,
        };
        fade.step(mixer);
        fade
    }

    #[must_use]
    pub fn from(&self) -> ActionHandle {
        self.from
    }

    #[must_use]
    pub fn to(&self) -> ActionHandle {
        self.to
    }

    #[must_use]
    pub fn params(&self) -> CrossFadeParams {
        self.params
    }

    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[must_use]
    pub fn state(&self) -> CrossFadeState {
        self.state
    }

    /// Consumes `dt` seconds of frame time in whole scheduler steps.
    pub fn advance(&mut self, dt: f32, mixer: &mut AnimationMixer) -> CrossFadeState {
        self.pending += dt.max(0.0);
        while self.state == CrossFadeState::Running && self.pending >= TRANSITION_STEP {
            self.pending -= TRANSITION_STEP;
            self.step(mixer);
        }
        self.state
    }

    /// Runs one scheduler step.
    pub fn step(&mut self, mixer: &mut AnimationMixer) {
        if self.state == CrossFadeState::Finished {
            return;
        }

        self.elapsed += TRANSITION_STEP;

        if self.elapsed < self.params.duration {
            let ratio = self.elapsed / self.params.duration;
            let (outgoing, incoming) = crossfade_weights(ratio, self.params.overlap, self.params.easing);
            self.set_weights(mixer, outgoing, incoming);
        } else {
            self.set_weights(mixer, 0.0, 1.0);
            if let Some(action) = mixer.action_mut(self.from) {
                action.stop();
            }
            self.state = CrossFadeState::Finished;
            log::debug!("Cross-fade finished after {:.3}s", self.elapsed);
        }
    }

    /// Jumps to the end state: outgoing stopped, incoming at full weight.
    pub fn finish(&mut self, mixer: &mut AnimationMixer) {
        self.elapsed = self.elapsed.max(self.params.duration);
        self.step(mixer);
    }

    fn set_weights(&self, mixer: &mut AnimationMixer, outgoing: f32, incoming: f32) {
        if let Some(action) = mixer.action_mut(self.from) {
            action.set_effective_weight(outgoing);
        }
        if let Some(action) = mixer.action_mut(self.to) {
            action.set_effective_weight(incoming);
        }
    }
}
