pub mod values;
pub mod tracks;
pub mod clip;
pub mod action;
pub mod binding;
pub mod binder;
pub mod mixer;
pub mod easing;
pub mod crossfade;

pub use clip::{AnimationClip, Track, TrackData};
pub use action::{AnimationAction, LoopMode, TrackValue};
pub use mixer::{ActionHandle, AnimationMixer};
pub use binder::Binder;
pub use binding::{PropertyBinding, TrackTarget};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use easing::Easing;
pub use crossfade::{CrossFade, CrossFadeParams, CrossFadeState, TRANSITION_STEP, crossfade_weights};
