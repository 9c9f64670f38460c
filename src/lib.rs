//! # Motion Showcase
//!
//! Loads FBX characters, keeps one model per animation name and blends
//! between their clips with eased cross-fades.
//!
//! The crate renders nothing. A host (window, renderer, test) calls
//! [`Showcase::tick`] once per frame and draws [`Showcase::model`] on the
//! stage described by [`StageConfig`].
//!
//! ## Modules
//!
//! - [`animation`]: keyframe tracks, actions, the weighted mixer, easing and cross-fades
//! - [`assets`]: model loading (binary FBX) and the per-name model cache
//! - [`scene`]: node tree, transforms, morph targets and stage setup
//! - [`app`]: the showcase controller, settings, panel and overlay state
//! - [`utils`]: frame timing helpers
//! - [`errors`]: error types

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod app;
pub mod assets;
pub mod errors;
pub mod scene;
pub mod utils;

pub use animation::{
    AnimationAction, AnimationClip, AnimationMixer, Binder, CrossFade, CrossFadeParams, Easing,
    LoopMode, crossfade_weights,
};
pub use app::{Key, Showcase, ShowcaseConfig, SwitchMode};
pub use assets::{AssetPaths, AssetServer, LoadEvent, ModelAsset, ModelLibrary};
pub use errors::{AssetError, Error, FbxError, Result};
pub use scene::{Model, MorphTargets, Node, NodeHandle, StageConfig, Transform};
