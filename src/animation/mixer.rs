use std::sync::Arc;

use glam::{Quat, Vec3};
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::{SlotMap, new_key_type};
use uuid::Uuid;

use crate::animation::action::{AnimationAction, TrackValue};
use crate::animation::binder::Binder;
use crate::animation::binding::TrackTarget;
use crate::animation::clip::AnimationClip;
use crate::scene::{Model, NodeHandle};

new_key_type! {
    pub struct ActionHandle;
}

type PropertyKey = (NodeHandle, TrackTarget);

/// Weighted running blend of one property across actions.
#[derive(Debug, Clone, Copy)]
enum Accumulator {
    Vector { value: Vec3, weight: f32 },
    Rotation { value: Quat, weight: f32 },
    Scalar { value: f32, weight: f32 },
}

impl Accumulator {
    fn start(sample: TrackValue, weight: f32) -> Self {
        match sample {
            TrackValue::Vector3(value) => Self::Vector { value, weight },
            TrackValue::Quaternion(value) => Self::Rotation { value, weight },
            TrackValue::Scalar(value) => Self::Scalar { value, weight },
        }
    }

    /// Folds `sample` in so the result stays the weighted mean of all samples.
    fn add(&mut self, sample: TrackValue, w: f32) {
        match (self, sample) {
            (Self::Vector { value, weight }, TrackValue::Vector3(v)) => {
                *weight += w;
                *value = value.lerp(v, w / *weight);
            }
            (Self::Rotation { value, weight }, TrackValue::Quaternion(q)) => {
                *weight += w;
                *value = value.slerp(q, w / *weight);
            }
            (Self::Scalar { value, weight }, TrackValue::Scalar(s)) => {
                *weight += w;
                *value += (s - *value) * (w / *weight);
            }
            _ => {}
        }
    }
}

/// Drives the actions of one model and writes the blended pose into it.
#[derive(Debug, Default)]
pub struct AnimationMixer {
    actions: SlotMap<ActionHandle, AnimationAction>,
    by_clip: FxHashMap<Uuid, ActionHandle>,
    /// Properties written last frame; restored to rest once nothing drives them.
    driven: FxHashSet<PropertyKey>,
    /// Total time advanced, in seconds.
    pub time: f32,
}

impl AnimationMixer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the action playing `clip`, creating and binding it on first use.
    pub fn clip_action(&mut self, clip: &Arc<AnimationClip>, model: &Model) -> ActionHandle {
        if let Some(handle) = self.existing_action(clip) {
            return handle;
        }

        let mut action = AnimationAction::new(Arc::clone(clip));
        action.bindings = Binder::bind(model, clip);
        let handle = self.actions.insert(action);
        self.by_clip.insert(clip.id, handle);
        handle
    }

    /// The action already created for `clip`, if any.
    #[must_use]
    pub fn existing_action(&self, clip: &AnimationClip) -> Option<ActionHandle> {
        self.by_clip.get(&clip.id).copied()
    }

    #[must_use]
    pub fn action(&self, handle: ActionHandle) -> Option<&AnimationAction> {
        self.actions.get(handle)
    }

    pub fn action_mut(&mut self, handle: ActionHandle) -> Option<&mut AnimationAction> {
        self.actions.get_mut(handle)
    }

    pub fn actions(&self) -> impl Iterator<Item = (ActionHandle, &AnimationAction)> {
        self.actions.iter()
    }

    /// Stops every action except those listed in `keep`.
    pub fn stop_all_except(&mut self, keep: &[ActionHandle]) {
        for (handle, action) in &mut self.actions {
            if !keep.contains(&handle) && action.is_running() {
                action.set_effective_weight(0.0).stop();
            }
        }
    }

    /// Advances all actions by `dt` and applies the weighted blend to `model`.
    pub fn update(&mut self, dt: f32, model: &mut Model) {
        self.time += dt;

        let mut blended: FxHashMap<PropertyKey, Accumulator> = FxHashMap::default();

        for action in self.actions.values_mut() {
            action.update(dt);

            if !action.is_running() || action.weight <= 0.0 {
                continue;
            }
            let weight = action.weight;

            for i in 0..action.bindings.len() {
                let binding = action.bindings[i];
                let Some(sample) = action.sample_track(binding.track_index) else {
                    continue;
                };

                blended
                    .entry((binding.node, binding.target))
                    .and_modify(|acc| acc.add(sample, weight))
                    .or_insert_with(|| Accumulator::start(sample, weight));
            }
        }

        for (&(node_handle, target), acc) in &blended {
            if let Some(node) = model.node_mut(node_handle) {
                apply(node, target, *acc);
            }
        }

        for &(node_handle, target) in &self.driven {
            if blended.contains_key(&(node_handle, target)) {
                continue;
            }
            if let Some(node) = model.node_mut(node_handle) {
                node.restore_rest(target);
            }
        }

        self.driven = blended.into_keys().collect();
    }
}

/// Writes an accumulated value; a total weight below one mixes in the rest value.
fn apply(node: &mut crate::scene::Node, target: TrackTarget, acc: Accumulator) {
    match (target, acc) {
        (TrackTarget::Translation, Accumulator::Vector { value, weight }) => {
            node.transform.position = node.rest.position.lerp(value, weight.min(1.0));
        }
        (TrackTarget::Scale, Accumulator::Vector { value, weight }) => {
            node.transform.scale = node.rest.scale.lerp(value, weight.min(1.0));
        }
        (TrackTarget::Rotation, Accumulator::Rotation { value, weight }) => {
            node.transform.rotation = node.rest.rotation.slerp(value, weight.min(1.0));
        }
        (TrackTarget::MorphInfluence(index), Accumulator::Scalar { value, weight }) => {
            if let Some(morph) = node.morph.as_mut() {
                let base = morph.default_influence(index);
                morph.set_influence(index, base + (value - base) * weight.min(1.0));
            }
        }
        _ => {}
    }
}
