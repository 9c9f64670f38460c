use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::animation::{ActionHandle, AnimationClip, AnimationMixer};
use crate::assets::server::ModelAsset;
use crate::errors::AssetError;
use crate::scene::Model;

/// A cached character: its model, mixer and the action of its first clip.
#[derive(Debug)]
pub struct LoadedModel {
    pub model: Model,
    pub mixer: AnimationMixer,
    /// Action playing `clips[0]`.
    pub action: ActionHandle,
    pub clips: Vec<Arc<AnimationClip>>,
}

impl LoadedModel {
    /// Prepares a decoded asset for playback. Shadows are switched on for
    /// every mesh.
    pub fn from_asset(asset: ModelAsset) -> Result<Self, AssetError> {
        let ModelAsset {
            mut model,
            animations,
        } = asset;

        let Some(clip) = animations.first() else {
            return Err(AssetError::NoAnimations(model.name.clone()));
        };

        model.enable_mesh_shadows();
        let mut mixer = AnimationMixer::new();
        let action = mixer.clip_action(clip, &model);

        Ok(Self {
            model,
            mixer,
            action,
            clips: animations,
        })
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clips[0]
    }
}

/// Animation name to loaded character cache.
#[derive(Debug, Default)]
pub struct ModelLibrary {
    entries: FxHashMap<String, LoadedModel>,
}

impl ModelLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LoadedModel> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut LoadedModel> {
        self.entries.get_mut(name)
    }

    /// Caches `entry`, returning the one it replaces.
    pub fn insert(&mut self, name: impl Into<String>, entry: LoadedModel) -> Option<LoadedModel> {
        self.entries.insert(name.into(), entry)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<LoadedModel> {
        self.entries.remove(name)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Two distinct entries at once, `None` when either is missing or the
    /// names are equal.
    pub fn get_pair_mut(&mut self, a: &str, b: &str) -> Option<(&mut LoadedModel, &mut LoadedModel)> {
        if a == b {
            return None;
        }
        let [first, second] = self.entries.get_disjoint_mut([a, b]);
        Some((first?, second?))
    }
}
