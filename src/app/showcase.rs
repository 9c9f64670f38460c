//! The showcase controller.
//!
//! [`Showcase`] owns the loaded models and decides which one is displayed.
//! The host drives it once per frame:
//!
//! ```rust,ignore
//! let mut showcase = Showcase::new(ShowcaseConfig::personalized())?;
//! showcase.start()?;
//! loop {
//!     for key in pressed_keys() {
//!         showcase.handle_key(&key)?;
//!     }
//!     showcase.tick(timer.dt_seconds());
//!     renderer.draw(showcase.model(), showcase.stage());
//! }
//! ```
//!
//! Loads run in the background and report through a channel drained by
//! [`Showcase::tick`]. Switching between two loaded models cross-fades the
//! outgoing clip into the incoming one on the incoming model's mixer.

use std::sync::Arc;

use flume::{Receiver, Sender};
use rustc_hash::FxHashSet;
use tokio::runtime::Runtime;

use crate::animation::{
    ActionHandle, AnimationAction, AnimationClip, AnimationMixer, CrossFade, CrossFadeState, Easing,
};
use crate::app::input::{Key, animation_index_for_key};
use crate::app::overlay::Overlay;
use crate::app::panel::ControlPanel;
use crate::app::settings::{ShowcaseConfig, SwitchMode};
use crate::assets::{AssetServer, LoadEvent, LoadedModel, ModelAsset, ModelLibrary};
use crate::errors::{AssetError, Error, Result};
use crate::scene::{Model, NodeHandle, StageConfig};

/// What the host should currently draw.
#[derive(Debug, Default)]
pub enum Displayed {
    #[default]
    Nothing,
    /// A library entry with a mixer.
    Library(String),
    /// A model without animation clips; shown as is and never cached.
    Static(Box<Model>),
}

/// The action holding the character: which library entry and which action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentAction {
    pub model: String,
    pub action: ActionHandle,
}

/// Clip and playhead of the action being replaced.
struct Outgoing {
    clip: Arc<AnimationClip>,
    time: f32,
}

pub struct Showcase {
    config: ShowcaseConfig,
    server: AssetServer,
    library: ModelLibrary,
    displayed: Displayed,
    current: Option<CurrentAction>,
    crossfade: Option<CrossFade>,
    selected: Option<String>,
    panel: ControlPanel,
    overlay: Overlay,
    pending: FxHashSet<String>,
    runtime: Runtime,
    events_tx: Sender<LoadEvent>,
    events_rx: Receiver<LoadEvent>,
}

impl Showcase {
    /// Validates `config` and starts the loader runtime.
    pub fn new(config: ShowcaseConfig) -> Result<Self> {
        config.validate()?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("showcase-loader")
            .enable_all()
            .build()?;
        let (events_tx, events_rx) = flume::unbounded();

        let transition = (config.switch_mode == SwitchMode::CrossFade).then_some(&config.transition);
        let panel = ControlPanel::new(config.animations.clone(), transition);
        let overlay = Overlay::new(config.keyboard_shortcuts);

        log::info!(
            "Showcase ready: {} animations from {}",
            config.animations.len(),
            config.models_dir.display()
        );

        Ok(Self {
            server: AssetServer::new(config.asset_paths()),
            config,
            library: ModelLibrary::new(),
            displayed: Displayed::Nothing,
            current: None,
            crossfade: None,
            selected: None,
            panel,
            overlay,
            pending: FxHashSet::default(),
            runtime,
            events_tx,
            events_rx,
        })
    }

    /// Selects the initial animation.
    pub fn start(&mut self) -> Result<()> {
        let Some(initial) = self.config.initial().map(str::to_string) else {
            return Err(Error::Config("animation list is empty".into()));
        };
        self.select_animation(&initial)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn config(&self) -> &ShowcaseConfig {
        &self.config
    }

    #[must_use]
    pub fn stage(&self) -> &StageConfig {
        &self.config.stage
    }

    #[must_use]
    pub fn library(&self) -> &ModelLibrary {
        &self.library
    }

    #[must_use]
    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    #[must_use]
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    #[must_use]
    pub fn displayed(&self) -> &Displayed {
        &self.displayed
    }

    /// Animation name of the displayed library entry.
    #[must_use]
    pub fn displayed_name(&self) -> Option<&str> {
        match &self.displayed {
            Displayed::Library(name) => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn current(&self) -> Option<&CurrentAction> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn crossfade(&self) -> Option<&CrossFade> {
        self.crossfade.as_ref()
    }

    /// Whether any model load is still running.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        !self.pending.is_empty()
    }

    /// The model the host should draw.
    #[must_use]
    pub fn model(&self) -> Option<&Model> {
        match &self.displayed {
            Displayed::Nothing => None,
            Displayed::Library(name) => self.library.get(name).map(|e| &e.model),
            Displayed::Static(model) => Some(model),
        }
    }

    /// Mixer of the displayed model.
    #[must_use]
    pub fn mixer(&self) -> Option<&AnimationMixer> {
        let name = self.displayed_name()?;
        self.library.get(name).map(|e| &e.mixer)
    }

    #[must_use]
    pub fn current_action(&self) -> Option<&AnimationAction> {
        let current = self.current.as_ref()?;
        self.library.get(&current.model)?.mixer.action(current.action)
    }

    /// Sender for loader events; tests and custom loaders feed the showcase through it.
    #[must_use]
    pub fn event_sender(&self) -> Sender<LoadEvent> {
        self.events_tx.clone()
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Handles a key press. Returns `Ok(true)` when it selected an animation.
    pub fn handle_key(&mut self, key: &Key) -> Result<bool> {
        if !self.config.keyboard_shortcuts {
            return Ok(false);
        }
        let Some(index) = animation_index_for_key(key, self.config.animations.len()) else {
            return Ok(false);
        };
        let name = self.config.animations[index].clone();
        self.select_animation(&name)?;
        Ok(true)
    }

    /// Switches to `name`: cached models transition at once, others are loaded first.
    pub fn select_animation(&mut self, name: &str) -> Result<()> {
        if !self.config.animations.iter().any(|a| a == name) {
            return Err(AssetError::UnknownAnimation(name.to_string()).into());
        }

        self.selected = Some(name.to_string());
        self.panel.animation.select(&name.to_string());

        if self.library.contains(name) {
            return self.display(name);
        }
        if self.pending.contains(name) {
            log::debug!("`{name}` is already loading");
            return Ok(());
        }

        self.pending.insert(name.to_string());
        self.overlay.begin_loading(name);
        // Detached: the result comes back through the event channel.
        drop(
            self.server
                .spawn_load(self.runtime.handle(), name.to_string(), self.events_tx.clone()),
        );
        Ok(())
    }

    pub fn set_transition_duration(&mut self, seconds: f32) -> Option<f32> {
        let folder = self.panel.transition.as_mut()?;
        let value = folder.duration.set(seconds);
        self.config.transition.transition_duration = value;
        Some(value)
    }

    pub fn set_cross_fade_ratio(&mut self, ratio: f32) -> Option<f32> {
        let folder = self.panel.transition.as_mut()?;
        let value = folder.overlap.set(ratio);
        self.config.transition.cross_fade_ratio = value;
        Some(value)
    }

    pub fn set_interpolation(&mut self, easing: Easing) -> bool {
        let Some(folder) = self.panel.transition.as_mut() else {
            return false;
        };
        if !folder.interpolation.select(&easing) {
            return false;
        }
        self.config.transition.interpolation = easing;
        true
    }

    /// Writes a morph influence edited in the panel. The value becomes the
    /// rest influence the mixer blends toward.
    pub fn set_morph_influence(&mut self, node: NodeHandle, index: usize, value: f32) -> Option<f32> {
        let slider = self.panel.morphs.slider_mut(node, index)?;
        let value = slider.set(value);

        let model = match &mut self.displayed {
            Displayed::Nothing => return None,
            Displayed::Library(name) => &mut self.library.get_mut(name)?.model,
            Displayed::Static(model) => model.as_mut(),
        };
        let morph = model.node_mut(node)?.morph.as_mut()?;
        if !morph.set_influence(index, value) {
            return None;
        }
        morph.commit_default(index);
        Some(value)
    }

    // ========================================================================
    // Frame update
    // ========================================================================

    /// Advances the showcase by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }

        if let Displayed::Library(name) = &self.displayed
            && let Some(entry) = self.library.get_mut(name)
        {
            let LoadedModel { model, mixer, .. } = entry;
            if let Some(fade) = self.crossfade.as_mut()
                && fade.advance(dt, mixer) == CrossFadeState::Finished
            {
                self.crossfade = None;
            }
            mixer.update(dt, model);
        }

        self.overlay.update(dt);
    }

    /// Applies one loader event.
    pub fn handle_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Progress { name, loaded, total } => {
                self.overlay.update_loading(&name, loaded, total);
            }
            LoadEvent::Loaded { name, asset } => {
                self.pending.remove(&name);
                self.overlay.finish_loading(&name);
                self.on_loaded(name, *asset);
            }
            LoadEvent::Failed { name, error } => {
                self.pending.remove(&name);
                self.overlay.finish_loading(&name);
                log::warn!("Load of `{name}` failed: {error}");
                self.overlay
                    .push_load_error(&name, self.config.error_notice_seconds);
            }
        }
    }

    fn on_loaded(&mut self, name: String, asset: ModelAsset) {
        let is_selected = self.selected.as_deref() == Some(name.as_str());

        if asset.animations.is_empty() {
            log::warn!("`{name}` has no animation clips, showing it static");
            if is_selected {
                self.show_static(asset.model);
            }
            return;
        }

        let entry = match LoadedModel::from_asset(asset) {
            Ok(entry) => entry,
            Err(e) => {
                log::error!("Cannot prepare `{name}`: {e}");
                self.overlay
                    .push_load_error(&name, self.config.error_notice_seconds);
                return;
            }
        };

        if !is_selected && !self.config.cache_models {
            log::debug!("Dropping `{name}`: loaded after another selection");
            return;
        }

        self.library.insert(name.clone(), entry);
        if is_selected {
            if let Err(e) = self.display(&name) {
                log::error!("Cannot display `{name}`: {e}");
            }
        } else {
            log::debug!("Cached `{name}` without displaying it");
        }
    }

    /// Shows a clip-less model. Nothing plays until the next switch.
    fn show_static(&mut self, mut model: Model) {
        self.take_outgoing();
        if !self.config.cache_models {
            self.library.clear();
        }
        model.enable_mesh_shadows();
        self.panel.morphs.rebuild(&model);
        self.displayed = Displayed::Static(Box::new(model));
        self.crossfade = None;
    }

    /// Shows the library entry `name` and starts its clip.
    fn display(&mut self, name: &str) -> Result<()> {
        if self
            .current
            .as_ref()
            .is_some_and(|c| c.model == name && self.displayed_name() == Some(name))
        {
            return Ok(());
        }

        let outgoing = self.take_outgoing();
        if !self.config.cache_models {
            let stale: Vec<String> = self.library.names().filter(|n| *n != name).map(str::to_string).collect();
            for stale_name in stale {
                self.library.remove(&stale_name);
            }
        }

        let params = self.panel.crossfade_params();
        let mode = self.config.switch_mode;
        let entry = self
            .library
            .get_mut(name)
            .ok_or_else(|| AssetError::NotLoaded(name.to_string()))?;
        let LoadedModel {
            model,
            mixer,
            action,
            ..
        } = entry;
        let incoming = *action;

        match (mode, outgoing) {
            (SwitchMode::CrossFade, Some(outgoing)) => {
                let from = mixer.clip_action(&outgoing.clip, model);
                if let Some(out) = mixer.action_mut(from) {
                    out.reset()
                        .set_effective_time_scale(1.0)
                        .set_effective_weight(1.0)
                        .play();
                    out.time = outgoing.time;
                }
                if let Some(inc) = mixer.action_mut(incoming) {
                    let duration = inc.clip().duration;
                    inc.reset()
                        .set_effective_time_scale(1.0)
                        .set_effective_weight(0.0)
                        .play();
                    inc.time = if duration > 0.0 {
                        outgoing.time % duration
                    } else {
                        0.0
                    };
                }
                mixer.stop_all_except(&[from, incoming]);
                self.crossfade = Some(CrossFade::begin(from, incoming, params, mixer));
                log::info!(
                    "Cross-fading `{}` into `{name}` over {:.1}s",
                    outgoing.clip.name,
                    params.duration
                );
            }
            _ => {
                mixer.stop_all_except(&[incoming]);
                if let Some(inc) = mixer.action_mut(incoming) {
                    inc.reset()
                        .set_effective_time_scale(1.0)
                        .set_effective_weight(1.0)
                        .play();
                }
                self.crossfade = None;
                log::info!("Playing `{name}`");
            }
        }

        self.panel.morphs.rebuild(model);
        self.displayed = Displayed::Library(name.to_string());
        self.current = Some(CurrentAction {
            model: name.to_string(),
            action: incoming,
        });
        Ok(())
    }

    /// Captures the playing clip and parks the model that played it.
    fn take_outgoing(&mut self) -> Option<Outgoing> {
        let current = self.current.take()?;
        self.crossfade = None;

        let entry = self.library.get_mut(&current.model)?;
        let outgoing = entry.mixer.action(current.action).map(|a| Outgoing {
            clip: Arc::clone(a.clip()),
            time: a.time,
        });

        entry.mixer.stop_all_except(&[]);
        entry.model.restore_rest_pose();
        outgoing
    }
}
