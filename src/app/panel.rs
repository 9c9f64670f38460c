//! Control panel state.
//!
//! The panel is data only: a host GUI draws the widgets and writes edits back
//! through [`Showcase`](crate::app::Showcase). Slider values are clamped to
//! their range and snapped to their step.

use crate::animation::{CrossFadeParams, Easing};
use crate::app::settings::{DURATION_RANGE, OVERLAP_RANGE, SliderRange, TransitionSettings};
use crate::scene::{Model, NodeHandle};

pub const TRANSITION_FOLDER: &str = "Transition";
pub const MORPH_FOLDER: &str = "Morphs";
pub const ANIMATION_LABEL: &str = "animation";

/// Range of every morph influence slider.
pub const MORPH_RANGE: SliderRange = SliderRange {
    min: 0.0,
    max: 1.0,
    step: 0.01,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    pub label: String,
    pub range: SliderRange,
    value: f32,
}

impl Slider {
    pub fn new(label: impl Into<String>, range: SliderRange, value: f32) -> Self {
        Self {
            label: label.into(),
            range,
            value: range.snap(value),
        }
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Stores `value` clamped and snapped, and returns what was stored.
    pub fn set(&mut self, value: f32) -> f32 {
        self.value = self.range.snap(value);
        self.value
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dropdown<T> {
    pub label: String,
    options: Vec<T>,
    selected: usize,
}

impl<T: PartialEq> Dropdown<T> {
    pub fn new(label: impl Into<String>, options: Vec<T>) -> Self {
        Self {
            label: label.into(),
            options,
            selected: 0,
        }
    }

    #[must_use]
    pub fn options(&self) -> &[T] {
        &self.options
    }

    #[must_use]
    pub fn selected(&self) -> Option<&T> {
        self.options.get(self.selected)
    }

    #[must_use]
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Selects `value`; returns `false` if it is not an option.
    pub fn select(&mut self, value: &T) -> bool {
        match self.options.iter().position(|o| o == value) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }
}

/// Duration, overlap and easing controls of the cross-fade.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionFolder {
    pub duration: Slider,
    pub overlap: Slider,
    pub interpolation: Dropdown<Easing>,
    pub open: bool,
}

impl TransitionFolder {
    #[must_use]
    pub fn new(settings: &TransitionSettings) -> Self {
        let mut interpolation = Dropdown::new("Interpolation", Easing::ALL.to_vec());
        interpolation.select(&settings.interpolation);
        Self {
            duration: Slider::new("Duration (s)", DURATION_RANGE, settings.transition_duration),
            overlap: Slider::new("Overlap", OVERLAP_RANGE, settings.cross_fade_ratio),
            interpolation,
            open: true,
        }
    }

    /// Parameters for the next cross-fade.
    #[must_use]
    pub fn params(&self) -> CrossFadeParams {
        CrossFadeParams {
            duration: self.duration.value(),
            overlap: self.overlap.value(),
            easing: self.interpolation.selected().copied().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MorphSlider {
    /// Index into the mesh's morph influences.
    pub index: usize,
    pub slider: Slider,
}

/// One sub-folder per mesh with morph targets.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshMorphFolder {
    pub node: NodeHandle,
    /// Node name, or its uuid when the node is unnamed.
    pub label: String,
    pub sliders: Vec<MorphSlider>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MorphFolder {
    meshes: Vec<MeshMorphFolder>,
}

impl MorphFolder {
    /// Replaces the sub-folders with those of `model`.
    pub fn rebuild(&mut self, model: &Model) {
        self.meshes.clear();
        for handle in model.morph_meshes() {
            let Some(node) = model.node(handle) else {
                continue;
            };
            let Some(morph) = node.morph.as_ref() else {
                continue;
            };
            let sliders = morph
                .names()
                .iter()
                .enumerate()
                .map(|(index, name)| MorphSlider {
                    index,
                    slider: Slider::new(name.clone(), MORPH_RANGE, morph.influence(index).unwrap_or(0.0)),
                })
                .collect();
            self.meshes.push(MeshMorphFolder {
                node: handle,
                label: node.label(),
                sliders,
            });
        }
        log::debug!("Morph panel rebuilt with {} meshes", self.meshes.len());
    }

    pub fn clear(&mut self) {
        self.meshes.clear();
    }

    #[must_use]
    pub fn meshes(&self) -> &[MeshMorphFolder] {
        &self.meshes
    }

    /// The folder is only shown when some mesh has morph targets.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !self.meshes.is_empty()
    }

    pub fn slider_mut(&mut self, node: NodeHandle, index: usize) -> Option<&mut Slider> {
        self.meshes
            .iter_mut()
            .find(|m| m.node == node)?
            .sliders
            .iter_mut()
            .find(|s| s.index == index)
            .map(|s| &mut s.slider)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlPanel {
    pub animation: Dropdown<String>,
    /// Present only when switches cross-fade.
    pub transition: Option<TransitionFolder>,
    pub morphs: MorphFolder,
}

impl ControlPanel {
    #[must_use]
    pub fn new(animations: Vec<String>, transition: Option<&TransitionSettings>) -> Self {
        Self {
            animation: Dropdown::new(ANIMATION_LABEL, animations),
            transition: transition.map(TransitionFolder::new),
            morphs: MorphFolder::default(),
        }
    }

    /// Cross-fade parameters, or the defaults when the folder is absent.
    #[must_use]
    pub fn crossfade_params(&self) -> CrossFadeParams {
        self.transition
            .as_ref()
            .map(TransitionFolder::params)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_clamps_and_snaps() {
        let mut slider = Slider::new("Duration (s)", DURATION_RANGE, 1.0);
        assert!((slider.set(1.26) - 1.3).abs() < 1e-5);
        assert!((slider.set(10.0) - 3.0).abs() < 1e-5);
        assert!((slider.set(-1.0) - 0.1).abs() < 1e-5);
    }

    #[test]
    fn dropdown_ignores_unknown_values() {
        let mut dropdown = Dropdown::new("animation", vec!["Taunt".to_string(), "Angry".to_string()]);
        assert!(dropdown.select(&"Angry".to_string()));
        assert!(!dropdown.select(&"Samba".to_string()));
        assert_eq!(dropdown.selected().map(String::as_str), Some("Angry"));
    }
}
