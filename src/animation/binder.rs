use crate::animation::binding::{PropertyBinding, TrackTarget};
use crate::animation::clip::AnimationClip;
use crate::scene::Model;

pub struct Binder;

impl Binder {
    /// Resolves every track of `clip` to a node of `model` by name.
    ///
    /// Tracks whose node is missing, or whose morph index is out of range for
    /// the node's mesh, are skipped.
    #[must_use]
    pub fn bind(model: &Model, clip: &AnimationClip) -> Vec<PropertyBinding> {
        let mut bindings = Vec::with_capacity(clip.tracks.len());
        let mut skipped = 0usize;

        for (track_index, track) in clip.tracks.iter().enumerate() {
            let Some(node) = model.find_by_name(&track.node_name) else {
                skipped += 1;
                continue;
            };

            if let TrackTarget::MorphInfluence(index) = track.target {
                let in_range = model
                    .node(node)
                    .and_then(|n| n.morph.as_ref())
                    .is_some_and(|m| index < m.len());
                if !in_range {
                    skipped += 1;
                    continue;
                }
            }

            bindings.push(PropertyBinding {
                track_index,
                node,
                target: track.target,
            });
        }

        if skipped > 0 {
            log::debug!(
                "Clip `{}`: {skipped} of {} tracks have no target in model `{}`",
                clip.name,
                clip.tracks.len(),
                model.name
            );
        }

        bindings
    }
}
