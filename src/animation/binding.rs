use crate::scene::NodeHandle;

/// Defines the node property a track writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackTarget {
    Translation, // Maps to transform.position
    Rotation,    // Maps to transform.rotation
    Scale,       // Maps to transform.scale
    /// Maps to one morph target influence of the node's mesh.
    MorphInfluence(usize),
}

/// Binding relationship: maps track `track_index` of a clip to the target
/// property of `node` in a model.
#[derive(Debug, Clone, Copy)]
pub struct PropertyBinding {
    pub track_index: usize,
    pub node: NodeHandle,
    pub target: TrackTarget,
}
