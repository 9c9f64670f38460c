use uuid::Uuid;

use crate::animation::TrackTarget;
use crate::scene::NodeHandle;
use crate::scene::morph::MorphTargets;
use crate::scene::transform::Transform;

/// A node of a loaded character model.
///
/// # Hierarchy
///
/// Nodes form a tree through parent-child relationships managed by
/// [`Model::attach`](crate::scene::Model::attach).
///
/// # Pose
///
/// `transform` is the animated local pose; `rest` is the pose the node was
/// loaded with and is what the mixer blends toward when the summed clip
/// weight is below one.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub uuid: Uuid,

    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    pub transform: Transform,
    pub rest: Transform,

    /// Morph targets of the mesh attached to this node, if any.
    pub morph: Option<MorphTargets>,

    pub is_mesh: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub visible: bool,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uuid: Uuid::new_v4(),
            parent: None,
            children: Vec::new(),
            transform: Transform::IDENTITY,
            rest: Transform::IDENTITY,
            morph: None,
            is_mesh: false,
            cast_shadow: false,
            receive_shadow: false,
            visible: true,
        }
    }

    /// Sets both the current and the rest pose.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self.rest = transform;
        self
    }

    #[must_use]
    pub fn with_morph_targets(mut self, morph: MorphTargets) -> Self {
        self.is_mesh = true;
        self.morph = Some(morph);
        self
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Display label: the node name, or its uuid when unnamed.
    #[must_use]
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            self.uuid.to_string()
        } else {
            self.name.clone()
        }
    }

    /// Resets one animated property to its rest value.
    pub fn restore_rest(&mut self, target: TrackTarget) {
        match target {
            TrackTarget::Translation => self.transform.position = self.rest.position,
            TrackTarget::Rotation => self.transform.rotation = self.rest.rotation,
            TrackTarget::Scale => self.transform.scale = self.rest.scale,
            TrackTarget::MorphInfluence(index) => {
                if let Some(morph) = self.morph.as_mut() {
                    morph.restore_default(index);
                }
            }
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("")
    }
}
