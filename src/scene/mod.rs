//! Scene data for a loaded character.
//!
//! - [`Model`]: node tree of one loaded asset
//! - [`Node`]: name, transform, rest pose and optional morph targets
//! - [`Transform`]: local position, rotation and scale
//! - [`MorphTargets`]: named blend-shape influences
//! - [`StageConfig`]: camera, lights, ground and fog setup for the host renderer

pub mod model;
pub mod morph;
pub mod node;
pub mod stage;
pub mod transform;

pub use model::Model;
pub use morph::MorphTargets;
pub use node::Node;
pub use stage::{CameraSetup, StageConfig};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
}
