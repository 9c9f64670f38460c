use glam::Affine3A;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::node::Node;

/// A loaded character: a node tree with transforms and morph targets.
///
/// This is what a renderer draws and what an [`AnimationMixer`] poses.
///
/// [`AnimationMixer`]: crate::animation::AnimationMixer
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub name: String,
    nodes: SlotMap<NodeHandle, Node>,
    roots: Vec<NodeHandle>,
    by_name: FxHashMap<String, NodeHandle>,
}

impl Model {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a node as a new root. The first node with a given name wins name lookups.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let name = node.name.clone();
        let handle = self.nodes.insert(node);
        if !name.is_empty() {
            self.by_name.entry(name).or_insert(handle);
        }
        self.roots.push(handle);
        handle
    }

    /// Re-parents `child` under `parent`.
    ///
    /// Returns `false` (and changes nothing) when either handle is stale or
    /// the move would create a cycle.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) -> bool {
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            return false;
        }
        if self.is_ancestor_or_self(child, parent) {
            log::warn!("Refusing to attach a node below its own descendant");
            return false;
        }

        match self.nodes[child].parent {
            Some(old) => self.nodes[old].children.retain(|&c| c != child),
            None => self.roots.retain(|&r| r != child),
        }

        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        true
    }

    fn is_ancestor_or_self(&self, ancestor: NodeHandle, mut node: NodeHandle) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes.get(node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in depth-first pre-order, roots first.
    #[must_use]
    pub fn traverse(&self) -> Vec<NodeHandle> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeHandle> = self.roots.iter().rev().copied().collect();
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            order.push(handle);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    /// Mesh nodes that carry morph targets, in traversal order.
    #[must_use]
    pub fn morph_meshes(&self) -> Vec<NodeHandle> {
        self.traverse()
            .into_iter()
            .filter(|&h| self.nodes[h].morph.as_ref().is_some_and(|m| !m.is_empty()))
            .collect()
    }

    /// Turns on shadow casting and receiving for every mesh node.
    pub fn enable_mesh_shadows(&mut self) {
        for node in self.nodes.values_mut().filter(|n| n.is_mesh) {
            node.cast_shadow = true;
            node.receive_shadow = true;
        }
    }

    /// Composes local matrices from the root down to `handle`.
    #[must_use]
    pub fn world_matrix(&self, handle: NodeHandle) -> Option<Affine3A> {
        let mut matrix = self.nodes.get(handle)?.transform.local_matrix();
        let mut current = self.nodes[handle].parent;
        while let Some(parent) = current {
            let node = self.nodes.get(parent)?;
            matrix = node.transform.local_matrix() * matrix;
            current = node.parent;
        }
        Some(matrix)
    }

    /// Puts every node back into its rest pose and default morph influences.
    pub fn restore_rest_pose(&mut self) {
        for node in self.nodes.values_mut() {
            node.transform = node.rest;
            if let Some(morph) = node.morph.as_mut() {
                for index in 0..morph.len() {
                    morph.restore_default(index);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_rejects_cycles() {
        let mut model = Model::new("rig");
        let a = model.add_node(Node::new("a"));
        let b = model.add_node(Node::new("b"));
        assert!(model.attach(b, a));
        assert!(!model.attach(a, b));
        assert_eq!(model.roots(), &[a]);
        assert_eq!(model.node(b).and_then(Node::parent), Some(a));
    }
}
