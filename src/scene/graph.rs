use cgmath::{
    EuclideanSpace, InnerSpace, Matrix4, One, Point3, Quaternion, SquareMatrix, Transform,
    Vector3,
};
use log::debug;

use super::{JointHierarchy, Node, NodeId};
use crate::error::{Result, SwayError};

/// Arena-backed transform hierarchy
///
/// Nodes are never removed, so a [`NodeId`] issued by a graph stays valid
/// for the graph's lifetime.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    /// Creates an empty scene graph
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Adds a top-level node at the given world position
    pub fn add_root(&mut self, name: impl Into<String>, position: Vector3<f32>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(name, position));
        id
    }

    /// Adds a child under `parent` with a position relative to it
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        local_position: Vector3<f32>,
    ) -> Result<NodeId> {
        if !self.contains(parent) {
            return Err(SwayError::UnknownNode(parent));
        }
        let id = NodeId(self.nodes.len());
        let mut node = Node::new(name, local_position);
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Appends a straight chain of `count` joints under `parent`
    ///
    /// Each joint sits `offset` away from the previous one. Returns the ids
    /// in order, first joint first.
    pub fn add_chain(
        &mut self,
        parent: NodeId,
        prefix: &str,
        count: usize,
        offset: Vector3<f32>,
    ) -> Result<Vec<NodeId>> {
        let mut ids = Vec::with_capacity(count);
        let mut current = parent;
        for i in 0..count {
            // the first joint sits on its parent
            let local = if i == 0 { Vector3::new(0.0, 0.0, 0.0) } else { offset };
            current = self.add_child(current, format!("{}_{}", prefix, i), local)?;
            ids.push(current);
        }
        debug!("added {} joint chain '{}' under {}", count, prefix, parent);
        Ok(ids)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Finds the first node with the given name
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(SwayError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(SwayError::UnknownNode(id))
    }

    /// Activates or deactivates a node (and with it, its subtree)
    pub fn set_active(&mut self, id: NodeId, active: bool) -> Result<()> {
        self.node_mut(id)?.active = active;
        Ok(())
    }

    /// Whether `id` and every one of its ancestors are active
    pub fn active_in_hierarchy(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.nodes.get(c.0)) {
            if !node.active {
                return false;
            }
            current = node.parent;
        }
        true
    }

    fn parent_matrix(&self, id: NodeId) -> Matrix4<f32> {
        match self.nodes[id.0].parent {
            Some(parent) => self.local_to_world(parent),
            None => Matrix4::identity(),
        }
    }

    fn parent_rotation(&self, id: NodeId) -> Quaternion<f32> {
        match self.nodes[id.0].parent {
            Some(parent) => self.world_rotation(parent),
            None => Quaternion::one(),
        }
    }
}

impl JointHierarchy for SceneGraph {
    fn contains(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(root) || !self.active_in_hierarchy(root) {
            return out;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if !node.active {
                continue;
            }
            out.push(id);
            // reversed so the first child is visited first
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn child_count(&self, node: NodeId) -> usize {
        self.nodes[node.0].children.len()
    }

    fn world_position(&self, node: NodeId) -> Vector3<f32> {
        self.local_to_world(node).w.truncate()
    }

    fn world_rotation(&self, node: NodeId) -> Quaternion<f32> {
        let local = self.nodes[node.0].local_rotation;
        match self.nodes[node.0].parent {
            Some(parent) => (self.world_rotation(parent) * local).normalize(),
            None => local,
        }
    }

    fn local_position(&self, node: NodeId) -> Vector3<f32> {
        self.nodes[node.0].local_position
    }

    fn local_rotation(&self, node: NodeId) -> Quaternion<f32> {
        self.nodes[node.0].local_rotation
    }

    fn local_to_world(&self, node: NodeId) -> Matrix4<f32> {
        self.parent_matrix(node) * self.nodes[node.0].local_matrix()
    }

    fn set_world_position(&mut self, node: NodeId, position: Vector3<f32>) {
        let parent = self.parent_matrix(node);
        // A zero-scale parent has no inverse; leave the joint where it is
        if let Some(inverse) = parent.invert() {
            let local = inverse.transform_point(Point3::from_vec(position));
            self.nodes[node.0].local_position = local.to_vec();
        }
    }

    fn set_world_rotation(&mut self, node: NodeId, rotation: Quaternion<f32>) {
        let parent = self.parent_rotation(node);
        self.nodes[node.0].local_rotation = (parent.conjugate() * rotation).normalize();
    }

    fn set_local_position(&mut self, node: NodeId, position: Vector3<f32>) {
        self.nodes[node.0].local_position = position;
    }

    fn set_local_rotation(&mut self, node: NodeId, rotation: Quaternion<f32>) {
        self.nodes[node.0].local_rotation = rotation.normalize();
    }
}
