//! Host transform hierarchy
//!
//! The simulator never owns joints. It reads and writes them through
//! [`JointHierarchy`], which any scene graph can implement. [`SceneGraph`] is
//! the arena-backed implementation used by the CLI and the tests.

pub mod graph;
pub mod node;

use std::fmt;

use cgmath::{Matrix4, Quaternion, Vector3};

pub use graph::SceneGraph;
pub use node::Node;

/// Handle to a node inside a host hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything the simulator needs from a transform hierarchy
///
/// Readers and writers take node ids previously obtained from the same
/// hierarchy. Implementations may panic on ids they never issued; use
/// [`JointHierarchy::contains`] to validate foreign ids first.
pub trait JointHierarchy {
    /// Whether `node` exists in this hierarchy
    fn contains(&self, node: NodeId) -> bool;

    /// `root` followed by its active descendants, parents before children
    ///
    /// Inactive nodes are skipped together with their subtrees. An unknown
    /// root, or one that is inactive itself or through an ancestor, yields an
    /// empty list.
    fn descendants(&self, root: NodeId) -> Vec<NodeId>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Number of direct children, active or not
    fn child_count(&self, node: NodeId) -> usize;

    fn world_position(&self, node: NodeId) -> Vector3<f32>;
    fn world_rotation(&self, node: NodeId) -> Quaternion<f32>;
    fn local_position(&self, node: NodeId) -> Vector3<f32>;
    fn local_rotation(&self, node: NodeId) -> Quaternion<f32>;

    /// Full local-to-world matrix including scale
    fn local_to_world(&self, node: NodeId) -> Matrix4<f32>;

    fn set_world_position(&mut self, node: NodeId, position: Vector3<f32>);
    fn set_world_rotation(&mut self, node: NodeId, rotation: Quaternion<f32>);
    fn set_local_position(&mut self, node: NodeId, position: Vector3<f32>);
    fn set_local_rotation(&mut self, node: NodeId, rotation: Quaternion<f32>);
}
