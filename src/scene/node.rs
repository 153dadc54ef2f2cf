use cgmath::{Deg, Matrix4, One, Quaternion, Rotation3, Vector3};

use super::NodeId;

/// A single transform in the host hierarchy
///
/// Position and rotation are relative to the parent node. Scale is uniform.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub local_position: Vector3<f32>,
    pub local_rotation: Quaternion<f32>,
    pub local_scale: f32,
    /// Inactive nodes and their subtrees are invisible to chain building
    pub active: bool,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
}

impl Node {
    /// Create a node with identity rotation and unit scale
    pub fn new(name: impl Into<String>, local_position: Vector3<f32>) -> Self {
        Self {
            name: name.into(),
            local_position,
            local_rotation: Quaternion::one(),
            local_scale: 1.0,
            active: true,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Apply translation in the parent's frame
    pub fn translate(&mut self, translation: Vector3<f32>) {
        self.local_position += translation;
    }

    /// Set uniform scale
    pub fn set_scale(&mut self, scale: f32) {
        self.local_scale = scale;
    }

    /// Set rotation around Y axis
    pub fn set_rotation_y(&mut self, angle: Deg<f32>) {
        self.local_rotation = Quaternion::from_angle_y(angle);
    }

    /// Set rotation around Z axis
    pub fn set_rotation_z(&mut self, angle: Deg<f32>) {
        self.local_rotation = Quaternion::from_angle_z(angle);
    }

    /// Local transform as a matrix: T * R * S
    pub fn local_matrix(&self) -> Matrix4<f32> {
        let t = Matrix4::from_translation(self.local_position);
        let r = Matrix4::from(self.local_rotation);
        let s = Matrix4::from_scale(self.local_scale);
        t * r * s // Order matters: T * R * S
    }
}
