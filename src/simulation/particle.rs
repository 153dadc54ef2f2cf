//! Point mass wrapping one joint of a simulated chain

use cgmath::{Quaternion, Vector3};

use crate::scene::{JointHierarchy, NodeId};

/// One joint of a chain, simulated as a Verlet point mass
///
/// Velocity is implicit: it is the difference between the current and the
/// previous world position.
#[derive(Clone, Debug)]
pub struct Particle {
    pub joint: NodeId,
    /// Index of the parent particle in the owning chain; `None` for the root
    pub parent_index: Option<usize>,
    pub damping: f32,
    pub stiffness: f32,
    /// World space
    pub position_current: Vector3<f32>,
    /// World space
    pub position_previous: Vector3<f32>,
    bind_local_position: Vector3<f32>,
    bind_local_rotation: Quaternion<f32>,
}

impl Particle {
    /// Captures the joint's current pose as its bind pose, at rest
    pub fn new<H: JointHierarchy + ?Sized>(
        host: &H,
        joint: NodeId,
        parent_index: Option<usize>,
        damping: f32,
        stiffness: f32,
    ) -> Self {
        let position = host.world_position(joint);
        Self {
            joint,
            parent_index,
            damping,
            stiffness,
            position_current: position,
            position_previous: position,
            bind_local_position: host.local_position(joint),
            bind_local_rotation: host.local_rotation(joint),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_index.is_none()
    }

    /// Per-step displacement carried into the next step
    pub fn velocity(&self) -> Vector3<f32> {
        self.position_current - self.position_previous
    }

    pub fn bind_local_position(&self) -> Vector3<f32> {
        self.bind_local_position
    }

    /// Restores the joint's authored local transform
    pub fn reset<H: JointHierarchy + ?Sized>(&self, host: &mut H) {
        host.set_local_position(self.joint, self.bind_local_position);
        host.set_local_rotation(self.joint, self.bind_local_rotation);
    }
}
