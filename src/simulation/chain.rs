//! # Particle Chains
//!
//! A [`ParticleChain`] is the flattened form of a joint subtree: one
//! [`Particle`] per active joint, stored parent-first, with integer parent
//! links instead of live hierarchy queries.
//!
//! Chains are never patched. When the root joint or the per-particle
//! parameters change, the owner resets the joints to their bind pose and
//! builds a new chain.

use std::collections::HashMap;

use cgmath::Vector3;
use log::{debug, warn};

use super::particle::Particle;
use crate::scene::{JointHierarchy, NodeId};

/// Ordered particles of one simulated joint subtree
#[derive(Clone, Debug)]
pub struct ParticleChain {
    particles: Vec<Particle>,
    /// Particle indices with every parent ahead of its children
    order: Vec<usize>,
    /// World position of the owning object at the end of the previous step
    anchor_previous_position: Vector3<f32>,
}

impl ParticleChain {
    /// A chain with no particles; stepping it does nothing
    pub fn empty() -> Self {
        Self {
            particles: Vec::new(),
            order: Vec::new(),
            anchor_previous_position: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    /// Walks the subtree under `root_joint` and seeds one particle per joint
    ///
    /// `owner_position` is the owning object's current world position; its
    /// motion between steps is what the chain inherits as inertia. Without a
    /// root joint, or with one the host does not know, the chain is empty.
    pub fn build<H: JointHierarchy + ?Sized>(
        host: &H,
        root_joint: Option<NodeId>,
        owner_position: Vector3<f32>,
        damping: f32,
        stiffness: f32,
    ) -> Self {
        let Some(root) = root_joint else {
            return Self::empty();
        };
        if !host.contains(root) {
            warn!("root joint {} is not part of the hierarchy", root);
            return Self::empty();
        }

        let mut particles: Vec<Particle> = Vec::new();
        let mut index_of: HashMap<NodeId, usize> = HashMap::new();

        for joint in host.descendants(root) {
            let parent_index = if joint == root {
                None
            } else {
                match host.parent(joint).and_then(|p| index_of.get(&p).copied()) {
                    Some(index) => Some(index),
                    None => {
                        debug!("skipping joint {} whose parent is not in the chain", joint);
                        continue;
                    }
                }
            };
            index_of.insert(joint, particles.len());
            particles.push(Particle::new(host, joint, parent_index, damping, stiffness));
        }

        let order = parent_first_order(&particles);
        debug!(
            "built chain of {} particles from root {} (damping {}, stiffness {})",
            particles.len(),
            root,
            damping,
            stiffness
        );

        Self {
            particles,
            order,
            anchor_previous_position: owner_position,
        }
    }

    /// Restores every joint of the chain to its bind pose
    pub fn reset<H: JointHierarchy + ?Sized>(&self, host: &mut H) {
        for particle in &self.particles {
            particle.reset(host);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// The joint the chain hangs from, if any
    pub fn root_joint(&self) -> Option<NodeId> {
        self.particles.first().map(|p| p.joint)
    }

    /// Particle indices in parent-before-child order
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn anchor_previous_position(&self) -> Vector3<f32> {
        self.anchor_previous_position
    }

    /// Records the owner's position and returns how far it moved since last time
    pub(crate) fn advance_anchor(&mut self, owner_position: Vector3<f32>) -> Vector3<f32> {
        let bias = owner_position - self.anchor_previous_position;
        self.anchor_previous_position = owner_position;
        bias
    }
}

/// Depth-first order over parent links, children in index order
fn parent_first_order(particles: &[Particle]) -> Vec<usize> {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); particles.len()];
    let mut roots = Vec::new();
    for (index, particle) in particles.iter().enumerate() {
        match particle.parent_index {
            Some(parent) => children[parent].push(index),
            None => roots.push(index),
        }
    }

    let mut order = Vec::with_capacity(particles.len());
    let mut stack: Vec<usize> = roots.into_iter().rev().collect();
    while let Some(index) = stack.pop() {
        order.push(index);
        stack.extend(children[index].iter().rev().copied());
    }
    order
}
