//! # Chain Solver
//!
//! Advances a [`ParticleChain`] by one time increment and writes the result
//! back into the host hierarchy. Each step runs two passes in parent-first
//! order:
//!
//! 1. **Integration**: damped Verlet for every child particle, plus the
//!    owner's motion since the last step scaled by stiffness. The root
//!    particle is not simulated; it is snapped to its live joint.
//! 2. **Constraints**: pull each child toward a rigid copy of its parent's
//!    motion (shape), restore the rest length to the parent (length), then
//!    rotate the parent joint to point at where the child ended up.
//!
//! The constraint pass mutates joint rotations that later particles read, so
//! both passes follow [`ParticleChain::order`].
//!
//! The integrator is time-step dependent by nature: the same motion fed with
//! different step lengths gives different trajectories.

use cgmath::{EuclideanSpace, InnerSpace, Point3, Quaternion, Rotation, Transform, Vector3};
use log::trace;

use super::chain::ParticleChain;
use crate::scene::JointHierarchy;

/// Stateful stepping engine for particle chains
#[derive(Clone, Debug)]
pub struct Simulator {
    /// Constant force applied to every child particle
    force: Vector3<f32>,
    /// Owner displacement for the step in progress
    root_bias: Vector3<f32>,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, 0.0, 0.0))
    }
}

impl Simulator {
    pub fn new(force: Vector3<f32>) -> Self {
        Self {
            force,
            root_bias: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    pub fn force(&self) -> Vector3<f32> {
        self.force
    }

    pub fn set_force(&mut self, force: Vector3<f32>) {
        self.force = force;
    }

    /// Advances `chain` by `delta_time` seconds
    ///
    /// `owner_position` is the owning object's current world position. Does
    /// nothing for an empty chain. Negative times are treated as zero.
    pub fn step<H: JointHierarchy + ?Sized>(
        &mut self,
        chain: &mut ParticleChain,
        host: &mut H,
        owner_position: Vector3<f32>,
        delta_time: f32,
    ) {
        if chain.is_empty() {
            return;
        }
        let dt = delta_time.max(0.0);
        let t2 = dt * dt;

        self.root_bias = chain.advance_anchor(owner_position);
        trace!(
            "stepping {} particles, dt {:.5}, owner moved {:?}",
            chain.len(),
            dt,
            self.root_bias
        );

        self.integrate(chain, host, t2);
        self.constrain(chain, host);

        self.root_bias = Vector3::new(0.0, 0.0, 0.0);
    }

    fn integrate<H: JointHierarchy + ?Sized>(
        &self,
        chain: &mut ParticleChain,
        host: &H,
        t2: f32,
    ) {
        let order = chain.order().to_vec();
        let particles = chain.particles_mut();
        for index in order {
            let p = &mut particles[index];
            if p.is_root() {
                // the root tracks the host exactly
                p.position_previous = p.position_current;
                p.position_current = host.world_position(p.joint);
                continue;
            }

            let velocity = p.velocity();
            let transform_bias = self.root_bias * p.stiffness;
            p.position_previous = p.position_current + transform_bias;
            p.position_current = p.position_current
                + velocity * (1.0 - p.damping)
                + self.force * t2
                + transform_bias;
        }
    }

    fn constrain<H: JointHierarchy + ?Sized>(&self, chain: &mut ParticleChain, host: &mut H) {
        let order = chain.order().to_vec();
        let particles = chain.particles_mut();
        for index in order {
            let Some(parent_index) = particles[index].parent_index else {
                continue;
            };
            let parent_joint = particles[parent_index].joint;
            let parent_position = particles[parent_index].position_current;
            let p = &mut particles[index];

            let rest_length =
                (host.world_position(parent_joint) - host.world_position(p.joint)).magnitude();
            // more than one child makes the parent's orientation ambiguous
            let single_child = host.child_count(parent_joint) <= 1;

            // keep shape
            if p.stiffness > 0.0 && single_child {
                let mut parent_matrix = host.local_to_world(parent_joint);
                parent_matrix.w = parent_position.extend(1.0);
                let rest_position = parent_matrix
                    .transform_point(Point3::from_vec(p.bind_local_position()))
                    .to_vec();

                let d = rest_position - p.position_current;
                p.position_current += d * p.stiffness;

                let d = rest_position - p.position_current;
                let len = d.magnitude();
                let max_len = rest_length * (1.0 - p.stiffness) * 2.0;
                if len > max_len {
                    p.position_current += d * ((len - max_len) / len);
                }
            }

            // keep length
            let dd = parent_position - p.position_current;
            let len = dd.magnitude();
            if len > 0.0 {
                p.position_current += dd * ((len - rest_length) / len);
            }

            // orient the parent toward the simulated child
            if single_child {
                let parent_rotation = host.world_rotation(parent_joint);
                let authored = parent_rotation.rotate_vector(p.bind_local_position());
                let simulated = p.position_current - parent_position;
                let rotation = Quaternion::from_arc(authored, simulated, None);
                host.set_world_rotation(parent_joint, rotation * parent_rotation);
            }

            host.set_world_position(p.joint, p.position_current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{NodeId, SceneGraph};
    use cgmath::Deg;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const EPSILON: f32 = 1e-4;

    fn assert_close(a: Vector3<f32>, b: Vector3<f32>) {
        assert!((a - b).magnitude() < EPSILON, "{:?} != {:?}", a, b);
    }

    /// owner -> root -> mid -> tip, hanging straight down one unit per segment
    fn straight_rig() -> (SceneGraph, NodeId, Vec<NodeId>) {
        let mut graph = SceneGraph::new();
        let owner = graph.add_root("owner", Vector3::new(0.0, 0.0, 0.0));
        let joints = graph
            .add_chain(owner, "joint", 3, Vector3::new(0.0, -1.0, 0.0))
            .unwrap();
        (graph, owner, joints)
    }

    fn build(
        graph: &SceneGraph,
        owner: NodeId,
        root: NodeId,
        damping: f32,
        stiffness: f32,
    ) -> ParticleChain {
        ParticleChain::build(graph, Some(root), graph.world_position(owner), damping, stiffness)
    }

    /// One scheduled tick: restore the bind pose, then step
    fn tick(
        simulator: &mut Simulator,
        chain: &mut ParticleChain,
        graph: &mut SceneGraph,
        owner: NodeId,
        dt: f32,
    ) {
        chain.reset(graph);
        let owner_position = graph.world_position(owner);
        simulator.step(chain, graph, owner_position, dt);
    }

    fn move_owner(graph: &mut SceneGraph, owner: NodeId, by: Vector3<f32>) {
        graph.node_mut(owner).unwrap().translate(by);
    }

    #[test]
    fn test_empty_chain_is_a_no_op() {
        let (mut graph, owner, joints) = straight_rig();
        let mut chain = ParticleChain::empty();
        let mut simulator = Simulator::default();
        simulator.step(&mut chain, &mut graph, Vector3::new(3.0, 0.0, 0.0), 0.016);
        assert_close(graph.world_position(joints[2]), Vector3::new(0.0, -2.0, 0.0));
        assert_close(graph.world_position(owner), Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_rigid_limit_follows_owner() {
        let (mut graph, owner, joints) = straight_rig();
        let mut chain = build(&graph, owner, joints[0], 0.0, 1.0);
        let mut simulator = Simulator::default();

        let mid_before = chain.particles()[1].position_current;
        let tip_before = chain.particles()[2].position_current;
        let displacement = Vector3::new(1.0, 0.0, 0.0);
        move_owner(&mut graph, owner, displacement);

        tick(&mut simulator, &mut chain, &mut graph, owner, 0.016);

        assert_close(chain.particles()[1].position_current, mid_before + displacement);
        assert_close(chain.particles()[2].position_current, tip_before + displacement);
        assert_close(graph.world_position(joints[2]), tip_before + displacement);
    }

    #[test]
    fn test_pendulum_limit_keeps_positions_up_to_length() {
        let (mut graph, owner, joints) = straight_rig();
        let mut chain = build(&graph, owner, joints[0], 0.0, 0.0);
        let mut simulator = Simulator::default();

        let mid_before = chain.particles()[1].position_current;
        let tip_before = chain.particles()[2].position_current;
        move_owner(&mut graph, owner, Vector3::new(1.0, 0.0, 0.0));

        tick(&mut simulator, &mut chain, &mut graph, owner, 0.016);

        // mid is pulled along the line to the new root until it is one unit away
        let root = Vector3::new(1.0, 0.0, 0.0);
        let expected_mid = root + (mid_before - root).normalize();
        assert_close(chain.particles()[1].position_current, expected_mid);

        let expected_tip = expected_mid + (tip_before - expected_mid).normalize();
        assert_close(chain.particles()[2].position_current, expected_tip);
        assert_close(graph.world_position(joints[1]), expected_mid);
        assert_close(graph.world_position(joints[2]), expected_tip);
    }

    #[test]
    fn test_length_is_preserved_every_tick() {
        let (mut graph, owner, joints) = straight_rig();
        let mut chain = build(&graph, owner, joints[0], 0.0, 0.0);
        let mut simulator = Simulator::default();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let jolt = Vector3::new(
                rng.random_range(-0.3..0.3),
                rng.random_range(-0.3..0.3),
                rng.random_range(-0.3..0.3),
            );
            move_owner(&mut graph, owner, jolt);
            tick(&mut simulator, &mut chain, &mut graph, owner, 1.0 / 60.0);

            for particle in chain.particles().iter().skip(1) {
                let parent = &chain.particles()[particle.parent_index.unwrap()];
                let distance = (particle.position_current - parent.position_current).magnitude();
                assert!((distance - 1.0).abs() < EPSILON, "segment length {}", distance);
            }
        }
    }

    #[test]
    fn test_parent_rotates_toward_child() {
        let (mut graph, owner, joints) = straight_rig();
        let mut chain = build(&graph, owner, joints[0], 0.0, 0.0);
        let mut simulator = Simulator::default();

        move_owner(&mut graph, owner, Vector3::new(1.0, 0.0, 0.0));
        tick(&mut simulator, &mut chain, &mut graph, owner, 0.016);

        let root = chain.particles()[0].position_current;
        let mid = chain.particles()[1].position_current;
        let authored = Vector3::new(0.0, -1.0, 0.0);
        let pointing = graph.world_rotation(joints[0]).rotate_vector(authored);
        assert_close(pointing, (mid - root).normalize());
    }

    #[test]
    fn test_multi_child_parent_keeps_rotation() {
        let mut graph = SceneGraph::new();
        let owner = graph.add_root("owner", Vector3::new(0.0, 0.0, 0.0));
        let root = graph.add_child(owner, "root", Vector3::new(0.0, 0.0, 0.0)).unwrap();
        graph.node_mut(root).unwrap().set_rotation_y(Deg(20.0));
        graph.add_child(root, "left", Vector3::new(-1.0, -1.0, 0.0)).unwrap();
        graph.add_child(root, "right", Vector3::new(1.0, -1.0, 0.0)).unwrap();

        let mut chain = build(&graph, owner, root, 0.1, 0.5);
        let mut simulator = Simulator::new(Vector3::new(0.0, -5.0, 0.0));
        for _ in 0..10 {
            move_owner(&mut graph, owner, Vector3::new(0.2, 0.0, 0.1));
            chain.reset(&mut graph);
            let before = graph.world_rotation(root);
            let owner_position = graph.world_position(owner);
            simulator.step(&mut chain, &mut graph, owner_position, 0.02);
            assert_eq!(graph.world_rotation(root), before);
        }
    }

    #[test]
    fn test_shape_pull_is_clamped_to_stretch_limit() {
        let mut graph = SceneGraph::new();
        let owner = graph.add_root("owner", Vector3::new(0.0, 0.0, 0.0));
        let joints = graph
            .add_chain(owner, "joint", 2, Vector3::new(0.0, -1.0, 0.0))
            .unwrap();
        let mut chain = build(&graph, owner, joints[0], 0.0, 0.5);
        // a violent sideways velocity of 50 units per step
        chain.particles_mut()[1].position_previous = Vector3::new(-50.0, -1.0, 0.0);
        let mut simulator = Simulator::default();

        tick(&mut simulator, &mut chain, &mut graph, owner, 0.016);

        // half the pull leaves the tip 25 units from its rest position (0, -1, 0);
        // the clamp brings it back to 1.0 * (1 - 0.5) * 2 = 1 unit before the
        // length correction projects it onto the unit circle around the root
        let expected = Vector3::new(1.0, -1.0, 0.0).normalize();
        assert_close(chain.particles()[1].position_current, expected);
        assert_close(graph.world_position(joints[1]), expected);
    }

    #[test]
    fn test_multi_child_parent_skips_shape_pull() {
        let mut graph = SceneGraph::new();
        let owner = graph.add_root("owner", Vector3::new(0.0, 0.0, 0.0));
        let root = graph.add_child(owner, "root", Vector3::new(0.0, 0.0, 0.0)).unwrap();
        let left = graph.add_child(root, "left", Vector3::new(-1.0, -1.0, 0.0)).unwrap();
        let right = graph.add_child(root, "right", Vector3::new(1.0, -1.0, 0.0)).unwrap();

        // fully stiff: a single-child parent would snap the child back to rest
        let mut chain = build(&graph, owner, root, 0.0, 1.0);
        chain.particles_mut()[1].position_previous = Vector3::new(-1.5, -1.0, 0.0);
        let mut simulator = Simulator::default();

        tick(&mut simulator, &mut chain, &mut graph, owner, 0.016);

        // pendulum: integrated to (-0.5, -1, 0), then only the length is restored
        let pendulum = Vector3::new(-0.5, -1.0, 0.0).normalize() * 2.0_f32.sqrt();
        assert_close(chain.particles()[1].position_current, pendulum);
        assert_close(graph.world_position(left), pendulum);
        assert!((graph.world_position(left) - Vector3::new(-1.0, -1.0, 0.0)).magnitude() > 0.1);
        assert_close(graph.world_position(right), Vector3::new(1.0, -1.0, 0.0));
    }

    #[test]
    fn test_zero_time_step_is_stationary_at_rest() {
        let (mut graph, owner, joints) = straight_rig();
        let mut chain = build(&graph, owner, joints[0], 0.1, 0.4);
        let mut simulator = Simulator::new(Vector3::new(0.0, -9.8, 0.0));

        for _ in 0..5 {
            tick(&mut simulator, &mut chain, &mut graph, owner, 0.0);
        }
        assert_close(graph.world_position(joints[1]), Vector3::new(0.0, -1.0, 0.0));
        assert_close(graph.world_position(joints[2]), Vector3::new(0.0, -2.0, 0.0));
    }

    #[test]
    fn test_reset_then_zero_step_restores_simulated_pose() {
        let (mut graph, owner, joints) = straight_rig();
        // full damping: no velocity carries into the zero-time step
        let mut chain = build(&graph, owner, joints[0], 1.0, 0.0);
        let mut simulator = Simulator::default();

        move_owner(&mut graph, owner, Vector3::new(0.7, 0.2, -0.4));
        tick(&mut simulator, &mut chain, &mut graph, owner, 0.016);
        let simulated: Vec<_> = joints.iter().map(|&j| graph.world_position(j)).collect();

        tick(&mut simulator, &mut chain, &mut graph, owner, 0.0);
        for (&joint, expected) in joints.iter().zip(simulated).skip(1) {
            assert_close(graph.world_position(joint), expected);
        }
    }

    #[test]
    fn test_force_accelerates_children() {
        let mut graph = SceneGraph::new();
        let owner = graph.add_root("owner", Vector3::new(0.0, 0.0, 0.0));
        let joints = graph
            .add_chain(owner, "joint", 2, Vector3::new(1.0, 0.0, 0.0))
            .unwrap();
        let mut chain = build(&graph, owner, joints[0], 0.0, 0.0);
        let mut simulator = Simulator::new(Vector3::new(0.0, -10.0, 0.0));

        for _ in 0..10 {
            tick(&mut simulator, &mut chain, &mut graph, owner, 0.05);
        }
        // the horizontal segment swings down under the force, length intact
        let tip = graph.world_position(joints[1]);
        assert!(tip.y < -0.1, "tip did not fall: {:?}", tip);
        assert!((tip.magnitude() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_degenerate_segment_does_not_produce_nan() {
        let mut graph = SceneGraph::new();
        let owner = graph.add_root("owner", Vector3::new(0.0, 0.0, 0.0));
        let root = graph.add_child(owner, "root", Vector3::new(0.0, 0.0, 0.0)).unwrap();
        // child sits exactly on its parent
        let child = graph.add_child(root, "child", Vector3::new(0.0, 0.0, 0.0)).unwrap();

        let mut chain = build(&graph, owner, root, 0.1, 0.5);
        let mut simulator = Simulator::default();
        for _ in 0..3 {
            move_owner(&mut graph, owner, Vector3::new(0.5, 0.0, 0.0));
            tick(&mut simulator, &mut chain, &mut graph, owner, 0.016);
        }
        let position = graph.world_position(child);
        assert!(position.x.is_finite() && position.y.is_finite() && position.z.is_finite());
        let rotation = graph.world_rotation(root);
        assert!(rotation.s.is_finite());
    }
}
