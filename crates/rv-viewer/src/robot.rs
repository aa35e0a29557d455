//! Attached robot model and joint angle application.

use std::collections::HashMap;

use glam::{Mat4, Vec3};
use uuid::Uuid;

use rv_model::{joint_transform, JointLimits, JointType};
use rv_scene::Scene;

/// Live state of one named joint in an attached robot.
#[derive(Debug, Clone)]
pub struct JointState {
    /// Scene node driven by this joint.
    pub node: Uuid,
    pub joint_type: JointType,
    /// Normalized articulation axis.
    pub axis: Vec3,
    /// Fixed transform from the parent to the joint at zero position.
    pub origin: Mat4,
    /// Limits from the description; carried but not enforced.
    pub limits: Option<JointLimits>,
    /// Current value: degrees for rotational joints, meters for prismatic.
    pub value: f32,
}

impl JointState {
    /// The articulation position in the units `joint_transform` expects.
    fn position(&self) -> f32 {
        if self.joint_type.is_rotational() {
            self.value.to_radians()
        } else {
            self.value
        }
    }

    /// The node's local transform for the current value, computed absolutely
    /// from the fixed origin (never accumulated).
    pub fn local_transform(&self) -> Mat4 {
        self.origin * joint_transform(self.joint_type, self.axis, self.position())
    }
}

/// One attached robot: its scene roots and named joints.
pub struct RobotModel {
    pub name: String,
    /// Root scene nodes owned by this robot, in attach order.
    pub roots: Vec<Uuid>,
    joints: HashMap<String, JointState>,
}

impl RobotModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roots: Vec::new(),
            joints: HashMap::new(),
        }
    }

    /// Registers a joint. Joint names are unique within a model.
    pub fn insert_joint(&mut self, joint: JointState, name: impl Into<String>) {
        self.joints.insert(name.into(), joint);
    }

    /// Returns true if the model has a joint with this name.
    pub fn has_joint(&self, name: &str) -> bool {
        self.joints.contains_key(name)
    }

    /// Current value of a joint, if present.
    pub fn joint_value(&self, name: &str) -> Option<f32> {
        self.joints.get(name).map(|j| j.value)
    }

    /// Joint states by name.
    pub fn joints(&self) -> &HashMap<String, JointState> {
        &self.joints
    }

    /// Applies a new value to a named joint, updating the driven scene node
    /// and dirtying the scene.
    ///
    /// Returns false (leaving everything untouched) when the joint is not
    /// part of this model.
    pub fn set_joint_value(&mut self, scene: &mut Scene, name: &str, value: f32) -> bool {
        let Some(joint) = self.joints.get_mut(name) else {
            return false;
        };
        joint.value = value;
        let transform = joint.local_transform();
        if let Some(node) = scene.node_mut(joint.node) {
            node.local_transform = transform;
        }
        scene.mark_dirty();
        true
    }

    /// Copies every joint's current value into a fresh map.
    pub fn joint_values(&self) -> HashMap<String, f32> {
        self.joints
            .iter()
            .map(|(name, joint)| (name.clone(), joint.value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rv_scene::SceneNode;

    fn arm() -> (Scene, RobotModel) {
        let mut scene = Scene::new();
        let base = scene.attach(SceneNode::new("base"), None);
        let origin = Mat4::from_translation(Vec3::new(0.0, 0.0, 1.0));
        let joint_node = scene.attach(
            SceneNode::new("shoulder").with_transform(origin),
            Some(base),
        );
        scene.attach(SceneNode::new("upper"), Some(joint_node));

        let mut robot = RobotModel::new("arm");
        robot.roots.push(base);
        robot.insert_joint(
            JointState {
                node: joint_node,
                joint_type: JointType::Revolute,
                axis: Vec3::Z,
                origin,
                limits: Some(JointLimits::new(-90.0, 90.0)),
                value: 0.0,
            },
            "shoulder",
        );
        (scene, robot)
    }

    #[test]
    fn set_joint_value_recomputes_node_transform() {
        let (mut scene, mut robot) = arm();
        scene.mark_clean();

        assert!(robot.set_joint_value(&mut scene, "shoulder", 90.0));
        assert!(scene.is_dirty());

        let node = robot.joints()["shoulder"].node;
        let transform = scene.node(node).unwrap().local_transform;
        // Origin translation preserved, X axis rotated onto Y.
        let moved = transform.transform_point3(Vec3::X);
        assert!((moved - Vec3::new(0.0, 1.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn transform_is_absolute_not_accumulated() {
        let (mut scene, mut robot) = arm();
        robot.set_joint_value(&mut scene, "shoulder", 45.0);
        robot.set_joint_value(&mut scene, "shoulder", 45.0);

        let node = robot.joints()["shoulder"].node;
        let transform = scene.node(node).unwrap().local_transform;
        let expected = Mat4::from_translation(Vec3::new(0.0, 0.0, 1.0))
            * joint_transform(JointType::Revolute, Vec3::Z, 45.0_f32.to_radians());
        assert!(transform.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn unknown_joint_is_untouched_noop() {
        let (mut scene, mut robot) = arm();
        scene.mark_clean();

        assert!(!robot.set_joint_value(&mut scene, "nonexistent", 30.0));
        assert!(!scene.is_dirty());
        assert_eq!(robot.joint_value("shoulder"), Some(0.0));
    }

    #[test]
    fn values_are_unclamped() {
        let (mut scene, mut robot) = arm();
        // Past the declared limits; the viewer is deliberately permissive.
        robot.set_joint_value(&mut scene, "shoulder", 720.0);
        assert_eq!(robot.joint_value("shoulder"), Some(720.0));
    }

    #[test]
    fn joint_values_is_a_snapshot() {
        let (mut scene, mut robot) = arm();
        robot.set_joint_value(&mut scene, "shoulder", 12.5);

        let snapshot = robot.joint_values();
        assert_eq!(snapshot["shoulder"], 12.5);

        robot.set_joint_value(&mut scene, "shoulder", 99.0);
        // The copy does not follow later mutations.
        assert_eq!(snapshot["shoulder"], 12.5);
    }

    #[test]
    fn prismatic_uses_raw_value() {
        let mut scene = Scene::new();
        let node = scene.attach(SceneNode::new("slide"), None);
        let mut robot = RobotModel::new("slider");
        robot.roots.push(node);
        robot.insert_joint(
            JointState {
                node,
                joint_type: JointType::Prismatic,
                axis: Vec3::X,
                origin: Mat4::IDENTITY,
                limits: None,
                value: 0.0,
            },
            "slide",
        );

        robot.set_joint_value(&mut scene, "slide", 0.25);
        let transform = scene.node(node).unwrap().local_transform;
        let moved = transform.transform_point3(Vec3::ZERO);
        assert!((moved - Vec3::new(0.25, 0.0, 0.0)).length() < 1e-6);
    }
}
