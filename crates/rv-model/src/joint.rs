//! Joint types and transform math.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Joint type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum JointType {
    #[default]
    Fixed,
    Revolute,
    Continuous,
    Prismatic,
    Floating,
    Planar,
}

impl JointType {
    /// Returns true if this joint articulates about/along an axis.
    pub fn has_axis(&self) -> bool {
        matches!(
            self,
            JointType::Revolute | JointType::Continuous | JointType::Prismatic
        )
    }

    /// Returns true if the joint value is an angle (as opposed to a
    /// translation distance).
    pub fn is_rotational(&self) -> bool {
        matches!(self, JointType::Revolute | JointType::Continuous)
    }
}

impl From<&urdf_rs::JointType> for JointType {
    fn from(urdf_type: &urdf_rs::JointType) -> Self {
        match urdf_type {
            urdf_rs::JointType::Fixed => JointType::Fixed,
            urdf_rs::JointType::Revolute => JointType::Revolute,
            urdf_rs::JointType::Continuous => JointType::Continuous,
            urdf_rs::JointType::Prismatic => JointType::Prismatic,
            urdf_rs::JointType::Floating => JointType::Floating,
            urdf_rs::JointType::Planar => JointType::Planar,
            urdf_rs::JointType::Spherical => JointType::Floating, // Approximate as floating
        }
    }
}

/// Joint limits carried through from the description.
///
/// Limits are informational here; the viewer applies angles unclamped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JointLimits {
    /// Lower position limit (rad or m).
    pub lower: f32,
    /// Upper position limit (rad or m).
    pub upper: f32,
}

impl JointLimits {
    pub fn new(lower: f32, upper: f32) -> Self {
        Self { lower, upper }
    }
}

/// Computes the articulation transform for a joint at a given position.
///
/// Position is in radians for rotational joints and meters for prismatic
/// joints. Fixed, floating and planar joints contribute no articulation.
pub fn joint_transform(joint_type: JointType, axis: Vec3, position: f32) -> Mat4 {
    match joint_type {
        JointType::Revolute | JointType::Continuous => {
            Mat4::from_quat(Quat::from_axis_angle(axis, position))
        }
        JointType::Prismatic => Mat4::from_translation(axis * position),
        JointType::Fixed | JointType::Floating | JointType::Planar => Mat4::IDENTITY,
    }
}
