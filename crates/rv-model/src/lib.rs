//! Robot Description Loading
//!
//! Parses a robot description (URDF) into a renderer-agnostic model-node
//! tree and decodes the mesh files it references:
//! - [`UrdfBuilder`]: description parsing into [`ModelNode`] trees
//! - [`StlMeshProvider`]: STL mesh decoding
//! - [`RobotBuilder`] / [`MeshProvider`]: the boundary traits the viewer
//!   core consumes, so tests and alternative formats can plug in
//! - joint types and the joint transform math

pub mod joint;
pub mod model;
pub mod primitive;
pub mod stl;
pub mod urdf;

pub use joint::{joint_transform, JointLimits, JointType};
pub use model::{
    Geometry, JointInfo, MeshProvider, ModelError, ModelNode, ModelSource, RobotBuilder,
};
pub use stl::StlMeshProvider;
pub use urdf::UrdfBuilder;
