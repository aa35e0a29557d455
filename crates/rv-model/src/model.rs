//! Model tree and the loading boundary traits.

use std::path::{Path, PathBuf};

use glam::{Mat4, Vec3};

use rv_scene::MeshData;

use crate::joint::{JointLimits, JointType};

/// Identifies where a model is loaded from: a package root plus the path of
/// the description file. Two sources are the same load target only when both
/// components match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelSource {
    /// Root directory that `package://` mesh references resolve against.
    pub package_root: PathBuf,
    /// Path of the robot description file.
    pub model_path: PathBuf,
}

impl ModelSource {
    pub fn new(package_root: impl Into<PathBuf>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            package_root: package_root.into(),
            model_path: model_path.into(),
        }
    }
}

/// Geometry attached to a model node.
#[derive(Debug, Clone)]
pub enum Geometry {
    /// Geometry generated while building (primitive shapes). Available
    /// immediately at attach time.
    Inline(MeshData),
    /// Geometry referenced by file path, decoded asynchronously by a
    /// [`MeshProvider`] after the model is attached.
    External { path: PathBuf },
}

/// Articulation carried by a model node.
#[derive(Debug, Clone)]
pub struct JointInfo {
    /// Joint name, the key used by the angle mutation surface.
    pub name: String,
    pub joint_type: JointType,
    /// Normalized articulation axis.
    pub axis: Vec3,
    /// Limits from the description, if any. Not enforced by the viewer.
    pub limits: Option<JointLimits>,
}

/// One node of a built (but not yet attached) robot model.
///
/// The builder emits a tree; the viewer walks it to create scene nodes.
#[derive(Debug, Clone)]
pub struct ModelNode {
    pub name: String,
    /// Fixed transform relative to the parent node.
    pub origin: Mat4,
    pub geometry: Option<Geometry>,
    /// Color applied to this node's geometry.
    pub color: [f32; 4],
    /// Present when this node is an articulation point.
    pub joint: Option<JointInfo>,
    pub children: Vec<ModelNode>,
}

impl ModelNode {
    /// Creates a plain grouping node.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: Mat4::IDENTITY,
            geometry: None,
            color: [0.7, 0.7, 0.7, 1.0],
            joint: None,
            children: Vec::new(),
        }
    }

    /// Sets the fixed origin transform.
    pub fn with_origin(mut self, origin: Mat4) -> Self {
        self.origin = origin;
        self
    }

    /// Sets the geometry.
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Sets the color.
    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    /// Marks this node as a joint.
    pub fn with_joint(mut self, joint: JointInfo) -> Self {
        self.joint = Some(joint);
        self
    }

    /// Adds a child node.
    pub fn with_child(mut self, child: ModelNode) -> Self {
        self.children.push(child);
        self
    }
}

/// Errors from building a model or decoding one of its meshes.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    #[error("Failed to parse description: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to load mesh '{path}': {reason}")]
    MeshLoad { path: String, reason: String },

    #[error("Unsupported mesh format: {0}")]
    UnsupportedMeshFormat(String),

    #[error("Link not found: {0}")]
    LinkNotFound(String),

    #[error("Empty description: no links defined")]
    EmptyModel,
}

/// Builds a robot model tree from a source locator.
///
/// Implementations run on a blocking worker; they may touch the
/// filesystem freely but must not assume any shared viewer state.
pub trait RobotBuilder: Send + Sync {
    /// Parses the description and returns the root model nodes.
    fn build(&self, source: &ModelSource) -> Result<Vec<ModelNode>, ModelError>;
}

/// Decodes a single external mesh file.
pub trait MeshProvider: Send + Sync {
    /// Loads the mesh at `path` into mesh data.
    fn load(&self, path: &Path) -> Result<MeshData, ModelError>;
}
