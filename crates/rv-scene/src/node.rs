//! Scene node definition.

use glam::Mat4;
use uuid::Uuid;

use crate::mesh::MeshHandle;

/// A node in the scene graph.
///
/// Nodes carry a local transform relative to their parent. Geometry is
/// optional; articulation nodes and grouping nodes have none until (or
/// unless) a mesh load assigns one.
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Unique identifier for this node.
    pub id: Uuid,

    /// Human-readable name (link or joint name from the description).
    pub name: String,

    /// Transform relative to the parent node.
    pub local_transform: Mat4,

    /// Handle to mesh data in the store, if this node has geometry.
    pub mesh: Option<MeshHandle>,

    /// Base color (RGBA) applied to the mesh.
    pub color: [f32; 4],

    /// Whether this node is rendered.
    pub visible: bool,

    /// Whether this node's geometry casts shadows. Explicit capability flag,
    /// set recursively when geometry arrives.
    pub casts_shadow: bool,
}

impl SceneNode {
    /// Creates a node with identity transform and no geometry.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            local_transform: Mat4::IDENTITY,
            mesh: None,
            color: [0.7, 0.7, 0.7, 1.0],
            visible: true,
            casts_shadow: false,
        }
    }

    /// Sets the local transform.
    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.local_transform = transform;
        self
    }

    /// Sets the mesh handle.
    pub fn with_mesh(mut self, mesh: MeshHandle) -> Self {
        self.mesh = Some(mesh);
        self
    }

    /// Sets the color.
    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    /// Returns true if this node has geometry to draw.
    pub fn has_geometry(&self) -> bool {
        self.mesh.is_some()
    }
}
