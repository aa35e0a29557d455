//! Robot Viewer Scene Graph
//!
//! Retained scene state for the robot viewer:
//! - [`Scene`]: flat node storage with parent/child topology and the dirty flag
//! - [`SceneNode`]: a transformable node that may reference a mesh
//! - [`MeshStore`]: handle-based mesh resource ownership
//! - [`BoundingBox`]: axis-aligned bounds with union/transform operations
//! - [`UpAxis`]: up-axis specifier parsing and the root orientation table

pub mod bounds;
pub mod mesh;
pub mod node;
pub mod scene;
pub mod up_axis;

pub use bounds::BoundingBox;
pub use mesh::{MeshData, MeshHandle, MeshStore};
pub use node::SceneNode;
pub use scene::Scene;
pub use up_axis::UpAxis;
